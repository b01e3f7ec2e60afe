//! API models for requests and responses

pub mod api;
pub mod template;

// Re-export commonly used types
pub use api::*;
pub use template::*;
