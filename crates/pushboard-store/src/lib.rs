//! # Pushboard Store
//!
//! File-backed persistence for push-notification templates:
//! - One JSON file per template in a single directory, no separate index
//! - Ids derived from file names, with path-traversal protection
//! - Collision-free naming (`Foo`, `Foo-1`, `Foo-2`, ...)
//! - `created` / `updated` bookkeeping in sortable ISO-8601 form
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pushboard_store::*;
//! use serde_json::json;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let storage = FileStorage::new("templates").await?;
//!
//! let created = storage
//!     .create_template(TemplateInput::named("Welcome").payload(json!({"title": "Hi"})))
//!     .await?;
//!
//! let template = storage.get_template(&created.id).await?;
//! println!("{} was created at {}", template.name, template.created);
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod entities;
pub mod error;
pub mod storage;

pub use address::TemplateAddress;
pub use entities::{
    CreatedTemplate, Template, TemplateInput, TemplateRecord, TemplateSummary, UpdatedTemplate,
    now_timestamp,
};
pub use error::{Result, StoreError};
pub use storage::{FileStorage, TemplateStorage};
