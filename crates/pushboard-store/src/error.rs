//! Error types for the pushboard template store

use thiserror::Error;

/// Store-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template {id} is corrupt: {source}")]
    CorruptData {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(id: &str) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn invalid_input(msg: &str) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    pub fn corrupt(id: &str, source: serde_json::Error) -> Self {
        Self::CorruptData {
            id: id.to_string(),
            source,
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
