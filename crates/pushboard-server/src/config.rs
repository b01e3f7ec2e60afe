//! Server configuration management

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Directory holding one JSON file per template
    pub templates_dir: PathBuf,

    /// CORS allowed origins; `*` allows any origin
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Optional directory with the editor front end
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: match lookup("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| ApiError::Config("Invalid PORT value".to_string()))?,
                None => defaults.port,
            },
            templates_dir: lookup("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: match lookup("MAX_BODY_BYTES") {
                Some(limit) => limit
                    .parse()
                    .map_err(|_| ApiError::Config("Invalid MAX_BODY_BYTES value".to_string()))?,
                None => defaults.max_body_bytes,
            },
            static_dir: lookup("STATIC_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Whether CORS should accept any origin
    pub fn cors_permissive(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5050,
            templates_dir: PathBuf::from("templates"),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: 10 * 1024 * 1024,
            static_dir: None,
        }
    }
}
