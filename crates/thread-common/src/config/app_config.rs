//! Application configuration structs
//!
//! Loads configuration from environment variables.

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub blobs: BlobConfig,
}

/// Remote document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the document store API
    pub base_url: String,
    /// Collection holding the comment documents
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Binary object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Base URL of the object store API
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_collection() -> String {
    "comments".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            store: StoreConfig {
                base_url: env::var("STORE_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("STORE_BASE_URL"))?,
                collection: env::var("STORE_COLLECTION").unwrap_or_else(|_| default_collection()),
                timeout_secs: env::var("STORE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_timeout_secs),
            },
            blobs: BlobConfig {
                base_url: env::var("BLOB_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("BLOB_BASE_URL"))?,
                timeout_secs: env::var("BLOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_timeout_secs),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
