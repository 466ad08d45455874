//! Error types for termcountdown

use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum CountdownError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Target store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read store {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write store {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
