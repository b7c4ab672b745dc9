//! Domain error types

use thiserror::Error;

/// Error when a store operation cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No recording stored at {0}")]
    NotFound(String),

    #[error("No recording at index {index} (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Recording title must not be empty")]
    EmptyTitle,

    #[error("A recording is already stored at {0}")]
    DuplicateLocation(String),

    #[error("Cannot delete a recording while it is playing")]
    InPlayback,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
