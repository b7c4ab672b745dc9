//! Clip storage port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Failed to prepare storage directory {path}: {reason}")]
    PrepareFailed { path: String, reason: String },

    #[error("Failed to delete {path}: {reason}")]
    DeleteFailed { path: String, reason: String },

    #[error("Clip file not found: {0}")]
    NotFound(String),
}

/// Port for the directory holding clip files
#[async_trait]
pub trait ClipStorage: Send + Sync {
    /// Create the storage directory if needed
    async fn prepare(&self) -> Result<(), StorageError>;

    /// Full path for a clip file name
    fn destination(&self, file_name: &str) -> PathBuf;

    /// Remove a clip file
    async fn remove(&self, location: &Path) -> Result<(), StorageError>;

    /// Check whether a clip file exists
    fn exists(&self, location: &Path) -> bool;
}
