//! Storage abstraction trait
//!
//! This module defines the Storage trait the API and the preview pipeline use to
//! reach document bytes, plus the error type shared by all implementations.

use async_trait::async_trait;
use smartdoc_core::AppError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidPath(msg) => AppError::InvalidPath(msg),
            StorageError::WriteFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
        }
    }
}

/// Document storage.
///
/// Every method takes a logical file name (never a path) and resolves it through
/// the implementation's [`crate::PathResolver`] first, so an out-of-root name fails
/// with [`StorageError::InvalidPath`] before any I/O happens.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Storage root every resolved path is contained in
    fn root(&self) -> &Path;

    /// Resolve a logical file name to its path under the storage root
    fn resolve(&self, filename: &str) -> StorageResult<PathBuf>;

    /// Write `data` to `filename`, replacing any existing file
    async fn write(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf>;

    /// Check whether the file exists. I/O failures other than absence are errors.
    async fn exists(&self, filename: &str) -> StorageResult<bool>;

    /// Delete the file; deleting a missing file succeeds
    async fn delete(&self, filename: &str) -> StorageResult<()>;

    /// Delete regular files last modified more than `age` ago.
    /// Returns the number of files removed.
    async fn purge_older_than(&self, age: Duration) -> StorageResult<usize>;
}
