//! Storage abstraction traits
//!
//! This module defines the Storage and Sink traits that all storage backends must implement.

use crate::StorageBackend;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create {}: {source}", .path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to close {}: {source}", .path.display())]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A writable, closable handle returned by [`Storage::create`].
///
/// Writes go through [`std::io::Write`]. `close` consumes the sink so it cannot be
/// used afterwards; callers must close every sink they acquire, including after a
/// failed write.
pub trait Sink: Write + Send {
    fn close(self: Box<Self>) -> StorageResult<()>;
}

/// Storage abstraction trait
///
/// All storage backends must implement this trait. The upload pipeline borrows a
/// backend for the duration of one save and never depends on a concrete filesystem.
pub trait Storage: Send + Sync {
    /// Create (or truncate) the file at `path` and return a sink for its content.
    fn create(&self, path: &Path) -> StorageResult<Box<dyn Sink>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
