//! imgdrop Core Library
//!
//! This crate provides configuration, the storage backend selector and the error
//! metadata contract shared by all imgdrop components.

pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{LogFormat, UploadConfig};
pub use error::{ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
