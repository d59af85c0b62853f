//! imgdrop Storage Library
//!
//! This crate provides the storage capability the upload pipeline writes through:
//! "create a writable sink at a path". The pipeline only depends on the [`Storage`]
//! and [`Sink`] traits, so tests and hosts can swap in any backend.
//!
//! Backends:
//!
//! - [`LocalStorage`]: the local filesystem, optionally confined to a root directory.
//! - [`DiscardStorage`]: accepts and counts bytes without persisting them.

pub mod discard;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use discard::DiscardStorage;
pub use factory::create_storage;
pub use imgdrop_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Sink, Storage, StorageError, StorageResult};
