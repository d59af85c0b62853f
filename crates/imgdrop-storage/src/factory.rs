#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{DiscardStorage, Storage, StorageBackend, StorageResult};
use imgdrop_core::UploadConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub fn create_storage(config: &UploadConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = match &config.local_storage_root {
                Some(root) => LocalStorage::rooted(root),
                None => LocalStorage::new(),
            };
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(crate::StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Discard => Ok(Arc::new(DiscardStorage::new())),
    }
}
