//! Upload pipeline: resolve → read → decode → store.
//!
//! The source is read exactly once into memory (bounded by the size limit). Decode
//! validation and the write both use that buffer, so the stored bytes are the bytes
//! that were validated.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::ImageError;
use imgdrop_core::{ErrorMetadata, LogLevel};
use imgdrop_storage::{Storage, StorageError};

use super::error::{UploadError, UploadResult};
use super::types::{destination_path, UploadRequest};
use crate::format::FormatRegistry;
use crate::validator::{ImageValidator, ValidationError};

/// Validates uploaded images and persists them through a storage backend.
///
/// Cheap to clone; clones share the storage backend and the format registry.
#[derive(Clone)]
pub struct ImageUploader {
    storage: Arc<dyn Storage>,
    registry: Arc<FormatRegistry>,
}

impl ImageUploader {
    /// Uploader using the default `jpg`/`png`/`gif` registry.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_registry(storage, FormatRegistry::global())
    }

    pub fn with_registry(storage: Arc<dyn Storage>, registry: Arc<FormatRegistry>) -> Self {
        Self { storage, registry }
    }

    /// Validate `source` as `format` and store it as `<directory>/<identifier>.<format>`.
    ///
    /// Saving the same identifier twice overwrites the first file; there is no
    /// collision detection.
    pub fn save_file<R: Read>(
        &self,
        source: R,
        directory: impl AsRef<Path>,
        identifier: &str,
        format: &str,
        size_limit: u64,
    ) -> UploadResult<PathBuf> {
        let start = Instant::now();
        let result = self.run(source, directory.as_ref(), identifier, format, size_limit);

        match &result {
            Ok(path) => tracing::info!(
                path = %path.display(),
                identifier = %identifier,
                format = %format,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Image upload stored"
            ),
            Err(e) => log_rejection(e, identifier, format),
        }

        result
    }

    pub fn save<R: Read>(&self, request: UploadRequest<R>) -> UploadResult<PathBuf> {
        self.save_file(
            request.source,
            &request.directory,
            &request.identifier,
            &request.format,
            request.size_limit,
        )
    }

    /// Run [`save`](Self::save) on tokio's blocking pool.
    ///
    /// Reading, decoding and writing are blocking and CPU-bound; async hosts should use
    /// this instead of calling `save` on a runtime worker.
    pub async fn save_async<R>(&self, request: UploadRequest<R>) -> UploadResult<PathBuf>
    where
        R: Read + Send + 'static,
    {
        let uploader = self.clone();
        tokio::task::spawn_blocking(move || uploader.save(request)).await?
    }

    fn run<R: Read>(
        &self,
        source: R,
        directory: &Path,
        identifier: &str,
        format: &str,
        size_limit: u64,
    ) -> UploadResult<PathBuf> {
        // Fail fast: nothing is read for a format we cannot validate.
        let decoder = self
            .registry
            .resolve(format)
            .map_err(|_| UploadError::UnsupportedFormat {
                format: format.to_string(),
            })?;

        tracing::debug!(
            identifier = %identifier,
            format = %format,
            size_limit = size_limit,
            decoder = decoder.name(),
            "Validating image upload"
        );

        let validator = ImageValidator::new(size_limit);
        let data = validator
            .read_source(source)
            .map_err(|e| validation_error(e, format))?;
        let dims = validator
            .validate_decodes(decoder, &data)
            .map_err(|e| validation_error(e, format))?;

        tracing::debug!(
            identifier = %identifier,
            size_bytes = data.len(),
            width = dims.width,
            height = dims.height,
            "Image upload decoded"
        );

        let path = destination_path(directory, identifier, format);
        self.persist(&path, &data)?;

        Ok(path)
    }

    /// Write `data` to a fresh sink at `path`. The sink is closed on every path once
    /// acquired; a write error takes precedence over a close error.
    fn persist(&self, path: &Path, data: &[u8]) -> UploadResult<()> {
        let storage_failed = |source| UploadError::StorageFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut sink = self.storage.create(path).map_err(storage_failed)?;

        let written = sink.write_all(data).and_then(|_| sink.flush());
        let closed = sink.close();

        written.map_err(|source| {
            storage_failed(StorageError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;
        closed.map_err(storage_failed)
    }
}

fn validation_error(err: ValidationError, format: &str) -> UploadError {
    match err {
        ValidationError::FileTooLarge { max } => UploadError::SizeLimitExceeded { limit: max },
        ValidationError::Read(source) => UploadError::DecodeFailed {
            format: format.to_string(),
            source: ImageError::IoError(source),
        },
        ValidationError::Decode(source) => UploadError::DecodeFailed {
            format: format.to_string(),
            source,
        },
    }
}

fn log_rejection(err: &UploadError, identifier: &str, format: &str) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            identifier = %identifier,
            format = %format,
            error_code = code,
            error = %err,
            "Image upload rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            identifier = %identifier,
            format = %format,
            error_code = code,
            error = %err,
            "Image upload rejected"
        ),
        LogLevel::Error => tracing::error!(
            identifier = %identifier,
            format = %format,
            error_code = code,
            error = %err,
            "Image upload failed"
        ),
    }
}
