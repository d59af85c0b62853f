use imgdrop_core::{ErrorMetadata, LogLevel};
use imgdrop_storage::StorageError;
use std::path::PathBuf;

/// Why an upload was not stored.
///
/// Every variant aborts the save immediately; nothing is retried inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Upload is not a valid {format} image: {source}")]
    DecodeFailed {
        format: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Upload exceeds the size limit of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    #[error("Failed to store upload at {}: {source}", .path.display())]
    StorageFailed {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Upload task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

pub type UploadResult<T> = Result<T, UploadError>;

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        match self {
            UploadError::UnsupportedFormat { .. } => 415,
            UploadError::DecodeFailed { .. } => 422,
            UploadError::SizeLimitExceeded { .. } => 413,
            UploadError::StorageFailed { .. } | UploadError::TaskFailed(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            UploadError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            UploadError::DecodeFailed { .. } => "DECODE_FAILED",
            UploadError::SizeLimitExceeded { .. } => "SIZE_LIMIT_EXCEEDED",
            UploadError::StorageFailed { .. } => "STORAGE_FAILED",
            UploadError::TaskFailed(_) => "TASK_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            UploadError::StorageFailed { .. } | UploadError::TaskFailed(_)
        )
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            UploadError::UnsupportedFormat { .. } => Some("Upload a JPEG, PNG or GIF image"),
            UploadError::DecodeFailed { .. } => {
                Some("Check that the file is not corrupted and matches its declared format")
            }
            UploadError::SizeLimitExceeded { .. } => Some("Upload a smaller image"),
            UploadError::StorageFailed { .. } | UploadError::TaskFailed(_) => {
                Some("Retry the upload later")
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::UnsupportedFormat { format } => {
                format!("Image format '{}' is not supported", format)
            }
            UploadError::DecodeFailed { format, .. } => {
                format!("The uploaded file is not a valid {} image", format)
            }
            UploadError::SizeLimitExceeded { limit } => {
                format!("The uploaded file exceeds the limit of {} bytes", limit)
            }
            UploadError::StorageFailed { .. } | UploadError::TaskFailed(_) => {
                "The upload could not be saved".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        matches!(
            self,
            UploadError::StorageFailed { .. } | UploadError::TaskFailed(_)
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::UnsupportedFormat { .. } | UploadError::DecodeFailed { .. } => {
                LogLevel::Debug
            }
            UploadError::SizeLimitExceeded { .. } => LogLevel::Warn,
            UploadError::StorageFailed { .. } | UploadError::TaskFailed(_) => LogLevel::Error,
        }
    }
}
