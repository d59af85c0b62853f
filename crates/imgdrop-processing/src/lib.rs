//! imgdrop Processing Library
//!
//! Validate-then-save pipeline for uploaded images:
//! - Format resolution: claimed format token -> decoder ([`format`])
//! - Decode validation with a byte limit ([`validator`])
//! - Persisting the original bytes as `<id>.<format>` through a [`imgdrop_storage::Storage`] ([`upload`])

pub mod format;
pub mod upload;
pub mod validator;

// Re-export commonly used types
pub use format::{
    extension_of, resolve, Decoder, FormatError, FormatRegistry, FormatRegistryBuilder,
};
pub use upload::{ImageUploader, UploadError, UploadRequest, UploadResult};
pub use validator::{ImageDimensions, ImageValidator, ValidationError};
