//! Upload pipeline: resolve → read → decode → store.

pub mod error;
pub mod pipeline;
pub mod types;

pub use error::{UploadError, UploadResult};
pub use pipeline::ImageUploader;
pub use types::UploadRequest;
