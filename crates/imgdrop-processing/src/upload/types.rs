//! Types for the upload pipeline.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// One upload, consumed by a single save.
#[derive(Debug)]
pub struct UploadRequest<R> {
    pub source: R,
    pub directory: PathBuf,
    pub identifier: String,
    /// Claimed format token, untrusted until the content decodes as it.
    pub format: String,
    /// Maximum number of bytes read from `source`. 0 = unlimited.
    pub size_limit: u64,
}

impl<R: Read> UploadRequest<R> {
    pub fn new(
        source: R,
        directory: impl Into<PathBuf>,
        identifier: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            source,
            directory: directory.into(),
            identifier: identifier.into(),
            format: format.into(),
            size_limit: 0,
        }
    }

    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }
}

/// `<directory>/<identifier>.<format>`.
///
/// The claimed format is the extension; a client-supplied file name never is. Root and
/// prefix components of the identifier are dropped so the result always stays under
/// `directory`. `..` components are kept for the storage backend to judge.
pub fn destination_path(directory: &Path, identifier: &str, format: &str) -> PathBuf {
    let name = format!("{}.{}", identifier, format);
    let relative: PathBuf = Path::new(&name)
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();
    directory.join(relative)
}
