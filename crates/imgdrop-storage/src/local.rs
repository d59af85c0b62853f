use crate::traits::{Sink, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

/// Local filesystem storage implementation
#[derive(Clone, Debug, Default)]
pub struct LocalStorage {
    root: Option<PathBuf>,
}

impl LocalStorage {
    /// Storage that writes wherever it is told to.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Storage confined to `root`.
    ///
    /// Paths must lie under `root` and must not contain `..` components.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Validate a destination path against the configured root.
    ///
    /// The check is lexical since the destination usually does not exist yet. `.`
    /// components are ignored on both sides. Symlinks are not resolved, so a link inside
    /// the root pointing elsewhere is followed on write.
    fn check_path(&self, path: &Path) -> StorageResult<()> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let root = without_cur_dir(root);

        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(StorageError::InvalidPath(format!(
                "{} contains a parent directory component",
                path.display()
            )));
        }

        let normalized = without_cur_dir(path);
        let outside = if root.as_os_str().is_empty() {
            normalized.has_root()
        } else {
            !normalized.starts_with(&root)
        };
        if outside {
            return Err(StorageError::InvalidPath(format!(
                "{} resolves outside storage root {}",
                path.display(),
                root.display()
            )));
        }

        Ok(())
    }

    /// Ensure parent directory exists
    fn ensure_parent_dir(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl Storage for LocalStorage {
    fn create(&self, path: &Path) -> StorageResult<Box<dyn Sink>> {
        self.check_path(path)?;

        let create = |source| StorageError::CreateFailed {
            path: path.to_path_buf(),
            source,
        };

        Self::ensure_parent_dir(path).map_err(create)?;
        let file = File::create(path).map_err(create)?;

        tracing::debug!(path = %path.display(), "Local storage file created");

        Ok(Box::new(LocalSink {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            bytes_written: 0,
            started: Instant::now(),
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Buffered file handle handed out by [`LocalStorage`].
struct LocalSink {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
    started: Instant,
}

impl Write for LocalSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Sink for LocalSink {
    fn close(mut self: Box<Self>) -> StorageResult<()> {
        let result = self
            .writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_all());

        match result {
            Ok(()) => {
                tracing::info!(
                    path = %self.path.display(),
                    size_bytes = self.bytes_written,
                    duration_ms = self.started.elapsed().as_secs_f64() * 1000.0,
                    "Local storage write successful"
                );
                Ok(())
            }
            Err(source) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %source,
                    "Local storage close failed"
                );
                Err(StorageError::CloseFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}
