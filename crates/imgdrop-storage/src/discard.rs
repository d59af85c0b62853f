//! Storage backend that persists nothing.
//!
//! Used for dry runs: uploads are fully validated and "written", but bytes are only counted.

use crate::traits::{Sink, Storage, StorageResult};
use crate::StorageBackend;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardStorage;

impl DiscardStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for DiscardStorage {
    fn create(&self, path: &Path) -> StorageResult<Box<dyn Sink>> {
        Ok(Box::new(DiscardSink {
            path: path.to_path_buf(),
            bytes_written: 0,
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Discard
    }
}

struct DiscardSink {
    path: PathBuf,
    bytes_written: u64,
}

impl Write for DiscardSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for DiscardSink {
    fn close(self: Box<Self>) -> StorageResult<()> {
        tracing::debug!(
            path = %self.path.display(),
            size_bytes = self.bytes_written,
            "Discarded upload content"
        );
        Ok(())
    }
}
