#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use imgdrop_storage::{Sink, Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn jpeg_bytes() -> Vec<u8> {
    // The JPEG encoder has no alpha channel support.
    let img = RgbImage::from_pixel(16, 8, Rgb([200, 30, 30]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Jpeg).unwrap();
    cursor.into_inner()
}

pub fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(16, 8, Rgba([0, 0, 255, 255]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

pub fn gif_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(16, 8, Rgba([0, 255, 0, 255]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Gif).unwrap();
    cursor.into_inner()
}

/// Reader that counts how many times it was asked for bytes.
pub struct CountingReader<R> {
    inner: R,
    reads: Arc<AtomicUsize>,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                reads: Arc::clone(&reads),
            },
            reads,
        )
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(buf)
    }
}

/// Reader that always fails.
pub struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailMode {
    None,
    Create,
    Write,
    Close,
}

#[derive(Default)]
struct Recorded {
    created: Vec<PathBuf>,
    files: HashMap<PathBuf, Vec<u8>>,
    closed: Vec<PathBuf>,
}

/// In-memory storage that records every sink it hands out.
#[derive(Clone)]
pub struct RecordingStorage {
    state: Arc<Mutex<Recorded>>,
    fail: FailMode,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::failing(FailMode::None)
    }

    pub fn failing(fail: FailMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(Recorded::default())),
            fail,
        }
    }

    pub fn created(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn closed(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }
}

impl Storage for RecordingStorage {
    fn create(&self, path: &Path) -> StorageResult<Box<dyn Sink>> {
        if self.fail == FailMode::Create {
            return Err(StorageError::CreateFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }

        let mut state = self.state.lock().unwrap();
        state.created.push(path.to_path_buf());
        state.files.insert(path.to_path_buf(), Vec::new());

        Ok(Box::new(RecordingSink {
            path: path.to_path_buf(),
            state: Arc::clone(&self.state),
            fail: self.fail,
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Discard
    }
}

struct RecordingSink {
    path: PathBuf,
    state: Arc<Mutex<Recorded>>,
    fail: FailMode,
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail == FailMode::Write {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        let mut state = self.state.lock().unwrap();
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for RecordingSink {
    fn close(self: Box<Self>) -> StorageResult<()> {
        self.state.lock().unwrap().closed.push(self.path.clone());
        if self.fail == FailMode::Close {
            return Err(StorageError::CloseFailed {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::Other, "sync failed"),
            });
        }
        Ok(())
    }
}
