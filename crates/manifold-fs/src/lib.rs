#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod local;

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use manifold_core::types::BlockLocation;
use thiserror::Error;

pub use local::LocalFs;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Seekable read stream handed out by [`Fs::open_read`].
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub blocks: Vec<BlockLocation>,
}

/// Minimal filesystem capability consumed by the input layer.
///
/// Read-only: producer and test code write through the platform directly,
/// never through this interface.
pub trait Fs: Send + Sync {
    /// Immediate children of `dir`, in the implementation's listing order.
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, FsError>;

    /// Length and block locations of the file at `path`. Fails with
    /// [`FsError::NotFound`] for a missing path and [`FsError::NotAFile`]
    /// when the path names a directory.
    fn stat(&self, path: &Path) -> Result<FileStat, FsError>;

    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadSeek>, FsError>;
}
