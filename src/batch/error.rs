//! Error types for batch runs

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to list {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    /// The file or directory the error is about
    pub fn path(&self) -> &Path {
        match self {
            BatchError::NotADirectory(path)
            | BatchError::Walk { path, .. }
            | BatchError::ListDir { path, .. }
            | BatchError::Read { path, .. }
            | BatchError::Write { path, .. } => path,
        }
    }
}
