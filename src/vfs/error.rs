use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by VFS persistence and by host-level VFS lookups.
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("persistence is not enabled for this VFS")]
    NotPersistent,

    #[error("persistence directory is not set")]
    NoDirectory,

    #[error("persistence directory {} does not exist", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Path would escape the persistence directory
    #[error("invalid VFS path: {path}")]
    InvalidPath { path: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no VFS named {name}")]
    UnknownVfs { name: String },
}

impl VfsError {
    pub fn is_not_persistent(&self) -> bool {
        matches!(self, VfsError::NotPersistent)
    }
}

pub type Result<T> = std::result::Result<T, VfsError>;
