use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error surface for the sync runtime, batch processor, and watcher.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("package error: {0}")]
    Package(#[from] aemsync_package::PackageError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("task failure: {0}")]
    Task(String),
}

impl SyncError {
    /// The local path an I/O failure refers to.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Failure submitting a package to one target.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Transport(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
