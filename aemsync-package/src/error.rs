//! Error types for aemsync-package.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while assembling a package.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Template(#[from] tera::Error),

    /// Zip container error.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Failure writing an entry into the in-memory archive.
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PackageError {
    PackageError::Io {
        path: path.into(),
        source,
    }
}
