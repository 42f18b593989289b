//! Error types for aemsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while building a [`crate::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The watch root does not exist.
    #[error("watch root does not exist: {path}")]
    WatchRootMissing { path: PathBuf },

    /// The watch root exists but is not a directory.
    #[error("watch root is not a directory: {path}")]
    WatchRootNotDirectory { path: PathBuf },

    /// Underlying I/O failure while inspecting the watch root.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A target URL could not be parsed or is missing required parts.
    ///
    /// `target` never carries credentials.
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// The target list was empty after parsing.
    #[error("at least one target is required")]
    NoTargets,

    /// A zero batch interval would spin the processor.
    #[error("batch interval must be greater than zero")]
    ZeroInterval,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
