use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the logger
#[derive(Error, Debug)]
pub enum Error {
    /// The configured directory was empty or only whitespace
    #[error("Configuration error: log directory path must be a non-empty string")]
    MissingPath,

    /// Ensuring or appending to a log file failed
    #[error("Failed to write log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A write was requested outside of a Tokio runtime
    #[error("No Tokio runtime available to dispatch the write")]
    NoRuntime,

    /// The write task panicked or was cancelled
    #[error("Write task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
