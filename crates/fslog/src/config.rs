use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name for informational lines
pub const LOGS_FILE_NAME: &str = "logs.log";

/// File name for error records
pub const ERRORS_FILE_NAME: &str = "errors.log";

/// Configuration consumed once by [`crate::Logger::new`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Directory holding `logs.log` and `errors.log`
    pub path: PathBuf,
    /// Log the full stack of an error instead of its message
    #[serde(default)]
    pub debug: bool,
    /// Log every error, not only those with a code of 500 or above
    #[serde(default)]
    pub every: bool,
}

impl LoggerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            debug: false,
            every: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_every(mut self, every: bool) -> Self {
        self.every = every;
        self
    }

    /// Reject a blank directory path.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(Error::MissingPath);
        }
        Ok(())
    }
}

/// Resolve `dir/file_name` against the current working directory.
///
/// Resolution happens per write, so a relative directory follows the
/// process if it changes directory between calls.
pub(crate) fn resolve_target(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let target = dir.join(file_name);
    if target.is_absolute() {
        return Ok(target);
    }
    let cwd = std::env::current_dir().map_err(|e| Error::io(&target, e))?;
    Ok(cwd.join(target))
}
