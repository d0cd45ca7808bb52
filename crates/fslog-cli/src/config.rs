//! Project configuration file support for fslog.
//!
//! Loads configuration from `fslog.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use fslog::LoggerConfig;

/// Project-level configuration loaded from `fslog.toml`
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory holding `logs.log` and `errors.log`
    pub path: Option<PathBuf>,
    /// Log full stacks instead of messages
    pub debug: Option<bool>,
    /// Log errors below code 500 too
    pub every: Option<bool>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "fslog.toml";

/// Values given on the command line; `None` defers to the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub path: Option<PathBuf>,
    pub debug: Option<bool>,
    pub every: Option<bool>,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_file(&config_path).map(Some)
    }

    /// Load an explicitly named config file. A missing file is an error.
    pub fn load_file(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Build the logger configuration.
    /// Priority: command line > config file > default directory
    pub fn resolve(&self, overrides: Overrides) -> Result<LoggerConfig> {
        let path = match overrides.path.or_else(|| self.path.clone()) {
            Some(path) => path,
            None => default_log_dir()?,
        };

        Ok(LoggerConfig::new(path)
            .with_debug(overrides.debug.or(self.debug).unwrap_or(false))
            .with_every(overrides.every.or(self.every).unwrap_or(false)))
    }
}

/// `<data dir>/fslog`, e.g. `~/.local/share/fslog` on Linux
pub fn default_log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data_dir.join("fslog"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ProjectConfig::load(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_load_valid_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "path = \"/var/log/shop\"\ndebug = true\n",
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.path, Some(PathBuf::from("/var/log/shop")));
        assert_eq!(config.debug, Some(true));
        assert_eq!(config.every, None);
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "rotate = true\n").unwrap();

        let err = ProjectConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_load_file_missing_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectConfig::load_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_command_line_wins() {
        let config = ProjectConfig {
            path: Some(PathBuf::from("/from/file")),
            debug: Some(false),
            every: Some(true),
        };

        let resolved = config
            .resolve(Overrides {
                path: Some(PathBuf::from("/from/flag")),
                debug: Some(true),
                every: None,
            })
            .unwrap();

        assert_eq!(resolved.path, PathBuf::from("/from/flag"));
        assert!(resolved.debug);
        assert!(resolved.every);
    }

    #[test]
    fn test_command_line_turns_switches_off() {
        let config = ProjectConfig {
            path: Some(PathBuf::from("/from/file")),
            debug: Some(true),
            every: Some(true),
        };

        let resolved = config
            .resolve(Overrides {
                debug: Some(false),
                every: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert!(!resolved.debug);
        assert!(!resolved.every);
    }

    #[test]
    fn test_file_used_without_flags() {
        let config = ProjectConfig {
            path: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };

        let resolved = config.resolve(Overrides::default()).unwrap();
        assert_eq!(resolved.path, PathBuf::from("/from/file"));
        assert!(!resolved.debug);
        assert!(!resolved.every);
    }
}
