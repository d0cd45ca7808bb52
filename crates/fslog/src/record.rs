use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// Code assigned to records that carry none
pub const DEFAULT_CODE: u16 = 500;

/// Message assigned to records that carry none
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// An error handed to [`crate::Logger::error`].
///
/// The record is an in/out parameter: `error` fills missing fields with
/// defaults and marks it `logged`, and callers may read those values back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Severity, HTTP-status style
    pub code: Option<u16>,
    pub message: Option<String>,
    /// Detailed trace, used instead of `message` in debug mode
    pub stack: Option<String>,
    /// Context label, takes precedence over the prefix passed to `error`
    pub prefix: Option<String>,
    /// Set once the record has been accepted for writing
    #[serde(default)]
    pub logged: bool,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Build a record from any error, rendering its `source()` chain as the stack.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let message = err.to_string();
        let mut stack = message.clone();
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message: Some(message),
            stack: Some(stack),
            ..Default::default()
        }
    }

    /// Fill missing fields with defaults. Safe to call repeatedly.
    pub fn normalize(&mut self) {
        let code = self.code.filter(|c| *c != 0).unwrap_or(DEFAULT_CODE);
        self.code = Some(code);

        if self.message.as_deref().map_or(true, str::is_empty) {
            self.message = Some(UNKNOWN_ERROR.to_string());
        }
        if self.stack.as_deref().map_or(true, str::is_empty) {
            self.stack = self.message.clone();
        }
    }

    /// Text written to the errors file: the stack in debug mode, else the message.
    pub fn detail(&self, debug: bool) -> &str {
        let selected = if debug { &self.stack } else { &self.message };
        selected
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or(UNKNOWN_ERROR)
    }

    /// The record's own prefix if set, otherwise `fallback`. Empty strings count as absent.
    pub fn resolve_prefix<'a>(&'a self, fallback: Option<&'a str>) -> Option<&'a str> {
        self.prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .or(fallback.filter(|p| !p.is_empty()))
    }
}

impl From<std::io::Error> for ErrorRecord {
    fn from(err: std::io::Error) -> Self {
        Self::from_error(&err)
    }
}

impl From<&anyhow::Error> for ErrorRecord {
    fn from(err: &anyhow::Error) -> Self {
        Self {
            message: Some(err.to_string()),
            stack: Some(format!("{:?}", err)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty_record() {
        let mut record = ErrorRecord::default();
        record.normalize();
        assert_eq!(record.code, Some(500));
        assert_eq!(record.message.as_deref(), Some("Unknown error"));
        assert_eq!(record.stack.as_deref(), Some("Unknown error"));
        assert!(!record.logged);
    }

    #[test]
    fn test_normalize_stack_falls_back_to_message() {
        let mut record = ErrorRecord::new("disk on fire").with_code(503);
        record.normalize();
        assert_eq!(record.code, Some(503));
        assert_eq!(record.stack.as_deref(), Some("disk on fire"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut record = ErrorRecord::new("boom").with_stack("boom\n  at main");
        record.normalize();
        let once = record.clone();
        record.normalize();
        assert_eq!(record, once);
    }

    #[test]
    fn test_detail_selects_by_debug() {
        let record = ErrorRecord::new("short").with_stack("long trace");
        assert_eq!(record.detail(false), "short");
        assert_eq!(record.detail(true), "long trace");
    }

    #[test]
    fn test_resolve_prefix_precedence() {
        let own = ErrorRecord::new("x").with_prefix("db");
        assert_eq!(own.resolve_prefix(Some("http")), Some("db"));

        let none = ErrorRecord::new("x");
        assert_eq!(none.resolve_prefix(Some("http")), Some("http"));
        assert_eq!(none.resolve_prefix(None), None);
        assert_eq!(none.resolve_prefix(Some("")), None);
    }

    #[test]
    fn test_from_io_error_renders_chain() {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "failed to load settings")
            }
        }

        impl StdError for Outer {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "settings.toml missing",
        ));
        let record = ErrorRecord::from_error(&err);
        assert_eq!(record.message.as_deref(), Some("failed to load settings"));
        assert_eq!(
            record.stack.as_deref(),
            Some("failed to load settings\n    caused by: settings.toml missing")
        );
    }

    #[test]
    fn test_from_anyhow_keeps_context() {
        let err = anyhow::anyhow!("connection refused").context("sync failed");
        let record = ErrorRecord::from(&err);
        assert_eq!(record.message.as_deref(), Some("sync failed"));
        assert!(record.stack.as_deref().unwrap().contains("connection refused"));
    }
}
