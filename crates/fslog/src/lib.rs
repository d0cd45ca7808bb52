//! # fslog
//!
//! Append-only file logger.
//!
//! A [`Logger`] owns one directory and writes two files into it:
//!
//! - `logs.log` - informational lines from [`Logger::log`], best effort
//! - `errors.log` - error records from [`Logger::error`], reported back
//!   through a [`Completion`]
//!
//! ## Key Types
//!
//! - [`Logger`] - Dispatches writes onto the Tokio runtime
//! - [`LoggerConfig`] - Directory plus the `debug`/`every` switches
//! - [`ErrorRecord`] - Error input, normalized in place
//! - [`LoggedError`] - Event broadcast to [`Logger::subscribe`] receivers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fslog::{ErrorRecord, Logger, LoggerConfig};
//!
//! let logger = Logger::new(LoggerConfig::new("/var/log/myapp"))?;
//!
//! fslog::log!(logger, "listening on", 8080);
//!
//! let mut err = ErrorRecord::new("upstream timed out").with_code(504);
//! logger.error(&mut err, Some("proxy")).await?;
//! ```

mod config;
mod error;
mod format;
mod logger;
mod record;
mod sink;

pub use config::{LoggerConfig, ERRORS_FILE_NAME, LOGS_FILE_NAME};
pub use error::{Error, Result};
pub use format::{stringify, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use logger::{Completion, LoggedError, Logger, Outcome, SkipReason};
pub use record::{ErrorRecord, DEFAULT_CODE, UNKNOWN_ERROR};
pub use sink::{FsSink, LogSink};

#[doc(hidden)]
pub use serde_json as __serde_json;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Append values to a logger's `logs.log` without waiting.
///
/// Each value is anything `serde_json::json!` accepts as a single token
/// tree; wrap longer expressions in parentheses.
///
/// ```rust,ignore
/// fslog::log!(logger, "a", 1, {"x": 1});
/// fslog::log!(logger, "user", (user.id));
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr $(, $value:tt)* $(,)?) => {
        $logger.log(&[$($crate::__serde_json::json!($value)),*])
    };
}

/// Initialize tracing diagnostics on stderr. `RUST_LOG` overrides `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
