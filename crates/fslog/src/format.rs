//! Line formatting for both log files.
//!
//! Every line has the shape `<timestamp> >>> <body>\n`, where the timestamp
//! reads like `Fri Oct 16 2026 09:05:03` in local time.

use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

/// `strftime` pattern for line timestamps
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S";

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the host's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    /// Pin the clock to a local wall-clock time, if that time exists.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Render one value: strings verbatim, everything else as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Join values with single spaces.
pub fn join_values(values: &[Value]) -> String {
    values.iter().map(stringify).collect::<Vec<_>>().join(" ")
}

pub fn log_line(timestamp: &str, message: &str) -> String {
    format!("{} >>> {}\n", timestamp, message)
}

pub fn error_line(timestamp: &str, code: u16, prefix: Option<&str>, detail: &str) -> String {
    match prefix {
        Some(prefix) => format!(
            "{} >>> Error {}: {} - {}\n",
            timestamp, code, prefix, detail
        ),
        None => format!("{} >>> Error {}: {}\n", timestamp, code, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_shape() {
        let clock = FixedClock::at(2026, 10, 6, 9, 5, 3).unwrap();
        assert_eq!(timestamp(&clock.now()), "Tue Oct 06 2026 09:05:03");
    }

    #[test]
    fn test_stringify_values() {
        assert_eq!(stringify(&json!("plain text")), "plain text");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "null");
        assert_eq!(stringify(&json!({"x": 1})), r#"{"x":1}"#);
        assert_eq!(stringify(&json!([1, "two"])), r#"[1,"two"]"#);
    }

    #[test]
    fn test_join_values() {
        let values = vec![json!("a"), json!(1), json!({"x": 1})];
        assert_eq!(join_values(&values), r#"a 1 {"x":1}"#);
        assert_eq!(join_values(&[]), "");
    }

    #[test]
    fn test_log_line() {
        assert_eq!(
            log_line("Tue Oct 06 2026 09:05:03", "hello"),
            "Tue Oct 06 2026 09:05:03 >>> hello\n"
        );
    }

    #[test]
    fn test_error_line_with_and_without_prefix() {
        let ts = "Tue Oct 06 2026 09:05:03";
        assert_eq!(
            error_line(ts, 500, Some("db"), "timeout"),
            "Tue Oct 06 2026 09:05:03 >>> Error 500: db - timeout\n"
        );
        assert_eq!(
            error_line(ts, 404, None, "not found"),
            "Tue Oct 06 2026 09:05:03 >>> Error 404: not found\n"
        );
    }
}
