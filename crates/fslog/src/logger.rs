use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{resolve_target, LoggerConfig, ERRORS_FILE_NAME, LOGS_FILE_NAME};
use crate::error::{Error, Result};
use crate::format::{self, Clock, SystemClock};
use crate::record::{ErrorRecord, DEFAULT_CODE};
use crate::sink::{ensure_and_append, FsSink, LogSink};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 64;

/// Why an error record was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No record was given
    Missing,
    /// The record was already written by an earlier call
    AlreadyLogged,
    /// The record's code is below 500 and `every` is off
    BelowThreshold,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "no error given"),
            SkipReason::AlreadyLogged => write!(f, "already logged"),
            SkipReason::BelowThreshold => write!(f, "below severity threshold"),
        }
    }
}

/// Result of a call to [`Logger::error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Written,
    Skipped(SkipReason),
}

/// Broadcast to subscribers once per accepted error, after its write settled
#[derive(Debug, Clone, Serialize)]
pub struct LoggedError {
    /// The normalized record
    pub record: ErrorRecord,
    /// The line that was appended (or attempted)
    pub line: String,
    /// Set when the write failed
    pub write_error: Option<String>,
}

/// Completion of an error write.
///
/// Resolves once the ensure/append chain settled. Dropping it does not
/// cancel the write.
#[must_use = "a Completion reports whether the error record reached disk"]
pub struct Completion {
    state: CompletionState,
}

enum CompletionState {
    Ready(Option<Result<Outcome>>),
    Pending(JoinHandle<Result<Outcome>>),
}

impl Completion {
    fn ready(result: Result<Outcome>) -> Self {
        Self {
            state: CompletionState::Ready(Some(result)),
        }
    }

    fn pending(handle: JoinHandle<Result<Outcome>>) -> Self {
        Self {
            state: CompletionState::Pending(handle),
        }
    }
}

impl Future for Completion {
    type Output = Result<Outcome>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            CompletionState::Ready(slot) => Poll::Ready(slot.take().unwrap_or_else(|| {
                Err(Error::TaskFailed("completion polled after it resolved".to_string()))
            })),
            CompletionState::Pending(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(join_err)) => {
                    Poll::Ready(Err(Error::TaskFailed(join_err.to_string())))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

struct Inner {
    config: LoggerConfig,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<LoggedError>,
    /// Feeds the `logs.log` writer task, started by the first `log` call
    log_tx: OnceLock<mpsc::UnboundedSender<String>>,
}

impl Inner {
    async fn write(&self, file_name: &str, line: &str) -> Result<()> {
        write_line(self.sink.as_ref(), &self.config.path, file_name, line).await
    }

    /// Sender for the writer task, spawning the task on first use.
    fn log_sender(&self, runtime: &Handle) -> &mpsc::UnboundedSender<String> {
        self.log_tx.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            runtime.spawn(run_log_writer(
                Arc::clone(&self.sink),
                self.config.path.clone(),
                rx,
            ));
            tx
        })
    }
}

async fn write_line(sink: &dyn LogSink, dir: &Path, file_name: &str, line: &str) -> Result<()> {
    let target = resolve_target(dir, file_name)?;
    ensure_and_append(sink, &target, line).await
}

/// Appends queued lines to `logs.log` one at a time, in arrival order.
///
/// Holds no reference back to the logger, so the task ends once every
/// `Logger` clone is dropped and the channel closes.
async fn run_log_writer(
    sink: Arc<dyn LogSink>,
    dir: PathBuf,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = rx.recv().await {
        if let Err(e) = write_line(sink.as_ref(), &dir, LOGS_FILE_NAME, &line).await {
            debug!(error = %e, "Dropped log line");
        }
    }
}

/// Appends log lines to `<path>/logs.log` and error records to `<path>/errors.log`.
///
/// Writes are dispatched onto the current Tokio runtime. Cloning is cheap and
/// clones share configuration and subscribers.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger writing through the filesystem with the system clock.
    /// Performs no I/O.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::with_parts(config, Arc::new(FsSink), Arc::new(SystemClock))
    }

    /// Create a logger with explicit filesystem and clock collaborators.
    pub fn with_parts(
        config: LoggerConfig,
        sink: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                sink,
                clock,
                events,
                log_tx: OnceLock::new(),
            }),
        })
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    pub fn path(&self) -> &Path {
        &self.inner.config.path
    }

    pub fn debug(&self) -> bool {
        self.inner.config.debug
    }

    pub fn every(&self) -> bool {
        self.inner.config.every
    }

    /// Current absolute location of `logs.log`
    pub fn logs_path(&self) -> Result<PathBuf> {
        resolve_target(self.path(), LOGS_FILE_NAME)
    }

    /// Current absolute location of `errors.log`
    pub fn errors_path(&self) -> Result<PathBuf> {
        resolve_target(self.path(), ERRORS_FILE_NAME)
    }

    /// Subscribe to records accepted by [`Logger::error`].
    pub fn subscribe(&self) -> broadcast::Receiver<LoggedError> {
        self.inner.events.subscribe()
    }

    fn timestamp(&self) -> String {
        format::timestamp(&self.inner.clock.now())
    }

    /// Append the space-joined values to `logs.log` without waiting.
    ///
    /// Lines from one logger are written in call order by a single writer
    /// task. Best effort: failures, including a missing runtime, are dropped.
    pub fn log(&self, values: &[Value]) {
        let line = format::log_line(&self.timestamp(), &format::join_values(values));

        let Ok(runtime) = Handle::try_current() else {
            debug!("No Tokio runtime, dropping log line");
            return;
        };

        if self.inner.log_sender(&runtime).send(line).is_err() {
            debug!("Log writer stopped, dropping log line");
        }
    }

    /// Append the space-joined values to `logs.log` and wait for the write.
    pub async fn write_log(&self, values: &[Value]) -> Result<()> {
        let line = format::log_line(&self.timestamp(), &format::join_values(values));
        self.inner.write(LOGS_FILE_NAME, &line).await
    }

    fn skip_reason(&self, record: &ErrorRecord) -> Option<SkipReason> {
        if record.logged {
            return Some(SkipReason::AlreadyLogged);
        }
        match record.code {
            Some(code) if code < DEFAULT_CODE && !self.every() => Some(SkipReason::BelowThreshold),
            _ => None,
        }
    }

    /// Normalize `record` in place and append it to `errors.log`.
    ///
    /// By the time this returns the record carries its defaults and is
    /// marked `logged`, so passing it again is a no-op.
    ///
    /// Two guards apply, both skipping the record without touching it: the
    /// `logged` marker (a record is written at most once) and the severity
    /// threshold (a code below 500 is skipped unless `every` is set). A
    /// missing record is skipped as well.
    ///
    /// The record's own `prefix` wins over the `prefix` argument.
    pub fn error<'r>(
        &self,
        record: impl Into<Option<&'r mut ErrorRecord>>,
        prefix: Option<&str>,
    ) -> Completion {
        let Some(record) = record.into() else {
            return Completion::ready(Ok(Outcome::Skipped(SkipReason::Missing)));
        };

        if let Some(reason) = self.skip_reason(record) {
            debug!(code = ?record.code, %reason, "Skipping error record");
            return Completion::ready(Ok(Outcome::Skipped(reason)));
        }

        let Ok(runtime) = Handle::try_current() else {
            return Completion::ready(Err(Error::NoRuntime));
        };

        record.normalize();
        record.logged = true;

        let line = format::error_line(
            &self.timestamp(),
            record.code.unwrap_or(DEFAULT_CODE),
            record.resolve_prefix(prefix),
            record.detail(self.debug()),
        );

        let inner = Arc::clone(&self.inner);
        let normalized = record.clone();

        Completion::pending(runtime.spawn(async move {
            let result = inner.write(ERRORS_FILE_NAME, &line).await;
            debug!(
                code = normalized.code.unwrap_or(DEFAULT_CODE),
                ok = result.is_ok(),
                "Error record write settled"
            );

            let _ = inner.events.send(LoggedError {
                record: normalized,
                line,
                write_error: result.as_ref().err().map(|e| e.to_string()),
            });

            result.map(|()| Outcome::Written)
        }))
    }
}
