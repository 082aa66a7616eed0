//! Injected build log.
//!
//! Diagnostics and per-entity failures are reported through a `BuildLog`
//! passed in by the caller instead of a process-wide logger. Production code
//! uses `TracingLog`; tests substitute `MemoryLog` and inspect what was
//! written.
//!
//! Logging is best effort: `emit` swallows sink failures so they never
//! affect the records returned to the caller.

use std::sync::Mutex;

use thiserror::Error;

/// Severity of a build log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    /// Errors
    Error,
    /// Warnings
    Warning,
    /// Informational notes
    Info,
}

/// A log sink refused or failed to record a line.
#[derive(Debug, Clone, Error)]
#[error("build log failed: {0}")]
pub struct LogError(pub String);

/// Destination for build log lines.
pub trait BuildLog: Send + Sync {
    /// Record one line at `level`.
    ///
    /// # Errors
    ///
    /// Returns `LogError` if the sink could not record the line.
    fn log(&self, level: LogLevel, text: &str) -> Result<(), LogError>;
}

/// Write a line, ignoring sink failures.
pub fn emit(log: &dyn BuildLog, level: LogLevel, text: &str) {
    if let Err(e) = log.log(level, text) {
        tracing::debug!(error = %e, ?level, "dropped build log line");
    }
}

/// Forwards build log lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl BuildLog for TracingLog {
    fn log(&self, level: LogLevel, text: &str) -> Result<(), LogError> {
        match level {
            LogLevel::Error => tracing::error!(target: "tessera::build", "{text}"),
            LogLevel::Warning => tracing::warn!(target: "tessera::build", "{text}"),
            LogLevel::Info => tracing::info!(target: "tessera::build", "{text}"),
        }
        Ok(())
    }
}

/// Keeps build log lines in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded lines in write order.
    #[must_use]
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Recorded lines at `level`.
    #[must_use]
    pub fn at(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }
}

impl BuildLog for MemoryLog {
    fn log(&self, level: LogLevel, text: &str) -> Result<(), LogError> {
        self.lines
            .lock()
            .map_err(|e| LogError(e.to_string()))?
            .push((level, text.to_string()));
        Ok(())
    }
}
