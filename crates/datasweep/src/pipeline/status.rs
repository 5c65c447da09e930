//! Status reporting for the sweeping pipeline.
//!
//! Every step of a file's run produces a [`StatusMessage`]. Messages are kept
//! on the file's outcome and, when a [`StatusReporter`] is attached, forwarded
//! to it as they happen.
//!
//! # Example
//!
//! ```rust,ignore
//! use datasweep::{Pipeline, StatusLevel};
//!
//! let report = Pipeline::builder()
//!     .on_status(|status| {
//!         if status.level == StatusLevel::Error {
//!             eprintln!("{}", status.message);
//!         }
//!     })
//!     .build()?
//!     .process_batch(files);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    /// Neutral information (e.g. a file was loaded)
    Info,
    /// A step completed and changed something
    Success,
    /// A step could not produce its usual output
    Warning,
    /// Processing of a file failed
    Error,
}

impl StatusLevel {
    /// Returns a short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A user-facing notice about one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    /// File the message is about; empty for batch-level messages.
    pub file_name: String,
    pub message: String,
}

impl StatusMessage {
    pub fn new(level: StatusLevel, file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            file_name: file_name.into(),
            message: message.into(),
        }
    }

    pub fn info(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Info, file_name, message)
    }

    pub fn success(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Success, file_name, message)
    }

    pub fn warning(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Warning, file_name, message)
    }

    pub fn error(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, file_name, message)
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Trait for receiving status messages while a batch runs.
///
/// Implementations must be `Send + Sync` so a host can forward messages
/// from a worker thread to its UI.
pub trait StatusReporter: Send + Sync {
    /// Called once per status message, in emission order.
    fn report(&self, status: &StatusMessage);
}

/// Wrapper that implements [`StatusReporter`] using a closure.
pub struct ClosureStatusReporter<F>
where
    F: Fn(&StatusMessage) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureStatusReporter<F>
where
    F: Fn(&StatusMessage) + Send + Sync,
{
    /// Creates a new closure-based status reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> StatusReporter for ClosureStatusReporter<F>
where
    F: Fn(&StatusMessage) + Send + Sync,
{
    fn report(&self, status: &StatusMessage) {
        (self.callback)(status);
    }
}

static_assertions::assert_impl_all!(StatusMessage: Send, Sync);
