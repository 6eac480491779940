//! Diagnostic sinks for errors that lookups report but do not return.
//!
//! Expected failures (a malformed file in a bundle, an unsupported query, an empty
//! directory list) are returned to the caller as sentinel values and recorded here
//! with their detail. Sinks are for diagnostics, never for control flow.

use crate::error::{ErrorKind, LookupError};
use crate::prelude::warn;
use std::sync::{Mutex, PoisonError};

/// Receives errors recorded by lookups.
///
/// # Example
///
/// ```
/// use x509_lookup::error::LookupError;
/// use x509_lookup::sink::ErrorSink;
///
/// #[derive(Debug)]
/// struct Stderr;
///
/// impl ErrorSink for Stderr {
///     fn record(&self, error: &LookupError) {
///         eprintln!("lookup: {error}");
///     }
/// }
/// ```
pub trait ErrorSink: Send + Sync + 'static {
    /// Records an error.
    fn record(&self, error: &LookupError);
}

/// Default sink: emits each error as a `warn` event through the logging facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn record(&self, error: &LookupError) {
        warn!("X.509 lookup error: kind={}, error={}", error.kind(), error);
    }
}

/// An error recorded by an [`ErrorQueue`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReportedError {
    /// The kind of the error.
    pub kind: ErrorKind,
    /// The error message, including the source chain.
    pub message: String,
}

/// An in-memory sink that keeps every recorded error until drained.
#[derive(Debug, Default)]
pub struct ErrorQueue {
    errors: Mutex<Vec<ReportedError>>,
}

impl ErrorQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all recorded errors, oldest first.
    pub fn drain(&self) -> Vec<ReportedError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the kinds of the recorded errors, oldest first, without removing them.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.kind)
            .collect()
    }

    /// Returns `true` if no error is queued.
    pub fn is_empty(&self) -> bool {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl ErrorSink for ErrorQueue {
    fn record(&self, error: &LookupError) {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ReportedError {
                kind: error.kind(),
                message,
            });
    }
}
