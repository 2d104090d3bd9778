//! Result channel passed to every backend function.
//!
//! Backends never return errors directly. Each function receives a `&mut FunctionResult`,
//! marks it failed with a diagnostic when something goes wrong, and only writes its output
//! structure on success. Services turn the channel into a [`crate::Result`] immediately
//! after the call returns.

use std::io;

use tracing::{debug, warn};

use crate::error::{ErrorKind, NativeError, Result};

/// Message used when a backend marks a failure without saying why.
const MISSING_MESSAGE: &str = "native call failed without a diagnostic message";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    kind: ErrorKind,
    message: Option<String>,
    code: Option<i32>,
}

/// Success/failure record for a single native call.
///
/// A fresh channel is created for every call. It is handed to the backend as `&mut`, so
/// one instance can never be written by two calls at the same time.
#[derive(Debug, Default)]
pub struct FunctionResult {
    failure: Option<Failure>,
}

impl FunctionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.failure.as_ref().and_then(|f| f.message.as_deref())
    }

    pub fn mark_failed(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.record(kind, Some(message.into()), None);
    }

    pub fn mark_failed_with_code(&mut self, kind: ErrorKind, message: impl Into<String>, code: i32) {
        self.record(kind, Some(message.into()), Some(code));
    }

    /// Marks the channel failed from an I/O error, keeping its OS error code.
    pub fn mark_failed_with_io(&mut self, message: &str, err: &io::Error) {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::ResolutionFailure,
            io::ErrorKind::Unsupported => ErrorKind::UnsupportedCapability,
            _ => ErrorKind::Os,
        };
        self.record(kind, Some(format!("{}: {}", message, err)), err.raw_os_error());
    }

    /// Marks the channel failed without a message. The conversion reports it as an
    /// os-failure.
    pub fn mark_failed_silently(&mut self, kind: ErrorKind) {
        self.record(kind, None, None);
    }

    fn record(&mut self, kind: ErrorKind, message: Option<String>, code: Option<i32>) {
        if let Some(existing) = &self.failure {
            warn!(
                "Ignoring second failure ({}: {:?}) after {}: {:?}",
                kind, message, existing.kind, existing.message
            );
            return;
        }
        self.failure = Some(Failure { kind, message, code });
    }

    /// Converts the channel into an error, if it was marked failed.
    pub fn check(self) -> Result<()> {
        match self.failure {
            None => Ok(()),
            Some(Failure { kind, message, code }) => {
                let err = match message.filter(|m| !m.trim().is_empty()) {
                    Some(message) => NativeError::with_code(kind, message, code),
                    None => NativeError::with_code(ErrorKind::Os, MISSING_MESSAGE, code),
                };
                debug!("Native call failed ({}): {}", err.kind(), err);
                Err(err)
            }
        }
    }

    /// Hands out `value` only when the call succeeded.
    pub fn into_result<T>(self, value: T) -> Result<T> {
        self.check().map(|()| value)
    }
}
