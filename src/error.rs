//! Error types returned by every native operation.

use std::fmt;

use thiserror::Error;

/// Classification of a native failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The platform or console type cannot perform the requested operation.
    UnsupportedCapability,
    /// The descriptor is not a console or is not open.
    InvalidHandle,
    /// The path cannot be mapped to a mounted file system.
    ResolutionFailure,
    /// The underlying system call failed.
    Os,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnsupportedCapability => "unsupported-capability",
            ErrorKind::InvalidHandle => "invalid-handle",
            ErrorKind::ResolutionFailure => "resolution-failure",
            ErrorKind::Os => "os-failure",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("Unsupported: {0}")]
    UnsupportedCapability(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Could not resolve file system: {0}")]
    ResolutionFailure(String),

    #[error("{}", format_os(.message, .code))]
    Os { message: String, code: Option<i32> },
}

fn format_os(message: &str, code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("{} (errno {})", message, code),
        None => message.to_string(),
    }
}

impl NativeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_code(kind, message, None)
    }

    pub fn with_code(kind: ErrorKind, message: impl Into<String>, code: Option<i32>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::UnsupportedCapability => NativeError::UnsupportedCapability(message),
            ErrorKind::InvalidHandle => NativeError::InvalidHandle(message),
            ErrorKind::ResolutionFailure => NativeError::ResolutionFailure(message),
            ErrorKind::Os => NativeError::Os { message, code },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NativeError::UnsupportedCapability(_) => ErrorKind::UnsupportedCapability,
            NativeError::InvalidHandle(_) => ErrorKind::InvalidHandle,
            NativeError::ResolutionFailure(_) => ErrorKind::ResolutionFailure,
            NativeError::Os { .. } => ErrorKind::Os,
        }
    }

    /// The diagnostic message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            NativeError::UnsupportedCapability(m)
            | NativeError::InvalidHandle(m)
            | NativeError::ResolutionFailure(m) => m,
            NativeError::Os { message, .. } => message,
        }
    }

    /// OS error code, when the failure came from a system call that reported one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            NativeError::Os { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NativeError>;
