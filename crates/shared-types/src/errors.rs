//! # Error Types
//!
//! The error taxonomy shared by every subsystem. Each subsystem keeps its own
//! error enum and classifies it into one of these four kinds.

use thiserror::Error;

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Requested block or validator is absent.
    NotFound,
    /// Fetched data failed structural checks.
    Validation,
    /// The ledger source failed (network, malformed response, explicit error).
    Upstream,
    /// A store query or transactional write failed.
    Persistence,
}

/// Errors surfaced to the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Requested entity is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ledger data failed structural checks.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Ledger source failure.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Store failure.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl MonitorError {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Upstream => Self::Upstream(message),
            ErrorKind::Persistence => Self::Persistence(message),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Implemented by subsystem errors so they can be reported uniformly.
pub trait Classify: std::fmt::Display {
    /// The taxonomy kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Convert into the API-facing error, keeping the message.
    fn to_monitor_error(&self) -> MonitorError {
        MonitorError::new(self.kind(), self.to_string())
    }
}
