//! # Domain Errors
//!
//! Error types for the Persistence subsystem.

use shared_types::{Classify, ErrorKind, Height};
use thiserror::Error;

/// Persistence error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness or reference constraint rejected a write.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// The underlying database failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored value could not be decoded.
    #[error("Corrupt {column} value: {value}")]
    Corrupt {
        /// Column that held the value
        column: String,
        /// Raw stored value
        value: String,
    },

    /// A transaction row referenced a block that is not persisted.
    #[error("Transaction {tx_id} references missing block {height}")]
    MissingBlock {
        /// Offending transaction id
        tx_id: String,
        /// Referenced height
        height: Height,
    },

    /// The requested row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Constraint(_)
            | Self::Database(_)
            | Self::Corrupt { .. }
            | Self::MissingBlock { .. } => ErrorKind::Persistence,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return Self::Constraint(err.to_string());
        }
        match err {
            // Row decoders wrap their own errors; unwrap them again here.
            rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
                match inner.downcast::<StoreError>() {
                    Ok(store_err) => *store_err,
                    Err(other) => Self::Database(other.to_string()),
                }
            }
            other => Self::Database(other.to_string()),
        }
    }
}
