//! # Domain Errors

use shared_types::{Address, Classify, ErrorKind};
use thiserror::Error;
use vp_02_persistence::StoreError;

/// Performance metrics error types.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A store query failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No validator row exists for the address.
    #[error("Validator not found: {0}")]
    ValidatorNotFound(Address),
}

impl Classify for MetricsError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::ValidatorNotFound(_) => ErrorKind::NotFound,
        }
    }
}
