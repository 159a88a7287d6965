//! # Domain Errors
//!
//! Error types for Block Sync.

use shared_types::{Classify, ErrorKind};
use thiserror::Error;
use vp_01_ledger_source::LedgerError;
use vp_02_persistence::StoreError;

/// Block sync error types.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The ledger failed outside a per-height fetch (latest height, committee,
    /// mempool). Aborts the pass.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A store read or block write failed. Aborts the pass.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Batch size must be at least one.
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),
}

impl Classify for SyncError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::InvalidBatchSize(_) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_source() {
        let err: SyncError = LedgerError::Network("timeout".into()).into();
        assert_eq!(err.kind(), ErrorKind::Upstream);

        let err: SyncError = StoreError::Database("locked".into()).into();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
