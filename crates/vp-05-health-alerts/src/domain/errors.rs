//! # Domain Errors

use shared_types::{Classify, ErrorKind};
use thiserror::Error;
use vp_02_persistence::StoreError;
use vp_04_performance_metrics::MetricsError;

/// Alert evaluation error types. Failures are never replaced by a default
/// verdict.
#[derive(Debug, Error)]
pub enum AlertError {
    /// A metric could not be computed.
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// A store query failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Classify for AlertError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Metrics(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
