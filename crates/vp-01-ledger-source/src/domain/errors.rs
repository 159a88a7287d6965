//! # Domain Errors
//!
//! Error types for the Ledger Source.

use shared_types::{Classify, ErrorKind, Height};
use thiserror::Error;

/// Ledger source error types.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport failure while talking to the ledger.
    #[error("Network error: {0}")]
    Network(String),

    /// The ledger answered with a non-success status.
    #[error("Ledger returned HTTP {status} for {url}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint that produced the body
        endpoint: String,
        /// Decoder message
        reason: String,
    },

    /// A block payload decoded but failed structural checks.
    #[error("Invalid block{}: {reason}", height.map(|h| format!(" at height {h}")).unwrap_or_default())]
    InvalidBlock {
        /// Height, when the payload carried one
        height: Option<Height>,
        /// Which check failed
        reason: String,
    },

    /// A committee payload failed structural checks.
    #[error("Invalid committee: {0}")]
    InvalidCommittee(String),

    /// A mempool payload failed structural checks.
    #[error("Invalid mempool entry: {0}")]
    InvalidMempool(String),

    /// The ledger has no latest height to report.
    #[error("Latest height unavailable: {0}")]
    HeightUnavailable(String),
}

impl Classify for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBlock { .. } | Self::InvalidCommittee(_) | Self::InvalidMempool(_) => {
                ErrorKind::Validation
            }
            Self::Network(_)
            | Self::Http { .. }
            | Self::MalformedResponse { .. }
            | Self::HeightUnavailable(_) => ErrorKind::Upstream,
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        Self::Network(err.to_string())
    }
}
