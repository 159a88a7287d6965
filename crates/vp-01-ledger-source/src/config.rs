//! # Ledger Source Configuration

use serde::{Deserialize, Serialize};

/// Default explorer API root.
pub const DEFAULT_BASE_URL: &str = "https://api.explorer.provable.com/v1";

/// Ledger source configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSourceConfig {
    /// Explorer API root URL.
    pub base_url: String,

    /// Network path segment (`mainnet` or `testnet`).
    pub network: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LedgerSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            network: "mainnet".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl LedgerSourceConfig {
    /// Create a config for testing (local endpoint, short timeout).
    pub fn for_testing() -> Self {
        Self {
            base_url: "http://127.0.0.1:3030".to_string(),
            network: "testnet".to_string(),
            request_timeout_secs: 2,
        }
    }
}
