//! # Metrics Configuration

use serde::{Deserialize, Serialize};

/// Performance metrics configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Lifetime of a cached performance summary, in seconds.
    pub cache_ttl_secs: u64,

    /// Window used when the caller does not pick one, in seconds.
    pub default_window_secs: u64,

    /// Number of most recent blocks in the validator performance view.
    pub recent_blocks: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            default_window_secs: 86_400,
            recent_blocks: 100,
        }
    }
}

impl MetricsConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self {
            cache_ttl_secs: 300,
            default_window_secs: 3_600,
            recent_blocks: 10,
        }
    }
}
