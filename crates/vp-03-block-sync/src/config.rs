//! # Sync Configuration

use serde::{Deserialize, Serialize};
use shared_types::Height;

/// Default number of concurrent block fetches per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Block sync configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Concurrent fetches per batch.
    pub batch_size: usize,

    /// Seconds between scheduled synchronization passes.
    pub sync_interval_secs: u64,

    /// Seconds between scheduled registry reconciliations.
    pub registry_interval_secs: u64,

    /// First height to fetch when the store is empty.
    pub initial_height: Height,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            sync_interval_secs: 300,
            registry_interval_secs: 3_600,
            initial_height: 0,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (small batches, short intervals).
    pub fn for_testing() -> Self {
        Self {
            batch_size: 4,
            sync_interval_secs: 1,
            registry_interval_secs: 2,
            initial_height: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.registry_interval_secs, 3_600);
    }
}
