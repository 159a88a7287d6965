//! # Alert Thresholds

use serde::{Deserialize, Serialize};
use shared_types::U256;

/// Fixed thresholds applied by the alert checks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Missed blocks above this count trigger `missedBlocks`.
    pub max_missed_blocks: u64,

    /// Number of the validator's most recent blocks scanned for gaps.
    pub missed_blocks_lookback: usize,

    /// Uptime below this percentage triggers `lowUptime`.
    pub min_uptime_percent: f64,

    /// Rewards below this amount trigger `lowRewards`.
    pub min_rewards: U256,

    /// Efficiency below this percentage triggers `lowEfficiency`.
    pub min_efficiency_percent: f64,

    /// Window for the uptime, rewards and efficiency checks, in seconds.
    pub window_secs: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_missed_blocks: 5,
            missed_blocks_lookback: 100,
            min_uptime_percent: 95.0,
            min_rewards: U256::from(1_000_000u64),
            min_efficiency_percent: 90.0,
            window_secs: 86_400,
        }
    }
}

impl AlertThresholds {
    /// Thresholds for tests: production values with a one-unit rewards floor.
    pub fn for_testing() -> Self {
        Self {
            min_rewards: U256::from(1u64),
            ..Self::default()
        }
    }
}
