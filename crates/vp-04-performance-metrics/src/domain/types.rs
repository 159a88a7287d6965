//! # Metric Types

use serde::Serialize;
use shared_types::{Address, Timestamp, Validator, U256};

/// Windowed activity of one validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorPerformance {
    /// Blocks produced in the window.
    pub blocks_proposed: u64,
    /// Transactions contained in those blocks.
    pub transactions_processed: u64,
    /// Share of all in-window blocks produced by this validator, percent.
    pub uptime: f64,
    /// Mean time between this validator's in-window blocks, milliseconds.
    pub average_response_time_ms: f64,
}

/// Everything the engine computes for one validator and window.
///
/// This is the only memoized result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    /// Validator address.
    pub address: Address,
    /// Window length in seconds.
    pub window_secs: u64,
    /// Clock reading the window ended at.
    pub computed_at: Timestamp,
    /// Activity figures.
    #[serde(flatten)]
    pub performance: ValidatorPerformance,
    /// Share of in-window blocks with transactions, percent.
    pub efficiency: f64,
    /// Fees accumulated in the window.
    pub rewards: U256,
}

/// A validator row together with statistics over its latest blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorPerformanceView {
    /// Persisted row, including lifetime aggregates.
    pub validator: Validator,
    /// Number of recent blocks considered.
    pub blocks_produced: u64,
    /// Mean time between those blocks, milliseconds.
    pub average_block_time_ms: f64,
    /// Fees across those blocks.
    pub total_fees: U256,
}

/// Cache key of a performance summary.
pub fn summary_cache_key(address: &Address, window_secs: u64) -> String {
    format!("performance_{address}_{window_secs}")
}
