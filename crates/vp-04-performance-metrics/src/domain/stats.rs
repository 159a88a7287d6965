//! # Window Statistics
//!
//! Pure aggregations over persisted block rows. Block slices are expected in
//! ascending height order. Percentages are in `[0, 100]`; an empty
//! denominator yields `0.0`.

use shared_types::{BlockRecord, U256};

/// Share of `total` blocks produced by one validator, as a percentage.
pub fn uptime_percent(validator_blocks: u64, total_blocks: u64) -> f64 {
    if total_blocks == 0 {
        return 0.0;
    }
    (validator_blocks as f64 / total_blocks as f64 * 100.0).min(100.0)
}

/// Share of `blocks` carrying at least one transaction, as a percentage.
pub fn efficiency_percent(blocks: &[BlockRecord]) -> f64 {
    if blocks.is_empty() {
        return 0.0;
    }
    let with_transactions = blocks.iter().filter(|b| b.transactions_count > 0).count();
    with_transactions as f64 / blocks.len() as f64 * 100.0
}

/// Mean timestamp delta between consecutive blocks, in milliseconds.
///
/// `0.0` with fewer than two blocks.
pub fn average_interval_ms(blocks: &[BlockRecord]) -> f64 {
    if blocks.len() < 2 {
        return 0.0;
    }
    let total: f64 = blocks
        .windows(2)
        .map(|pair| (pair[1].timestamp as f64 - pair[0].timestamp as f64) * 1_000.0)
        .sum();
    total / (blocks.len() - 1) as f64
}

/// Sum of `total_fees`.
pub fn total_fees(blocks: &[BlockRecord]) -> U256 {
    blocks
        .iter()
        .fold(U256::zero(), |acc, b| acc.saturating_add(b.total_fees))
}
