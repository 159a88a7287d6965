//! # Validator Aggregates
//!
//! `total_blocks_produced` and `total_rewards` are derived from the block
//! table. They are maintained incrementally: every block insertion that names
//! a producer applies [`apply_block`] to that producer's row inside the same
//! atomic unit that appends the block.

use std::collections::BTreeMap;

use shared_types::{Address, BlockRecord, Validator, U256};

/// Fold one newly appended block into its producer's counters.
///
/// Blocks with zero fees still count as produced.
pub fn apply_block(mut validator: Validator, block: &BlockRecord) -> Validator {
    validator.total_blocks_produced = validator.total_blocks_produced.saturating_add(1);
    validator.total_rewards = validator.total_rewards.saturating_add(block.total_fees);
    validator.last_seen = Some(block.timestamp);
    validator
}

/// Counters recomputed from scratch for one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    /// Blocks attributed to the address.
    pub blocks: u64,
    /// Sum of their fees.
    pub rewards: U256,
}

/// A validator whose stored counters disagree with the block table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateMismatch {
    /// Offending address.
    pub address: Address,
    /// Counters as stored on the validator row.
    pub stored: AggregateTotals,
    /// Counters recomputed from blocks.
    pub expected: AggregateTotals,
}

/// Recompute every producer's counters from the block table.
pub fn recompute_aggregates<'a>(
    blocks: impl IntoIterator<Item = &'a BlockRecord>,
) -> BTreeMap<Address, AggregateTotals> {
    let mut totals: BTreeMap<Address, AggregateTotals> = BTreeMap::new();
    for block in blocks {
        if let Some(address) = &block.validator_address {
            let entry = totals.entry(address.clone()).or_default();
            entry.blocks += 1;
            entry.rewards = entry.rewards.saturating_add(block.total_fees);
        }
    }
    totals
}

/// Compare stored counters against the block table.
///
/// Returns an empty list when the store is consistent.
pub fn audit_aggregates(blocks: &[BlockRecord], validators: &[Validator]) -> Vec<AggregateMismatch> {
    let mut expected = recompute_aggregates(blocks);
    let mut mismatches = Vec::new();

    for validator in validators {
        let want = expected.remove(&validator.address).unwrap_or_default();
        let stored = AggregateTotals {
            blocks: validator.total_blocks_produced,
            rewards: validator.total_rewards,
        };
        if stored != want {
            mismatches.push(AggregateMismatch {
                address: validator.address.clone(),
                stored,
                expected: want,
            });
        }
    }

    // Producers with blocks but no validator row at all.
    for (address, want) in expected {
        mismatches.push(AggregateMismatch {
            address,
            stored: AggregateTotals::default(),
            expected: want,
        });
    }
    mismatches
}
