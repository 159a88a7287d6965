//! # Core Domain Entities
//!
//! Defines the ledger entities persisted by the monitor.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `BlockTransaction`, `BlockRecord`, `TransactionRecord`
//! - **Registry**: `Validator`, `CommitteeMember`
//! - **Mempool**: `PendingTransaction`

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for fee and reward amounts
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// Block height in the ledger.
pub type Height = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A validator address as reported by the ledger (e.g. `aleo1...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a raw address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A block fetched from the ledger, together with its transactions.
///
/// This is the internal shape produced by the Ledger Source adapter. Nothing
/// untyped crosses the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height (primary key).
    pub height: Height,
    /// Block hash.
    pub hash: String,
    /// Hash of the previous block.
    pub previous_hash: String,
    /// Unix timestamp when the block was produced.
    pub timestamp: Timestamp,
    /// The validator that produced this block, if the ledger names one.
    pub validator_address: Option<Address>,
    /// Sum of the fees of all transactions in the block.
    pub total_fees: U256,
    /// Transactions included in the block.
    pub transactions: Vec<BlockTransaction>,
}

impl Block {
    /// Number of transactions in the block.
    pub fn transactions_count(&self) -> u32 {
        u32::try_from(self.transactions.len()).unwrap_or(u32::MAX)
    }

    /// Project the block onto its persisted row shape.
    pub fn record(&self) -> BlockRecord {
        BlockRecord {
            height: self.height,
            hash: self.hash.clone(),
            previous_hash: self.previous_hash.clone(),
            timestamp: self.timestamp,
            transactions_count: self.transactions_count(),
            validator_address: self.validator_address.clone(),
            total_fees: self.total_fees,
        }
    }

    /// Project the block's transactions onto their persisted row shape.
    pub fn transaction_records(&self) -> Vec<TransactionRecord> {
        self.transactions
            .iter()
            .map(|tx| TransactionRecord {
                id: tx.id.clone(),
                block_height: self.height,
                fee: tx.fee,
                timestamp: tx.timestamp,
            })
            .collect()
    }
}

/// A transaction as carried inside a fetched block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransaction {
    /// Transaction identifier.
    pub id: String,
    /// Fee paid by the transaction.
    pub fee: U256,
    /// Unix timestamp of the transaction.
    pub timestamp: Timestamp,
}

/// A persisted block row.
///
/// Append-only: created once, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Block height (primary key).
    pub height: Height,
    /// Block hash.
    pub hash: String,
    /// Hash of the previous block.
    pub previous_hash: String,
    /// Unix timestamp when the block was produced.
    pub timestamp: Timestamp,
    /// Number of transactions in the block.
    pub transactions_count: u32,
    /// The producing validator.
    pub validator_address: Option<Address>,
    /// Sum of transaction fees.
    pub total_fees: U256,
}

/// A persisted transaction row. `block_height` always references a
/// persisted block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction identifier (primary key).
    pub id: String,
    /// Height of the containing block.
    pub block_height: Height,
    /// Fee paid.
    pub fee: U256,
    /// Unix timestamp.
    pub timestamp: Timestamp,
}

// =============================================================================
// CLUSTER B: THE REGISTRY
// =============================================================================

/// A validator row.
///
/// `total_blocks_produced` and `total_rewards` are derived counters that are
/// maintained incrementally on every block insertion attributed to this
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Validator address (primary key).
    pub address: Address,
    /// Current stake.
    pub stake: u64,
    /// Whether the validator is active in the committee.
    pub is_active: bool,
    /// Bonded amount.
    pub bonded: u64,
    /// Last time the validator was observed (block produced or registry pass).
    pub last_seen: Option<Timestamp>,
    /// Number of persisted blocks produced by this validator.
    pub total_blocks_produced: u64,
    /// Sum of fees over persisted blocks produced by this validator.
    pub total_rewards: U256,
}

impl Validator {
    /// A validator first seen as a block producer, before any registry pass.
    pub fn unregistered(address: Address) -> Self {
        Self {
            address,
            stake: 0,
            is_active: false,
            bonded: 0,
            last_seen: None,
            total_blocks_produced: 0,
            total_rewards: U256::zero(),
        }
    }

    /// A validator first seen in a committee snapshot.
    pub fn from_committee(member: &CommitteeMember, seen_at: Timestamp) -> Self {
        Self {
            address: member.address.clone(),
            stake: member.stake,
            is_active: member.is_active,
            bonded: member.bonded,
            last_seen: Some(seen_at),
            total_blocks_produced: 0,
            total_rewards: U256::zero(),
        }
    }
}

/// One entry of the ledger's current committee snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMember {
    /// Member address.
    pub address: Address,
    /// Stake held by the member.
    pub stake: u64,
    /// Whether the member is currently active.
    pub is_active: bool,
    /// Bonded amount.
    pub bonded: u64,
}

// =============================================================================
// CLUSTER C: THE MEMPOOL
// =============================================================================

/// A transaction waiting in the ledger's mempool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Transaction identifier.
    pub id: String,
    /// Transaction type (`execute`, `deploy`, ...), when reported.
    pub kind: Option<String>,
}
