//! # Outbound Ports
//!
//! The relational store as seen by sync, metrics and alerting.
//!
//! Production: `SqliteStore` (adapters/sqlite.rs)
//! Testing: `InMemoryStore` (adapters/memory.rs)

use async_trait::async_trait;
use shared_types::{Address, Block, BlockRecord, CommitteeMember, Height, Timestamp, TransactionRecord, Validator};

use crate::domain::{InsertOutcome, StoreError};

/// Result of reconciling one committee member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new validator row was created.
    Inserted,
    /// An existing row had its registry fields refreshed.
    Updated,
}

/// Persistence store - outbound port.
///
/// Window queries take a `since` bound and select rows with
/// `timestamp > since`. Results listing blocks are ordered by height
/// ascending.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Highest persisted block height, `None` on an empty store.
    async fn latest_height(&self) -> Result<Option<Height>, StoreError>;

    /// Append a block, update its producer's aggregates and append its
    /// transactions as one atomic unit.
    ///
    /// Re-inserting an existing height is a no-op returning
    /// [`InsertOutcome::AlreadyPresent`].
    async fn insert_block(&self, block: &Block) -> Result<InsertOutcome, StoreError>;

    /// Block at `height`.
    async fn block_by_height(&self, height: Height) -> Result<Option<BlockRecord>, StoreError>;

    /// Block with the highest height.
    async fn latest_block(&self) -> Result<Option<BlockRecord>, StoreError>;

    /// Blocks with `from <= height <= to`.
    async fn blocks_in_range(&self, from: Height, to: Height)
        -> Result<Vec<BlockRecord>, StoreError>;

    /// Transactions of the block at `height`, ordered by id.
    async fn transactions_for_block(
        &self,
        height: Height,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Blocks produced by `address` with `timestamp > since`.
    async fn blocks_by_validator_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<Vec<BlockRecord>, StoreError>;

    /// The `limit` most recent blocks produced by `address`.
    async fn recent_blocks_by_validator(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError>;

    /// Number of blocks from any producer with `timestamp > since`.
    async fn count_blocks_since(&self, since: Timestamp) -> Result<u64, StoreError>;

    /// Number of transactions in blocks produced by `address` with
    /// `timestamp > since`.
    async fn count_transactions_by_validator_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<u64, StoreError>;

    /// Every validator row, ordered by stake descending then address.
    async fn validators(&self) -> Result<Vec<Validator>, StoreError>;

    /// One validator row.
    async fn validator(&self, address: &Address) -> Result<Option<Validator>, StoreError>;

    /// Insert or refresh the registry fields of a committee member.
    ///
    /// Aggregate counters are never touched.
    async fn upsert_committee_member(
        &self,
        member: &CommitteeMember,
        seen_at: Timestamp,
    ) -> Result<UpsertOutcome, StoreError>;
}
