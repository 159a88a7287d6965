//! # Outbound Ports
//!
//! The ledger as seen by the rest of the monitor. The ledger client is a
//! trusted oracle: no consensus or signature checks happen behind this trait.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Block, CommitteeMember, Height, PendingTransaction};

use crate::domain::LedgerError;

/// Ledger source - outbound port.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Current latest height of the ledger.
    async fn latest_height(&self) -> Result<Height, LedgerError>;

    /// Block at `height`, or `None` when the ledger has no block there.
    async fn block_by_height(&self, height: Height) -> Result<Option<Block>, LedgerError>;

    /// Current committee snapshot.
    async fn latest_committee(&self) -> Result<Vec<CommitteeMember>, LedgerError>;

    /// Transactions currently waiting in the mempool.
    async fn transactions_in_mempool(&self) -> Result<Vec<PendingTransaction>, LedgerError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Scriptable in-process ledger for tests and dry runs.
///
/// Counts every block fetch and the peak number of fetches in flight, so
/// callers can assert on fetch volume and batch concurrency.
#[derive(Default)]
pub struct MockLedgerSource {
    blocks: RwLock<BTreeMap<Height, Block>>,
    latest_height: RwLock<Option<Height>>,
    failing_heights: RwLock<BTreeSet<Height>>,
    committee: RwLock<Vec<CommitteeMember>>,
    mempool: RwLock<Vec<PendingTransaction>>,
    fail_committee: RwLock<bool>,
    block_fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLedgerSource {
    /// Empty ledger with no latest height (height queries fail).
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger holding `blocks`; latest height is the highest of them.
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mock = Self::new();
        for block in blocks {
            mock.push_block(block);
        }
        mock
    }

    /// Add a block and raise the latest height if needed.
    pub fn push_block(&self, block: Block) {
        let height = block.height;
        self.blocks.write().insert(height, block);
        let mut latest = self.latest_height.write();
        *latest = Some(latest.map_or(height, |h| h.max(height)));
    }

    /// Force the reported latest height (`None` makes the query fail).
    pub fn set_latest_height(&self, height: Option<Height>) {
        *self.latest_height.write() = height;
    }

    /// Make fetches of `height` fail with a network error.
    pub fn fail_height(&self, height: Height) {
        self.failing_heights.write().insert(height);
    }

    /// Let every previously failing height answer again.
    pub fn clear_failures(&self) {
        self.failing_heights.write().clear();
    }

    /// Make committee queries fail.
    pub fn fail_committee(&self, fail: bool) {
        *self.fail_committee.write() = fail;
    }

    /// Replace the committee snapshot.
    pub fn set_committee(&self, committee: Vec<CommitteeMember>) {
        *self.committee.write() = committee;
    }

    /// Replace the mempool contents.
    pub fn set_mempool(&self, mempool: Vec<PendingTransaction>) {
        *self.mempool.write() = mempool;
    }

    /// Number of `block_by_height` calls so far.
    pub fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `block_by_height` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn latest_height(&self) -> Result<Height, LedgerError> {
        (*self.latest_height.read())
            .ok_or_else(|| LedgerError::HeightUnavailable("mock ledger has no blocks".to_string()))
    }

    async fn block_by_height(&self, height: Height) -> Result<Option<Block>, LedgerError> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Let sibling fetches of the same batch start before this one resolves.
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_heights.read().contains(&height) {
            return Err(LedgerError::Network(format!(
                "mock failure at height {height}"
            )));
        }
        Ok(self.blocks.read().get(&height).cloned())
    }

    async fn latest_committee(&self) -> Result<Vec<CommitteeMember>, LedgerError> {
        if *self.fail_committee.read() {
            return Err(LedgerError::Network("mock committee failure".to_string()));
        }
        Ok(self.committee.read().clone())
    }

    async fn transactions_in_mempool(&self) -> Result<Vec<PendingTransaction>, LedgerError> {
        Ok(self.mempool.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;

    fn block(height: Height) -> Block {
        Block {
            height,
            hash: format!("hash-{height}"),
            previous_hash: format!("hash-{}", height.saturating_sub(1)),
            timestamp: 1_700_000_000 + height,
            validator_address: None,
            total_fees: U256::zero(),
            transactions: vec![],
        }
    }

    #[tokio::test]
    async fn test_mock_tracks_latest_height() {
        let ledger = MockLedgerSource::with_blocks([block(3), block(7)]);
        assert_eq!(ledger.latest_height().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_mock_without_blocks_fails_height() {
        let ledger = MockLedgerSource::new();
        assert!(ledger.latest_height().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_missing_and_failing_heights() {
        let ledger = MockLedgerSource::with_blocks([block(1)]);
        ledger.fail_height(2);

        assert!(ledger.block_by_height(1).await.unwrap().is_some());
        assert!(ledger.block_by_height(2).await.is_err());
        assert!(ledger.block_by_height(3).await.unwrap().is_none());
        assert_eq!(ledger.block_fetches(), 3);
    }
}
