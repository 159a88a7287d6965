//! In-Memory Store Adapter
//!
//! Table-for-table stand-in for the SQLite store. Writes hold the table lock
//! for the whole unit and stage changes in an overlay, so a failed unit leaves
//! no trace.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    Address, Block, BlockRecord, CommitteeMember, Height, Timestamp, TransactionRecord, Validator,
};
use tracing::debug;

use crate::domain::{write_block, InsertOutcome, StoreError, StoreTransaction};
use crate::ports::outbound::{PersistenceStore, UpsertOutcome};

#[derive(Default)]
struct Tables {
    blocks: BTreeMap<Height, BlockRecord>,
    transactions: BTreeMap<String, TransactionRecord>,
    validators: BTreeMap<Address, Validator>,
}

/// Write set of one open unit, layered over the committed tables.
struct Overlay<'a> {
    base: &'a Tables,
    blocks: BTreeMap<Height, BlockRecord>,
    transactions: BTreeMap<String, TransactionRecord>,
    validators: BTreeMap<Address, Validator>,
}

impl<'a> Overlay<'a> {
    fn new(base: &'a Tables) -> Self {
        Self {
            base,
            blocks: BTreeMap::new(),
            transactions: BTreeMap::new(),
            validators: BTreeMap::new(),
        }
    }

    fn has_block(&self, height: Height) -> bool {
        self.blocks.contains_key(&height) || self.base.blocks.contains_key(&height)
    }

    fn into_changes(self) -> Changes {
        Changes {
            blocks: self.blocks,
            transactions: self.transactions,
            validators: self.validators,
        }
    }
}

struct Changes {
    blocks: BTreeMap<Height, BlockRecord>,
    transactions: BTreeMap<String, TransactionRecord>,
    validators: BTreeMap<Address, Validator>,
}

impl Tables {
    fn apply(&mut self, changes: Changes) {
        self.blocks.extend(changes.blocks);
        self.transactions.extend(changes.transactions);
        self.validators.extend(changes.validators);
    }
}

impl StoreTransaction for Overlay<'_> {
    fn append_block(&mut self, block: &BlockRecord) -> Result<bool, StoreError> {
        if self.has_block(block.height) {
            return Ok(false);
        }
        self.blocks.insert(block.height, block.clone());
        Ok(true)
    }

    fn load_validator(&mut self, address: &Address) -> Result<Option<Validator>, StoreError> {
        Ok(self
            .validators
            .get(address)
            .or_else(|| self.base.validators.get(address))
            .cloned())
    }

    fn save_validator(&mut self, validator: &Validator) -> Result<(), StoreError> {
        self.validators
            .insert(validator.address.clone(), validator.clone());
        Ok(())
    }

    fn append_transaction(&mut self, tx: &TransactionRecord) -> Result<(), StoreError> {
        if self.transactions.contains_key(&tx.id) || self.base.transactions.contains_key(&tx.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate transaction id {}",
                tx.id
            )));
        }
        if !self.has_block(tx.block_height) {
            return Err(StoreError::MissingBlock {
                tx_id: tx.id.clone(),
                height: tx.block_height,
            });
        }
        self.transactions.insert(tx.id.clone(), tx.clone());
        Ok(())
    }
}

/// In-memory `PersistenceStore`.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted transaction rows.
    pub fn transaction_count(&self) -> usize {
        self.tables.read().transactions.len()
    }
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn latest_height(&self) -> Result<Option<Height>, StoreError> {
        Ok(self.tables.read().blocks.keys().next_back().copied())
    }

    async fn insert_block(&self, block: &Block) -> Result<InsertOutcome, StoreError> {
        let mut tables = self.tables.write();
        let mut overlay = Overlay::new(&tables);

        match write_block(&mut overlay, block) {
            Ok(outcome) => {
                let changes = overlay.into_changes();
                tables.apply(changes);
                Ok(outcome)
            }
            Err(err) => {
                debug!("[vp-02] rolled back block {}: {}", block.height, err);
                Err(err)
            }
        }
    }

    async fn block_by_height(&self, height: Height) -> Result<Option<BlockRecord>, StoreError> {
        Ok(self.tables.read().blocks.get(&height).cloned())
    }

    async fn latest_block(&self) -> Result<Option<BlockRecord>, StoreError> {
        Ok(self.tables.read().blocks.values().next_back().cloned())
    }

    async fn blocks_in_range(
        &self,
        from: Height,
        to: Height,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self
            .tables
            .read()
            .blocks
            .range(from..=to)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn transactions_for_block(
        &self,
        height: Height,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .transactions
            .values()
            .filter(|tx| tx.block_height == height)
            .cloned()
            .collect())
    }

    async fn blocks_by_validator_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .blocks
            .values()
            .filter(|b| b.validator_address.as_ref() == Some(address) && b.timestamp > since)
            .cloned()
            .collect())
    }

    async fn recent_blocks_by_validator(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        let tables = self.tables.read();
        let mut recent: Vec<BlockRecord> = tables
            .blocks
            .values()
            .rev()
            .filter(|b| b.validator_address.as_ref() == Some(address))
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn count_blocks_since(&self, since: Timestamp) -> Result<u64, StoreError> {
        let count = self
            .tables
            .read()
            .blocks
            .values()
            .filter(|b| b.timestamp > since)
            .count();
        Ok(count as u64)
    }

    async fn count_transactions_by_validator_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<u64, StoreError> {
        let tables = self.tables.read();
        let heights: BTreeSet<Height> = tables
            .blocks
            .values()
            .filter(|b| b.validator_address.as_ref() == Some(address) && b.timestamp > since)
            .map(|b| b.height)
            .collect();
        let count = tables
            .transactions
            .values()
            .filter(|tx| heights.contains(&tx.block_height))
            .count();
        Ok(count as u64)
    }

    async fn validators(&self) -> Result<Vec<Validator>, StoreError> {
        let mut all: Vec<Validator> = self.tables.read().validators.values().cloned().collect();
        all.sort_by(|a, b| b.stake.cmp(&a.stake).then_with(|| a.address.cmp(&b.address)));
        Ok(all)
    }

    async fn validator(&self, address: &Address) -> Result<Option<Validator>, StoreError> {
        Ok(self.tables.read().validators.get(address).cloned())
    }

    async fn upsert_committee_member(
        &self,
        member: &CommitteeMember,
        seen_at: Timestamp,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut tables = self.tables.write();
        match tables.validators.get_mut(&member.address) {
            Some(existing) => {
                existing.stake = member.stake;
                existing.is_active = member.is_active;
                existing.bonded = member.bonded;
                existing.last_seen = Some(seen_at);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                tables.validators.insert(
                    member.address.clone(),
                    Validator::from_committee(member, seen_at),
                );
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}
