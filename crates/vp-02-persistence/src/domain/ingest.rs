//! # Block Ingestion
//!
//! The single write path for blocks. An adapter opens one transaction, hands
//! it to [`write_block`], and commits only if every step succeeded:
//!
//! 1. append the block row (no-op if the height already exists)
//! 2. apply the aggregate step to the producer's validator row
//! 3. append the block's transaction rows
//!
//! Any error leaves the adapter to roll the whole unit back.

use shared_types::{Address, Block, BlockRecord, TransactionRecord, Validator};

use crate::domain::aggregates::apply_block;
use crate::domain::errors::StoreError;

/// Result of inserting a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The block was appended and aggregates were updated.
    Inserted,
    /// A block at this height already existed; nothing changed.
    AlreadyPresent,
}

/// Primitive row operations available inside one open store transaction.
pub trait StoreTransaction {
    /// Append a block row. Returns `false` if the height is already taken.
    fn append_block(&mut self, block: &BlockRecord) -> Result<bool, StoreError>;

    /// Read a validator row as seen by this transaction.
    fn load_validator(&mut self, address: &Address) -> Result<Option<Validator>, StoreError>;

    /// Write a validator row, replacing any previous version.
    fn save_validator(&mut self, validator: &Validator) -> Result<(), StoreError>;

    /// Append a transaction row. Fails on a duplicate id or a missing block.
    fn append_transaction(&mut self, tx: &TransactionRecord) -> Result<(), StoreError>;
}

/// Run the block write path inside `tx`.
pub fn write_block<T: StoreTransaction + ?Sized>(
    tx: &mut T,
    block: &Block,
) -> Result<InsertOutcome, StoreError> {
    let record = block.record();
    if !tx.append_block(&record)? {
        return Ok(InsertOutcome::AlreadyPresent);
    }

    if let Some(address) = &record.validator_address {
        let current = tx
            .load_validator(address)?
            .unwrap_or_else(|| Validator::unregistered(address.clone()));
        tx.save_validator(&apply_block(current, &record))?;
    }

    for transaction in block.transaction_records() {
        tx.append_transaction(&transaction)?;
    }

    Ok(InsertOutcome::Inserted)
}
