//! # Persistence Subsystem (vp-02)
//!
//! Relational store for blocks, transactions and validators.
//!
//! ## Architecture
//!
//! Hexagonal layout:
//! - **Domain**: the aggregate step and the block write path
//! - **Ports**: `PersistenceStore`
//! - **Adapters**: SQLite (production) and in-memory (tests)
//!
//! ## Invariants
//!
//! - Block rows are append-only; a height is written at most once.
//! - A block row, its producer's aggregate update and its transaction rows
//!   commit together or not at all.
//! - Every validator's `total_blocks_produced` and `total_rewards` equal the
//!   count and fee sum of persisted blocks attributed to it.

#![warn(missing_docs)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{InMemoryStore, SqliteStore};
pub use config::PersistenceConfig;
pub use domain::{
    apply_block, audit_aggregates, recompute_aggregates, AggregateMismatch, AggregateTotals,
    InsertOutcome, StoreError,
};
pub use ports::{PersistenceStore, UpsertOutcome};
