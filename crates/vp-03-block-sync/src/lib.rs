//! # Block Sync Subsystem (vp-03)
//!
//! Drives ingestion from the ledger into the store.
//!
//! ## Components
//!
//! | Service | Operation |
//! |---------|-----------|
//! | `BlockSynchronizer` | `sync_latest_blocks(batch_size)` |
//! | `RegistryReconciler` | `update_validators()` |
//! | `MempoolObserver` | `observe_mempool()` |
//!
//! ## Failure policy
//!
//! - A failed or empty fetch of one height is logged and skipped; the pass
//!   continues and the height is retried on the next pass.
//! - Failing to read the ledger height or the persisted frontier aborts the
//!   pass before any fetch.
//! - A block write failure rolls back that block and aborts the pass.

#![warn(missing_docs)]

pub mod application;
pub mod config;
pub mod domain;

pub use application::{BlockSynchronizer, MempoolObserver, RegistryReconciler};
pub use config::{SyncConfig, DEFAULT_BATCH_SIZE};
pub use domain::{first_missing_height, plan_batches, ReconcileReport, SyncError, SyncReport};
