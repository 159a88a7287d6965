//! # Domain Layer
//!
//! Pure persistence rules: the aggregate step, the block write path, errors.

pub mod aggregates;
pub mod errors;
pub mod ingest;

pub use aggregates::{
    apply_block, audit_aggregates, recompute_aggregates, AggregateMismatch, AggregateTotals,
};
pub use errors::StoreError;
pub use ingest::{write_block, InsertOutcome, StoreTransaction};
