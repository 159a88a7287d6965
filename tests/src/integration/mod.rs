//! Cross-subsystem tests. Every store-facing test runs against both the
//! in-memory adapter and SQLite.

mod health_pipeline;
mod persistence_invariants;
mod sync_pipeline;
