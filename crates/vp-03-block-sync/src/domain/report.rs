//! # Pass Reports

use std::time::Duration;

use serde::Serialize;
use shared_types::Height;

/// What one synchronization pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Highest persisted height when the pass started.
    pub persisted_before: Option<Height>,
    /// Ledger latest height observed by the pass.
    pub ledger_height: Height,
    /// First height the pass tried to fetch, if any were missing.
    pub start_height: Option<Height>,
    /// Heights skipped by earlier passes that this pass fetched again.
    pub retried: u64,
    /// Number of block fetches issued.
    pub fetched: u64,
    /// Blocks committed by this pass.
    pub persisted: u64,
    /// Fetched blocks whose height was already stored.
    pub already_present: u64,
    /// Heights that failed or returned nothing, left for a later pass.
    pub skipped: Vec<Height>,
    /// Wall time of the pass.
    pub elapsed: Duration,
}

impl SyncReport {
    /// Whether the pass had nothing to do.
    pub fn is_noop(&self) -> bool {
        self.start_height.is_none() && self.retried == 0
    }
}

/// What one registry reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Members in the committee snapshot.
    pub members: usize,
    /// New validator rows.
    pub inserted: usize,
    /// Refreshed validator rows.
    pub updated: usize,
}
