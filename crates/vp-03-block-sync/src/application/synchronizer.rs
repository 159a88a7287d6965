//! # Block Synchronizer
//!
//! Brings the store up to the ledger's latest height.
//!
//! A pass reads the persisted frontier and the ledger height, then walks the
//! missing range in batches. Fetches inside a batch run concurrently; the
//! batch is persisted in height order only after every fetch resolved. Each
//! block is its own store transaction.
//!
//! Heights whose fetch failed are skipped and remembered. The next pass
//! fetches them again before walking its own range. A height leaves the gap
//! set only once it is in the store, so an aborted pass loses none.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use shared_types::{Block, Height};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vp_01_ledger_source::LedgerSource;
use vp_02_persistence::{InsertOutcome, PersistenceStore};
use vp_telemetry::{MonitorMetrics, PassOutcome};

use crate::config::SyncConfig;
use crate::domain::{first_missing_height, plan_batches, SyncError, SyncReport};

/// Upper bound on remembered gaps; older ones are dropped first.
const MAX_REMEMBERED_GAPS: usize = 10_000;

/// Incremental block ingestion.
pub struct BlockSynchronizer {
    ledger: Arc<dyn LedgerSource>,
    store: Arc<dyn PersistenceStore>,
    metrics: Arc<MonitorMetrics>,
    initial_height: Height,
    gaps: Mutex<BTreeSet<Height>>,
}

impl BlockSynchronizer {
    /// Create a synchronizer over `ledger` and `store`.
    pub fn new(
        ledger: Arc<dyn LedgerSource>,
        store: Arc<dyn PersistenceStore>,
        metrics: Arc<MonitorMetrics>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            ledger,
            store,
            metrics,
            initial_height: config.initial_height,
            gaps: Mutex::new(BTreeSet::new()),
        }
    }

    /// Heights skipped so far and not yet recovered.
    pub fn pending_gaps(&self) -> Vec<Height> {
        self.gaps.lock().iter().copied().collect()
    }

    /// Run one synchronization pass with `batch_size` concurrent fetches per
    /// batch.
    ///
    /// Fails without partial progress when the ledger height or the
    /// persisted frontier cannot be read. A block write failure aborts the
    /// pass; blocks committed before it stay committed.
    pub async fn sync_latest_blocks(&self, batch_size: usize) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let result = self.run_pass(batch_size, started).await;

        match &result {
            Ok(report) => {
                let outcome = if report.is_noop() {
                    PassOutcome::UpToDate
                } else {
                    PassOutcome::Completed
                };
                self.metrics.record_sync_pass(outcome, report.elapsed);
                if !report.is_noop() {
                    info!(
                        persisted = report.persisted,
                        already_present = report.already_present,
                        skipped = report.skipped.len(),
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "[vp-03] Synchronization pass finished at ledger height {}",
                        report.ledger_height
                    );
                }
            }
            Err(e) => {
                self.metrics
                    .record_sync_pass(PassOutcome::Failed, started.elapsed());
                warn!("[vp-03] Synchronization pass failed: {}", e);
            }
        }
        result
    }

    async fn run_pass(&self, batch_size: usize, started: Instant) -> Result<SyncReport, SyncError> {
        if batch_size == 0 {
            return Err(SyncError::InvalidBatchSize(batch_size));
        }

        let persisted = self.store.latest_height().await?;
        let ledger_height = self.ledger.latest_height().await?;
        let mut report = SyncReport {
            persisted_before: persisted,
            ledger_height,
            ..SyncReport::default()
        };

        let retry = self.due_gaps(ledger_height);
        if !retry.is_empty() {
            debug!("[vp-03] Retrying {} previously skipped heights", retry.len());
            report.retried = retry.len() as u64;
            for chunk in retry.chunks(batch_size) {
                self.process_batch(chunk.to_vec(), &mut report).await?;
            }
        }

        report.start_height = first_missing_height(persisted, ledger_height, self.initial_height);
        match report.start_height {
            Some(start) => {
                info!(
                    "[vp-03] Syncing heights {}..={} in batches of {}",
                    start, ledger_height, batch_size
                );
                for batch in plan_batches(start, ledger_height, batch_size) {
                    self.process_batch(batch.collect(), &mut report).await?;
                }
            }
            None => debug!(
                "[vp-03] Store at {:?} is up to date with ledger height {}",
                persisted, ledger_height
            ),
        }

        if report.fetched > 0 && report.persisted == 0 {
            warn!("[vp-03] Pass fetched {} heights but persisted none", report.fetched);
        }
        report.elapsed = started.elapsed();
        Ok(report)
    }

    /// Fetch every height of one batch concurrently, then persist in order.
    async fn process_batch(
        &self,
        heights: Vec<Height>,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let fetched = join_all(heights.iter().map(|h| self.fetch(*h))).await;
        report.fetched += heights.len() as u64;

        for (height, block) in heights.into_iter().zip(fetched) {
            let Some(block) = block else {
                report.skipped.push(height);
                self.remember_gap(height);
                self.metrics.record_height_skipped();
                continue;
            };

            let outcome = self.store.insert_block(&block).await?;
            self.forget_gap(height);
            match outcome {
                InsertOutcome::Inserted => {
                    report.persisted += 1;
                    self.metrics.record_block_persisted(height);
                }
                InsertOutcome::AlreadyPresent => {
                    report.already_present += 1;
                    self.metrics.record_block_already_present();
                }
            }
        }
        Ok(())
    }

    /// One height; failures and absences are logged and mapped to `None`.
    async fn fetch(&self, height: Height) -> Option<Block> {
        match self.ledger.block_by_height(height).await {
            Ok(Some(block)) => Some(block),
            Ok(None) => {
                warn!(height, "[vp-03] Ledger has no block at height, skipping");
                None
            }
            Err(e) => {
                warn!(height, error = %e, "[vp-03] Block fetch failed, skipping");
                None
            }
        }
    }

    fn remember_gap(&self, height: Height) {
        let mut gaps = self.gaps.lock();
        gaps.insert(height);
        while gaps.len() > MAX_REMEMBERED_GAPS {
            gaps.pop_first();
        }
    }

    fn forget_gap(&self, height: Height) {
        self.gaps.lock().remove(&height);
    }

    /// Remembered gaps the ledger can currently serve. They stay remembered
    /// until persisted.
    fn due_gaps(&self, ledger_height: Height) -> Vec<Height> {
        self.gaps.lock().range(..=ledger_height).copied().collect()
    }
}
