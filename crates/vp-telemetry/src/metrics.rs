//! Prometheus metrics for Validator Pulse.
//!
//! All metrics follow the naming convention `<namespace>_<area>_<metric>`.
//! The collector is a plain instance owning its own registry; the runtime
//! builds one and shares it by `Arc`.

use std::time::Duration;

use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

/// Outcome label of one synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The ledger was ahead and the pass walked the missing range.
    Completed,
    /// Nothing was missing.
    UpToDate,
    /// The pass aborted.
    Failed,
}

impl PassOutcome {
    fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::UpToDate => "up_to_date",
            Self::Failed => "failed",
        }
    }
}

/// Counters and gauges reported by the monitor's components.
pub struct MonitorMetrics {
    registry: Registry,
    blocks_persisted: IntCounter,
    blocks_already_present: IntCounter,
    heights_skipped: IntCounter,
    sync_passes: IntCounterVec,
    sync_duration: Histogram,
    validators_reconciled: IntCounterVec,
    cache_lookups: IntCounterVec,
    latest_height: IntGauge,
    mempool_transactions: IntGauge,
}

impl MonitorMetrics {
    /// Create and register every metric under `namespace`.
    pub fn new(namespace: &str) -> Result<Self, TelemetryError> {
        let registry = Registry::new();
        let opts = |name: &str, help: &str| Opts::new(name, help).namespace(namespace);

        let blocks_persisted = IntCounter::with_opts(opts(
            "sync_blocks_persisted_total",
            "Blocks written to the store",
        ))?;
        let blocks_already_present = IntCounter::with_opts(opts(
            "sync_blocks_already_present_total",
            "Fetched blocks whose height was already persisted",
        ))?;
        let heights_skipped = IntCounter::with_opts(opts(
            "sync_heights_skipped_total",
            "Heights skipped because the fetch failed or returned nothing",
        ))?;
        let sync_passes = IntCounterVec::new(
            opts("sync_passes_total", "Synchronization passes by outcome"),
            &["outcome"],
        )?;
        let sync_duration = Histogram::with_opts(
            HistogramOpts::new(
                "sync_pass_duration_seconds",
                "Wall time of one synchronization pass",
            )
            .namespace(namespace)
            .buckets(exponential_buckets(0.01, 2.0, 14)?),
        )?;
        let validators_reconciled = IntCounterVec::new(
            opts(
                "registry_validators_reconciled_total",
                "Committee members merged into the validator table",
            ),
            &["outcome"],
        )?;
        let cache_lookups = IntCounterVec::new(
            opts("metrics_cache_lookups_total", "Performance cache lookups"),
            &["result"],
        )?;
        let latest_height = IntGauge::with_opts(opts(
            "store_latest_height",
            "Highest persisted block height",
        ))?;
        let mempool_transactions = IntGauge::with_opts(opts(
            "mempool_transactions_pending",
            "Transactions waiting in the ledger mempool",
        ))?;

        registry.register(Box::new(blocks_persisted.clone()))?;
        registry.register(Box::new(blocks_already_present.clone()))?;
        registry.register(Box::new(heights_skipped.clone()))?;
        registry.register(Box::new(sync_passes.clone()))?;
        registry.register(Box::new(sync_duration.clone()))?;
        registry.register(Box::new(validators_reconciled.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(latest_height.clone()))?;
        registry.register(Box::new(mempool_transactions.clone()))?;

        Ok(Self {
            registry,
            blocks_persisted,
            blocks_already_present,
            heights_skipped,
            sync_passes,
            sync_duration,
            validators_reconciled,
            cache_lookups,
            latest_height,
            mempool_transactions,
        })
    }

    /// A block was committed at `height`.
    pub fn record_block_persisted(&self, height: u64) {
        self.blocks_persisted.inc();
        let height = i64::try_from(height).unwrap_or(i64::MAX);
        if height > self.latest_height.get() {
            self.latest_height.set(height);
        }
    }

    /// A fetched block was already in the store.
    pub fn record_block_already_present(&self) {
        self.blocks_already_present.inc();
    }

    /// A height was skipped within a pass.
    pub fn record_height_skipped(&self) {
        self.heights_skipped.inc();
    }

    /// A synchronization pass finished.
    pub fn record_sync_pass(&self, outcome: PassOutcome, elapsed: Duration) {
        self.sync_passes.with_label_values(&[outcome.label()]).inc();
        self.sync_duration.observe(elapsed.as_secs_f64());
    }

    /// A committee member was inserted (`inserted = true`) or refreshed.
    pub fn record_validator_reconciled(&self, inserted: bool) {
        let label = if inserted { "inserted" } else { "updated" };
        self.validators_reconciled.with_label_values(&[label]).inc();
    }

    /// A performance cache lookup hit or missed.
    pub fn record_cache_lookup(&self, hit: bool) {
        let label = if hit { "hit" } else { "miss" };
        self.cache_lookups.with_label_values(&[label]).inc();
    }

    /// Current mempool size.
    pub fn set_mempool_size(&self, pending: usize) {
        self.mempool_transactions
            .set(i64::try_from(pending).unwrap_or(i64::MAX));
    }

    /// Blocks written so far.
    pub fn blocks_persisted(&self) -> u64 {
        self.blocks_persisted.get()
    }

    /// Fetched blocks that were already present.
    pub fn blocks_already_present(&self) -> u64 {
        self.blocks_already_present.get()
    }

    /// Heights skipped so far.
    pub fn heights_skipped(&self) -> u64 {
        self.heights_skipped.get()
    }

    /// Passes recorded with `outcome`.
    pub fn sync_passes(&self, outcome: PassOutcome) -> u64 {
        self.sync_passes.with_label_values(&[outcome.label()]).get()
    }

    /// Cache lookups recorded as hit (`true`) or miss (`false`).
    pub fn cache_lookups(&self, hit: bool) -> u64 {
        let label = if hit { "hit" } else { "miss" };
        self.cache_lookups.with_label_values(&[label]).get()
    }

    /// Last recorded mempool size.
    pub fn mempool_size(&self) -> i64 {
        self.mempool_transactions.get()
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn export_text(&self) -> Result<String, TelemetryError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}
