//! # API Facade
//!
//! The call surface an HTTP layer sits on. Every failure is reported as a
//! [`MonitorError`], so callers map one four-way taxonomy onto status codes:
//!
//! | Kind | Typical cause |
//! |------|---------------|
//! | `NotFound` | unknown height or validator |
//! | `Validation` | ledger payload failed structural checks |
//! | `Upstream` | ledger unreachable or answered garbage |
//! | `Persistence` | store query or transaction failed |
//!
//! Manual triggers share the scheduler's single-flight guards. A trigger that
//! finds its task already running returns `Ok(None)` instead of waiting.

use std::sync::Arc;

use serde::Serialize;
use shared_types::{
    Address, BlockRecord, Classify, Height, MonitorError, PendingTransaction, TransactionRecord,
    Validator, U256,
};
use tracing::info;
use vp_03_block_sync::{ReconcileReport, SyncReport};
use vp_04_performance_metrics::{PerformanceSummary, ValidatorPerformanceView};
use vp_05_health_alerts::{AlertReport, HealthReport};
use vp_telemetry::TelemetryError;

use crate::container::MonitorContainer;

/// A persisted block with its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDetail {
    /// Block row.
    #[serde(flatten)]
    pub block: BlockRecord,
    /// Transactions ordered by id.
    pub transactions: Vec<TransactionRecord>,
}

/// Read and trigger operations over a wired container.
#[derive(Clone)]
pub struct MonitorApi {
    container: Arc<MonitorContainer>,
}

fn classify<E: Classify>(err: E) -> MonitorError {
    err.to_monitor_error()
}

impl MonitorApi {
    /// Facade over `container`.
    pub fn new(container: Arc<MonitorContainer>) -> Self {
        Self { container }
    }

    fn window(&self, window_secs: Option<u64>) -> u64 {
        window_secs.unwrap_or_else(|| self.container.performance.default_window_secs())
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Highest persisted block.
    pub async fn latest_block(&self) -> Result<BlockRecord, MonitorError> {
        self.container
            .store
            .latest_block()
            .await
            .map_err(classify)?
            .ok_or_else(|| MonitorError::NotFound("no blocks persisted yet".to_string()))
    }

    /// Persisted block at `height` with its transactions.
    pub async fn block_by_height(&self, height: Height) -> Result<BlockDetail, MonitorError> {
        let store = &self.container.store;
        let block = store
            .block_by_height(height)
            .await
            .map_err(classify)?
            .ok_or_else(|| MonitorError::NotFound(format!("block {height}")))?;
        let transactions = store
            .transactions_for_block(height)
            .await
            .map_err(classify)?;
        Ok(BlockDetail {
            block,
            transactions,
        })
    }

    // =========================================================================
    // Validators
    // =========================================================================

    /// Every known validator, highest stake first.
    pub async fn validators(&self) -> Result<Vec<Validator>, MonitorError> {
        self.container.store.validators().await.map_err(classify)
    }

    /// One validator row.
    pub async fn validator(&self, address: &Address) -> Result<Validator, MonitorError> {
        self.container
            .store
            .validator(address)
            .await
            .map_err(classify)?
            .ok_or_else(|| MonitorError::NotFound(format!("validator {address}")))
    }

    /// Cached performance summary over `window_secs` (default window when
    /// `None`).
    pub async fn validator_performance(
        &self,
        address: &Address,
        window_secs: Option<u64>,
    ) -> Result<Arc<PerformanceSummary>, MonitorError> {
        self.container
            .performance
            .validator_performance_summary(address, self.window(window_secs))
            .await
            .map_err(classify)
    }

    /// Validator row plus statistics over its most recent blocks.
    pub async fn validator_performance_view(
        &self,
        address: &Address,
    ) -> Result<ValidatorPerformanceView, MonitorError> {
        self.container
            .performance
            .validator_performance(address)
            .await
            .map_err(classify)
    }

    /// Efficiency percentage over the window.
    pub async fn validator_efficiency(
        &self,
        address: &Address,
        window_secs: Option<u64>,
    ) -> Result<f64, MonitorError> {
        self.container
            .performance
            .validator_efficiency(address, self.window(window_secs))
            .await
            .map_err(classify)
    }

    /// Fees earned over the window.
    pub async fn validator_rewards(
        &self,
        address: &Address,
        window_secs: Option<u64>,
    ) -> Result<U256, MonitorError> {
        self.container
            .performance
            .validator_rewards(address, self.window(window_secs))
            .await
            .map_err(classify)
    }

    /// Individual alert signals.
    pub async fn validator_alerts(&self, address: &Address) -> Result<AlertReport, MonitorError> {
        self.container
            .alerts
            .check_all_alerts(address)
            .await
            .map_err(classify)
    }

    /// Aggregate health classification.
    pub async fn validator_health(&self, address: &Address) -> Result<HealthReport, MonitorError> {
        self.container
            .alerts
            .validator_health_status(address)
            .await
            .map_err(classify)
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    /// Run a synchronization pass now with the configured batch size.
    ///
    /// `Ok(None)` when a pass is already in flight.
    pub async fn trigger_sync(&self) -> Result<Option<SyncReport>, MonitorError> {
        let container = &self.container;
        let batch_size = container.config.sync.batch_size;
        info!("[runtime] Manual sync requested");

        match container
            .sync_guard
            .run(container.synchronizer.sync_latest_blocks(batch_size))
            .await
        {
            Some(result) => result.map(Some).map_err(classify),
            None => Ok(None),
        }
    }

    /// Run a registry reconciliation now.
    ///
    /// `Ok(None)` when one is already in flight.
    pub async fn trigger_reconcile(&self) -> Result<Option<ReconcileReport>, MonitorError> {
        let container = &self.container;
        info!("[runtime] Manual registry reconciliation requested");

        match container
            .registry_guard
            .run(container.reconciler.update_validators())
            .await
        {
            Some(result) => result.map(Some).map_err(classify),
            None => Ok(None),
        }
    }

    /// Current mempool contents; refreshes the mempool gauge.
    pub async fn pending_transactions(&self) -> Result<Vec<PendingTransaction>, MonitorError> {
        self.container
            .mempool
            .observe_mempool()
            .await
            .map_err(classify)
    }

    /// Prometheus text exposition of the monitor's counters.
    pub fn metrics_text(&self) -> Result<String, TelemetryError> {
        self.container.metrics.export_text()
    }
}
