//! # Mempool Observer
//!
//! Samples the ledger's pending transactions into the mempool gauge.

use std::sync::Arc;

use shared_types::PendingTransaction;
use tracing::debug;
use vp_01_ledger_source::LedgerSource;
use vp_telemetry::MonitorMetrics;

use crate::domain::SyncError;

/// Reads the mempool and reports its size.
pub struct MempoolObserver {
    ledger: Arc<dyn LedgerSource>,
    metrics: Arc<MonitorMetrics>,
}

impl MempoolObserver {
    /// Create an observer.
    pub fn new(ledger: Arc<dyn LedgerSource>, metrics: Arc<MonitorMetrics>) -> Self {
        Self { ledger, metrics }
    }

    /// Fetch pending transactions and update the gauge.
    pub async fn observe_mempool(&self) -> Result<Vec<PendingTransaction>, SyncError> {
        let pending = self.ledger.transactions_in_mempool().await?;
        self.metrics.set_mempool_size(pending.len());
        debug!("[vp-03] {} transactions pending in mempool", pending.len());
        Ok(pending)
    }
}
