//! # Performance Metrics Service
//!
//! Read-only aggregations over the store. Windows are trailing and end at
//! the injected clock's current reading; a block is in the window when its
//! timestamp is strictly after `now - window`.

use std::sync::Arc;
use std::time::Duration;

use shared_types::{window_start, Address, TimeSource, Timestamp, U256};
use tracing::debug;
use vp_02_persistence::PersistenceStore;
use vp_telemetry::MonitorMetrics;

use crate::config::MetricsConfig;
use crate::domain::{
    average_interval_ms, efficiency_percent, summary_cache_key, total_fees, uptime_percent,
    MetricsError, PerformanceSummary, TtlCache, ValidatorPerformance, ValidatorPerformanceView,
};

/// Validator performance engine.
pub struct PerformanceMetricsService {
    store: Arc<dyn PersistenceStore>,
    clock: Arc<dyn TimeSource>,
    metrics: Arc<MonitorMetrics>,
    cache: TtlCache<Arc<PerformanceSummary>>,
    config: MetricsConfig,
}

impl PerformanceMetricsService {
    /// Create the engine.
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        clock: Arc<dyn TimeSource>,
        metrics: Arc<MonitorMetrics>,
        config: MetricsConfig,
    ) -> Self {
        Self {
            store,
            clock,
            metrics,
            cache: TtlCache::new(Duration::from_secs(config.cache_ttl_secs)),
            config,
        }
    }

    /// Window used when callers have none.
    pub fn default_window_secs(&self) -> u64 {
        self.config.default_window_secs
    }

    /// The summary cache, for maintenance.
    pub fn cache(&self) -> &TtlCache<Arc<PerformanceSummary>> {
        &self.cache
    }

    fn since(&self, window_secs: u64) -> Timestamp {
        window_start(self.clock.now(), window_secs)
    }

    /// Blocks, transactions, uptime and mean block interval over the window.
    pub async fn calculate_validator_performance(
        &self,
        address: &Address,
        window_secs: u64,
    ) -> Result<ValidatorPerformance, MetricsError> {
        self.performance_since(address, self.since(window_secs)).await
    }

    /// Percentage of in-window blocks that carry transactions.
    pub async fn validator_efficiency(
        &self,
        address: &Address,
        window_secs: u64,
    ) -> Result<f64, MetricsError> {
        self.efficiency_since(address, self.since(window_secs)).await
    }

    /// Fees accumulated over the window.
    pub async fn validator_rewards(
        &self,
        address: &Address,
        window_secs: u64,
    ) -> Result<U256, MetricsError> {
        self.rewards_since(address, self.since(window_secs)).await
    }

    /// All of the above, memoized under `performance_{address}_{window}`.
    pub async fn validator_performance_summary(
        &self,
        address: &Address,
        window_secs: u64,
    ) -> Result<Arc<PerformanceSummary>, MetricsError> {
        let key = summary_cache_key(address, window_secs);
        if let Some(cached) = self.cache.get(&key) {
            self.metrics.record_cache_lookup(true);
            return Ok(cached);
        }
        self.metrics.record_cache_lookup(false);

        let now = self.clock.now();
        let since = window_start(now, window_secs);
        let (performance, efficiency, rewards) = tokio::try_join!(
            self.performance_since(address, since),
            self.efficiency_since(address, since),
            self.rewards_since(address, since),
        )?;

        let summary = Arc::new(PerformanceSummary {
            address: address.clone(),
            window_secs,
            computed_at: now,
            performance,
            efficiency,
            rewards,
        });
        debug!(validator = %address, window_secs, "[vp-04] Cached performance summary");
        self.cache.set(key, Arc::clone(&summary));
        Ok(summary)
    }

    /// A validator row plus statistics over its most recent blocks.
    pub async fn validator_performance(
        &self,
        address: &Address,
    ) -> Result<ValidatorPerformanceView, MetricsError> {
        let validator = self
            .store
            .validator(address)
            .await?
            .ok_or_else(|| MetricsError::ValidatorNotFound(address.clone()))?;
        let recent = self
            .store
            .recent_blocks_by_validator(address, self.config.recent_blocks)
            .await?;

        Ok(ValidatorPerformanceView {
            validator,
            blocks_produced: recent.len() as u64,
            average_block_time_ms: average_interval_ms(&recent),
            total_fees: total_fees(&recent),
        })
    }

    async fn performance_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<ValidatorPerformance, MetricsError> {
        let blocks = self.store.blocks_by_validator_since(address, since).await?;
        let transactions = self
            .store
            .count_transactions_by_validator_since(address, since)
            .await?;
        let total_blocks = self.store.count_blocks_since(since).await?;

        Ok(ValidatorPerformance {
            blocks_proposed: blocks.len() as u64,
            transactions_processed: transactions,
            uptime: uptime_percent(blocks.len() as u64, total_blocks),
            average_response_time_ms: average_interval_ms(&blocks),
        })
    }

    async fn efficiency_since(&self, address: &Address, since: Timestamp) -> Result<f64, MetricsError> {
        let blocks = self.store.blocks_by_validator_since(address, since).await?;
        Ok(efficiency_percent(&blocks))
    }

    async fn rewards_since(&self, address: &Address, since: Timestamp) -> Result<U256, MetricsError> {
        let blocks = self.store.blocks_by_validator_since(address, since).await?;
        Ok(total_fees(&blocks))
    }
}
