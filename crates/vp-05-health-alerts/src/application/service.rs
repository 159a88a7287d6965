//! # Alert Service
//!
//! Evaluates the four checks against fresh (uncached) metrics.

use std::sync::Arc;

use shared_types::Address;
use tracing::warn;
use vp_02_persistence::PersistenceStore;
use vp_04_performance_metrics::PerformanceMetricsService;

use crate::config::AlertThresholds;
use crate::domain::{count_missed_blocks, AlertError, AlertReport, HealthReport};

/// Validator health classifier.
pub struct AlertService {
    store: Arc<dyn PersistenceStore>,
    metrics: Arc<PerformanceMetricsService>,
    thresholds: AlertThresholds,
}

impl AlertService {
    /// Create the classifier.
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        metrics: Arc<PerformanceMetricsService>,
        thresholds: AlertThresholds,
    ) -> Self {
        Self {
            store,
            metrics,
            thresholds,
        }
    }

    /// Thresholds in effect.
    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Run all four checks.
    ///
    /// Uptime, rewards and efficiency use the configured window (24 hours by
    /// default) regardless of any window the caller works with.
    pub async fn check_all_alerts(&self, address: &Address) -> Result<AlertReport, AlertError> {
        let window = self.thresholds.window_secs;
        let (missed_block_count, performance, rewards, efficiency) = tokio::try_join!(
            self.missed_blocks(address),
            async {
                self.metrics
                    .calculate_validator_performance(address, window)
                    .await
                    .map_err(AlertError::from)
            },
            async {
                self.metrics
                    .validator_rewards(address, window)
                    .await
                    .map_err(AlertError::from)
            },
            async {
                self.metrics
                    .validator_efficiency(address, window)
                    .await
                    .map_err(AlertError::from)
            },
        )?;

        let report = AlertReport {
            address: address.clone(),
            missed_blocks: missed_block_count > self.thresholds.max_missed_blocks,
            low_uptime: performance.uptime < self.thresholds.min_uptime_percent,
            low_rewards: rewards < self.thresholds.min_rewards,
            low_efficiency: efficiency < self.thresholds.min_efficiency_percent,
            missed_block_count,
            uptime: performance.uptime,
            rewards,
            efficiency,
        };

        if report.missed_blocks {
            warn!(
                validator = %address,
                "[vp-05] Validator missed {} blocks, exceeding threshold of {}",
                missed_block_count,
                self.thresholds.max_missed_blocks
            );
        }
        Ok(report)
    }

    /// Count triggered checks into a health verdict.
    pub async fn validator_health_status(
        &self,
        address: &Address,
    ) -> Result<HealthReport, AlertError> {
        let report = self.check_all_alerts(address).await?;
        Ok(HealthReport {
            address: address.clone(),
            status: report.status(),
            alerts: report.triggered(),
        })
    }

    async fn missed_blocks(&self, address: &Address) -> Result<u64, AlertError> {
        let recent = self
            .store
            .recent_blocks_by_validator(address, self.thresholds.missed_blocks_lookback)
            .await?;
        let heights: Vec<_> = recent.iter().map(|b| b.height).collect();
        Ok(count_missed_blocks(&heights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Block, BlockTransaction, Height, ManualTimeSource, Timestamp, U256};
    use vp_02_persistence::InMemoryStore;
    use vp_04_performance_metrics::MetricsConfig;
    use vp_telemetry::MonitorMetrics;

    use crate::domain::{AlertCheck, HealthStatus};

    const NOW: Timestamp = 1_700_000_000;

    fn block(height: Height, producer: &str, fee: Option<u64>) -> Block {
        let timestamp = NOW - 3_600 + height;
        let transactions: Vec<BlockTransaction> = fee
            .map(|fee| BlockTransaction {
                id: format!("at-{height}"),
                fee: U256::from(fee),
                timestamp,
            })
            .into_iter()
            .collect();
        Block {
            height,
            hash: format!("h{height}"),
            previous_hash: format!("h{}", height.saturating_sub(1)),
            timestamp,
            validator_address: Some(Address::from(producer)),
            total_fees: transactions.iter().fold(U256::zero(), |acc, tx| acc + tx.fee),
            transactions,
        }
    }

    async fn alerts_with(blocks: Vec<Block>, thresholds: AlertThresholds) -> AlertService {
        let store = Arc::new(InMemoryStore::new());
        for b in &blocks {
            store.insert_block(b).await.unwrap();
        }
        let metrics = Arc::new(PerformanceMetricsService::new(
            store.clone(),
            Arc::new(ManualTimeSource::new(NOW)),
            Arc::new(MonitorMetrics::new("vp").unwrap()),
            MetricsConfig::default(),
        ));
        AlertService::new(store, metrics, thresholds)
    }

    #[tokio::test]
    async fn test_sole_producer_is_healthy() {
        let blocks = (1..=20).map(|h| block(h, "X", Some(1_000_000))).collect();
        let alerts = alerts_with(blocks, AlertThresholds::default()).await;

        let health = alerts.validator_health_status(&Address::from("X")).await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_small_gap_is_below_missed_threshold() {
        let blocks = vec![block(10, "X", Some(5)), block(12, "X", Some(5))];
        let alerts = alerts_with(blocks, AlertThresholds::for_testing()).await;

        let report = alerts.check_all_alerts(&Address::from("X")).await.unwrap();
        assert_eq!(report.missed_block_count, 1);
        assert!(!report.missed_blocks);
    }

    #[tokio::test]
    async fn test_absent_validator_has_low_uptime() {
        let blocks = (1..=50).map(|h| block(h, "X", Some(10))).collect();
        let alerts = alerts_with(blocks, AlertThresholds::for_testing()).await;

        let report = alerts.check_all_alerts(&Address::from("Y")).await.unwrap();
        assert_eq!(report.uptime, 0.0);
        assert!(report.low_uptime);
        assert!(report.low_rewards);
        assert!(report.low_efficiency);
        assert!(!report.missed_blocks);

        let health = alerts.validator_health_status(&Address::from("Y")).await.unwrap();
        assert_eq!(health.status, HealthStatus::Critical);
        assert_eq!(
            health.alerts,
            vec![AlertCheck::LowUptime, AlertCheck::LowRewards, AlertCheck::LowEfficiency]
        );
    }

    #[tokio::test]
    async fn test_sparse_producer_gets_warning() {
        // X produces every tenth block: 9 missed per gap, but fees and
        // transactions are fine.
        let blocks = (1..=40)
            .map(|h| {
                if h % 10 == 0 {
                    block(h, "X", Some(2_000_000))
                } else {
                    block(h, "Z", Some(1))
                }
            })
            .collect();
        let alerts = alerts_with(blocks, AlertThresholds::default()).await;

        let health = alerts.validator_health_status(&Address::from("X")).await.unwrap();
        assert_eq!(health.status, HealthStatus::Warning);
        assert_eq!(health.alerts, vec![AlertCheck::MissedBlocks, AlertCheck::LowUptime]);
    }
}
