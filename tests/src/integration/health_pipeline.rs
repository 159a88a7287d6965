//! # Health Pipeline
//!
//! Persisted history -> Performance Metrics -> Health Alerts, including the
//! summary cache and the API facade on top.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use monitor_runtime::{MonitorApi, MonitorConfig, MonitorContainer};
    use shared_types::{Address, ErrorKind, ManualTimeSource, U256};
    use vp_01_ledger_source::MockLedgerSource;
    use vp_02_persistence::{InMemoryStore, PersistenceStore};
    use vp_03_block_sync::{BlockSynchronizer, SyncConfig};
    use vp_04_performance_metrics::{MetricsConfig, PerformanceMetricsService};
    use vp_05_health_alerts::{AlertCheck, AlertService, AlertThresholds, HealthStatus};

    use crate::fixtures::{all_stores, block, metrics, DAY, NOW};

    fn services(
        store: Arc<dyn PersistenceStore>,
    ) -> (Arc<PerformanceMetricsService>, AlertService) {
        let performance = Arc::new(PerformanceMetricsService::new(
            store.clone(),
            Arc::new(ManualTimeSource::new(NOW)),
            metrics(),
            MetricsConfig::default(),
        ));
        let alerts = AlertService::new(store, performance.clone(), AlertThresholds::default());
        (performance, alerts)
    }

    // =========================================================================
    // MISSED BLOCKS
    // =========================================================================

    /// Heights 10 and 12 persisted for X after 11 failed to fetch: a gap of
    /// one stays under the threshold of five.
    #[tokio::test]
    async fn test_single_gap_is_not_missed_blocks() {
        for named in all_stores() {
            let store = named.store;
            let ledger = Arc::new(MockLedgerSource::with_blocks(
                (10..=12).map(|h| block(h, Some("aleo1x"), 3_600 - h, &[2_000_000])),
            ));
            ledger.fail_height(11);
            let sync = BlockSynchronizer::new(
                ledger,
                store.clone(),
                metrics(),
                &SyncConfig {
                    initial_height: 10,
                    ..SyncConfig::for_testing()
                },
            );
            let report = sync.sync_latest_blocks(4).await.unwrap();
            assert_eq!(report.skipped, vec![11]);

            let (_, alerts) = services(store);
            let x = Address::new("aleo1x");
            let report = alerts.check_all_alerts(&x).await.unwrap();
            assert_eq!(report.missed_block_count, 1, "{}", named.name);
            assert!(!report.missed_blocks, "{}", named.name);
        }
    }

    #[tokio::test]
    async fn test_wide_spacing_triggers_missed_blocks() {
        for named in all_stores() {
            let store = named.store;
            for height in [0, 3, 10] {
                store
                    .insert_block(&block(height, Some("aleo1x"), 600, &[2_000_000]))
                    .await
                    .unwrap();
            }
            let (_, alerts) = services(store);

            let report = alerts.check_all_alerts(&Address::new("aleo1x")).await.unwrap();
            assert_eq!(report.missed_block_count, 8, "{}", named.name);
            assert!(report.missed_blocks);
        }
    }

    // =========================================================================
    // UPTIME / CLASSIFICATION
    // =========================================================================

    /// Y produced nothing while 50 blocks landed in the last day.
    #[tokio::test]
    async fn test_absent_validator_is_critical() {
        for named in all_stores() {
            let store = named.store;
            for height in 0..50 {
                store
                    .insert_block(&block(height, Some("aleo1x"), 3_600 + height, &[5]))
                    .await
                    .unwrap();
            }
            let (performance, alerts) = services(store);
            let y = Address::new("aleo1y");

            let perf = performance
                .calculate_validator_performance(&y, DAY)
                .await
                .unwrap();
            assert_eq!(perf.blocks_proposed, 0);
            assert_eq!(perf.uptime, 0.0);

            let report = alerts.check_all_alerts(&y).await.unwrap();
            assert!(report.low_uptime, "{}", named.name);

            let health = alerts.validator_health_status(&y).await.unwrap();
            assert_eq!(health.status, HealthStatus::Critical, "{}", named.name);
            assert_eq!(
                health.alerts,
                vec![
                    AlertCheck::LowUptime,
                    AlertCheck::LowRewards,
                    AlertCheck::LowEfficiency
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_blocks_outside_window_do_not_count() {
        for named in all_stores() {
            let store = named.store;
            store
                .insert_block(&block(1, Some("aleo1x"), DAY + 10, &[5]))
                .await
                .unwrap();
            store
                .insert_block(&block(2, Some("aleo1z"), 60, &[5]))
                .await
                .unwrap();
            let (performance, _) = services(store);

            let x = Address::new("aleo1x");
            let perf = performance.calculate_validator_performance(&x, DAY).await.unwrap();
            assert_eq!(perf.blocks_proposed, 0, "{}", named.name);
            assert_eq!(performance.validator_rewards(&x, DAY).await.unwrap(), U256::zero());

            let wide = performance
                .calculate_validator_performance(&x, 2 * DAY)
                .await
                .unwrap();
            assert_eq!(wide.blocks_proposed, 1, "{}", named.name);
            assert_eq!(wide.uptime, 50.0);
        }
    }

    #[tokio::test]
    async fn test_empty_store_has_zero_uptime() {
        for named in all_stores() {
            let (performance, _) = services(named.store);
            let perf = performance
                .calculate_validator_performance(&Address::new("aleo1x"), DAY)
                .await
                .unwrap();
            assert_eq!(perf.uptime, 0.0, "{}", named.name);
            assert!(!perf.uptime.is_nan());
        }
    }

    // =========================================================================
    // SUMMARY CACHE
    // =========================================================================

    /// Two reads inside the TTL share one object; after the TTL the summary is
    /// recomputed and reflects new data.
    #[tokio::test(start_paused = true)]
    async fn test_summary_cached_for_five_minutes() {
        let store: Arc<dyn PersistenceStore> = Arc::new(InMemoryStore::new());
        store
            .insert_block(&block(1, Some("aleo1x"), 60, &[5]))
            .await
            .unwrap();
        let (performance, _) = services(store.clone());
        let x = Address::new("aleo1x");

        let first = performance.validator_performance_summary(&x, DAY).await.unwrap();
        store
            .insert_block(&block(2, Some("aleo1x"), 30, &[5]))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;
        let second = performance.validator_performance_summary(&x, DAY).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.performance.blocks_proposed, 1);

        tokio::time::advance(Duration::from_secs(181)).await;
        let third = performance.validator_performance_summary(&x, DAY).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.performance.blocks_proposed, 2);
    }

    // =========================================================================
    // THROUGH THE FACADE
    // =========================================================================

    #[tokio::test]
    async fn test_facade_end_to_end() {
        let ledger = Arc::new(MockLedgerSource::with_blocks(
            (0..20).map(|h| {
                let producer = if h < 5 { "aleo1y" } else { "aleo1x" };
                block(h, Some(producer), 7_200 - h * 10, &[2_000_000])
            }),
        ));
        let container = MonitorContainer::with_adapters(
            MonitorConfig::for_testing(),
            ledger,
            Arc::new(InMemoryStore::new()),
            Arc::new(ManualTimeSource::new(NOW)),
        )
        .unwrap();
        let api = MonitorApi::new(Arc::new(container));

        let report = api.trigger_sync().await.unwrap().unwrap();
        assert_eq!(report.persisted, 20);

        let x = Address::new("aleo1x");
        let summary = api.validator_performance(&x, Some(DAY)).await.unwrap();
        assert_eq!(summary.performance.blocks_proposed, 15);
        assert_eq!(summary.performance.uptime, 75.0);

        let y = Address::new("aleo1y");
        let health = api.validator_health(&y).await.unwrap();
        // 25 % uptime is the only failing signal
        assert_eq!(health.status, HealthStatus::Warning);
        assert_eq!(health.alerts, vec![AlertCheck::LowUptime]);

        let view = api.validator_performance_view(&y).await.unwrap();
        assert_eq!(view.validator.total_blocks_produced, 5);

        let unknown = api.validator_health(&Address::new("aleo1nobody")).await.unwrap();
        assert_eq!(unknown.status, HealthStatus::Critical);
        assert_eq!(
            api.validator(&Address::new("aleo1nobody")).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
