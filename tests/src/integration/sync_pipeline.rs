//! # Sync Pipeline
//!
//! Ledger -> Block Synchronizer -> Persistence Store, against the mock ledger
//! and both store adapters.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{Address, CommitteeMember, ErrorKind, ManualTimeSource, U256};
    use vp_01_ledger_source::MockLedgerSource;
    use vp_02_persistence::audit_aggregates;
    use vp_03_block_sync::{BlockSynchronizer, RegistryReconciler, SyncConfig};
    use vp_telemetry::PassOutcome;

    use crate::fixtures::{all_stores, block, metrics, NOW};

    fn config_from(initial_height: u64) -> SyncConfig {
        SyncConfig {
            initial_height,
            ..SyncConfig::for_testing()
        }
    }

    // =========================================================================
    // UP-TO-DATE STORE
    // =========================================================================

    /// Heights 10..=12 persisted, ledger at 12: nothing is fetched or written.
    #[tokio::test]
    async fn test_up_to_date_store_fetches_nothing() {
        for named in all_stores() {
            let store = named.store;
            for height in 10..=12 {
                store
                    .insert_block(&block(height, Some("aleo1x"), 60, &[5]))
                    .await
                    .unwrap();
            }
            let before = store.validator(&Address::new("aleo1x")).await.unwrap();

            let ledger = Arc::new(MockLedgerSource::with_blocks(
                (10..=12).map(|h| block(h, Some("aleo1x"), 60, &[5])),
            ));
            let metrics = metrics();
            let sync = BlockSynchronizer::new(
                ledger.clone(),
                store.clone(),
                metrics.clone(),
                &config_from(10),
            );

            let report = sync.sync_latest_blocks(4).await.unwrap();
            assert!(report.is_noop(), "{}", named.name);
            assert_eq!(report.fetched, 0, "{}", named.name);
            assert_eq!(report.persisted, 0, "{}", named.name);
            assert_eq!(ledger.block_fetches(), 0, "{}", named.name);
            assert_eq!(metrics.sync_passes(PassOutcome::UpToDate), 1);
            assert_eq!(
                store.validator(&Address::new("aleo1x")).await.unwrap(),
                before,
                "{}",
                named.name
            );
        }
    }

    // =========================================================================
    // FULL PASSES
    // =========================================================================

    #[tokio::test]
    async fn test_empty_store_syncs_whole_ledger_in_batches() {
        for named in all_stores() {
            let store = named.store;
            let ledger = Arc::new(MockLedgerSource::with_blocks(
                (0..=9).map(|h| block(h, Some(if h % 2 == 0 { "aleo1even" } else { "aleo1odd" }), 600 - h, &[1, 2])),
            ));
            let sync = BlockSynchronizer::new(ledger.clone(), store.clone(), metrics(), &config_from(0));

            let report = sync.sync_latest_blocks(3).await.unwrap();
            assert_eq!(report.start_height, Some(0));
            assert_eq!(report.persisted, 10, "{}", named.name);
            assert!(ledger.max_in_flight() <= 3, "{}", named.name);
            assert_eq!(store.latest_height().await.unwrap(), Some(9));

            let even = store.validator(&Address::new("aleo1even")).await.unwrap().unwrap();
            assert_eq!(even.total_blocks_produced, 5);
            assert_eq!(even.total_rewards, U256::from(15u64));

            let blocks = store.blocks_in_range(0, u64::MAX).await.unwrap();
            let validators = store.validators().await.unwrap();
            assert!(audit_aggregates(&blocks, &validators).is_empty(), "{}", named.name);
        }
    }

    #[tokio::test]
    async fn test_failed_height_skipped_then_recovered() {
        for named in all_stores() {
            let store = named.store;
            let ledger = Arc::new(MockLedgerSource::with_blocks(
                (1..=6).map(|h| block(h, Some("aleo1x"), 100 - h, &[3])),
            ));
            ledger.fail_height(3);
            let sync = BlockSynchronizer::new(ledger.clone(), store.clone(), metrics(), &config_from(1));

            let first = sync.sync_latest_blocks(2).await.unwrap();
            assert_eq!(first.skipped, vec![3], "{}", named.name);
            assert_eq!(first.persisted, 5);
            assert!(store.block_by_height(3).await.unwrap().is_none());
            assert_eq!(store.latest_height().await.unwrap(), Some(6));
            assert_eq!(sync.pending_gaps(), vec![3]);

            ledger.clear_failures();
            let second = sync.sync_latest_blocks(2).await.unwrap();
            assert_eq!(second.retried, 1, "{}", named.name);
            assert_eq!(second.persisted, 1);
            assert!(sync.pending_gaps().is_empty());

            let x = store.validator(&Address::new("aleo1x")).await.unwrap().unwrap();
            assert_eq!(x.total_blocks_produced, 6, "{}", named.name);
            assert_eq!(x.total_rewards, U256::from(18u64));
        }
    }

    #[tokio::test]
    async fn test_unavailable_ledger_height_aborts_pass() {
        for named in all_stores() {
            let ledger = Arc::new(MockLedgerSource::new());
            let metrics = metrics();
            let sync = BlockSynchronizer::new(ledger, named.store.clone(), metrics.clone(), &config_from(0));

            let err = sync.sync_latest_blocks(4).await.unwrap_err();
            assert_eq!(shared_types::Classify::kind(&err), ErrorKind::Upstream);
            assert_eq!(metrics.sync_passes(PassOutcome::Failed), 1);
            assert_eq!(named.store.latest_height().await.unwrap(), None, "{}", named.name);
        }
    }

    // =========================================================================
    // REGISTRY + SYNC
    // =========================================================================

    /// Committee data and block aggregates land on the same validator row
    /// whichever arrives first.
    #[tokio::test]
    async fn test_registry_and_blocks_merge_on_one_row() {
        for named in all_stores() {
            let store = named.store;
            let ledger = Arc::new(MockLedgerSource::with_blocks(
                (0..=2).map(|h| block(h, Some("aleo1x"), 50, &[7])),
            ));
            ledger.set_committee(vec![CommitteeMember {
                address: Address::new("aleo1x"),
                stake: 1_000,
                is_active: true,
                bonded: 900,
            }]);
            let metrics = metrics();
            let sync = BlockSynchronizer::new(ledger.clone(), store.clone(), metrics.clone(), &config_from(0));
            let reconciler = RegistryReconciler::new(
                ledger.clone(),
                store.clone(),
                metrics,
                Arc::new(ManualTimeSource::new(NOW)),
            );

            sync.sync_latest_blocks(4).await.unwrap();
            let report = reconciler.update_validators().await.unwrap();
            assert_eq!(report.updated, 1, "{}", named.name);

            let x = store.validator(&Address::new("aleo1x")).await.unwrap().unwrap();
            assert_eq!(x.stake, 1_000);
            assert_eq!(x.bonded, 900);
            assert!(x.is_active);
            assert_eq!(x.total_blocks_produced, 3, "{}", named.name);
            assert_eq!(x.total_rewards, U256::from(21u64));
            assert_eq!(x.last_seen, Some(NOW));
        }
    }
}
