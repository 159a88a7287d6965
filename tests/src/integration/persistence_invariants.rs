//! # Persistence Invariants
//!
//! Idempotent ingestion, transactional atomicity and aggregate consistency,
//! checked on every store adapter.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use shared_types::{Address, Classify, ErrorKind, U256};
    use vp_01_ledger_source::MockLedgerSource;
    use vp_02_persistence::{audit_aggregates, InsertOutcome, PersistenceStore, SqliteStore};
    use vp_03_block_sync::{BlockSynchronizer, SyncConfig};

    use crate::fixtures::{all_stores, block, metrics};

    async fn assert_consistent(store: &dyn PersistenceStore, name: &str) {
        let blocks = store.blocks_in_range(0, u64::MAX).await.unwrap();
        let validators = store.validators().await.unwrap();
        let mismatches = audit_aggregates(&blocks, &validators);
        assert!(mismatches.is_empty(), "{name}: {mismatches:?}");
    }

    // =========================================================================
    // IDEMPOTENCY
    // =========================================================================

    #[tokio::test]
    async fn test_double_insert_counts_once() {
        for named in all_stores() {
            let store = named.store;
            let b = block(7, Some("aleo1x"), 10, &[4, 6]);

            assert_eq!(store.insert_block(&b).await.unwrap(), InsertOutcome::Inserted);
            assert_eq!(
                store.insert_block(&b).await.unwrap(),
                InsertOutcome::AlreadyPresent,
                "{}",
                named.name
            );

            let x = store.validator(&Address::new("aleo1x")).await.unwrap().unwrap();
            assert_eq!(x.total_blocks_produced, 1, "{}", named.name);
            assert_eq!(x.total_rewards, U256::from(10u64));
            assert_eq!(store.blocks_in_range(0, 100).await.unwrap().len(), 1);
            assert_eq!(store.transactions_for_block(7).await.unwrap().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_unrepresentable_height_reads_as_absent() {
        for named in all_stores() {
            let store = named.store;
            store
                .insert_block(&block(3, Some("aleo1x"), 10, &[5]))
                .await
                .unwrap();
            assert!(
                store.block_by_height(u64::MAX).await.unwrap().is_none(),
                "{}",
                named.name
            );
        }
    }

    // =========================================================================
    // ATOMICITY
    // =========================================================================

    /// A block whose transaction collides with an existing id leaves neither
    /// its row nor its aggregate update behind.
    #[tokio::test]
    async fn test_failed_transaction_write_rolls_back_block() {
        for named in all_stores() {
            let store = named.store;
            store
                .insert_block(&block(1, Some("aleo1x"), 10, &[5]))
                .await
                .unwrap();

            let mut clash = block(2, Some("aleo1x"), 5, &[9]);
            clash.transactions[0].id = "at1h1t0".to_string();

            let err = store.insert_block(&clash).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Persistence, "{}", named.name);

            assert!(store.block_by_height(2).await.unwrap().is_none(), "{}", named.name);
            assert_eq!(store.latest_height().await.unwrap(), Some(1));
            let x = store.validator(&Address::new("aleo1x")).await.unwrap().unwrap();
            assert_eq!(x.total_blocks_produced, 1, "{}", named.name);
            assert_eq!(x.total_rewards, U256::from(5u64));
            assert_consistent(store.as_ref(), named.name).await;
        }
    }

    /// A write failure inside a sync pass surfaces as a Persistence error.
    #[tokio::test]
    async fn test_sync_propagates_write_failure() {
        for named in all_stores() {
            let store = named.store;
            let mut second = block(1, Some("aleo1x"), 5, &[9]);
            second.transactions[0].id = "at1h0t0".to_string();
            let ledger = Arc::new(MockLedgerSource::with_blocks([
                block(0, Some("aleo1x"), 10, &[5]),
                second,
            ]));
            let sync = BlockSynchronizer::new(ledger, store.clone(), metrics(), &SyncConfig::for_testing());

            let err = sync.sync_latest_blocks(4).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Persistence, "{}", named.name);
            assert_eq!(store.latest_height().await.unwrap(), Some(0));
            assert_consistent(store.as_ref(), named.name).await;
        }
    }

    // =========================================================================
    // DURABILITY
    // =========================================================================

    #[tokio::test]
    async fn test_sqlite_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = vp_02_persistence::PersistenceConfig {
            database_path: dir.path().join("pulse.db").to_string_lossy().into_owned(),
            ..vp_02_persistence::PersistenceConfig::default()
        };

        {
            let store = SqliteStore::open(&config).unwrap();
            for height in 0..3 {
                store
                    .insert_block(&block(height, Some("aleo1x"), 30, &[2]))
                    .await
                    .unwrap();
            }
        }

        let reopened = SqliteStore::open(&config).unwrap();
        assert_eq!(reopened.latest_height().await.unwrap(), Some(2));
        let x = reopened.validator(&Address::new("aleo1x")).await.unwrap().unwrap();
        assert_eq!(x.total_blocks_produced, 3);
        assert_consistent(&reopened, "sqlite-reopened").await;
    }

    // =========================================================================
    // AGGREGATE CONSISTENCY UNDER ARBITRARY PASSES
    // =========================================================================

    #[derive(Debug, Clone)]
    struct Scenario {
        producers: Vec<Option<u8>>,
        fees: Vec<u64>,
        failing: BTreeSet<u64>,
        batch_size: usize,
    }

    fn scenario() -> impl Strategy<Value = Scenario> {
        (1usize..30).prop_flat_map(|len| {
            (
                prop::collection::vec(prop::option::weighted(0.9, 0u8..3), len),
                prop::collection::vec(0u64..1_000, len),
                prop::collection::btree_set(0u64..len as u64, 0..len.min(5)),
                1usize..8,
            )
                .prop_map(|(producers, fees, failing, batch_size)| Scenario {
                    producers,
                    fees,
                    failing,
                    batch_size,
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// After any pass, with or without skipped heights, every validator's
        /// counters equal the aggregate over its persisted blocks.
        #[test]
        fn prop_aggregates_match_persisted_blocks(s in scenario()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                for named in all_stores() {
                    let store = named.store;
                    let blocks: Vec<_> = s
                        .producers
                        .iter()
                        .zip(&s.fees)
                        .enumerate()
                        .map(|(h, (producer, fee))| {
                            let name = producer.map(|p| format!("aleo1v{p}"));
                            let fees: &[u64] = if *fee % 3 == 0 { &[] } else { std::slice::from_ref(fee) };
                            block(h as u64, name.as_deref(), 1_000 - h as u64, fees)
                        })
                        .collect();
                    let ledger = Arc::new(MockLedgerSource::with_blocks(blocks.clone()));
                    for height in &s.failing {
                        ledger.fail_height(*height);
                    }
                    let sync = BlockSynchronizer::new(
                        ledger.clone(),
                        store.clone(),
                        metrics(),
                        &SyncConfig::for_testing(),
                    );

                    let first = sync.sync_latest_blocks(s.batch_size).await.unwrap();
                    assert_eq!(first.skipped.iter().copied().collect::<BTreeSet<_>>(), s.failing);
                    assert_consistent(store.as_ref(), named.name).await;

                    ledger.clear_failures();
                    sync.sync_latest_blocks(s.batch_size).await.unwrap();
                    assert_consistent(store.as_ref(), named.name).await;
                    let persisted = store.blocks_in_range(0, u64::MAX).await.unwrap();
                    assert_eq!(persisted.len(), blocks.len(), "{}", named.name);

                    // replaying the whole ledger changes nothing
                    for b in &blocks {
                        assert_eq!(store.insert_block(b).await.unwrap(), InsertOutcome::AlreadyPresent);
                    }
                    assert_consistent(store.as_ref(), named.name).await;
                }
            });
        }
    }
}
