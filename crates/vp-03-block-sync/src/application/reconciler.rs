//! # Validator Registry Reconciler
//!
//! Merges the ledger's committee snapshot into the validator table. Members
//! are upserted; validators missing from the snapshot are left as they are.

use std::sync::Arc;

use shared_types::TimeSource;
use tracing::{debug, info};
use vp_01_ledger_source::LedgerSource;
use vp_02_persistence::{PersistenceStore, UpsertOutcome};
use vp_telemetry::MonitorMetrics;

use crate::domain::{ReconcileReport, SyncError};

/// Committee-to-store reconciliation.
pub struct RegistryReconciler {
    ledger: Arc<dyn LedgerSource>,
    store: Arc<dyn PersistenceStore>,
    metrics: Arc<MonitorMetrics>,
    clock: Arc<dyn TimeSource>,
}

impl RegistryReconciler {
    /// Create a reconciler; `clock` stamps `last_seen`.
    pub fn new(
        ledger: Arc<dyn LedgerSource>,
        store: Arc<dyn PersistenceStore>,
        metrics: Arc<MonitorMetrics>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            ledger,
            store,
            metrics,
            clock,
        }
    }

    /// Fetch the committee and upsert every member.
    pub async fn update_validators(&self) -> Result<ReconcileReport, SyncError> {
        let committee = self.ledger.latest_committee().await?;
        let seen_at = self.clock.now();
        let mut report = ReconcileReport {
            members: committee.len(),
            ..ReconcileReport::default()
        };

        for member in &committee {
            let outcome = self.store.upsert_committee_member(member, seen_at).await?;
            let inserted = outcome == UpsertOutcome::Inserted;
            if inserted {
                report.inserted += 1;
                debug!(validator = %member.address, "[vp-03] New validator registered");
            } else {
                report.updated += 1;
            }
            self.metrics.record_validator_reconciled(inserted);
        }

        info!(
            inserted = report.inserted,
            updated = report.updated,
            "[vp-03] Reconciled {} committee members",
            report.members
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, CommitteeMember, ManualTimeSource};
    use vp_01_ledger_source::MockLedgerSource;
    use vp_02_persistence::InMemoryStore;

    fn member(addr: &str, stake: u64, active: bool) -> CommitteeMember {
        CommitteeMember {
            address: Address::from(addr),
            stake,
            is_active: active,
            bonded: stake,
        }
    }

    fn setup() -> (RegistryReconciler, Arc<MockLedgerSource>, Arc<InMemoryStore>, Arc<ManualTimeSource>) {
        let ledger = Arc::new(MockLedgerSource::new());
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualTimeSource::new(1_000));
        let metrics = Arc::new(MonitorMetrics::new("vp").unwrap());
        let reconciler =
            RegistryReconciler::new(ledger.clone(), store.clone(), metrics, clock.clone());
        (reconciler, ledger, store, clock)
    }

    #[tokio::test]
    async fn test_inserts_then_updates() {
        let (reconciler, ledger, store, clock) = setup();
        ledger.set_committee(vec![member("aleo1a", 10, true), member("aleo1b", 20, true)]);

        let first = reconciler.update_validators().await.unwrap();
        assert_eq!((first.inserted, first.updated), (2, 0));

        clock.advance(60);
        ledger.set_committee(vec![member("aleo1a", 15, false)]);
        let second = reconciler.update_validators().await.unwrap();
        assert_eq!((second.inserted, second.updated), (0, 1));

        let a = store.validator(&Address::from("aleo1a")).await.unwrap().unwrap();
        assert_eq!(a.stake, 15);
        assert!(!a.is_active);
        assert_eq!(a.last_seen, Some(1_060));
    }

    #[tokio::test]
    async fn test_absent_members_are_untouched() {
        let (reconciler, ledger, store, _) = setup();
        ledger.set_committee(vec![member("aleo1a", 10, true), member("aleo1b", 20, true)]);
        reconciler.update_validators().await.unwrap();

        ledger.set_committee(vec![member("aleo1a", 10, true)]);
        reconciler.update_validators().await.unwrap();

        let b = store.validator(&Address::from("aleo1b")).await.unwrap().unwrap();
        assert!(b.is_active);
        assert_eq!(b.last_seen, Some(1_000));
        assert_eq!(store.validators().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_committee_failure_propagates() {
        let (reconciler, ledger, store, _) = setup();
        ledger.fail_committee(true);

        assert!(matches!(
            reconciler.update_validators().await,
            Err(SyncError::Ledger(_))
        ));
        assert!(store.validators().await.unwrap().is_empty());
    }
}
