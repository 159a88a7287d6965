//! Shared builders for the integration suite.

use std::sync::Arc;

use shared_types::{Address, Block, BlockTransaction, Height, Timestamp, U256};
use vp_02_persistence::{InMemoryStore, PersistenceStore, SqliteStore};
use vp_telemetry::MonitorMetrics;

/// Fixed "now" for every clock in the suite.
pub const NOW: Timestamp = 1_700_000_000;

/// One day in seconds.
pub const DAY: u64 = 86_400;

/// Block at `height` produced by `producer`, `age_secs` before [`NOW`], with
/// one transaction per entry of `fees`.
pub fn block(height: Height, producer: Option<&str>, age_secs: u64, fees: &[u64]) -> Block {
    let timestamp = NOW - age_secs;
    let transactions: Vec<BlockTransaction> = fees
        .iter()
        .enumerate()
        .map(|(i, fee)| BlockTransaction {
            id: format!("at1h{height}t{i}"),
            fee: U256::from(*fee),
            timestamp,
        })
        .collect();
    let total_fees = transactions
        .iter()
        .fold(U256::zero(), |acc, tx| acc + tx.fee);

    Block {
        height,
        hash: format!("ab1hash{height}"),
        previous_hash: format!("ab1hash{}", height.saturating_sub(1)),
        timestamp,
        validator_address: producer.map(Address::new),
        total_fees,
        transactions,
    }
}

/// A named store adapter.
pub struct NamedStore {
    /// Adapter name for assertion messages.
    pub name: &'static str,
    /// The adapter.
    pub store: Arc<dyn PersistenceStore>,
}

/// One fresh instance of every store adapter.
pub fn all_stores() -> Vec<NamedStore> {
    let sqlite = SqliteStore::open_in_memory().expect("in-memory SQLite opens");
    vec![
        NamedStore {
            name: "memory",
            store: Arc::new(InMemoryStore::new()),
        },
        NamedStore {
            name: "sqlite",
            store: Arc::new(sqlite),
        },
    ]
}

/// Metrics collector with its own registry.
pub fn metrics() -> Arc<MonitorMetrics> {
    Arc::new(MonitorMetrics::new("vp_test").expect("metrics registry builds"))
}
