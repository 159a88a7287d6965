//! # Subsystem Container
//!
//! Holds every subsystem instance and wires them in dependency order:
//!
//! ```text
//! Level 0: Metrics collector, Ledger Source, Persistence Store
//! Level 1: Block Synchronizer, Registry Reconciler, Mempool Observer
//! Level 2: Performance Metrics (reads the store)
//! Level 3: Health Alerts (reads the store and Performance Metrics)
//! ```
//!
//! All subsystems are wrapped in `Arc`. The store is the only shared mutable
//! resource; the single-flight guards keep two passes of the same task kind
//! from racing on it.

use std::sync::Arc;

use shared_types::{SystemTimeSource, TimeSource};
use thiserror::Error;
use tracing::{info, instrument};
use vp_01_ledger_source::{HttpLedgerSource, LedgerError, LedgerSource};
use vp_02_persistence::{PersistenceStore, SqliteStore, StoreError};
use vp_03_block_sync::{BlockSynchronizer, MempoolObserver, RegistryReconciler};
use vp_04_performance_metrics::PerformanceMetricsService;
use vp_05_health_alerts::AlertService;
use vp_telemetry::{MonitorMetrics, TelemetryError};

use crate::container::config::{ConfigError, MonitorConfig};
use crate::scheduler::SingleFlight;

/// Wiring failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The ledger client could not be built.
    #[error("Ledger source: {0}")]
    Ledger(#[from] LedgerError),

    /// The store could not be opened.
    #[error("Persistence store: {0}")]
    Store(#[from] StoreError),

    /// The metrics collector could not be registered.
    #[error("Metrics collector: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Central container holding all subsystem instances.
pub struct MonitorContainer {
    // =========================================================================
    // LEVEL 0: Adapters and shared infrastructure
    // =========================================================================
    /// Ledger Source (Subsystem 1).
    pub ledger: Arc<dyn LedgerSource>,

    /// Persistence Store (Subsystem 2).
    pub store: Arc<dyn PersistenceStore>,

    /// Prometheus collector shared by every subsystem.
    pub metrics: Arc<MonitorMetrics>,

    // =========================================================================
    // LEVEL 1: Ingestion
    // =========================================================================
    /// Block Synchronizer (Subsystem 3).
    pub synchronizer: Arc<BlockSynchronizer>,

    /// Validator Registry Reconciler (Subsystem 3).
    pub reconciler: Arc<RegistryReconciler>,

    /// Mempool gauge feeder (Subsystem 3).
    pub mempool: Arc<MempoolObserver>,

    // =========================================================================
    // LEVEL 2-3: Read side
    // =========================================================================
    /// Performance Metrics (Subsystem 4).
    pub performance: Arc<PerformanceMetricsService>,

    /// Health Alerts (Subsystem 5).
    pub alerts: Arc<AlertService>,

    // =========================================================================
    // TASK GUARDS
    // =========================================================================
    /// Held while a synchronization pass runs.
    pub sync_guard: Arc<SingleFlight>,

    /// Held while a registry reconciliation runs.
    pub registry_guard: Arc<SingleFlight>,

    /// Configuration (immutable after initialization).
    pub config: MonitorConfig,
}

impl MonitorContainer {
    /// Build the production container: HTTP ledger client and SQLite store.
    #[instrument(name = "container_init", skip(config))]
    pub fn new(config: MonitorConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        info!("Initializing Validator Pulse subsystem container");

        let ledger: Arc<dyn LedgerSource> = Arc::new(HttpLedgerSource::new(&config.ledger)?);
        info!("  [01] Ledger source -> {}/{}", config.ledger.base_url, config.ledger.network);

        let store: Arc<dyn PersistenceStore> = Arc::new(SqliteStore::open(&config.database)?);
        info!("  [02] Persistence store -> {}", config.database.database_path);

        Self::with_adapters(config, ledger, store, Arc::new(SystemTimeSource))
    }

    /// Wire the subsystems over caller-supplied adapters.
    pub fn with_adapters(
        config: MonitorConfig,
        ledger: Arc<dyn LedgerSource>,
        store: Arc<dyn PersistenceStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;

        let metrics = Arc::new(MonitorMetrics::new(&config.telemetry.metrics_namespace)?);

        let synchronizer = Arc::new(BlockSynchronizer::new(
            Arc::clone(&ledger),
            Arc::clone(&store),
            Arc::clone(&metrics),
            &config.sync,
        ));
        let reconciler = Arc::new(RegistryReconciler::new(
            Arc::clone(&ledger),
            Arc::clone(&store),
            Arc::clone(&metrics),
            Arc::clone(&clock),
        ));
        let mempool = Arc::new(MempoolObserver::new(
            Arc::clone(&ledger),
            Arc::clone(&metrics),
        ));
        info!("  [03] Block sync, registry reconciler and mempool observer ready");

        let performance = Arc::new(PerformanceMetricsService::new(
            Arc::clone(&store),
            clock,
            Arc::clone(&metrics),
            config.metrics.clone(),
        ));
        info!(
            "  [04] Performance metrics ready (cache TTL {}s)",
            config.metrics.cache_ttl_secs
        );

        let alerts = Arc::new(AlertService::new(
            Arc::clone(&store),
            Arc::clone(&performance),
            config.alerts.clone(),
        ));
        info!("  [05] Health alerts ready");

        Ok(Self {
            ledger,
            store,
            metrics,
            synchronizer,
            reconciler,
            mempool,
            performance,
            alerts,
            sync_guard: Arc::new(SingleFlight::new("block-sync")),
            registry_guard: Arc::new(SingleFlight::new("registry-reconcile")),
            config,
        })
    }
}
