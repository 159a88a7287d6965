//! # Monitor Runtime
//!
//! ## Startup Sequence
//!
//! 1. Wait for the ledger (bounded retries, fatal on exhaustion)
//! 2. Schedule registry reconciliation (runs now, then every interval)
//! 3. Schedule block synchronization (runs now, then every interval)
//!
//! ## Shutdown Sequence
//!
//! 1. Signal every periodic task
//! 2. Wait for them to stop

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::MonitorApi;
use crate::container::MonitorContainer;
use crate::scheduler::Scheduler;
use crate::startup::{wait_for_ledger, StartupError};

/// The runtime orchestrating all subsystems.
pub struct MonitorRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<MonitorContainer>,
    /// Periodic tasks.
    scheduler: Scheduler,
}

impl MonitorRuntime {
    /// Create a runtime over a wired container. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(container: MonitorContainer) -> Self {
        Self {
            container: Arc::new(container),
            scheduler: Scheduler::new(),
        }
    }

    /// Check connectivity, then start the periodic tasks.
    pub async fn start(&mut self) -> Result<(), StartupError> {
        info!("===========================================");
        info!("  Validator Pulse Monitor v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let ledger_height =
            wait_for_ledger(self.container.ledger.as_ref(), &self.container.config.startup).await?;
        info!("Ledger at height {}", ledger_height);

        self.schedule_registry();
        self.schedule_sync();

        info!("Periodic tasks running: {:?}", self.scheduler.task_names());
        Ok(())
    }

    fn schedule_registry(&mut self) {
        let container = Arc::clone(&self.container);
        let period = Duration::from_secs(container.config.sync.registry_interval_secs);
        let guard = Arc::clone(&container.registry_guard);

        self.scheduler.spawn_periodic(guard, period, move || {
            let container = Arc::clone(&container);
            async move {
                if let Err(e) = container.reconciler.update_validators().await {
                    error!("[runtime] Registry reconciliation failed: {}", e);
                }
            }
        });
    }

    fn schedule_sync(&mut self) {
        let container = Arc::clone(&self.container);
        let period = Duration::from_secs(container.config.sync.sync_interval_secs);
        let guard = Arc::clone(&container.sync_guard);

        self.scheduler.spawn_periodic(guard, period, move || {
            let container = Arc::clone(&container);
            async move {
                let batch_size = container.config.sync.batch_size;
                if let Err(e) = container.synchronizer.sync_latest_blocks(batch_size).await {
                    error!("[runtime] Sync pass failed: {}", e);
                }
                if let Err(e) = container.mempool.observe_mempool().await {
                    warn!("[runtime] Mempool observation failed: {}", e);
                }
                let purged = container.performance.cache().purge_expired();
                if purged > 0 {
                    info!("[runtime] Purged {} expired performance summaries", purged);
                }
            }
        });
    }

    /// Facade for the API layer.
    pub fn api(&self) -> MonitorApi {
        MonitorApi::new(Arc::clone(&self.container))
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<MonitorContainer> {
        Arc::clone(&self.container)
    }

    /// Stop the periodic tasks and wait for them.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        self.scheduler.shutdown().await;
        info!("Shutdown complete");
    }
}
