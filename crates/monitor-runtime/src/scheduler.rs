//! # Periodic Scheduler
//!
//! Each task kind runs once immediately and then on a fixed interval in its
//! own tokio task. A task kind owns a [`SingleFlight`] guard that is shared
//! with the manual triggers of the API facade, so two passes of the same kind
//! never overlap. A tick that finds its guard taken is skipped, not queued.
//!
//! All tasks observe one `watch` shutdown channel.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Mutual exclusion for one task kind.
#[derive(Debug)]
pub struct SingleFlight {
    name: &'static str,
    gate: Mutex<()>,
    skipped: AtomicU64,
}

impl SingleFlight {
    /// Create an open guard.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            gate: Mutex::new(()),
            skipped: AtomicU64::new(0),
        }
    }

    /// Task kind this guard protects.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a run currently holds the guard.
    pub fn is_running(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Number of runs refused because another was in flight.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Take the guard if it is free.
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match self.gate.try_lock() {
            Ok(permit) => Some(permit),
            Err(_) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Drive `work` to completion while holding the guard.
    ///
    /// Returns `None` without polling `work` when a run is already in flight.
    pub async fn run<F, T>(&self, work: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let Some(_permit) = self.try_acquire() else {
            debug!("[runtime] {} already in flight", self.name);
            return None;
        };
        Some(work.await)
    }
}

/// Owner of the periodic tasks and their shutdown channel.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Scheduler with no tasks.
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    /// Names of the spawned tasks.
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    /// Run `tick` now and then every `period` under `guard`.
    ///
    /// Shutdown interrupts an in-flight tick. Blocks commit one at a time, so
    /// an interrupted sync pass leaves no partial block behind.
    pub fn spawn_periodic<F, Fut>(
        &mut self,
        guard: Arc<SingleFlight>,
        period: Duration,
        mut tick: F,
    ) where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = guard.name();
        let mut shutdown = self.shutdown_rx.clone();
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("[runtime] {} scheduled every {:?}", name, period);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        tokio::select! {
                            ran = guard.run(tick()) => {
                                if ran.is_none() {
                                    warn!("[runtime] {} tick skipped, previous run still in flight", name);
                                }
                            }
                            _ = shutdown.changed() => {
                                info!("[runtime] {} interrupted by shutdown", name);
                                break;
                            }
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("[runtime] {} shutdown signal received", name);
                        break;
                    }
                }
            }
        });

        self.tasks.push((name, handle));
    }

    /// Signal every task to stop and wait for them to finish.
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for (name, handle) in self.tasks {
            if let Err(e) = handle.await {
                error!("[runtime] {} task ended abnormally: {}", name, e);
            }
        }
        info!("[runtime] Scheduler stopped");
    }
}
