//! # Validator Pulse Monitor
//!
//! Pulls blocks from the ledger explorer into SQLite and keeps the validator
//! registry current. Performance and health are derived on demand through
//! [`monitor_runtime::MonitorApi`].
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `VP_*` environment overrides)
//! 2. Initialize logging
//! 3. Wire the subsystem container
//! 4. Wait for the ledger; give up after the configured retries
//! 5. Start the periodic tasks and wait for Ctrl+C

use anyhow::{Context, Result};
use tracing::info;

use monitor_runtime::{MonitorConfig, MonitorContainer, MonitorRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    let config = MonitorConfig::from_env();

    vp_telemetry::init_telemetry(&config.telemetry).context("Failed to initialize logging")?;

    let container = MonitorContainer::new(config).context("Failed to wire subsystems")?;
    let mut runtime = MonitorRuntime::new(container);
    runtime
        .start()
        .await
        .context("Ledger connectivity check failed")?;

    info!("Monitor is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
