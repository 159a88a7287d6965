//! # Startup Connectivity Check
//!
//! The monitor cannot operate unsynchronized, so it refuses to start until
//! the ledger answers a latest-height query. Attempts are spaced by a fixed
//! delay; exhausting them is fatal for the process.

use std::time::Duration;

use shared_types::Height;
use thiserror::Error;
use tracing::{info, warn};
use vp_01_ledger_source::{LedgerError, LedgerSource};

use crate::container::StartupConfig;

/// The ledger never answered.
#[derive(Debug, Error)]
#[error("Ledger unreachable after {attempts} attempts: {last}")]
pub struct StartupError {
    /// Attempts made.
    pub attempts: u32,
    /// Failure of the final attempt.
    pub last: LedgerError,
}

/// Query the ledger height until it answers or `config.max_retries` attempts
/// have failed.
pub async fn wait_for_ledger(
    ledger: &dyn LedgerSource,
    config: &StartupConfig,
) -> Result<Height, StartupError> {
    let attempts = config.max_retries.max(1);
    let delay = Duration::from_secs(config.retry_delay_secs);
    let mut attempt = 1;

    loop {
        match ledger.latest_height().await {
            Ok(height) => {
                info!(height, attempt, "[runtime] Ledger reachable");
                return Ok(height);
            }
            Err(e) if attempt < attempts => {
                warn!(
                    "[runtime] Ledger check {}/{} failed: {}; retrying in {:?}",
                    attempt, attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(last) => return Err(StartupError { attempts, last }),
        }
    }
}
