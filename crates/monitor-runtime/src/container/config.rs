//! # Monitor Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Every section has a `Default`; `MonitorConfig::from_env()` overrides a
//! handful of operational knobs from `VP_*` variables. A malformed value is
//! logged and the default kept.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared_types::U256;
use thiserror::Error;
use tracing::warn;
use vp_01_ledger_source::LedgerSourceConfig;
use vp_02_persistence::PersistenceConfig;
use vp_03_block_sync::SyncConfig;
use vp_04_performance_metrics::MetricsConfig;
use vp_05_health_alerts::AlertThresholds;
use vp_telemetry::TelemetryConfig;

/// Complete monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Ledger explorer endpoint.
    pub ledger: LedgerSourceConfig,
    /// Relational store location.
    pub database: PersistenceConfig,
    /// Batch size and task intervals.
    pub sync: SyncConfig,
    /// Startup connectivity check.
    pub startup: StartupConfig,
    /// Metrics engine and summary cache.
    pub metrics: MetricsConfig,
    /// Health alert thresholds.
    pub alerts: AlertThresholds,
    /// Logging and metric naming.
    pub telemetry: TelemetryConfig,
}

/// Startup connectivity check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Attempts before giving up.
    pub max_retries: u32,
    /// Fixed delay between attempts in seconds.
    pub retry_delay_secs: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay_secs: 5,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting that must be positive is zero.
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    /// The network segment is empty.
    #[error("Ledger network name is empty")]
    EmptyNetwork,
}

impl MonitorConfig {
    /// Defaults overridden from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `VP_LEDGER_URL`, `VP_NETWORK`
    /// - `VP_DATABASE_PATH`
    /// - `VP_SYNC_BATCH_SIZE`, `VP_SYNC_INTERVAL_SECS`, `VP_REGISTRY_INTERVAL_SECS`
    /// - `VP_STARTUP_MAX_RETRIES`, `VP_STARTUP_RETRY_DELAY_SECS`
    /// - `VP_MIN_REWARDS` (decimal)
    ///
    /// Logging variables are read by [`TelemetryConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            telemetry: TelemetryConfig::from_env(),
            ..Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VP_LEDGER_URL") {
            self.ledger.base_url = url;
        }
        if let Some(network) = lookup("VP_NETWORK") {
            self.ledger.network = network;
        }
        if let Some(path) = lookup("VP_DATABASE_PATH") {
            self.database.database_path = path;
        }

        override_parsed(&lookup, "VP_SYNC_BATCH_SIZE", &mut self.sync.batch_size);
        override_parsed(&lookup, "VP_SYNC_INTERVAL_SECS", &mut self.sync.sync_interval_secs);
        override_parsed(
            &lookup,
            "VP_REGISTRY_INTERVAL_SECS",
            &mut self.sync.registry_interval_secs,
        );
        override_parsed(&lookup, "VP_STARTUP_MAX_RETRIES", &mut self.startup.max_retries);
        override_parsed(
            &lookup,
            "VP_STARTUP_RETRY_DELAY_SECS",
            &mut self.startup.retry_delay_secs,
        );

        if let Some(raw) = lookup("VP_MIN_REWARDS") {
            match U256::from_dec_str(raw.trim()) {
                Ok(value) => self.alerts.min_rewards = value,
                Err(_) => warn!("VP_MIN_REWARDS={:?} is not a decimal amount, ignoring", raw),
            }
        }
    }

    /// Reject settings the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.batch_size == 0 {
            return Err(ConfigError::ZeroValue("sync batch size"));
        }
        if self.sync.sync_interval_secs == 0 {
            return Err(ConfigError::ZeroValue("sync interval"));
        }
        if self.sync.registry_interval_secs == 0 {
            return Err(ConfigError::ZeroValue("registry interval"));
        }
        if self.startup.max_retries == 0 {
            return Err(ConfigError::ZeroValue("startup retries"));
        }
        if self.ledger.network.trim().is_empty() {
            return Err(ConfigError::EmptyNetwork);
        }
        Ok(())
    }

    /// Configuration for tests: in-memory database, quiet logs, short intervals.
    pub fn for_testing() -> Self {
        Self {
            ledger: LedgerSourceConfig::for_testing(),
            database: PersistenceConfig::for_testing(),
            sync: SyncConfig::for_testing(),
            startup: StartupConfig {
                max_retries: 3,
                retry_delay_secs: 1,
            },
            metrics: MetricsConfig::for_testing(),
            alerts: AlertThresholds::for_testing(),
            telemetry: TelemetryConfig::for_testing(),
        }
    }
}

fn override_parsed<T, F>(lookup: &F, key: &str, target: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!("{}={:?} is malformed, keeping default", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.sync.batch_size, 100);
        assert_eq!(config.sync.sync_interval_secs, 300);
        assert_eq!(config.sync.registry_interval_secs, 3600);
        assert_eq!(config.startup.max_retries, 5);
        assert_eq!(config.startup.retry_delay_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = MonitorConfig::default();
        config.apply_overrides(lookup(&[
            ("VP_NETWORK", "testnet"),
            ("VP_DATABASE_PATH", "/tmp/pulse.db"),
            ("VP_SYNC_BATCH_SIZE", "25"),
            ("VP_STARTUP_MAX_RETRIES", " 8 "),
            ("VP_MIN_REWARDS", "340282366920938463463374607431768211456"),
        ]));

        assert_eq!(config.ledger.network, "testnet");
        assert_eq!(config.database.database_path, "/tmp/pulse.db");
        assert_eq!(config.sync.batch_size, 25);
        assert_eq!(config.startup.max_retries, 8);
        assert_eq!(config.alerts.min_rewards, U256::from(u128::MAX) + U256::one());
    }

    #[test]
    fn test_malformed_overrides_ignored() {
        let mut config = MonitorConfig::default();
        config.apply_overrides(lookup(&[
            ("VP_SYNC_BATCH_SIZE", "lots"),
            ("VP_SYNC_INTERVAL_SECS", "-1"),
            ("VP_MIN_REWARDS", "1e6"),
        ]));

        let defaults = MonitorConfig::default();
        assert_eq!(config.sync.batch_size, defaults.sync.batch_size);
        assert_eq!(config.sync.sync_interval_secs, defaults.sync.sync_interval_secs);
        assert_eq!(config.alerts.min_rewards, defaults.alerts.min_rewards);
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = MonitorConfig::default();
        config.sync.batch_size = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroValue("sync batch size"))
        );

        let mut config = MonitorConfig::default();
        config.startup.max_retries = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroValue("startup retries"))
        );

        let mut config = MonitorConfig::default();
        config.ledger.network = " ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyNetwork));
    }

    #[test]
    fn test_testing_config_is_valid() {
        let config = MonitorConfig::for_testing();
        assert!(config.validate().is_ok());
        assert!(config.database.is_in_memory());
    }
}
