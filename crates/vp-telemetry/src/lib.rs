//! # Validator Pulse Telemetry
//!
//! Structured logging and in-process Prometheus metrics.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vp_telemetry::{init_telemetry, MonitorMetrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! let metrics = std::sync::Arc::new(MonitorMetrics::new(&config.metrics_namespace)?);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VP_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `VP_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `VP_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `VP_SERVICE_NAME` | `validator-pulse` | Service name in logs |
//! | `VP_METRICS_NAMESPACE` | `vp` | Metric name prefix |

#![warn(missing_docs)]

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{MonitorMetrics, PassOutcome};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed or could not be built.
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// A metric could not be created or registered.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<prometheus::Error> for TelemetryError {
    fn from(err: prometheus::Error) -> Self {
        Self::MetricsInit(err.to_string())
    }
}

/// Install the global tracing subscriber described by `config`.
///
/// Call once, early in `main`. A second call fails with
/// [`TelemetryError::SubscriberInit`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}
