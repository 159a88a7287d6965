//! # Health Alerts Subsystem (vp-05)
//!
//! Applies fixed thresholds to validator metrics and classifies health as
//! healthy, warning or critical by the number of triggered checks.

#![warn(missing_docs)]

pub mod application;
pub mod config;
pub mod domain;

pub use application::AlertService;
pub use config::AlertThresholds;
pub use domain::{
    count_missed_blocks, AlertCheck, AlertError, AlertReport, HealthReport, HealthStatus,
};
