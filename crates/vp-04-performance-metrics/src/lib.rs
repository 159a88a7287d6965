//! # Performance Metrics Subsystem (vp-04)
//!
//! Windowed validator statistics computed from persisted history.
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `calculate_validator_performance` | blocks, transactions, uptime %, mean block interval (ms) |
//! | `validator_efficiency` | % of blocks with transactions |
//! | `validator_rewards` | fee sum |
//! | `validator_performance_summary` | all of the above, cached for the TTL |
//!
//! Nothing here writes to the store. Uptime divides by the number of blocks
//! from all producers in the window; an empty window reports 0%.

#![warn(missing_docs)]

pub mod application;
pub mod config;
pub mod domain;

pub use application::PerformanceMetricsService;
pub use config::MetricsConfig;
pub use domain::{
    summary_cache_key, MetricsError, PerformanceSummary, TtlCache, ValidatorPerformance,
    ValidatorPerformanceView,
};
