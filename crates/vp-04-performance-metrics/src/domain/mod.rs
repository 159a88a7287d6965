//! # Domain Layer

pub mod cache;
pub mod errors;
pub mod stats;
pub mod types;

pub use cache::TtlCache;
pub use errors::MetricsError;
pub use stats::{average_interval_ms, efficiency_percent, total_fees, uptime_percent};
pub use types::{summary_cache_key, PerformanceSummary, ValidatorPerformance, ValidatorPerformanceView};
