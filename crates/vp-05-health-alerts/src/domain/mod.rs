//! # Domain Layer

pub mod errors;
pub mod health;

pub use errors::AlertError;
pub use health::{count_missed_blocks, AlertCheck, AlertReport, HealthReport, HealthStatus};
