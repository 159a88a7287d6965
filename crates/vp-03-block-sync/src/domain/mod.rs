//! # Domain Layer

pub mod errors;
pub mod plan;
pub mod report;

pub use errors::SyncError;
pub use plan::{first_missing_height, plan_batches};
pub use report::{ReconcileReport, SyncReport};
