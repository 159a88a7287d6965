//! # Monitor Runtime Library
//!
//! Wiring, scheduling and the API facade of Validator Pulse. The main entry
//! point is the `main.rs` binary; the modules are exposed for the
//! integration suite and for an HTTP layer to sit on.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: each subsystem crate defines its ports; the
//!   container plugs adapters into them
//! - **Single-flight tasks**: a task kind never overlaps itself, whether it
//!   was started by the scheduler or by a manual trigger

#![warn(missing_docs)]

pub mod api;
pub mod container;
pub mod runtime;
pub mod scheduler;
pub mod startup;

pub use api::{BlockDetail, MonitorApi};
pub use container::{ConfigError, ContainerError, MonitorConfig, MonitorContainer, StartupConfig};
pub use runtime::MonitorRuntime;
pub use scheduler::{Scheduler, SingleFlight};
pub use startup::{wait_for_ledger, StartupError};
