//! # Subsystem Container
//!
//! Central container holding all subsystem instances with their adapters
//! wired in, plus the unified configuration.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, MonitorConfig, StartupConfig};
pub use subsystems::{ContainerError, MonitorContainer};
