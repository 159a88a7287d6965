//! # Ports Module
//!
//! Outbound port through which the monitor reads the ledger.

pub mod outbound;

pub use outbound::*;
