//! # VP-01 Ledger Source
//!
//! Typed access to the ledger explorer API.
//!
//! **Subsystem ID:** 01  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Exposes the four ledger reads the monitor needs (latest height, block by
//! height, committee snapshot, mempool contents) and converts the explorer's
//! loosely shaped JSON into the fixed `shared-types` entities. Payloads that
//! fail structural checks become validation errors at this boundary.
//!
//! ## Module Structure
//!
//! ```text
//! vp-01-ledger-source/
//! ├── domain/          # Wire payloads, conversion, LedgerError
//! ├── ports/           # LedgerSource trait + MockLedgerSource
//! ├── adapters/        # HttpLedgerSource (reqwest)
//! └── config.rs        # LedgerSourceConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::HttpLedgerSource;
pub use config::LedgerSourceConfig;
pub use domain::{convert_block, convert_committee, convert_mempool, LedgerError};
pub use ports::{LedgerSource, MockLedgerSource};
