//! # Shared Types Crate
//!
//! This crate contains the ledger entities and the error taxonomy shared by
//! every Validator Pulse subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Typed Boundary**: Ledger payloads are converted into these shapes at the
//!   adapter edge; nothing untyped travels further.
//! - **Uniform Failures**: Subsystem errors classify into `ErrorKind`.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::*;
