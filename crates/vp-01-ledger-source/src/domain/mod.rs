//! # Domain Module
//!
//! Ledger payload shapes, their conversion, and errors.

pub mod errors;
pub mod payloads;

pub use errors::*;
pub use payloads::*;
