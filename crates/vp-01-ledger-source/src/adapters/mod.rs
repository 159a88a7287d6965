//! # Adapters
//!
//! Concrete `LedgerSource` implementations.

pub mod http;

pub use http::HttpLedgerSource;
