//! # Validator Pulse Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Block builders and store factories
//! └── integration/      # Cross-subsystem pipeline tests
//!     ├── sync_pipeline.rs
//!     ├── persistence_invariants.rs
//!     └── health_pipeline.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vp-tests
//! cargo test -p vp-tests integration::health_pipeline::
//! ```

pub mod fixtures;
pub mod integration;
