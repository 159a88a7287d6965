//! # Application Layer
//!
//! Services that move data from the ledger into the store.

pub mod mempool;
pub mod reconciler;
pub mod synchronizer;

pub use mempool::MempoolObserver;
pub use reconciler::RegistryReconciler;
pub use synchronizer::BlockSynchronizer;
