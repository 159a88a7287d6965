//! # Persistence Configuration

use serde::{Deserialize, Serialize};

/// SQLite path that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Persistence configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database file path, or `:memory:`.
    pub database_path: String,

    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: "validator-pulse.db".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

impl PersistenceConfig {
    /// Create a config for testing (in-memory database).
    pub fn for_testing() -> Self {
        Self {
            database_path: IN_MEMORY_PATH.to_string(),
            busy_timeout_ms: 500,
        }
    }

    /// Whether this config selects an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY_PATH
    }
}
