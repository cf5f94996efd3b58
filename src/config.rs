//! Query configuration from environment variables

use crate::lineup_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::env;
use std::time::Duration;

/// Configuration for the query engine
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Path to SQLite database file
    pub db_path: String,

    /// Page size used when a request does not name one (never above the cap)
    pub default_page_size: usize,

    /// How long a reader waits on a locked database
    pub busy_timeout_ms: u64,
}

impl QueryConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `STINTFLOW_DB_PATH` (default: data/stintflow.db)
    /// - `DEFAULT_PAGE_SIZE` (default: 50, clamped to 100)
    /// - `SQLITE_BUSY_TIMEOUT_MS` (default: 5000)
    pub fn from_env() -> Self {
        let default_page_size: usize = env::var("DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            db_path: env::var("STINTFLOW_DB_PATH")
                .unwrap_or_else(|_| "data/stintflow.db".to_string()),

            default_page_size: default_page_size.min(MAX_PAGE_SIZE),

            busy_timeout_ms: env::var("SQLITE_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5_000),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            db_path: "data/stintflow.db".to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            busy_timeout_ms: 5_000,
        }
    }
}
