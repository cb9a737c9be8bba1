//! Query session configuration with sensible defaults.
//!
//! [`SessionConfig`] controls page size, fuzzy matching, debounce, caching
//! and the simulated per-page latency of the local backend. It is
//! serde-friendly so host applications can embed it in their config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::MAX_PER_PAGE;

/// Configuration for one query orchestrator session.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Results per page, between 1 and 50.
    pub per_page: usize,
    /// Enable approximate token matching.
    pub fuzzy: bool,
    /// Quiet period after the last keystroke before the query is applied.
    /// Set to 0 when the caller debounces on its own.
    pub debounce_ms: u64,
    /// How long a cached page stays valid. Set to 0 to disable caching.
    pub cache_ttl_ms: u64,
    /// Interval of the active sweep that evicts expired cache entries.
    pub sweep_interval_ms: u64,
    /// Upper bound on cached pages.
    pub cache_capacity: u64,
    /// Simulated latency before computing page 1.
    pub first_page_delay_ms: u64,
    /// Simulated latency before computing later pages.
    pub next_page_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            per_page: 10,
            fuzzy: false,
            debounce_ms: 350,
            cache_ttl_ms: 5 * 60 * 1000,
            sweep_interval_ms: 60_000,
            cache_capacity: 1_000,
            first_page_delay_ms: 120,
            next_page_delay_ms: 400,
        }
    }
}

impl SessionConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `per_page` must be between 1 and 50
    /// - `sweep_interval_ms` must be greater than 0
    /// - `cache_capacity` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(SearchError::Config(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        if self.sweep_interval_ms == 0 {
            return Err(SearchError::Config(
                "sweep_interval_ms must be greater than 0".into(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(SearchError::Config(
                "cache_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Simulated latency for fetching `page`.
    pub fn page_delay(&self, page: usize) -> Duration {
        if page <= 1 {
            Duration::from_millis(self.first_page_delay_ms)
        } else {
            Duration::from_millis(self.next_page_delay_ms)
        }
    }
}
