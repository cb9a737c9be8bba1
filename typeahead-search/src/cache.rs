//! Per-session page cache with TTL expiry.
//!
//! Caches finished [`SearchResult`] pages keyed by the (normalised query,
//! page, fuzzy flag) triple. Uses [`moka`] for bounded storage; expiry is
//! tracked per entry with [`tokio::time::Instant`], so it follows the tokio
//! clock (and therefore `tokio::time::pause` in tests).
//!
//! Entries expire passively (checked on every read) and actively through
//! [`PageCache::sweep`], which the orchestrator runs on a timer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tokio::time::Instant;

use crate::text::normalize;
use crate::types::SearchResult;

/// Composite cache key: normalised query + page + fuzzy flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Trimmed, NFKC-normalised, lower-cased query.
    query: String,
    page: usize,
    fuzzy: bool,
}

impl CacheKey {
    pub fn new(query: &str, page: usize, fuzzy: bool) -> Self {
        Self {
            query: normalize(query.trim()),
            page,
            fuzzy,
        }
    }

    /// Whether the rendered key (`query|page|flag`) starts with `prefix`.
    ///
    /// Keys that fail this for a new active query belong to an abandoned
    /// query and are dropped en masse.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.to_string().starts_with(&normalize(prefix.trim()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.fuzzy { "1" } else { "0" };
        write!(f, "{}|{}|{}", self.query, self.page, flag)
    }
}

/// A cached page and the moment it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: Arc<SearchResult>,
    pub timestamp: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.timestamp) >= ttl
    }
}

/// Bounded TTL cache of result pages.
pub struct PageCache {
    entries: Cache<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl PageCache {
    /// Create a cache holding at most `capacity` pages for `ttl`.
    ///
    /// A zero `ttl` disables caching: inserts are dropped and reads miss.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
            ttl,
        }
    }

    /// Look up a live entry. Expired entries are evicted and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SearchResult>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(self.ttl, Instant::now()) {
            self.entries.invalidate(key);
            tracing::debug!(key = %key, "cache entry expired");
            return None;
        }
        Some(entry.result)
    }

    pub fn insert(&self, key: CacheKey, result: Arc<SearchResult>) {
        if self.ttl.is_zero() {
            return;
        }
        let entry = CacheEntry {
            result,
            timestamp: Instant::now(),
        };
        self.entries.insert(key, entry);
    }

    /// Drop every entry whose rendered key does not start with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn retain_prefix(&self, prefix: &str) -> usize {
        self.remove_where(|key, _| !key.has_prefix(prefix))
    }

    /// Evict every expired entry. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        self.remove_where(|_, entry| entry.is_expired(ttl, now))
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_where(&self, predicate: impl Fn(&CacheKey, &CacheEntry) -> bool) -> usize {
        let doomed: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(key, entry)| predicate(&**key, entry))
            .map(|(key, _)| key)
            .collect();
        for key in &doomed {
            self.entries.invalidate(key.as_ref());
        }
        doomed.len()
    }
}

impl fmt::Debug for PageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(query: &str) -> Arc<SearchResult> {
        let mut result = SearchResult::empty(10, 0.0);
        result.meta.query = query.into();
        Arc::new(result)
    }

    #[test]
    fn cache_key_deterministic_for_same_inputs() {
        assert_eq!(CacheKey::new("rust", 1, false), CacheKey::new("rust", 1, false));
    }

    #[test]
    fn cache_key_differs_by_page_and_flag() {
        let base = CacheKey::new("rust", 1, false);
        assert_ne!(base, CacheKey::new("rust", 2, false));
        assert_ne!(base, CacheKey::new("rust", 1, true));
    }

    #[test]
    fn cache_key_normalises_query() {
        assert_eq!(CacheKey::new("  RUST ", 1, true), CacheKey::new("rust", 1, true));
    }

    #[test]
    fn cache_key_renders_pipe_format() {
        assert_eq!(CacheKey::new("rust", 3, true).to_string(), "rust|3|1");
        assert_eq!(CacheKey::new("rust", 1, false).to_string(), "rust|1|0");
    }

    #[test]
    fn cache_key_prefix_matching() {
        let key = CacheKey::new("first", 1, false);
        assert!(key.has_prefix("fir"));
        assert!(key.has_prefix("first"));
        assert!(!key.has_prefix("second"));
        assert!(!CacheKey::new("fir", 1, false).has_prefix("first"));
    }

    #[tokio::test(start_paused = true)]
    async fn cache_miss_returns_none() {
        let cache = PageCache::new(16, Duration::from_secs(60));
        assert!(cache.get(&CacheKey::new("nothing", 1, false)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_and_retrieve_same_value() {
        let cache = PageCache::new(16, Duration::from_secs(60));
        let key = CacheKey::new("rust", 1, false);
        let stored = page("rust");
        cache.insert(key.clone(), Arc::clone(&stored));
        let hit = cache.get(&key).expect("should be cached");
        assert!(Arc::ptr_eq(&hit, &stored));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = PageCache::new(16, Duration::from_secs(60));
        let key = CacheKey::new("rust", 1, false);
        cache.insert(key.clone(), page("rust"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get(&key).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired() {
        let cache = PageCache::new(16, Duration::from_secs(60));
        cache.insert(CacheKey::new("old", 1, false), page("old"));
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.insert(CacheKey::new("new", 1, false), page("new"));
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&CacheKey::new("new", 1, false)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn retain_prefix_drops_unrelated_queries() {
        let cache = PageCache::new(16, Duration::from_secs(60));
        cache.insert(CacheKey::new("fir", 1, false), page("fir"));
        cache.insert(CacheKey::new("first", 1, false), page("first"));
        cache.insert(CacheKey::new("first", 2, false), page("first"));
        cache.insert(CacheKey::new("other", 1, false), page("other"));

        assert_eq!(cache.retain_prefix("first"), 2);
        assert!(cache.get(&CacheKey::new("first", 2, false)).is_some());
        assert!(cache.get(&CacheKey::new("fir", 1, false)).is_none());
        assert!(cache.get(&CacheKey::new("other", 1, false)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_disables_caching() {
        let cache = PageCache::new(16, Duration::ZERO);
        let key = CacheKey::new("rust", 1, false);
        cache.insert(key.clone(), page("rust"));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_empties_cache() {
        let cache = PageCache::new(16, Duration::from_secs(60));
        cache.insert(CacheKey::new("a", 1, false), page("a"));
        cache.insert(CacheKey::new("b", 1, false), page("b"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
