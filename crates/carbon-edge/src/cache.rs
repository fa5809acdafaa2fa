// SPDX-License-Identifier: Apache-2.0
//! Read-through edge cache for the two cacheable resources.
//!
//! Keys are synthetic identities, not request URLs, so cache identity never
//! couples to query strings — and the cache holds at most two entries. There
//! is no single-flight coordination on MISS: with two keys and in-memory
//! recomputation, a refresh race costs one duplicate shuffle and the last
//! writer wins.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Logical identity of a cacheable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CacheKey {
    /// The full emission-factor catalog.
    Factors,
    /// The current 3-tip sample.
    Tips,
}

/// Whether a response was served from cache, surfaced as `X-Cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheStatus {
    /// Served the stored body, byte-identical.
    Hit,
    /// Recomputed and stored.
    Miss,
}

impl CacheStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

struct Entry {
    body: String,
    stored_at: Instant,
}

/// Two-entry TTL cache storing serialized response bodies.
pub(crate) struct EdgeCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    factors_ttl: Duration,
    tips_ttl: Duration,
}

impl EdgeCache {
    pub(crate) fn new(factors_ttl: Duration, tips_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            factors_ttl,
            tips_ttl,
        }
    }

    /// Freshness lifetime for `key` (policy constants, CLI-overridable).
    pub(crate) fn ttl(&self, key: CacheKey) -> Duration {
        match key {
            CacheKey::Factors => self.factors_ttl,
            CacheKey::Tips => self.tips_ttl,
        }
    }

    /// Return the stored body if present and still fresh.
    pub(crate) fn lookup(&self, key: CacheKey) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl(key))
            .map(|entry| entry.body.clone())
    }

    /// Store a freshly computed body. Overwrites any previous entry.
    pub(crate) fn store(&self, key: CacheKey, body: String) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            Entry {
                body,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_stored_body_while_fresh() {
        let cache = EdgeCache::new(Duration::from_secs(60), Duration::from_secs(60));
        assert_eq!(cache.lookup(CacheKey::Factors), None);
        cache.store(CacheKey::Factors, "{\"a\":1}".into());
        assert_eq!(cache.lookup(CacheKey::Factors), Some("{\"a\":1}".into()));
        // other key is independent
        assert_eq!(cache.lookup(CacheKey::Tips), None);
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let cache = EdgeCache::new(Duration::from_millis(10), Duration::from_millis(10));
        cache.store(CacheKey::Tips, "old".into());
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.lookup(CacheKey::Tips), None);
    }

    #[test]
    fn store_is_last_writer_wins() {
        let cache = EdgeCache::new(Duration::from_secs(60), Duration::from_secs(60));
        cache.store(CacheKey::Tips, "first".into());
        cache.store(CacheKey::Tips, "second".into());
        assert_eq!(cache.lookup(CacheKey::Tips), Some("second".into()));
    }
}
