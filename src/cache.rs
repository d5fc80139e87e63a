//! Bounded in-memory cache with a fixed time-to-live.
//!
//! Entries expire `ttl` after insertion and are checked lazily on read.
//! When the cache is full, expired entries are purged first and then the
//! oldest insertion is evicted.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Key/value cache with a time-to-live and a capacity bound.
pub struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    ttl: Duration,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    /// Create an empty cache.
    ///
    /// A `capacity` of zero disables caching entirely; a zero `ttl` makes
    /// every entry stale immediately.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return a clone of the cached value if present and not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert or replace a value, evicting as needed to stay within capacity.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired();
            if self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove a single entry. Returns `true` if it was present.
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every entry whose key matches `pred` and return how many were removed.
    pub fn invalidate_where<F: Fn(&K) -> bool>(&mut self, pred: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !pred(k));
        before - self.entries.len()
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including ones that expired but were not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.inserted_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(3600);

    #[test]
    fn get_returns_fresh_value() {
        let mut cache = TtlCache::new(LONG, 4);
        cache.insert("AAPL:ytd".to_string(), 1.5);
        assert_eq!(cache.get(&"AAPL:ytd".to_string()), Some(1.5));
        assert_eq!(cache.get(&"MSFT:ytd".to_string()), None);
    }

    #[test]
    fn zero_ttl_expires_on_read() {
        let mut cache = TtlCache::new(Duration::ZERO, 4);
        cache.insert("k", 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_evicts_oldest_insertion() {
        let mut cache = TtlCache::new(LONG, 2);
        cache.insert("a", 1);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", 2);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn replacing_existing_key_does_not_evict() {
        let mut cache = TtlCache::new(LONG, 2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(10));
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = TtlCache::new(LONG, 0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_and_clear() {
        let mut cache = TtlCache::new(LONG, 4);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert!(cache.invalidate(&"a"));
        assert!(!cache.invalidate(&"a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_where_removes_matching_keys() {
        let mut cache = TtlCache::new(LONG, 8);
        cache.insert("AAPL:1y:2023-01-01".to_string(), 1);
        cache.insert("AAPL:1y:2023-01-02".to_string(), 2);
        cache.insert("AAPLX:max:all".to_string(), 3);
        assert_eq!(cache.invalidate_where(|k| k.starts_with("AAPL:")), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn purge_expired_counts_removed() {
        let mut cache = TtlCache::new(Duration::ZERO, 4);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.purge_expired(), 2);
    }
}
