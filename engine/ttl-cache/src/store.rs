use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::single_flight::InFlight;
use crate::stats::{CacheCounters, CacheStats};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Expiring key/value cache with LRU eviction.
///
/// All map access goes through one `parking_lot::Mutex` that is never held across an
/// await point, so `get`, `set` and the sweeper can run from any task.
pub struct TtlCache<V> {
    pub(crate) config: CacheConfig,
    pub(crate) entries: Mutex<HashMap<String, CacheEntry<V>>>,
    pub(crate) in_flight: Mutex<HashMap<String, InFlight<V>>>,
    pub(crate) counters: CacheCounters,
}

impl<V: Clone> TtlCache<V> {
    /// Create a new, empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            counters: CacheCounters::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a value if present and not expired; a hit refreshes its access time
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.touch(now);
                CacheCounters::bump(&self.counters.hits, 1);
                debug!("Cache hit for key: {}", key);
                Some(entry.data.clone())
            }
            Some(entry) => {
                CacheCounters::bump(&self.counters.misses, 1);
                debug!("Cache entry for key {} expired (age: {:?})", key, entry.age(now));
                None
            }
            None => {
                CacheCounters::bump(&self.counters.misses, 1);
                debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    /// Previous value for `key`, expired or not, without touching stats
    pub fn peek_stale(&self, key: &str) -> Option<V> {
        self.entries.lock().get(key).map(|entry| entry.data.clone())
    }

    /// Insert or overwrite a value; creation time resets on every set
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let max = self.config.max_entries;
        if max > 0 && !entries.contains_key(key) && entries.len() >= max {
            self.evict_lru(&mut entries);
        }

        entries.insert(key.to_string(), CacheEntry::new(key, value, ttl, now));
        CacheCounters::bump(&self.counters.sets, 1);
        debug!("Cached data for key: {} with TTL: {}s", key, ttl.as_secs());
    }

    /// Non-expired value for `key` without counting a hit or miss
    pub(crate) fn fresh_value(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(key).filter(|entry| !entry.is_expired(now))?;
        entry.touch(now);
        Some(entry.data.clone())
    }

    fn evict_lru(&self, entries: &mut HashMap<String, CacheEntry<V>>) {
        let victim = entries
            .values()
            .min_by_key(|entry| entry.last_accessed_at)
            .map(|entry| entry.key.clone());

        if let Some(victim) = victim {
            entries.remove(&victim);
            CacheCounters::bump(&self.counters.evictions, 1);
            debug!("Cache full, evicted least recently used key: {}", victim);
        }
    }

    /// Remove one key; returns whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.lock().remove(key).is_some();
        if removed {
            CacheCounters::bump(&self.counters.deletes, 1);
            debug!("Deleted cache key: {}", key);
        }
        removed
    }

    /// Remove every key containing `pattern`; returns how many were removed
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        let removed = before - entries.len();

        if removed > 0 {
            CacheCounters::bump(&self.counters.deletes, removed as u64);
            debug!("Invalidated {} cache keys matching '{}'", removed, pattern);
        }
        removed
    }

    /// Remove every entry
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        CacheCounters::bump(&self.counters.deletes, removed as u64);
        removed
    }

    /// Remove all expired entries; returns how many were removed
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            CacheCounters::bump(&self.counters.cleanups, removed as u64);
            info!("Cleared {} expired cache entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }
}
