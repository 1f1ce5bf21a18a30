use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction kicks in (0 = unbounded)
    pub max_entries: usize,

    /// TTL for entries whose caller has no TTL of its own
    pub default_ttl_secs: u64,

    /// How often the sweeper removes expired entries
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl_secs: 300,     // 5 minutes
            cleanup_interval_secs: 60, // 1 minute
        }
    }
}

impl CacheConfig {
    /// Get default TTL as Duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Get cleanup interval as Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
