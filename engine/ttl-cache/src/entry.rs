use std::time::Duration;
use tokio::time::Instant;

/// A cached value with its bookkeeping timestamps
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub data: V,
    pub created_at: Instant,
    pub last_accessed_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(key: impl Into<String>, data: V, ttl: Duration, now: Instant) -> Self {
        Self { key: key.into(), data, created_at: now, last_accessed_at: now, ttl }
    }

    /// Expired once strictly more than `ttl` has passed since creation
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_accessed_at = now;
    }
}
