//! Background expiry sweep

use crate::store::TtlCache;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle to the task periodically calling `TtlCache::cleanup`
pub struct CacheSweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Stop the sweep and wait for the task to exit
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
        info!("Cache sweeper stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Spawn the sweep using the configured cleanup interval
    pub fn start_sweeper(self: &Arc<Self>) -> CacheSweeper {
        let period = self.config.cleanup_interval();
        self.start_sweeper_with_interval(period)
    }

    /// Spawn the sweep with an explicit period.
    ///
    /// The task only holds a weak reference, so dropping the last `Arc` also ends it.
    pub fn start_sweeper_with_interval(self: &Arc<Self>, period: Duration) -> CacheSweeper {
        let cancel = CancellationToken::new();
        let cache: Weak<Self> = Arc::downgrade(self);
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so a fresh cache is not swept at t=0.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else { break };
                        let removed = cache.cleanup();
                        debug!("Cache sweep removed {} entries", removed);
                    }
                }
            }
        });

        info!("Cache sweeper started with interval {:?}", period);
        CacheSweeper { cancel, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let cache = Arc::new(TtlCache::<u32>::new(CacheConfig::default()));
        cache.set("short", 1, Duration::from_secs(5));
        cache.set("long", 2, Duration::from_secs(3600));

        let sweeper = cache.start_sweeper_with_interval(Duration::from_secs(10));
        sleep(Duration::from_secs(11)).await;

        assert_eq!(cache.peek_stale("short"), None);
        assert_eq!(cache.peek_stale("long"), Some(2));
        assert_eq!(cache.stats().cleanups, 1);

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_when_cache_dropped() {
        let cache = Arc::new(TtlCache::<u32>::new(CacheConfig::default()));
        let sweeper = cache.start_sweeper_with_interval(Duration::from_secs(1));

        drop(cache);
        sleep(Duration::from_secs(2)).await;

        assert!(sweeper.is_finished());
    }
}
