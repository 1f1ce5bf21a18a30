//! Single-flight loading on top of `TtlCache`
//!
//! The first caller that misses on a key becomes the leader and runs the loader. Everyone
//! else arriving while that load is running subscribes to the leader's `watch` channel and
//! is woken with the exact same outcome.

use crate::error::CacheError;
use crate::store::TtlCache;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Whether a value came from a successful load or a degraded fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Value returned by `get_or_load` / `refresh`
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<V> {
    pub value: V,
    pub freshness: Freshness,
}

impl<V> Loaded<V> {
    pub fn fresh(value: V) -> Self {
        Self { value, freshness: Freshness::Fresh }
    }

    pub fn stale(value: V) -> Self {
        Self { value, freshness: Freshness::Stale }
    }

    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

type Outcome<V> = Result<Loaded<V>, CacheError>;

/// Receiver side of an in-flight load; `None` until the leader publishes
pub(crate) type InFlight<V> = watch::Receiver<Option<Outcome<V>>>;

enum Role<V> {
    Cached(V),
    Leader(watch::Sender<Option<Outcome<V>>>),
    Follower(InFlight<V>),
}

/// Publishes the leader's outcome and clears the in-flight slot.
///
/// If the leader's future is dropped mid-load, `Drop` publishes `Abandoned` so followers
/// are released instead of waiting forever.
struct FlightGuard<'a, V: Clone> {
    cache: &'a TtlCache<V>,
    key: &'a str,
    sender: Option<watch::Sender<Option<Outcome<V>>>>,
}

impl<V: Clone> FlightGuard<'_, V> {
    fn complete(mut self, outcome: Outcome<V>) {
        self.publish(outcome);
    }

    fn publish(&mut self, outcome: Outcome<V>) {
        if let Some(sender) = self.sender.take() {
            let mut in_flight = self.cache.in_flight.lock();
            in_flight.remove(self.key);
            // Followers hold their own receivers; the value outlives the map entry.
            sender.send_replace(Some(outcome));
        }
    }
}

impl<V: Clone> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            warn!("In-flight load for key {} dropped before completion", self.key);
            self.publish(Err(CacheError::Abandoned { key: self.key.to_string() }));
        }
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Return the cached value, or load it exactly once across concurrent callers.
    ///
    /// On loader failure the previous value (even if expired) is returned as `Stale`; with no
    /// previous value the error is returned to every waiter.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<Loaded<V>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if let Some(value) = self.get(key) {
            return Ok(Loaded::fresh(value));
        }
        self.load_shared(key, ttl, loader, true).await
    }

    /// Like `get_or_load` but skips the fresh-value check.
    ///
    /// Still joins an in-flight load for the same key instead of starting a second one.
    pub async fn refresh<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<Loaded<V>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.load_shared(key, ttl, loader, false).await
    }

    /// Number of loads currently running
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// With `reuse_fresh`, a value stored by a leader that finished after the caller's miss
    /// is returned instead of starting a second load. Checked under the `in_flight` lock,
    /// which a leader takes only after storing its value.
    async fn load_shared<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
        reuse_fresh: bool,
    ) -> Result<Loaded<V>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let role = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(key) {
                Some(receiver) => Role::Follower(receiver.clone()),
                None => match reuse_fresh.then(|| self.fresh_value(key)).flatten() {
                    Some(value) => Role::Cached(value),
                    None => {
                        let (sender, receiver) = watch::channel(None);
                        in_flight.insert(key.to_string(), receiver);
                        Role::Leader(sender)
                    }
                },
            }
        };

        match role {
            Role::Cached(value) => {
                debug!("Key {} was loaded by a concurrent caller", key);
                Ok(Loaded::fresh(value))
            }
            Role::Follower(mut receiver) => {
                debug!("Joining in-flight load for key: {}", key);
                let outcome = match receiver.wait_for(Option::is_some).await {
                    Ok(published) => published.clone(),
                    Err(_) => None,
                };
                outcome.unwrap_or_else(|| Err(CacheError::Abandoned { key: key.to_string() }))
            }
            Role::Leader(sender) => {
                let guard = FlightGuard { cache: self, key, sender: Some(sender) };
                debug!("Loading key: {}", key);

                let outcome = match loader().await {
                    Ok(value) => {
                        self.set(key, value.clone(), ttl);
                        Ok(Loaded::fresh(value))
                    }
                    Err(e) => match self.peek_stale(key) {
                        Some(previous) => {
                            warn!("Loading {} failed ({}), serving stale value", key, e);
                            Ok(Loaded::stale(previous))
                        }
                        None => {
                            warn!("Loading {} failed with nothing to fall back on: {}", key, e);
                            Err(CacheError::Loader { key: key.to_string(), source: Arc::new(e) })
                        }
                    },
                };

                guard.complete(outcome.clone());
                outcome
            }
        }
    }
}
