//! Sliding window rate limiting per upstream resource class

use crate::config::RateLimitConfig;
use crate::error::RateLimitExceeded;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Timestamps of recent requests for one resource class
#[derive(Debug)]
pub struct RateLimitWindow {
    window: Duration,
    max_requests: u32,
    recent: VecDeque<Instant>,
}

impl RateLimitWindow {
    /// Create an empty window
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            window: config.window(),
            max_requests: config.max_requests.max(1),
            recent: VecDeque::new(),
        }
    }

    /// Drop timestamps that have fallen outside the window
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.recent.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record an attempt at `now` if the window has capacity.
    ///
    /// When saturated, returns how long until the oldest timestamp leaves the window.
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), RateLimitExceeded> {
        self.prune(now);

        if self.recent.len() >= self.max_requests as usize {
            let oldest = self.recent.front().copied().unwrap_or(now);
            let retry_after = self.window.saturating_sub(now.saturating_duration_since(oldest));
            return Err(RateLimitExceeded { retry_after });
        }

        self.recent.push_back(now);
        Ok(())
    }

    /// Requests currently counted against the window
    pub fn in_window(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.recent.len()
    }
}

/// Rate limiter shared by all fetch callers, one window per resource class
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Arc<Mutex<RateLimitWindow>>>>,
    limits: HashMap<String, RateLimitConfig>,
    default_limit: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(limits: HashMap<String, RateLimitConfig>, default_limit: RateLimitConfig) -> Self {
        Self { windows: Mutex::new(HashMap::new()), limits, default_limit }
    }

    /// Limiter where every resource class shares the same window settings
    pub fn uniform(limit: RateLimitConfig) -> Self {
        Self::new(HashMap::new(), limit)
    }

    fn window(&self, resource_class: &str) -> Arc<Mutex<RateLimitWindow>> {
        let mut windows = self.windows.lock();
        let limit = self.limit_for(resource_class);
        Arc::clone(
            windows
                .entry(resource_class.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(RateLimitWindow::new(limit)))),
        )
    }

    fn limit_for(&self, resource_class: &str) -> RateLimitConfig {
        self.limits.get(resource_class).copied().unwrap_or(self.default_limit)
    }

    /// Wait until `resource_class` has capacity, then record the attempt.
    ///
    /// Locks are only held while checking the window; the wait itself happens unlocked so
    /// other resource classes keep flowing.
    pub async fn acquire(&self, resource_class: &str) {
        let window = self.window(resource_class);

        loop {
            let wait = match window.lock().try_acquire(Instant::now()) {
                Ok(()) => return,
                Err(exceeded) => exceeded.retry_after,
            };

            debug!(
                resource_class,
                wait_ms = wait.as_millis() as u64,
                "Rate limit window saturated, waiting"
            );
            // A zero wait can only come from a timer edge; yield one tick instead of spinning.
            sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    /// Get current rate limit information for a resource class
    pub fn info(&self, resource_class: &str) -> RateLimitInfo {
        let limit = self.limit_for(resource_class);
        let in_window = self.window(resource_class).lock().in_window(Instant::now());

        RateLimitInfo {
            resource_class: resource_class.to_string(),
            window_ms: limit.window_ms,
            max_requests: limit.max_requests,
            in_window,
        }
    }
}

/// Rate limit information for a resource class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub resource_class: String,
    pub window_ms: u64,
    pub max_requests: u32,
    pub in_window: usize,
}
