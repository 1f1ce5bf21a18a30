use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::resource;

/// Configuration for the upstream sports API fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// API base URL (without the key segment)
    pub base_url: String,

    /// API key, inserted as a path segment
    pub api_key: String,

    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// Attempts per request before giving up
    pub max_retries: u32,

    /// Backoff between attempts
    pub retry: RetryConfig,

    /// Rate limit windows keyed by resource class
    pub rate_limits: HashMap<String, RateLimitConfig>,

    /// Window applied to resource classes without an explicit entry
    pub default_rate_limit: RateLimitConfig,
}

/// Sliding window rate limit for one resource class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds
    pub window_ms: u64,

    /// Requests allowed inside one window
    pub max_requests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay before the second attempt in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for any single backoff delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        let mut rate_limits = HashMap::new();
        rate_limits.insert(
            resource::FIXTURES.to_string(),
            RateLimitConfig { window_ms: 60_000, max_requests: 25 },
        );
        rate_limits.insert(
            resource::TABLE.to_string(),
            RateLimitConfig { window_ms: 60_000, max_requests: 10 },
        );

        Self {
            base_url: "https://www.thesportsdb.com/api/v1/json".to_string(),
            api_key: "3".to_string(),
            request_timeout_secs: 30,
            max_retries: 3,
            retry: RetryConfig::default(),
            rate_limits,
            default_rate_limit: RateLimitConfig { window_ms: 60_000, max_requests: 30 },
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000, // 1s, 2s, 4s, ...
            max_delay_ms: 60_000,
        }
    }
}

impl FetcherConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RateLimitConfig {
    /// Get the window as Duration
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}
