//! Error types for upstream fetching

use std::time::Duration;
use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while talking to the upstream API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Body could not be decoded into the expected shape
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// All attempts failed; carries the last error for diagnostics
    #[error("Upstream unavailable after {attempts} attempt(s) for {url}: {last}")]
    UpstreamUnavailable { url: String, attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new decode error
    pub fn decode(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode { url: url.into(), message: msg.into() }
    }
}

/// Internal guard outcome when a rate limit window is saturated.
///
/// Never leaves this crate as an error: the limiter waits `retry_after` and tries again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Rate limit exceeded, retry after {retry_after:?}")]
pub struct RateLimitExceeded {
    pub retry_after: Duration,
}
