//! Sports API Fetcher
//!
//! Outbound access to the upstream football data API. Every request goes through a
//! per-resource-class sliding window rate limiter and a structured retry policy with
//! exponential backoff, so callers never have to think about upstream quotas.

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod rate_limiter;
pub mod retry;
pub mod transport;

pub use client::SportsApiClient;
pub use config::{FetcherConfig, RateLimitConfig, RetryConfig};
pub use error::{FetchError, Result};
pub use fetcher::RateLimitedFetcher;
pub use models::*;
pub use rate_limiter::{RateLimitInfo, RateLimiter};
pub use retry::{Backoff, RetryPolicy};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Resource classes used to partition upstream rate limits
pub mod resource {
    /// Events-by-round lookups
    pub const FIXTURES: &str = "fixtures";

    /// League table lookups
    pub const TABLE: &str = "table";
}
