//! # TTL Cache
//!
//! In-memory expiring key/value cache used in front of the upstream sports API.
//!
//! ## Features
//!
//! - **TTL expiry**: entries are served only while `now - created_at <= ttl`
//! - **LRU eviction**: the least recently accessed entry makes room when full
//! - **Single-flight**: concurrent misses for one key share a single load
//! - **Stale fallback**: a failed load returns the previous value, marked stale
//! - **Periodic sweep**: a background task drops expired entries
//!
//! The cache is an explicit instance: build it once, share it with `Arc`, and stop its
//! sweeper on shutdown.

pub mod config;
pub mod entry;
pub mod error;
pub mod single_flight;
pub mod stats;
pub mod store;
pub mod sweeper;

pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use single_flight::{Freshness, Loaded};
pub use stats::CacheStats;
pub use store::TtlCache;
pub use sweeper::CacheSweeper;
