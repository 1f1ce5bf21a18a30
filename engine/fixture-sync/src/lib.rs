//! Fixture Synchronizer
//!
//! Pulls a season round by round from the upstream API, works out where the regular season
//! ends, classifies every fixture as regular or playoff, and keeps the consolidated result in
//! the TTL cache and the fixture store. `FixtureQueryService` sits in front of it and decides
//! between fresh cache, a new sync, or stale data when the upstream is down.

pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod source;
pub mod store;
pub mod synchronizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{CompetitionConfig, CompetitionUpdate, SyncConfig, SyncMode};
pub use error::{QueryError, StoreError, SyncError};
pub use models::{fixtures_cache_key, Classification, Fixture, FixtureKey, FixtureSet, SyncMetadata};
pub use query::FixtureQueryService;
pub use source::UpstreamSource;
pub use store::{FixtureStore, InMemoryFixtureStore, UpsertSummary};
pub use synchronizer::FixtureSynchronizer;
