//! Error types for fixture synchronization and queries

use sports_fetcher::FetchError;
use thiserror::Error;
use ttl_cache::CacheError;

/// Errors from a season sync
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// Bad league/season setup, e.g. the final regular round has no events. Not retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Competition {season_id} is not configured")]
    UnknownCompetition { season_id: String },

    /// Upstream failed after retries
    #[error("Upstream error: {0}")]
    Upstream(#[from] FetchError),

    #[error("Sync deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// The sync this caller was waiting on was cancelled
    #[error("In-flight sync was abandoned")]
    Interrupted,
}

impl SyncError {
    /// Transient failures worth retrying later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Upstream(_) | SyncError::DeadlineExceeded(_) | SyncError::Interrupted
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, SyncError::Configuration(_) | SyncError::UnknownCompetition { .. })
    }
}

impl From<CacheError> for SyncError {
    fn from(err: CacheError) -> Self {
        match err.loader_error::<SyncError>() {
            Some(sync_error) => sync_error.clone(),
            None => SyncError::Interrupted,
        }
    }
}

/// Fixture store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Fixture store error: {0}")]
    Backend(String),
}

/// Errors surfaced by `FixtureQueryService`
#[derive(Error, Debug, Clone)]
pub enum QueryError {
    /// No fresh data, no stale data, upstream down
    #[error("Fixture data for {season_id} ({season}) is temporarily unavailable: {source}")]
    Unavailable { season_id: String, season: String, source: SyncError },

    #[error("Fixture configuration error for {season_id} ({season}): {source}")]
    Configuration { season_id: String, season: String, source: SyncError },
}

impl QueryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Unavailable { .. })
    }

    pub fn sync_error(&self) -> &SyncError {
        match self {
            QueryError::Unavailable { source, .. }
            | QueryError::Configuration { source, .. } => source,
        }
    }
}
