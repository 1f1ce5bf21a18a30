//! Error types for cache loading

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors surfaced by `get_or_load` and `refresh`.
///
/// Cloneable so every waiter on a shared load receives the same outcome.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The loader failed and no previous value existed to fall back on
    #[error("Loading '{key}' failed: {source}")]
    Loader {
        key: String,
        source: Arc<dyn StdError + Send + Sync + 'static>,
    },

    /// The task running the load was dropped before finishing
    #[error("In-flight load for '{key}' was abandoned")]
    Abandoned { key: String },
}

impl CacheError {
    /// Recover the loader's concrete error type
    pub fn loader_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            CacheError::Loader { source, .. } => source.downcast_ref::<E>(),
            CacheError::Abandoned { .. } => None,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            CacheError::Loader { key, .. } | CacheError::Abandoned { key } => key,
        }
    }
}
