use crate::error::{QueryError, SyncError};
use crate::models::FixtureSet;
use crate::store::FixtureStore;
use crate::synchronizer::FixtureSynchronizer;
use std::sync::Arc;
use tracing::{error, warn};

/// Read path for fixtures: fresh cache, then a deduplicated sync, then stale data
pub struct FixtureQueryService {
    synchronizer: Arc<FixtureSynchronizer>,
    store: Arc<dyn FixtureStore>,
}

impl FixtureQueryService {
    pub fn new(synchronizer: Arc<FixtureSynchronizer>) -> Self {
        let store = synchronizer.store().clone();
        Self { synchronizer, store }
    }

    pub fn synchronizer(&self) -> &Arc<FixtureSynchronizer> {
        &self.synchronizer
    }

    /// Fixtures of a season.
    ///
    /// Returns cached data while fresh. Otherwise a sync runs (one per season at a time);
    /// if it fails, the last known fixtures are returned with `stale` set. Only when nothing
    /// is known does the error reach the caller.
    pub async fn get_fixtures(
        &self,
        season_id: &str,
        season: &str,
        force_refresh: bool,
    ) -> Result<FixtureSet, QueryError> {
        match self.synchronizer.sync_season(season_id, season, force_refresh).await {
            Ok(set) => Ok(set),
            Err(err) => {
                if let Some(set) = self.stored_fixtures(season_id, season).await {
                    warn!(
                        "Sync of {} ({}) failed, serving {} stored fixtures: {}",
                        season_id,
                        season,
                        set.all_fixtures.len(),
                        err
                    );
                    return Ok(set);
                }

                error!("No fixture data available for {} ({}): {}", season_id, season, err);
                Err(into_query_error(season_id, season, err))
            }
        }
    }

    async fn stored_fixtures(&self, season_id: &str, season: &str) -> Option<FixtureSet> {
        let fixtures = match self.store.fixtures_for_season(season_id, season).await {
            Ok(fixtures) if !fixtures.is_empty() => fixtures,
            Ok(_) => return None,
            Err(e) => {
                warn!("Fixture store unavailable: {}", e);
                return None;
            }
        };
        let metadata = self.store.metadata(season_id, season).await.ok().flatten()?;
        Some(FixtureSet::from_fixtures(fixtures, metadata).mark_stale())
    }
}

fn into_query_error(season_id: &str, season: &str, source: SyncError) -> QueryError {
    let season_id = season_id.to_string();
    let season = season.to_string();
    if source.is_configuration() {
        QueryError::Configuration { season_id, season, source }
    } else {
        QueryError::Unavailable { season_id, season, source }
    }
}
