//! Service facade over the fetcher, caches, synchronizer and standings calculator

use crate::config::LeagueServiceConfig;
use crate::scheduler::RefreshScheduler;
use anyhow::{bail, Context, Result};
use fixture_sync::{
    CompetitionConfig, CompetitionUpdate, Fixture, FixtureQueryService, FixtureSet, FixtureStore,
    FixtureSynchronizer, InMemoryFixtureStore, QueryError, UpstreamSource,
};
use parking_lot::Mutex;
use sports_fetcher::{FetchError, SportsApiClient, UpstreamTableRow};
use standings::{GroupedStandings, MatchResult, TeamStanding};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, warn};
use ttl_cache::{CacheConfig, CacheStats, CacheSweeper, TtlCache};

/// Cache key of a season's published league table
pub fn table_cache_key(season_id: &str, season: &str) -> String {
    format!("table:{}:{}", season_id, season)
}

/// Standing from an upstream table row; missing figures count as zero
pub fn standing_from_row(row: &UpstreamTableRow) -> TeamStanding {
    let win = row.win.unwrap_or(0);
    let draw = row.draw.unwrap_or(0);
    let loss = row.loss.unwrap_or(0);

    TeamStanding {
        team: row.team.clone(),
        played: row.played.unwrap_or(win + draw + loss),
        win,
        draw,
        loss,
        goals_for: row.goals_for.unwrap_or(0),
        goals_against: row.goals_against.unwrap_or(0),
        points: row.points.unwrap_or(3 * win + draw),
        rank: row.rank,
        badge: row.badge.clone().filter(|b| !b.is_empty()),
    }
}

pub fn match_result(fixture: &Fixture) -> MatchResult {
    MatchResult {
        home_team: fixture.home_team.clone(),
        away_team: fixture.away_team.clone(),
        home_score: fixture.home_score,
        away_score: fixture.away_score,
    }
}

#[derive(Default)]
struct BackgroundTasks {
    sweepers: Vec<CacheSweeper>,
    scheduler: Option<RefreshScheduler>,
}

/// Entry point for fixtures, standings and cache management
pub struct LeagueDataService {
    config: LeagueServiceConfig,
    source: Arc<dyn UpstreamSource>,
    fixtures_cache: Arc<TtlCache<FixtureSet>>,
    tables_cache: Arc<TtlCache<Vec<TeamStanding>>>,
    synchronizer: Arc<FixtureSynchronizer>,
    query: Arc<FixtureQueryService>,
    background: Mutex<BackgroundTasks>,
}

impl LeagueDataService {
    /// Build the service against the real upstream API with an in-memory fixture store
    pub fn new(config: LeagueServiceConfig) -> Result<Self> {
        let client = SportsApiClient::from_config(&config.fetcher)
            .context("Failed to create upstream API client")?;
        Ok(Self::with_parts(config, Arc::new(client), Arc::new(InMemoryFixtureStore::new())))
    }

    pub fn with_parts(
        config: LeagueServiceConfig,
        source: Arc<dyn UpstreamSource>,
        store: Arc<dyn FixtureStore>,
    ) -> Self {
        let fixtures_cache = Arc::new(TtlCache::new(config.cache.clone()));
        let tables_cache = Arc::new(TtlCache::new(CacheConfig {
            default_ttl_secs: config.service.table_ttl_secs,
            ..config.cache.clone()
        }));

        let synchronizer = Arc::new(FixtureSynchronizer::new(
            source.clone(),
            fixtures_cache.clone(),
            store,
            config.competitions.clone(),
            config.sync.clone(),
        ));
        let query = Arc::new(FixtureQueryService::new(synchronizer.clone()));

        info!("League data service ready with {} competitions", config.competitions.len());

        Self {
            config,
            source,
            fixtures_cache,
            tables_cache,
            synchronizer,
            query,
            background: Mutex::new(BackgroundTasks::default()),
        }
    }

    pub fn config(&self) -> &LeagueServiceConfig {
        &self.config
    }

    pub fn competitions(&self) -> Vec<CompetitionConfig> {
        self.synchronizer.competitions()
    }

    /// Start the cache sweepers and, if enabled, the refresh scheduler
    pub fn start_background_tasks(&self) {
        let mut background = self.background.lock();
        if !background.sweepers.is_empty() {
            return;
        }

        background.sweepers.push(self.fixtures_cache.start_sweeper());
        background.sweepers.push(self.tables_cache.start_sweeper());

        let scheduler = &self.config.scheduler;
        if scheduler.enabled && !scheduler.tracked_seasons.is_empty() {
            background.scheduler = Some(RefreshScheduler::start(
                self.query.clone(),
                scheduler.tracked_seasons.clone(),
                scheduler.interval(),
            ));
        }
    }

    /// Stop background tasks, giving them `shutdown_timeout_secs` to finish
    pub async fn shutdown(&self) {
        let tasks = std::mem::take(&mut *self.background.lock());
        let limit = self.config.service.shutdown_timeout();

        let stop = async {
            if let Some(scheduler) = tasks.scheduler {
                scheduler.shutdown().await;
            }
            for sweeper in tasks.sweepers {
                sweeper.shutdown().await;
            }
        };

        if timeout(limit, stop).await.is_err() {
            warn!("Background tasks did not stop within {:?}", limit);
        }
        info!("League data service shut down");
    }

    /// Fixtures of a season, see `FixtureQueryService::get_fixtures`
    pub async fn fetch_fixtures(
        &self,
        season_id: &str,
        season: &str,
        force_refresh: bool,
    ) -> Result<FixtureSet, QueryError> {
        self.query.get_fixtures(season_id, season, force_refresh).await
    }

    pub fn compute_grouped_standings(
        &self,
        regular_standings: &[TeamStanding],
        subsequent_matches: &[MatchResult],
        top_group_size: usize,
    ) -> GroupedStandings {
        standings::compute_grouped_standings(regular_standings, subsequent_matches, top_group_size)
    }

    /// Published league table, cached for `service.table_ttl_secs`
    pub async fn regular_standings(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<TeamStanding>> {
        let key = table_cache_key(season_id, season);
        let loaded = self
            .tables_cache
            .get_or_load(&key, self.tables_cache.config().default_ttl(), || {
                self.load_table(season_id, season)
            })
            .await
            .with_context(|| {
                format!("Failed to load league table for {} ({})", season_id, season)
            })?;

        if loaded.is_stale() {
            warn!("Serving stale league table for {} ({})", season_id, season);
        }
        Ok(loaded.value)
    }

    async fn load_table(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<TeamStanding>, FetchError> {
        let rows = self.source.standings_table(season_id, season).await?;
        Ok(rows.iter().map(standing_from_row).collect())
    }

    /// League table split into groups with the season's playoff results replayed
    pub async fn grouped_standings(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<GroupedStandings> {
        let Some(competition) = self.synchronizer.competition(season_id) else {
            bail!("Competition {} is not configured", season_id);
        };

        let regular = self.regular_standings(season_id, season).await?;
        if regular.is_empty() {
            bail!("No league table published for {} ({})", season_id, season);
        }

        let fixtures = self.fetch_fixtures(season_id, season, false).await?;
        let matches: Vec<MatchResult> =
            fixtures.playoff_fixtures.iter().map(match_result).collect();

        Ok(self.compute_grouped_standings(&regular, &matches, competition.top_group_size))
    }

    /// Combined statistics of the fixture and table caches
    pub fn get_cache_stats(&self) -> CacheStats {
        self.fixtures_cache.stats() + self.tables_cache.stats()
    }

    /// Drop the cached fixtures and table of one season
    pub fn invalidate(&self, season_id: &str, season: &str) -> usize {
        let fixtures_key = fixture_sync::fixtures_cache_key(season_id, season);
        let removed = usize::from(self.fixtures_cache.invalidate(&fixtures_key))
            + usize::from(self.tables_cache.invalidate(&table_cache_key(season_id, season)));
        info!("Invalidated {} cache entries for {} ({})", removed, season_id, season);
        removed
    }

    pub fn invalidate_all(&self) -> usize {
        let removed = self.fixtures_cache.clear() + self.tables_cache.clear();
        info!("Cleared {} cache entries", removed);
        removed
    }

    pub fn update_competition(
        &self,
        season_id: &str,
        update: CompetitionUpdate,
    ) -> Result<CompetitionConfig> {
        let updated = self.synchronizer.update_competition(season_id, update)?;
        self.tables_cache.invalidate_pattern(&format!("table:{}:", season_id));
        Ok(updated)
    }
}
