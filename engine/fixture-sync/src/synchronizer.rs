use crate::config::{CompetitionConfig, CompetitionUpdate, SyncConfig, SyncMode};
use crate::error::SyncError;
use crate::models::{
    fixtures_cache_key, Classification, Fixture, FixtureKey, FixtureSet, SyncMetadata,
};
use crate::source::UpstreamSource;
use crate::store::FixtureStore;
use chrono::{NaiveDate, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::RwLock;
use sports_fetcher::UpstreamEvent;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use ttl_cache::TtlCache;

/// Result of fetching one round under the sync deadline
enum RoundFetch {
    Events(Vec<UpstreamEvent>),
    Failed,
    TimedOut,
}

#[derive(Default)]
struct RoundScan {
    events: BTreeMap<u32, Vec<UpstreamEvent>>,
    fetched: u32,
    failed: u32,
    truncated: bool,
}

/// Builds the consolidated fixture set of a season from round-by-round upstream data
pub struct FixtureSynchronizer {
    source: Arc<dyn UpstreamSource>,
    cache: Arc<TtlCache<FixtureSet>>,
    store: Arc<dyn FixtureStore>,
    competitions: RwLock<HashMap<String, CompetitionConfig>>,
    config: SyncConfig,
}

impl FixtureSynchronizer {
    pub fn new(
        source: Arc<dyn UpstreamSource>,
        cache: Arc<TtlCache<FixtureSet>>,
        store: Arc<dyn FixtureStore>,
        competitions: Vec<CompetitionConfig>,
        config: SyncConfig,
    ) -> Self {
        let competitions = competitions.into_iter().map(|c| (c.season_id.clone(), c)).collect();
        Self { source, cache, store, competitions: RwLock::new(competitions), config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TtlCache<FixtureSet>> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn FixtureStore> {
        &self.store
    }

    pub fn competition(&self, season_id: &str) -> Option<CompetitionConfig> {
        self.competitions.read().get(season_id).cloned()
    }

    pub fn competitions(&self) -> Vec<CompetitionConfig> {
        let mut all: Vec<_> = self.competitions.read().values().cloned().collect();
        all.sort_by(|a, b| a.season_id.cmp(&b.season_id));
        all
    }

    /// Apply a partial update and drop every cached season of that competition
    pub fn update_competition(
        &self,
        season_id: &str,
        update: CompetitionUpdate,
    ) -> Result<CompetitionConfig, SyncError> {
        let updated = {
            let mut competitions = self.competitions.write();
            let current = competitions
                .get_mut(season_id)
                .ok_or_else(|| SyncError::UnknownCompetition { season_id: season_id.to_string() })?;

            let mut candidate = current.clone();
            candidate.apply(update);
            let final_round = candidate.final_regular_round;
            if final_round == 0 || final_round > self.config.round_ceiling {
                return Err(SyncError::Configuration(format!(
                    "final regular round {} is outside 1..={}",
                    candidate.final_regular_round, self.config.round_ceiling
                )));
            }
            *current = candidate.clone();
            candidate
        };

        let removed = self.cache.invalidate_pattern(&format!("fixtures:{}:", season_id));
        info!("Updated competition {}; invalidated {} cached seasons", season_id, removed);
        Ok(updated)
    }

    /// Consolidated fixtures of a season, served from cache unless `force_refresh`.
    ///
    /// Concurrent calls for the same season share one sync. If the sync fails and an expired
    /// entry is still cached, it is returned with `stale` set.
    pub async fn sync_season(
        &self,
        season_id: &str,
        season: &str,
        force_refresh: bool,
    ) -> Result<FixtureSet, SyncError> {
        let key = fixtures_cache_key(season_id, season);
        let ttl = self.config.fixtures_ttl();
        let loader = || self.run_sync(season_id, season);

        let loaded = if force_refresh {
            self.cache.refresh(&key, ttl, loader).await?
        } else {
            self.cache.get_or_load(&key, ttl, loader).await?
        };

        if loaded.is_stale() {
            warn!("Serving stale fixtures for {} ({}) after a failed sync", season_id, season);
            return Ok(loaded.value.mark_stale());
        }
        Ok(loaded.value)
    }

    async fn run_sync(&self, season_id: &str, season: &str) -> Result<FixtureSet, SyncError> {
        let competition = self
            .competition(season_id)
            .ok_or_else(|| SyncError::UnknownCompetition { season_id: season_id.to_string() })?;
        let final_round = competition.final_regular_round;
        let started = Instant::now();
        let deadline = started + self.config.sync_deadline();

        info!(
            "Starting fixture sync for {} ({}), final regular round {}",
            season_id, season, final_round
        );

        let final_fetch = self.source.events_by_round(season_id, final_round, season);
        let final_events = match timeout_at(deadline, final_fetch).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SyncError::DeadlineExceeded(format!(
                    "final regular round {} of {} ({}) did not respond in time",
                    final_round, season_id, season
                )))
            }
        };

        let regular_season_end = final_events.iter().filter_map(event_date).max().ok_or_else(|| {
            SyncError::Configuration(format!(
                "final regular round {} of {} ({}) has no dated events",
                final_round, season_id, season
            ))
        })?;
        debug!("Regular season of {} ({}) ends on {}", season_id, season, regular_season_end);

        let mut scan = RoundScan {
            events: BTreeMap::from([(final_round, final_events)]),
            fetched: 1,
            ..Default::default()
        };

        match self.config.mode {
            SyncMode::Sequential { stop_after_empty } => {
                self.scan_sequential(
                    season_id,
                    season,
                    final_round,
                    stop_after_empty,
                    deadline,
                    &mut scan,
                )
                .await
            }
            SyncMode::Exhaustive { concurrency } => {
                self.scan_exhaustive(
                    season_id,
                    season,
                    final_round,
                    concurrency,
                    deadline,
                    &mut scan,
                )
                .await
            }
        }

        let fixtures = consolidate(season_id, season, &scan.events, regular_season_end);
        let metadata = SyncMetadata {
            season_id: season_id.to_string(),
            season: season.to_string(),
            regular_season_end_date: regular_season_end,
            total_fixtures: 0,
            regular_count: 0,
            playoff_count: 0,
            rounds_fetched: scan.fetched,
            rounds_failed: scan.failed,
            truncated: scan.truncated,
            last_synced_at: Utc::now(),
        };
        let set = FixtureSet::from_fixtures(fixtures, metadata);

        if set.metadata.truncated {
            warn!("Sync of {} ({}) hit its deadline; round scan is incomplete", season_id, season);
        }
        info!(
            "Synced {} fixtures for {} ({}): {} regular, {} playoff, {} rounds failed, took {:?}",
            set.metadata.total_fixtures,
            season_id,
            season,
            set.metadata.regular_count,
            set.metadata.playoff_count,
            set.metadata.rounds_failed,
            started.elapsed()
        );

        self.persist(&set).await;
        Ok(set)
    }

    /// Rounds in order; after the final regular round, stop on a run of empty rounds
    async fn scan_sequential(
        &self,
        season_id: &str,
        season: &str,
        final_round: u32,
        stop_after_empty: u32,
        deadline: Instant,
        scan: &mut RoundScan,
    ) {
        let mut empty_streak = 0;

        for round in 1..=self.config.round_ceiling {
            if round == final_round {
                empty_streak = 0;
                continue;
            }

            match self.fetch_round(season_id, round, season, deadline).await {
                RoundFetch::TimedOut => {
                    scan.truncated = true;
                    break;
                }
                RoundFetch::Failed => scan.failed += 1,
                RoundFetch::Events(events) if events.is_empty() => {
                    scan.fetched += 1;
                    if round > final_round {
                        empty_streak += 1;
                        if stop_after_empty > 0 && empty_streak >= stop_after_empty {
                            debug!(
                                "Stopping round scan after {} empty rounds at round {}",
                                empty_streak, round
                            );
                            break;
                        }
                    }
                }
                RoundFetch::Events(events) => {
                    empty_streak = 0;
                    scan.fetched += 1;
                    scan.events.insert(round, events);
                }
            }
        }
    }

    /// Every round up to the ceiling with at most `concurrency` requests in flight
    async fn scan_exhaustive(
        &self,
        season_id: &str,
        season: &str,
        final_round: u32,
        concurrency: usize,
        deadline: Instant,
        scan: &mut RoundScan,
    ) {
        let rounds: Vec<u32> =
            (1..=self.config.round_ceiling).filter(|r| *r != final_round).collect();
        let mut pending = rounds.into_iter();
        let mut in_flight = FuturesUnordered::new();

        for round in pending.by_ref().take(concurrency.max(1)) {
            in_flight.push(self.fetch_numbered_round(season_id, round, season, deadline));
        }

        while let Some((round, fetch)) = in_flight.next().await {
            match fetch {
                RoundFetch::TimedOut => scan.truncated = true,
                RoundFetch::Failed => scan.failed += 1,
                RoundFetch::Events(events) => {
                    scan.fetched += 1;
                    if !events.is_empty() {
                        scan.events.insert(round, events);
                    }
                }
            }

            if let Some(next) = pending.next() {
                in_flight.push(self.fetch_numbered_round(season_id, next, season, deadline));
            }
        }
    }

    async fn fetch_numbered_round(
        &self,
        season_id: &str,
        round: u32,
        season: &str,
        deadline: Instant,
    ) -> (u32, RoundFetch) {
        (round, self.fetch_round(season_id, round, season, deadline).await)
    }

    async fn fetch_round(
        &self,
        season_id: &str,
        round: u32,
        season: &str,
        deadline: Instant,
    ) -> RoundFetch {
        match timeout_at(deadline, self.source.events_by_round(season_id, round, season)).await {
            Err(_) => RoundFetch::TimedOut,
            Ok(Ok(events)) => RoundFetch::Events(events),
            Ok(Err(e)) => {
                warn!(
                    round,
                    error = %e,
                    "Round fetch failed for {} ({}); continuing", season_id, season
                );
                RoundFetch::Failed
            }
        }
    }

    /// Best effort: a store failure does not fail the sync
    async fn persist(&self, set: &FixtureSet) {
        match self.store.upsert_fixtures(&set.all_fixtures).await {
            Ok(summary) => debug!(
                "Stored fixtures: {} inserted, {} updated",
                summary.inserted, summary.updated
            ),
            Err(e) => {
                warn!("Failed to persist fixtures: {}", e);
                return;
            }
        }
        if let Err(e) = self.store.put_metadata(&set.metadata).await {
            warn!("Failed to persist sync metadata: {}", e);
        }
    }
}

fn event_date(event: &UpstreamEvent) -> Option<NaiveDate> {
    event
        .date_event
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
}

/// Events to fixtures, de-duplicated by natural key; undated or teamless events are dropped
fn consolidate(
    season_id: &str,
    season: &str,
    rounds: &BTreeMap<u32, Vec<UpstreamEvent>>,
    regular_season_end: NaiveDate,
) -> Vec<Fixture> {
    let mut by_key: HashMap<FixtureKey, Fixture> = HashMap::new();

    for (&round, events) in rounds {
        for event in events {
            let Some(date) = event_date(event) else {
                debug!("Skipping event {} without a valid date", event.id);
                continue;
            };
            let (Some(home_team), Some(away_team)) = (&event.home_team, &event.away_team) else {
                warn!("Skipping event {} in round {} without both teams", event.id, round);
                continue;
            };

            let fixture = Fixture {
                id: event.id.clone(),
                season_id: season_id.to_string(),
                season: season.to_string(),
                round,
                date,
                time: event.time.clone().filter(|t| !t.trim().is_empty()),
                venue: event.venue.clone().filter(|v| !v.trim().is_empty()),
                home_team: home_team.clone(),
                away_team: away_team.clone(),
                home_score: event.home_score,
                away_score: event.away_score,
                classification: Classification::for_date(date, regular_season_end),
            };
            by_key.insert(fixture.key(), fixture);
        }
    }

    by_key.into_values().collect()
}
