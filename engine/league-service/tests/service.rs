mod common;

use common::{test_config, FakeUpstream, SEASON, SEASON_ID};
use fixture_sync::{CompetitionUpdate, InMemoryFixtureStore, QueryError};
use futures::future::join_all;
use league_service::config::TrackedSeason;
use league_service::{LeagueDataService, LeagueServiceConfig};
use std::sync::Arc;
use std::time::Duration;

fn service_with(config: LeagueServiceConfig, upstream: Arc<FakeUpstream>) -> LeagueDataService {
    LeagueDataService::with_parts(config, upstream, Arc::new(InMemoryFixtureStore::new()))
}

fn service(upstream: Arc<FakeUpstream>) -> LeagueDataService {
    service_with(test_config(), upstream)
}

#[tokio::test]
async fn test_fixtures_split_at_regular_season_end() {
    let upstream = Arc::new(FakeUpstream::league());
    let service = service(upstream.clone());

    let fixtures = tokio_test::assert_ok!(service.fetch_fixtures(SEASON_ID, SEASON, false).await);

    assert_eq!(fixtures.regular_fixtures.len(), 4);
    assert_eq!(fixtures.playoff_fixtures.len(), 2);
    assert_eq!(fixtures.metadata.regular_season_end_date.to_string(), "2024-03-10");
    // Final round first, then 1, 3, and the three empty rounds up to the ceiling
    assert_eq!(upstream.calls_for(2), 1);
    assert_eq!(upstream.total_round_calls(), 6);
}

#[tokio::test]
async fn test_grouped_standings_replay_playoff_results() {
    let upstream = Arc::new(FakeUpstream::league());
    let service = service(upstream);

    let grouped = service.grouped_standings(SEASON_ID, SEASON).await.unwrap();

    let top: Vec<_> =
        grouped.top_group_table.iter().map(|s| (s.team.as_str(), s.points, s.played)).collect();
    assert_eq!(top, vec![("A", 33, 13), ("B", 28, 13)]);

    let b = &grouped.top_group_table[1];
    assert_eq!((b.loss, b.goals_for, b.goals_against), (3, 21, 12));

    let bottom: Vec<_> =
        grouped.bottom_group_table.iter().map(|s| (s.team.as_str(), s.points, s.played)).collect();
    assert_eq!(bottom, vec![("C", 10, 12), ("D", 8, 12)]);

    assert_eq!(grouped.applied_matches, 1);
    assert_eq!(grouped.skipped_unplayed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_share_one_sync() {
    let upstream = Arc::new(FakeUpstream::league().with_delay(Duration::from_millis(50)));
    let service = service(upstream.clone());

    let results = join_all((0..10).map(|_| service.fetch_fixtures(SEASON_ID, SEASON, false))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(upstream.calls_for(2), 1);
    assert_eq!(upstream.total_round_calls(), 6);
}

#[tokio::test]
async fn test_force_refresh_during_outage_returns_stale() {
    let upstream = Arc::new(FakeUpstream::league());
    let service = service(upstream.clone());

    let fresh = service.fetch_fixtures(SEASON_ID, SEASON, false).await.unwrap();
    upstream.set_down(true);

    let stale = service.fetch_fixtures(SEASON_ID, SEASON, true).await.unwrap();

    assert!(stale.stale);
    assert_eq!(stale.all_fixtures, fresh.all_fixtures);
}

#[tokio::test]
async fn test_outage_without_previous_data_is_retryable() {
    let upstream = Arc::new(FakeUpstream::league());
    upstream.set_down(true);
    let service = service(upstream);

    let err = service.fetch_fixtures(SEASON_ID, SEASON, false).await.unwrap_err();

    assert!(matches!(err, QueryError::Unavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_invalidate_forces_resync() {
    let upstream = Arc::new(FakeUpstream::league());
    let service = service(upstream.clone());

    service.fetch_fixtures(SEASON_ID, SEASON, false).await.unwrap();
    assert_eq!(service.invalidate(SEASON_ID, SEASON), 1);
    assert_eq!(service.get_cache_stats().deletes, 1);

    service.fetch_fixtures(SEASON_ID, SEASON, false).await.unwrap();
    assert_eq!(upstream.calls_for(2), 2);
}

#[tokio::test]
async fn test_cache_stats_cover_fixtures_and_tables() {
    let upstream = Arc::new(FakeUpstream::league());
    let service = service(upstream.clone());

    service.fetch_fixtures(SEASON_ID, SEASON, false).await.unwrap();
    service.fetch_fixtures(SEASON_ID, SEASON, false).await.unwrap();
    service.regular_standings(SEASON_ID, SEASON).await.unwrap();
    service.regular_standings(SEASON_ID, SEASON).await.unwrap();

    let stats = service.get_cache_stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.sets, 2);
    assert_eq!(stats.size, 2);
    assert_eq!(upstream.table_calls(), 1);

    assert_eq!(service.invalidate_all(), 2);
    assert_eq!(service.get_cache_stats().size, 0);
}

#[tokio::test]
async fn test_competition_update_changes_group_split() {
    let upstream = Arc::new(FakeUpstream::league());
    let service = service(upstream);

    service.grouped_standings(SEASON_ID, SEASON).await.unwrap();
    service
        .update_competition(
            SEASON_ID,
            CompetitionUpdate { top_group_size: Some(3), ..Default::default() },
        )
        .unwrap();

    let grouped = service.grouped_standings(SEASON_ID, SEASON).await.unwrap();
    assert_eq!(grouped.top_group_table.len(), 3);
    assert_eq!(grouped.bottom_group_table.len(), 1);
}

#[tokio::test]
async fn test_unknown_competition_standings_fail() {
    let service = service(Arc::new(FakeUpstream::league()));
    assert!(service.grouped_standings("999", SEASON).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_refreshes_tracked_seasons() {
    let upstream = Arc::new(FakeUpstream::league());
    let mut config = test_config();
    config.scheduler.enabled = true;
    config.scheduler.interval_secs = 60;
    config.scheduler.tracked_seasons =
        vec![TrackedSeason { season_id: SEASON_ID.to_string(), season: SEASON.to_string() }];
    let service = service_with(config, upstream.clone());

    service.start_background_tasks();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(upstream.calls_for(2), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(upstream.calls_for(2), 2);

    service.shutdown().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(upstream.calls_for(2), 2);
}
