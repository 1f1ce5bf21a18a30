//! Periodic re-sync of tracked seasons

use crate::config::TrackedSeason;
use fixture_sync::{FixtureQueryService, FixtureSet, QueryError};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Outcome of one refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: usize,
    /// Sync failed; previous data still served
    pub stale: usize,
    /// Sync failed with nothing to fall back on
    pub failed: usize,
}

/// Force a sync of every tracked season; failures are logged, never propagated
pub async fn refresh_seasons(
    query: &FixtureQueryService,
    seasons: &[TrackedSeason],
) -> RefreshReport {
    let results = join_all(seasons.iter().map(|tracked| refresh_one(query, tracked))).await;

    let mut report = RefreshReport::default();
    for (tracked, result) in results {
        match result {
            Ok(set) if set.stale => {
                warn!(
                    "Refresh of {} ({}) failed; keeping stale fixtures",
                    tracked.season_id, tracked.season
                );
                report.stale += 1;
            }
            Ok(_) => report.refreshed += 1,
            Err(e) => {
                warn!("Refresh of {} ({}) failed: {}", tracked.season_id, tracked.season, e);
                report.failed += 1;
            }
        }
    }
    report
}

async fn refresh_one<'a>(
    query: &FixtureQueryService,
    tracked: &'a TrackedSeason,
) -> (&'a TrackedSeason, Result<FixtureSet, QueryError>) {
    (tracked, query.get_fixtures(&tracked.season_id, &tracked.season, true).await)
}

/// Background task running `refresh_seasons` on a fixed period, starting immediately
pub struct RefreshScheduler {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    pub fn start(
        query: Arc<FixtureQueryService>,
        seasons: Vec<TrackedSeason>,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        info!("Refresh scheduler started for {} seasons every {:?}", seasons.len(), period);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let report = refresh_seasons(&query, &seasons).await;
                        info!(
                            refreshed = report.refreshed,
                            stale = report.stale,
                            failed = report.failed,
                            "Scheduled fixture refresh finished"
                        );
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Stop the task, waiting for a running pass to end
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
        info!("Refresh scheduler stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
