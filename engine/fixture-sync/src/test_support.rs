use crate::config::CompetitionConfig;
use crate::source::UpstreamSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use sports_fetcher::{FetchError, UpstreamEvent, UpstreamTableRow};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Scripted upstream: unscripted rounds are empty
#[derive(Default)]
pub(crate) struct FakeSource {
    rounds: Mutex<HashMap<u32, Result<Vec<UpstreamEvent>, FetchError>>>,
    calls: Mutex<Vec<u32>>,
    delay: Mutex<Option<Duration>>,
    down: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_round(self, round: u32, events: Vec<UpstreamEvent>) -> Self {
        self.rounds.lock().insert(round, Ok(events));
        self
    }

    pub fn with_failing_round(self, round: u32) -> Self {
        self.rounds.lock().insert(round, Err(FetchError::network("round unavailable")));
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls_for(&self, round: u32) -> usize {
        self.calls.lock().iter().filter(|r| **r == round).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl UpstreamSource for FakeSource {
    async fn events_by_round(
        &self,
        _season_id: &str,
        round: u32,
        _season: &str,
    ) -> Result<Vec<UpstreamEvent>, FetchError> {
        self.calls.lock().push(round);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(FetchError::network("connection refused"));
        }
        self.rounds.lock().get(&round).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn standings_table(
        &self,
        _season_id: &str,
        _season: &str,
    ) -> Result<Vec<UpstreamTableRow>, FetchError> {
        Ok(Vec::new())
    }
}

pub(crate) fn event(
    round: u32,
    date: &str,
    home: &str,
    away: &str,
    score: Option<(u32, u32)>,
) -> UpstreamEvent {
    UpstreamEvent {
        id: format!("{}-{}-{}", round, home, away),
        home_team: Some(home.to_string()),
        away_team: Some(away.to_string()),
        date_event: Some(date.to_string()),
        time: Some("18:00:00".to_string()),
        venue: None,
        round: Some(round),
        home_score: score.map(|s| s.0),
        away_score: score.map(|s| s.1),
    }
}

pub(crate) fn competition(final_regular_round: u32) -> CompetitionConfig {
    CompetitionConfig {
        season_id: "4336".to_string(),
        name: "Test League".to_string(),
        final_regular_round,
        top_group_size: 2,
    }
}
