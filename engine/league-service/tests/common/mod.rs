use async_trait::async_trait;
use fixture_sync::{CompetitionConfig, UpstreamSource};
use league_service::LeagueServiceConfig;
use parking_lot::Mutex;
use sports_fetcher::{FetchError, UpstreamEvent, UpstreamTableRow};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const SEASON_ID: &str = "100";
pub const SEASON: &str = "2023-2024";

/// Upstream double with a switch to simulate an outage
#[derive(Default)]
pub struct FakeUpstream {
    rounds: Mutex<HashMap<u32, Vec<UpstreamEvent>>>,
    table: Mutex<Vec<UpstreamTableRow>>,
    round_calls: Mutex<Vec<u32>>,
    table_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    down: AtomicBool,
}

impl FakeUpstream {
    /// Four teams, two regular rounds ending 2024-03-10 and one playoff round
    pub fn league() -> Self {
        let fake = Self::default();
        fake.rounds.lock().extend([
            (
                1,
                vec![
                    event(1, "2023-09-01", "A", "B", Some((1, 1))),
                    event(1, "2023-09-01", "C", "D", Some((0, 0))),
                ],
            ),
            (
                2,
                vec![
                    event(2, "2024-03-09", "A", "C", Some((2, 0))),
                    event(2, "2024-03-10", "B", "D", Some((3, 1))),
                ],
            ),
            (
                3,
                vec![
                    event(3, "2024-03-20", "A", "B", Some((2, 1))),
                    event(3, "2024-03-20", "C", "D", None),
                ],
            ),
        ]);
        *fake.table.lock() = vec![
            row("C", 2, 4, 6, 10, 18),
            row("A", 9, 3, 0, 25, 8),
            row("D", 2, 2, 8, 7, 22),
            row("B", 9, 1, 2, 20, 10),
        ];
        fake
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls_for(&self, round: u32) -> usize {
        self.round_calls.lock().iter().filter(|r| **r == round).count()
    }

    pub fn total_round_calls(&self) -> usize {
        self.round_calls.lock().len()
    }

    pub fn table_calls(&self) -> usize {
        self.table_calls.load(Ordering::SeqCst)
    }

    async fn respond<T>(&self, value: impl FnOnce() -> T) -> Result<T, FetchError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(FetchError::UpstreamUnavailable {
                url: "fake://upstream".to_string(),
                attempts: 3,
                last: Box::new(FetchError::Status {
                    url: "fake://upstream".to_string(),
                    status: 503,
                }),
            });
        }
        Ok(value())
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn events_by_round(
        &self,
        _season_id: &str,
        round: u32,
        _season: &str,
    ) -> Result<Vec<UpstreamEvent>, FetchError> {
        self.round_calls.lock().push(round);
        self.respond(|| self.rounds.lock().get(&round).cloned().unwrap_or_default()).await
    }

    async fn standings_table(
        &self,
        _season_id: &str,
        _season: &str,
    ) -> Result<Vec<UpstreamTableRow>, FetchError> {
        self.table_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(|| self.table.lock().clone()).await
    }
}

pub fn event(
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
        time: Some("19:00:00".to_string()),
        venue: Some("Stadium".to_string()),
        round: Some(round),
        home_score: score.map(|s| s.0),
        away_score: score.map(|s| s.1),
    }
}

pub fn row(
    team: &str,
    win: u32,
    draw: u32,
    loss: u32,
    goals_for: u32,
    goals_against: u32,
) -> UpstreamTableRow {
    UpstreamTableRow {
        team: team.to_string(),
        rank: None,
        played: Some(win + draw + loss),
        win: Some(win),
        draw: Some(draw),
        loss: Some(loss),
        goals_for: Some(goals_for),
        goals_against: Some(goals_against),
        points: Some(3 * win + draw),
        badge: None,
    }
}

pub fn test_config() -> LeagueServiceConfig {
    let mut config = LeagueServiceConfig::default();
    config.sync.round_ceiling = 6;
    config.competitions = vec![CompetitionConfig {
        season_id: SEASON_ID.to_string(),
        name: "Test League".to_string(),
        final_regular_round: 2,
        top_group_size: 2,
    }];
    config
}
