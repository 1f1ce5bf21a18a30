use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Regular season or playoff, decided by the regular-season end date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Regular,
    Playoff,
}

impl Classification {
    /// Matches on or before `regular_season_end` are regular season
    pub fn for_date(date: NaiveDate, regular_season_end: NaiveDate) -> Self {
        if date <= regular_season_end {
            Classification::Regular
        } else {
            Classification::Playoff
        }
    }
}

/// A single scheduled or played match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Upstream event id
    pub id: String,
    pub season_id: String,
    pub season: String,
    pub round: u32,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub classification: Classification,
}

/// Natural key used for de-duplication and store upserts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureKey {
    pub season_id: String,
    pub season: String,
    pub round: u32,
    pub home_team: String,
    pub away_team: String,
}

impl Fixture {
    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            season_id: self.season_id.clone(),
            season: self.season.clone(),
            round: self.round,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }

    pub fn is_played(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }
}

/// Summary of the sync that produced a `FixtureSet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub season_id: String,
    pub season: String,
    pub regular_season_end_date: NaiveDate,
    pub total_fixtures: usize,
    pub regular_count: usize,
    pub playoff_count: usize,
    pub rounds_fetched: u32,
    pub rounds_failed: u32,
    /// The sync deadline cut the round scan short
    pub truncated: bool,
    pub last_synced_at: DateTime<Utc>,
}

/// Consolidated fixtures of one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSet {
    pub regular_fixtures: Vec<Fixture>,
    pub playoff_fixtures: Vec<Fixture>,
    pub all_fixtures: Vec<Fixture>,
    pub metadata: SyncMetadata,
    /// Served from an expired cache entry or the fixture store after a failed sync
    #[serde(default)]
    pub stale: bool,
}

impl FixtureSet {
    /// Sort and partition `fixtures`; counts in `metadata` are recomputed from them
    pub fn from_fixtures(mut fixtures: Vec<Fixture>, mut metadata: SyncMetadata) -> Self {
        sort_fixtures(&mut fixtures);

        let (regular_fixtures, playoff_fixtures): (Vec<_>, Vec<_>) = fixtures
            .iter()
            .cloned()
            .partition(|f| f.classification == Classification::Regular);

        metadata.total_fixtures = fixtures.len();
        metadata.regular_count = regular_fixtures.len();
        metadata.playoff_count = playoff_fixtures.len();

        Self { regular_fixtures, playoff_fixtures, all_fixtures: fixtures, metadata, stale: false }
    }

    pub fn mark_stale(mut self) -> Self {
        self.stale = true;
        self
    }
}

/// Chronological order: date, kick-off time, round, home team
pub fn sort_fixtures(fixtures: &mut [Fixture]) {
    fixtures.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.round.cmp(&b.round))
            .then_with(|| a.home_team.cmp(&b.home_team))
    });
}

/// Cache key of a consolidated season
pub fn fixtures_cache_key(season_id: &str, season: &str) -> String {
    format!("fixtures:{}:{}", season_id, season)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(round: u32, date: &str, home: &str, classification: Classification) -> Fixture {
        Fixture {
            id: format!("{}-{}", round, home),
            season_id: "4336".to_string(),
            season: "2023-2024".to_string(),
            round,
            date: date.parse().unwrap(),
            time: None,
            venue: None,
            home_team: home.to_string(),
            away_team: "Away".to_string(),
            home_score: None,
            away_score: None,
            classification,
        }
    }

    fn metadata() -> SyncMetadata {
        SyncMetadata {
            season_id: "4336".to_string(),
            season: "2023-2024".to_string(),
            regular_season_end_date: "2024-03-10".parse().unwrap(),
            total_fixtures: 0,
            regular_count: 0,
            playoff_count: 0,
            rounds_fetched: 0,
            rounds_failed: 0,
            truncated: false,
            last_synced_at: Utc::now(),
        }
    }

    #[test]
    fn test_classification_boundary_is_inclusive() {
        let end: NaiveDate = "2024-03-10".parse().unwrap();
        assert_eq!(Classification::for_date(end, end), Classification::Regular);
        assert_eq!(Classification::for_date(end.succ_opt().unwrap(), end), Classification::Playoff);
    }

    #[test]
    fn test_from_fixtures_partitions_and_sorts() {
        let set = FixtureSet::from_fixtures(
            vec![
                fixture(27, "2024-03-20", "B", Classification::Playoff),
                fixture(1, "2023-08-20", "A", Classification::Regular),
                fixture(26, "2024-03-10", "C", Classification::Regular),
            ],
            metadata(),
        );

        let rounds: Vec<_> = set.all_fixtures.iter().map(|f| f.round).collect();
        assert_eq!(rounds, vec![1, 26, 27]);
        assert_eq!(set.regular_fixtures.len(), 2);
        assert_eq!(set.playoff_fixtures.len(), 1);
        assert_eq!(set.metadata.total_fixtures, 3);
        assert_eq!(set.metadata.playoff_count, 1);
        assert!(!set.stale);
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(fixtures_cache_key("4336", "2023-2024"), "fixtures:4336:2023-2024");
    }
}
