use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static per-competition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionConfig {
    /// Upstream league identifier
    pub season_id: String,

    /// Display name
    pub name: String,

    /// Last round of the regular season; its latest match date is the playoff cutoff
    pub final_regular_round: u32,

    /// Teams that continue in the top playoff group
    pub top_group_size: usize,
}

/// Typed partial update of a `CompetitionConfig`; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionUpdate {
    pub name: Option<String>,
    pub final_regular_round: Option<u32>,
    pub top_group_size: Option<usize>,
}

impl CompetitionConfig {
    pub fn apply(&mut self, update: CompetitionUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(round) = update.final_regular_round {
            self.final_regular_round = round;
        }
        if let Some(size) = update.top_group_size {
            self.top_group_size = size;
        }
    }
}

/// How rounds `1..=round_ceiling` are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMode {
    /// One round at a time, stopping after `stop_after_empty` consecutive empty rounds
    Sequential { stop_after_empty: u32 },
    /// Every round up to the ceiling, at most `concurrency` requests in flight
    Exhaustive { concurrency: usize },
}

/// Synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Highest round number ever requested
    pub round_ceiling: u32,

    pub mode: SyncMode,

    /// TTL of a consolidated season in the cache
    pub fixtures_ttl_secs: u64,

    /// Overall budget for one season sync
    pub sync_deadline_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            round_ceiling: 40,
            mode: SyncMode::Sequential { stop_after_empty: 3 },
            fixtures_ttl_secs: 6 * 60 * 60, // 6 hours
            sync_deadline_secs: 120,
        }
    }
}

impl SyncConfig {
    /// Get fixtures TTL as Duration
    pub fn fixtures_ttl(&self) -> Duration {
        Duration::from_secs(self.fixtures_ttl_secs)
    }

    /// Get sync deadline as Duration
    pub fn sync_deadline(&self) -> Duration {
        Duration::from_secs(self.sync_deadline_secs)
    }
}

/// Competitions known out of the box
pub fn default_competitions() -> Vec<CompetitionConfig> {
    vec![
        CompetitionConfig {
            season_id: "4336".to_string(),
            name: "Super League Greece".to_string(),
            final_regular_round: 26,
            top_group_size: 4,
        },
        CompetitionConfig {
            season_id: "4346".to_string(),
            name: "Cyprus First Division".to_string(),
            final_regular_round: 26,
            top_group_size: 6,
        },
    ]
}
