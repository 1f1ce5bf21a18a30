use serde::{Deserialize, Serialize};

/// One team's row in a league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team: String,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Result of a single match from one team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
}

impl TeamStanding {
    /// A team with no matches played
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            played: 0,
            win: 0,
            draw: 0,
            loss: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            rank: None,
            badge: None,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Apply one played match; the only way figures change after construction
    pub fn record_result(&mut self, scored: u32, conceded: u32) -> MatchOutcome {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;

        let outcome = match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => MatchOutcome::Win,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
            std::cmp::Ordering::Less => MatchOutcome::Loss,
        };

        match outcome {
            MatchOutcome::Win => {
                self.win += 1;
                self.points += 3;
            }
            MatchOutcome::Draw => {
                self.draw += 1;
                self.points += 1;
            }
            MatchOutcome::Loss => self.loss += 1,
        }

        outcome
    }

    /// `played == win + draw + loss` and `points == 3*win + draw`
    pub fn is_consistent(&self) -> bool {
        self.played == self.win + self.draw + self.loss && self.points == 3 * self.win + self.draw
    }
}

/// A match as seen by the standings calculator; scores are `None` until played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

impl MatchResult {
    pub fn played(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_score: u32,
        away_score: u32,
    ) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: Some(home_score),
            away_score: Some(away_score),
        }
    }

    pub fn unplayed(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: None,
            away_score: None,
        }
    }

    /// Both scores, if the match has been played
    pub fn score(&self) -> Option<(u32, u32)> {
        self.home_score.zip(self.away_score)
    }
}

/// Output of `compute_grouped_standings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedStandings {
    pub top_group_table: Vec<TeamStanding>,
    pub bottom_group_table: Vec<TeamStanding>,
    /// Matches applied to a group table
    pub applied_matches: usize,
    /// Matches without both scores
    pub skipped_unplayed: usize,
    /// Matches between a top-group and a bottom-group team
    pub skipped_cross_group: usize,
    /// Matches naming a team missing from the regular-season table
    pub skipped_inconsistent: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_result_awards_points() {
        let mut standing = TeamStanding::new("Omonia");

        assert_eq!(standing.record_result(2, 1), MatchOutcome::Win);
        assert_eq!(standing.record_result(0, 0), MatchOutcome::Draw);
        assert_eq!(standing.record_result(1, 3), MatchOutcome::Loss);

        assert_eq!(standing.played, 3);
        assert_eq!(standing.points, 4);
        assert_eq!(standing.goals_for, 3);
        assert_eq!(standing.goals_against, 4);
        assert_eq!(standing.goal_difference(), -1);
        assert!(standing.is_consistent());
    }

    #[test]
    fn test_standing_serializes_camel_case() {
        let json = serde_json::to_value(TeamStanding::new("AEK")).unwrap();
        assert_eq!(json["goalsFor"], 0);
        assert!(json.get("rank").is_none());
    }

    #[test]
    fn test_match_score_requires_both_sides() {
        let mut result = MatchResult::played("A", "B", 1, 0);
        assert_eq!(result.score(), Some((1, 0)));
        result.away_score = None;
        assert_eq!(result.score(), None);
    }
}
