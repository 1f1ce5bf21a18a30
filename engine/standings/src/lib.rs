//! # Standings
//!
//! League table rows and the playoff split: teams are divided into a top and a bottom
//! group by their regular-season ranking, and the results played after the regular season
//! are replayed inside each group.

pub mod calculator;
pub mod models;

pub use calculator::{compute_grouped_standings, sort_for_final_table, sort_for_group_assignment};
pub use models::{GroupedStandings, MatchOutcome, MatchResult, TeamStanding};
