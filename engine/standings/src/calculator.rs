use crate::models::{GroupedStandings, MatchResult, TeamStanding};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Top,
    Bottom,
}

/// Regular-season order deciding group membership: points, goal difference, goals for
pub fn sort_for_group_assignment(table: &mut [TeamStanding]) {
    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
            .then_with(|| b.goals_for.cmp(&a.goals_for))
    });
}

/// Order of a group table after replaying results: points, goal difference, wins.
///
/// The third key differs from `sort_for_group_assignment` (wins instead of goals for).
/// Both tie-breaks are kept as the league has published them until the rule is confirmed.
pub fn sort_for_final_table(table: &mut [TeamStanding]) {
    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
            .then_with(|| b.win.cmp(&a.win))
    });
}

fn assign_ranks(table: &mut [TeamStanding]) {
    for (position, standing) in table.iter_mut().enumerate() {
        standing.rank = Some(position as u32 + 1);
    }
}

/// Split the regular-season table into a top and a bottom group and replay the
/// subsequent matches inside each group.
///
/// Only matches with both scores and both teams in the same group count. A match naming a
/// team that is absent from `regular_standings` is skipped and logged; the rest of the
/// computation continues.
pub fn compute_grouped_standings(
    regular_standings: &[TeamStanding],
    subsequent_matches: &[MatchResult],
    top_group_size: usize,
) -> GroupedStandings {
    let mut ordered = regular_standings.to_vec();
    sort_for_group_assignment(&mut ordered);

    let split_at = top_group_size.min(ordered.len());
    let bottom = ordered.split_off(split_at);
    let top = ordered;

    let mut tables: [Vec<TeamStanding>; 2] = [top, bottom];
    let mut positions: HashMap<String, (Group, usize)> = HashMap::new();
    for (group, table) in [(Group::Top, &tables[0]), (Group::Bottom, &tables[1])] {
        for (idx, standing) in table.iter().enumerate() {
            if positions.insert(standing.team.clone(), (group, idx)).is_some() {
                warn!("Team {} appears more than once in the regular-season table", standing.team);
            }
        }
    }

    let mut result = GroupedStandings::default();

    for m in subsequent_matches {
        let Some((home_goals, away_goals)) = m.score() else {
            result.skipped_unplayed += 1;
            continue;
        };

        let home = positions.get(m.home_team.as_str()).copied();
        let away = positions.get(m.away_team.as_str()).copied();

        match (home, away) {
            (Some((home_group, home_idx)), Some((away_group, away_idx)))
                if home_group == away_group =>
            {
                let table = match home_group {
                    Group::Top => &mut tables[0],
                    Group::Bottom => &mut tables[1],
                };
                table[home_idx].record_result(home_goals, away_goals);
                table[away_idx].record_result(away_goals, home_goals);
                result.applied_matches += 1;
            }
            (Some(_), Some(_)) => {
                debug!("Skipping cross-group match {} vs {}", m.home_team, m.away_team);
                result.skipped_cross_group += 1;
            }
            _ => {
                warn!(
                    home_team = %m.home_team,
                    away_team = %m.away_team,
                    "Data inconsistency: match references a team missing from the regular table"
                );
                result.skipped_inconsistent += 1;
            }
        }
    }

    let [mut top, mut bottom] = tables;
    sort_for_final_table(&mut top);
    sort_for_final_table(&mut bottom);
    assign_ranks(&mut top);
    assign_ranks(&mut bottom);

    info!(
        "Computed grouped standings: {} top, {} bottom, {} matches applied",
        top.len(),
        bottom.len(),
        result.applied_matches
    );

    result.top_group_table = top;
    result.bottom_group_table = bottom;
    result
}
