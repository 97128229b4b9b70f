use std::cmp::Ordering;

use wrestledraft_types::{TeamStanding, WrestlerResult};

/// Sum finalized wrestler results into team standings, highest total first.
///
/// Teams appear in the order their first wrestler appears in `results`; the
/// sort is stable, so tied teams keep that order.
pub fn aggregate(results: &[WrestlerResult]) -> Vec<TeamStanding> {
    let mut standings: Vec<TeamStanding> = Vec::new();
    for result in results {
        let idx = match standings.iter().position(|s| s.team == result.team) {
            Some(idx) => idx,
            None => {
                standings.push(TeamStanding {
                    team: result.team.clone(),
                    ..TeamStanding::default()
                });
                standings.len() - 1
            }
        };
        let team = &mut standings[idx];
        team.champ_wins += result.champ_wins;
        team.champ_advancement += result.champ_advancement;
        team.champ_bonus += result.champ_bonus;
        team.cons_wins += result.cons_wins;
        team.cons_advancement += result.cons_advancement;
        team.cons_bonus += result.cons_bonus;
        team.placement_points += result.placement_points;
        if result.total_points > 0.0 {
            team.wrestlers_with_points += 1;
        }
    }

    for team in &mut standings {
        team.total_advancement = team.champ_advancement + team.cons_advancement;
        team.total_bonus = team.champ_bonus + team.cons_bonus;
        team.total_points = team.total_advancement + team.total_bonus + team.placement_points;
    }

    standings.sort_by(|a, b| {
        b.total_points
            .partial_cmp(&a.total_points)
            .unwrap_or(Ordering::Equal)
    });
    standings
}
