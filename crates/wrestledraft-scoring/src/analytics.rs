//! Per-team breakdowns layered on a finished run: how each team's wrestlers
//! won their bouts, and where they placed.

use serde::Serialize;
use tracing::debug;
use wrestledraft_types::{MatchEvent, Roster, WinMethod, WrestlerResult, placement_points};

/// Ranks that count as All-American.
pub const AA_RANKS: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub teams: Vec<TeamWinProfile>,
    pub placements: Vec<TeamPlacements>,
}

impl Analysis {
    pub fn team(&self, team: &str) -> Option<&TeamWinProfile> {
        self.teams.iter().find(|t| t.team == team)
    }

    pub fn placements_for(&self, team: &str) -> Option<&TeamPlacements> {
        self.placements.iter().find(|t| t.team == team)
    }
}

/// Wins by one method, as a count and a share of the team's wins.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MethodShare {
    pub method: &'static str,
    pub wins: u32,
    pub pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamWinProfile {
    pub team: String,
    pub total_wins: u32,
    /// One share per method, in [`WinMethod::ALL`] order.
    pub methods: Vec<MethodShare>,
    /// Wins that earned bonus points.
    pub bonus_wins: u32,
    pub bonus_win_pct: f64,
}

impl TeamWinProfile {
    pub fn wins_by(&self, method: WinMethod) -> u32 {
        self.share(method).map_or(0, |s| s.wins)
    }

    pub fn share(&self, method: WinMethod) -> Option<&MethodShare> {
        self.methods.iter().find(|s| s.method == method.code())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamPlacements {
    pub team: String,
    /// Wrestlers finishing 1st through 8th.
    pub by_rank: [u32; AA_RANKS],
    pub all_americans: u32,
    pub points_by_rank: [f64; AA_RANKS],
    pub placement_points: f64,
}

/// Break down every drafted team, in roster order. Teams without a single
/// win or placement still get a zeroed row.
pub fn analyze(roster: &Roster, wrestlers: &[WrestlerResult], events: &[MatchEvent]) -> Analysis {
    let teams = roster.teams();
    let mut analysis = Analysis::default();
    for team in teams {
        let members: Vec<&WrestlerResult> = wrestlers.iter().filter(|w| w.team == team).collect();
        analysis.teams.push(win_profile(team, &members, events));
        analysis.placements.push(team_placements(team, &members));
    }
    debug!("analysis covers {} teams", analysis.teams.len());
    analysis
}

fn win_profile(team: &str, members: &[&WrestlerResult], events: &[MatchEvent]) -> TeamWinProfile {
    let mut counts = [0u32; WinMethod::ALL.len()];
    let mut bonus_wins = 0;
    for credited in members.iter().flat_map(|w| &w.matches) {
        let Some(event) = events.get(credited.event.0) else {
            continue;
        };
        if let Some(idx) = WinMethod::ALL.iter().position(|m| *m == event.method) {
            counts[idx] += 1;
        }
        if event.method.bonus() > 0.0 {
            bonus_wins += 1;
        }
    }

    let total_wins: u32 = counts.iter().sum();
    let methods = WinMethod::ALL
        .iter()
        .zip(counts)
        .map(|(method, wins)| MethodShare {
            method: method.code(),
            wins,
            pct: percent(wins, total_wins),
        })
        .collect();
    TeamWinProfile {
        team: team.to_string(),
        total_wins,
        methods,
        bonus_wins,
        bonus_win_pct: percent(bonus_wins, total_wins),
    }
}

fn team_placements(team: &str, members: &[&WrestlerResult]) -> TeamPlacements {
    let mut by_rank = [0u32; AA_RANKS];
    for rank in members.iter().filter_map(|w| w.placement) {
        match usize::from(rank).checked_sub(1) {
            Some(idx) if idx < AA_RANKS => by_rank[idx] += 1,
            _ => debug!("{team}: placement {rank} is outside the All-American ranks"),
        }
    }

    let mut points_by_rank = [0.0; AA_RANKS];
    for (idx, count) in by_rank.iter().enumerate() {
        points_by_rank[idx] = f64::from(*count) * placement_points(idx as u32 + 1);
    }
    TeamPlacements {
        team: team.to_string(),
        by_rank,
        all_americans: by_rank.iter().sum(),
        points_by_rank,
        placement_points: points_by_rank.iter().sum(),
    }
}

/// Percentage to one decimal place; zero when there is nothing to divide.
fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let pct = f64::from(part) / f64::from(whole) * 100.0;
    (pct * 10.0).round() / 10.0
}
