//! Plain-text renderings of a scoring run.

use std::cmp::Ordering;

use wrestledraft_scoring::{RunStatus, ScoringReport};
use wrestledraft_types::{MatchRule, TeamStanding, WrestlerResult};

/// Fixed-width team table: rank, team, total, advancement, bonus, placement.
pub fn standings_table(standings: &[TeamStanding]) -> String {
    let rule = "-".repeat(80);
    let mut out = format!(
        "TEAM STANDINGS:\n{rule}\n{:<5}{:<25}{:<10}{:<10}{:<10}{:<10}\n{rule}\n",
        "Rank", "Team", "Total", "Adv", "Bonus", "Placement"
    );
    for (idx, team) in standings.iter().enumerate() {
        out.push_str(&format!(
            "{:<5}{:<25}{:<10.1}{:<10.1}{:<10.1}{:<10.1}\n",
            idx + 1,
            team.team,
            team.total_points,
            team.total_advancement,
            team.total_bonus,
            team.placement_points
        ));
    }
    out
}

/// Per-team breakdown followed by every team's wrestlers, highest scorer
/// first, and the bouts credited to each.
pub fn detailed(report: &ScoringReport) -> String {
    let rule = "-".repeat(50);
    let mut out = format!("NCAA WRESTLING TOURNAMENT DRAFT RESULTS\n{}\n\n", "=".repeat(50));
    match &report.status {
        RunStatus::Complete => {}
        RunStatus::CannotProceed { reason } => {
            out.push_str(&format!("No results: {reason}\n"));
            return out;
        }
        RunStatus::Failed { reason } => {
            out.push_str(&format!("Scoring failed: {reason}\n"));
            return out;
        }
    }

    out.push_str(&format!("TEAM STANDINGS\n{rule}\n"));
    for (idx, team) in report.standings.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} - {:.1} points\n",
            idx + 1,
            team.team,
            team.total_points
        ));
        out.push_str(&format!(
            "   Advancement: {:.1} points (Champ: {:.1}, Cons: {:.1})\n",
            team.total_advancement, team.champ_advancement, team.cons_advancement
        ));
        out.push_str(&format!(
            "   Bonus: {:.1} points (Champ: {:.1}, Cons: {:.1})\n",
            team.total_bonus, team.champ_bonus, team.cons_bonus
        ));
        out.push_str(&format!(
            "   Placement: {:.1} points\n",
            team.placement_points
        ));
        out.push_str(&format!(
            "   Wrestlers with points: {}\n\n",
            team.wrestlers_with_points
        ));
    }

    for team in &report.standings {
        out.push_str(&format!("\n{} WRESTLERS\n{rule}\n", team.team));
        let mut wrestlers: Vec<&WrestlerResult> = report
            .wrestlers
            .iter()
            .filter(|w| w.team == team.team)
            .collect();
        wrestlers.sort_by(|a, b| {
            b.total_points
                .partial_cmp(&a.total_points)
                .unwrap_or(Ordering::Equal)
        });
        for wrestler in wrestlers {
            push_wrestler(&mut out, report, wrestler);
        }
    }

    if !report.mismatches.is_empty() {
        out.push_str(&format!("\nUNMATCHED WINNERS\n{rule}\n"));
        for miss in &report.mismatches {
            let weight = miss.weight.map(|w| w.as_str()).unwrap_or("?");
            out.push_str(&format!(
                "{weight} - {} ({}): {} ({:.1} pts)\n",
                miss.name, miss.school, miss.method_text, miss.points
            ));
        }
    }
    out
}

fn push_wrestler(out: &mut String, report: &ScoringReport, wrestler: &WrestlerResult) {
    let seed = wrestler
        .seed
        .as_ref()
        .map(|s| s.raw.as_str())
        .unwrap_or("unseeded");
    out.push_str(&format!(
        "{} - {} ({seed}): {:.1} points\n",
        wrestler.weight, wrestler.key, wrestler.total_points
    ));
    out.push_str(&format!(
        "   Advancement: {:.1} points (Champ: {:.1}, Cons: {:.1})\n",
        wrestler.champ_advancement + wrestler.cons_advancement,
        wrestler.champ_advancement,
        wrestler.cons_advancement
    ));
    out.push_str(&format!(
        "   Bonus: {:.1} points (Champ: {:.1}, Cons: {:.1})\n",
        wrestler.champ_bonus + wrestler.cons_bonus,
        wrestler.champ_bonus,
        wrestler.cons_bonus
    ));
    if let Some(place) = wrestler.placement {
        out.push_str(&format!(
            "   Placement: {} place ({:.1} points)\n",
            ordinal(place),
            wrestler.placement_points
        ));
    }

    for credited in &wrestler.matches {
        let Some(event) = report.event(credited.event) else {
            continue;
        };
        let result = if event.method.is_overtime() {
            event.method_text.as_str()
        } else {
            event.method.code()
        };
        out.push_str(&format!(
            "   {} - {result} over {} ({}) ({:.1} pts = {:.1} adv + {:.1} bonus)",
            event.round.label,
            event.loser.name,
            event.loser.school,
            event.total_points(),
            event.advancement(),
            event.bonus
        ));
        if !matches!(credited.rule, MatchRule::FullName | MatchRule::NameOnly) {
            out.push_str(&format!(" [matched by {}]", credited.rule));
        }
        out.push('\n');
    }
    out.push('\n');
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrestledraft_scoring::{ScoringConfig, run};
    use wrestledraft_types::{Roster, RosterEntry, Seed, WeightClass};

    fn jane() -> Roster {
        Roster::new(vec![RosterEntry {
            team: "Big Cat".into(),
            weight: WeightClass::W125,
            name: "Jane Doe".into(),
            school: "State U".into(),
            seed: Some(Seed::from_rank(4)),
        }])
    }

    #[test]
    fn table_pads_columns() {
        let standings = vec![TeamStanding {
            team: "Ty Walters".into(),
            total_points: 24.5,
            total_advancement: 3.0,
            total_bonus: 5.5,
            placement_points: 16.0,
            ..TeamStanding::default()
        }];
        let table = standings_table(&standings);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "TEAM STANDINGS:");
        assert_eq!(lines[1].len(), 80);
        assert!(lines[2].starts_with("Rank Team"));
        assert_eq!(
            lines[4],
            format!(
                "{:<5}{:<25}{:<10}{:<10}{:<10}{:<10}",
                "1", "Ty Walters", "24.5", "3.0", "5.5", "16.0"
            )
        );
    }

    #[test]
    fn detailed_lists_bouts_and_flags_weak_matches() {
        let text = "125\n\
                    Champ. Round 1 - J. Dough (St) 10-2 (#4) won by fall over Sam Roe (Tech) 9-9 (Fall 1:00)\n\
                    Cons. Round 2 - Jane Doe (State U) won by decision over Kim Poe (Army) (Dec 3-2)\n";
        let report = run(&jane(), text, &ScoringConfig::empty());
        let out = detailed(&report);
        assert!(out.contains("1. Big Cat - 3.5 points"));
        assert!(out.contains("Big Cat WRESTLERS"));
        assert!(out.contains("125 - Jane Doe (State U) (#4): 3.5 points"));
        assert!(out.contains(
            "   Champ. R1 - Fall over Sam Roe (Tech) (3.0 pts = 1.0 adv + 2.0 bonus) [matched by weight_seed]\n"
        ));
        assert!(out.contains(
            "   Cons. R2 - Dec over Kim Poe (Army) (0.5 pts = 0.5 adv + 0.0 bonus)\n"
        ));
    }

    #[test]
    fn detailed_explains_an_empty_run() {
        let report = run(&Roster::default(), "", &ScoringConfig::default());
        let out = detailed(&report);
        assert!(out.starts_with("NCAA WRESTLING TOURNAMENT DRAFT RESULTS"));
        assert!(out.contains("No results: cannot proceed"));
        assert!(!out.contains("TEAM STANDINGS"));
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(8), "8th");
        assert_eq!(ordinal(11), "11th");
    }
}
