//! Match-line parsing.
//!
//! One permissive pattern covers every round format seen so far:
//!
//! ```text
//! <anything> - <winner> (<school>) <anything> won by|in <method> over <loser> (<school>) <anything>
//! ```
//!
//! Win methods are classified from the captured method phrase, with the whole
//! line consulted for overtime markers (`SV-1`, `TB-2`) that some sources
//! print after the score instead of in the phrase.

use std::sync::LazyLock;

use regex::Regex;
use wrestledraft_types::{
    Bracket, Competitor, MatchEvent, PlacementPair, RoundDescriptor, Seed, WeightClass, WinMethod,
};

use crate::rounds;

static MATCH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:.*?)(?:\s*-\s*)(.*?)\s+\((.*?)\)(?:.*?)won\s+(?:by|in)\s+(.*?)\s+over\s+(.*?)\s+\((.*?)\)(.*)",
    )
    .expect("match line regex")
});

static WINNER_SEED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(.*?\)\s+(\d+)-\d+\s+(?:\(#(\d+)\))?").expect("winner seed regex")
});

static SV_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(])SV-\d").expect("sudden victory marker regex"));

static TB_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(])TB-\d").expect("tiebreaker marker regex"));

const METHOD_KEYWORDS: &[(&[&str], WinMethod)] = &[
    (&["tech fall"], WinMethod::TechFall),
    (&["major decision"], WinMethod::MajorDecision),
    (&["fall", "pin"], WinMethod::Fall),
    (
        &["default", "forfeit", "disqualification", "misconduct"],
        WinMethod::DefaultDq,
    ),
    (&["sudden victory"], WinMethod::SuddenVictory),
    (&["tie breaker"], WinMethod::Tiebreaker),
    (&["decision"], WinMethod::Decision),
];

const PLACE_ORDINALS: [(&str, u8); 8] = [
    ("1st", 1),
    ("2nd", 2),
    ("3rd", 3),
    ("4th", 4),
    ("5th", 5),
    ("6th", 6),
    ("7th", 7),
    ("8th", 8),
];

/// Classify a captured win-method phrase. `line` is the full source line,
/// consulted only for overtime markers.
pub fn classify_win_method(method_text: &str, line: &str) -> WinMethod {
    let phrase = method_text.to_lowercase();
    let keyword = METHOD_KEYWORDS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| phrase.contains(n)))
        .map(|(_, method)| *method);
    match keyword {
        Some(WinMethod::Decision) | None => {
            let fallback = keyword.unwrap_or(WinMethod::Other);
            overtime_marker(line).unwrap_or(fallback)
        }
        Some(method) => method,
    }
}

fn overtime_marker(line: &str) -> Option<WinMethod> {
    let lower = line.to_lowercase();
    if lower.contains("sudden victory") || SV_MARKER.is_match(line) {
        Some(WinMethod::SuddenVictory)
    } else if lower.contains("tie breaker") || TB_MARKER.is_match(line) {
        Some(WinMethod::Tiebreaker)
    } else {
        None
    }
}

/// The winner's seed from a `(#N)` marker after their record, if printed.
pub fn winner_seed(line: &str) -> Option<Seed> {
    let caps = WINNER_SEED.captures(line)?;
    let rank = caps.get(2)?.as_str().parse().ok()?;
    Some(Seed::from_rank(rank))
}

/// Placement ranks decided by a bout, from the first place ordinal in the line
/// or, failing that, from the round itself.
fn placement_pair(line: &str, round: &RoundDescriptor) -> Option<PlacementPair> {
    let from_line = PLACE_ORDINALS
        .iter()
        .find(|(ordinal, _)| line.contains(ordinal))
        .map(|(_, rank)| *rank);
    let rank = match from_line {
        Some(rank) => rank,
        None if *round == rounds::FINALS => 1,
        None => round.label.chars().next()?.to_digit(10)? as u8,
    };
    match rank {
        1 | 3 | 5 | 7 => Some(PlacementPair {
            winner: rank,
            loser: rank + 1,
        }),
        _ => None,
    }
}

/// A bout decides a place when the line says "Place Match", when its round
/// sits in the placement bracket, or when it is the Finals. The last case
/// covers a bare bout under a "Championships" header: it is scored as the
/// 1st place match even though the line never says so.
fn is_placement_bout(line: &str, round: &RoundDescriptor) -> bool {
    line.contains("Place Match") || round.bracket == Bracket::Placement || *round == rounds::FINALS
}

/// Parse one result line under the given weight and round. Returns `None` when
/// the line does not look like a bout.
pub fn parse_match_line(
    line: &str,
    weight: Option<WeightClass>,
    round: &RoundDescriptor,
) -> Option<MatchEvent> {
    let caps = MATCH_LINE.captures(line)?;
    let method_text = caps[3].trim().to_string();
    let method = classify_win_method(&method_text, line);

    let placement = if is_placement_bout(line, round) {
        placement_pair(line, round)
    } else {
        None
    };

    Some(MatchEvent {
        weight,
        round: *round,
        winner: Competitor {
            name: caps[1].trim().to_string(),
            school: caps[2].trim().to_string(),
            seed: winner_seed(line),
        },
        loser: Competitor {
            name: caps[4].trim().to_string(),
            school: caps[5].trim().to_string(),
            seed: None,
        },
        method,
        bonus: method.bonus(),
        method_text,
        placement,
        line: line.to_string(),
    })
}

/// The phrase between `won by`/`won in` and `over`, for the win-type survey.
pub fn method_phrase(line: &str) -> Option<&str> {
    let start = line
        .find("won by ")
        .or_else(|| line.find("won in "))?
        + "won by ".len();
    let rest = &line[start..];
    let end = rest.find(" over").unwrap_or(rest.len());
    let phrase = rest[..end].trim();
    (!phrase.is_empty()).then_some(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> MatchEvent {
        let round = rounds::lookup(line).unwrap_or(rounds::UNKNOWN);
        parse_match_line(line, Some(WeightClass::W125), &round).unwrap()
    }

    #[test]
    fn champ_decision() {
        let event = parse("Champ. Round 1 - Jane Doe (State U) won by decision over John Roe (Tech)");
        assert_eq!(event.round.bracket, Bracket::Championship);
        assert_eq!(event.advancement(), 1.0);
        assert_eq!(event.bonus, 0.0);
        assert_eq!(event.method, WinMethod::Decision);
        assert_eq!(event.winner.name, "Jane Doe");
        assert_eq!(event.winner.school, "State U");
        assert_eq!(event.loser.name, "John Roe");
        assert_eq!(event.loser.school, "Tech");
        assert!(event.placement.is_none());
    }

    #[test]
    fn cons_fall() {
        let event = parse("Cons. Round 2 - Jane Doe (State U) won by fall over John Roe (Tech)");
        assert_eq!(event.round.bracket, Bracket::Consolation);
        assert_eq!(event.advancement(), 0.5);
        assert_eq!(event.bonus, 2.0);
        assert_eq!(event.method, WinMethod::Fall);
    }

    #[test]
    fn third_place_major() {
        let event =
            parse("3rd Place Match - Jane Doe (State U) won by major decision over John Roe (Tech)");
        assert_eq!(event.placement, Some(PlacementPair { winner: 3, loser: 4 }));
        assert_eq!(event.advancement(), 0.0);
        assert_eq!(event.bonus, 1.0);
        assert_eq!(event.total_points(), 1.0);
    }

    #[test]
    fn final_is_a_placement_bout() {
        let event = parse("1st Place Match - A B (Iowa) won by tech fall over C D (Penn State)");
        assert_eq!(event.round.label, "Finals");
        assert_eq!(event.placement, Some(PlacementPair { winner: 1, loser: 2 }));
        assert_eq!(event.total_points(), 1.5);
    }

    #[test]
    fn bare_bout_under_championships_header_decides_first_place() {
        let line = "Mat 1 - A B (Iowa) won by decision over C D (Penn State)";
        let event = parse_match_line(line, Some(WeightClass::W125), &rounds::FINALS).unwrap();
        assert_eq!(event.placement, Some(PlacementPair { winner: 1, loser: 2 }));
        assert_eq!(event.advancement(), 0.0);

        let semi = rounds::lookup("Semifinal").unwrap();
        let event = parse_match_line(line, Some(WeightClass::W125), &semi).unwrap();
        assert!(event.placement.is_none());
        assert_eq!(event.advancement(), 1.0);
    }

    #[test]
    fn extracts_winner_seed_and_record() {
        let line = "Quarterfinal - Luke Lilledahl (Penn State) 20-1 (#1) won by major decision over \
                    Eddie Ventresca (Virginia Tech) 18-5 (#8) (MD 12-3)";
        let event = parse(line);
        assert_eq!(event.winner.seed.as_ref().and_then(|s| s.rank), Some(1));
        assert_eq!(event.winner.name, "Luke Lilledahl");
        assert_eq!(event.loser.name, "Eddie Ventresca");
        assert_eq!(event.loser.school, "Virginia Tech");
        assert_eq!(event.method, WinMethod::MajorDecision);
    }

    #[test]
    fn method_cascade() {
        assert_eq!(classify_win_method("Tech Fall 5:20 (17-2)", ""), WinMethod::TechFall);
        assert_eq!(classify_win_method("fall 2:01", ""), WinMethod::Fall);
        assert_eq!(classify_win_method("pin", ""), WinMethod::Fall);
        assert_eq!(classify_win_method("medical forfeit", ""), WinMethod::DefaultDq);
        assert_eq!(classify_win_method("injury default", ""), WinMethod::DefaultDq);
        assert_eq!(classify_win_method("sudden victory - 1 (5-3)", ""), WinMethod::SuddenVictory);
        assert_eq!(classify_win_method("tie breaker - 1 (2-1)", ""), WinMethod::Tiebreaker);
        assert_eq!(classify_win_method("something new", ""), WinMethod::Other);
    }

    #[test]
    fn overtime_markers_upgrade_decisions() {
        let line = "Semifinal - A (B) won by decision over C (D) (SV-1 4-2)";
        assert_eq!(classify_win_method("decision", line), WinMethod::SuddenVictory);
        let line = "Semifinal - A (B) won in OT over C (D) TB-1 2-1 ";
        assert_eq!(classify_win_method("OT", line), WinMethod::Tiebreaker);
        assert_eq!(classify_win_method("decision", "no markers here"), WinMethod::Decision);
    }

    #[test]
    fn rejects_non_bout_lines() {
        let round = rounds::UNKNOWN;
        assert!(parse_match_line("Quarterfinal", None, &round).is_none());
        assert!(parse_match_line("1st: Jane Doe (State U)", None, &round).is_none());
    }

    #[test]
    fn method_phrase_for_survey() {
        let line = "Cons. Round 2 - A (B) won by tech fall over C (D)";
        assert_eq!(method_phrase(line), Some("tech fall"));
        assert_eq!(method_phrase("A (B) won in sudden victory - 1 over C (D)"), Some("sudden victory - 1"));
        assert_eq!(method_phrase("no bout"), None);
    }
}
