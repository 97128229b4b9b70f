//! Shared types for scoring a draft league built on an NCAA wrestling bracket.
//!
//! Roster data is immutable once loaded ([`Roster`], [`RosterEntry`]); match
//! data is produced once per parsed line ([`MatchEvent`]) and never edited;
//! per-wrestler and per-team figures ([`WrestlerResult`], [`TeamStanding`])
//! are derived from those and recomputed wholesale on every run.
//!
//! ```rust
//! use wrestledraft_types::{Seed, WeightClass, placement_points};
//!
//! assert_eq!(WeightClass::from_token("285"), Some(WeightClass::W285));
//! assert_eq!(Seed::parse("#4").and_then(|s| s.rank), Some(4));
//! assert_eq!(placement_points(3), 10.0);
//! ```

use std::fmt;

use serde::Serialize;

/// Weight class tokens as they appear in result text and roster rows.
///
/// Ordering follows ascending weight with the non-scoring `DH` column last.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub enum WeightClass {
    #[serde(rename = "125")]
    W125,
    #[serde(rename = "133")]
    W133,
    #[serde(rename = "141")]
    W141,
    #[serde(rename = "149")]
    W149,
    #[serde(rename = "157")]
    W157,
    #[serde(rename = "165")]
    W165,
    #[serde(rename = "174")]
    W174,
    #[serde(rename = "184")]
    W184,
    #[serde(rename = "197")]
    W197,
    #[serde(rename = "285")]
    W285,
    /// Placeholder column in the round-by-round grid; never scores.
    #[serde(rename = "DH")]
    Dh,
}

impl WeightClass {
    pub const ALL: [WeightClass; 11] = [
        WeightClass::W125,
        WeightClass::W133,
        WeightClass::W141,
        WeightClass::W149,
        WeightClass::W157,
        WeightClass::W165,
        WeightClass::W174,
        WeightClass::W184,
        WeightClass::W197,
        WeightClass::W285,
        WeightClass::Dh,
    ];

    /// Parse a bare weight token (`"125"`, `"DH"`). Surrounding whitespace is ignored.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightClass::W125 => "125",
            WeightClass::W133 => "133",
            WeightClass::W141 => "141",
            WeightClass::W149 => "149",
            WeightClass::W157 => "157",
            WeightClass::W165 => "165",
            WeightClass::W174 => "174",
            WeightClass::W184 => "184",
            WeightClass::W197 => "197",
            WeightClass::W285 => "285",
            WeightClass::Dh => "DH",
        }
    }

    pub fn is_scoring(self) -> bool {
        self != WeightClass::Dh
    }
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the bracket a bout belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bracket {
    Championship,
    Consolation,
    Placement,
}

impl Bracket {
    /// Advancement points earned per win in this bracket.
    pub fn advancement_per_win(self) -> f64 {
        match self {
            Bracket::Championship => 1.0,
            Bracket::Consolation => 0.5,
            Bracket::Placement => 0.0,
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bracket::Championship => "Champ",
            Bracket::Consolation => "Cons",
            Bracket::Placement => "Place",
        })
    }
}

/// Structured form of a free-text round label.
///
/// `ordinal` orders rounds for display only; it never enters point math.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoundDescriptor {
    pub bracket: Bracket,
    pub ordinal: u8,
    pub label: &'static str,
    pub advancement: f64,
}

/// How a bout was won.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WinMethod {
    Fall,
    TechFall,
    MajorDecision,
    Decision,
    DefaultDq,
    SuddenVictory,
    Tiebreaker,
    Other,
}

impl WinMethod {
    pub const ALL: [WinMethod; 8] = [
        WinMethod::Fall,
        WinMethod::TechFall,
        WinMethod::MajorDecision,
        WinMethod::Decision,
        WinMethod::DefaultDq,
        WinMethod::SuddenVictory,
        WinMethod::Tiebreaker,
        WinMethod::Other,
    ];

    /// Bonus points implied by the method.
    pub fn bonus(self) -> f64 {
        match self {
            WinMethod::Fall | WinMethod::DefaultDq => 2.0,
            WinMethod::TechFall => 1.5,
            WinMethod::MajorDecision => 1.0,
            WinMethod::Decision
            | WinMethod::SuddenVictory
            | WinMethod::Tiebreaker
            | WinMethod::Other => 0.0,
        }
    }

    /// Short code used in the round grid (`W-TF`, `L-SV`, ...).
    pub fn code(self) -> &'static str {
        match self {
            WinMethod::Fall => "Fall",
            WinMethod::TechFall => "TF",
            WinMethod::MajorDecision => "MD",
            WinMethod::Decision => "Dec",
            WinMethod::DefaultDq => "Def/DQ",
            WinMethod::SuddenVictory => "SV",
            WinMethod::Tiebreaker => "TB",
            WinMethod::Other => "Other",
        }
    }

    /// Overtime results get their own loss marker in the grid.
    pub fn is_overtime(self) -> bool {
        matches!(self, WinMethod::SuddenVictory | WinMethod::Tiebreaker)
    }
}

impl fmt::Display for WinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Seed designation: the raw rank string plus its parsed number, if any.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Seed {
    pub raw: String,
    pub rank: Option<u32>,
}

impl Seed {
    /// Parse a seed cell such as `"#4"`, `"4"` or `"4 seed"`.
    ///
    /// Empty input means unseeded and yields `None`. The numeric rank is the
    /// first run of digits; a seed string without digits keeps its raw text.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let digits: String = raw
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        Some(Self {
            raw: raw.to_string(),
            rank: digits.parse().ok(),
        })
    }

    pub fn from_rank(rank: u32) -> Self {
        Self {
            raw: format!("#{rank}"),
            rank: Some(rank),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One drafted wrestler.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RosterEntry {
    pub team: String,
    pub weight: WeightClass,
    pub name: String,
    pub school: String,
    pub seed: Option<Seed>,
}

impl RosterEntry {
    /// `"Name (School)"`, the key every per-wrestler output uses.
    pub fn display_key(&self) -> String {
        format!("{} ({})", self.name, self.school)
    }

    pub fn seed_rank(&self) -> Option<u32> {
        self.seed.as_ref().and_then(|s| s.rank)
    }
}

/// Position of an entry inside its [`Roster`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub usize);

/// The draft as loaded: entries in load order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: EntryId) -> Option<&RosterEntry> {
        self.entries.get(id.0)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &RosterEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (EntryId(idx), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Team names in order of first appearance.
    pub fn teams(&self) -> Vec<&str> {
        let mut teams: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !teams.contains(&entry.team.as_str()) {
                teams.push(entry.team.as_str());
            }
        }
        teams
    }
}

/// One side of a bout as written in the result text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Competitor {
    pub name: String,
    pub school: String,
    pub seed: Option<Seed>,
}

/// Ranks decided by a placement bout (`3rd Place Match` → 3 and 4).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct PlacementPair {
    pub winner: u8,
    pub loser: u8,
}

/// One parsed bout. Built once from a source line and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchEvent {
    pub weight: Option<WeightClass>,
    pub round: RoundDescriptor,
    pub winner: Competitor,
    pub loser: Competitor,
    pub method: WinMethod,
    pub method_text: String,
    pub bonus: f64,
    pub placement: Option<PlacementPair>,
    pub line: String,
}

impl MatchEvent {
    pub fn is_placement_match(&self) -> bool {
        self.placement.is_some()
    }

    /// Advancement value of a win in this bout. Placement bouts never advance.
    pub fn advancement(&self) -> f64 {
        if self.is_placement_match() {
            0.0
        } else {
            self.round.advancement
        }
    }

    pub fn total_points(&self) -> f64 {
        self.advancement() + self.bonus
    }
}

/// Index of a [`MatchEvent`] inside a scoring run's event list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(pub usize);

/// Which resolver rule tied a raw name to a roster entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    NameOverride,
    ProblemList,
    FullName,
    NameOnly,
    LastName,
    WeightSeed,
}

impl MatchRule {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchRule::NameOverride => "name_override",
            MatchRule::ProblemList => "problem_list",
            MatchRule::FullName => "full_name",
            MatchRule::NameOnly => "name_only",
            MatchRule::LastName => "last_name",
            MatchRule::WeightSeed => "weight_seed",
        }
    }

    /// Matches that still score but should be reviewed by an operator.
    pub fn is_low_confidence(self) -> bool {
        matches!(
            self,
            MatchRule::NameOverride | MatchRule::ProblemList | MatchRule::WeightSeed
        )
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bout credited to a wrestler, with the rule that identified them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct CreditedMatch {
    pub event: EventId,
    pub rule: MatchRule,
}

/// Points for a final placement; zero outside 1st-8th.
pub fn placement_points(rank: u32) -> f64 {
    match rank {
        1 => 16.0,
        2 => 12.0,
        3 => 10.0,
        4 => 9.0,
        5 => 7.0,
        6 => 6.0,
        7 => 4.0,
        8 => 3.0,
        _ => 0.0,
    }
}

/// A declared or bout-decided final placement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacementRecord {
    pub name: String,
    pub school: String,
    pub weight: Option<WeightClass>,
    pub rank: u32,
    pub points: f64,
}

impl PlacementRecord {
    pub fn new(name: &str, school: &str, weight: Option<WeightClass>, rank: u32) -> Self {
        Self {
            name: name.to_string(),
            school: school.to_string(),
            weight,
            rank,
            points: placement_points(rank),
        }
    }

    pub fn display_key(&self) -> String {
        format!("{} ({})", self.name, self.school)
    }
}

/// Per-wrestler accumulator. Point fields are derived from `matches` and
/// `placement`; see `total_points`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WrestlerResult {
    pub entry: EntryId,
    pub key: String,
    pub team: String,
    pub weight: WeightClass,
    pub seed: Option<Seed>,
    pub champ_wins: u32,
    pub champ_advancement: f64,
    pub champ_bonus: f64,
    pub cons_wins: u32,
    pub cons_advancement: f64,
    /// Consolation bonus, including bonus earned in placement bouts.
    pub cons_bonus: f64,
    pub placement: Option<u8>,
    pub placement_points: f64,
    pub total_points: f64,
    pub matches: Vec<CreditedMatch>,
}

impl WrestlerResult {
    pub fn new(entry: EntryId, roster_entry: &RosterEntry) -> Self {
        Self {
            entry,
            key: roster_entry.display_key(),
            team: roster_entry.team.clone(),
            weight: roster_entry.weight,
            seed: roster_entry.seed.clone(),
            champ_wins: 0,
            champ_advancement: 0.0,
            champ_bonus: 0.0,
            cons_wins: 0,
            cons_advancement: 0.0,
            cons_bonus: 0.0,
            placement: None,
            placement_points: 0.0,
            total_points: 0.0,
            matches: Vec::new(),
        }
    }

    /// Sum of the five point components.
    pub fn component_sum(&self) -> f64 {
        self.champ_advancement
            + self.champ_bonus
            + self.cons_advancement
            + self.cons_bonus
            + self.placement_points
    }
}

/// One fantasy team's totals, derived from its wrestlers' results.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team: String,
    pub champ_wins: u32,
    pub champ_advancement: f64,
    pub champ_bonus: f64,
    pub cons_wins: u32,
    pub cons_advancement: f64,
    pub cons_bonus: f64,
    pub placement_points: f64,
    pub total_advancement: f64,
    pub total_bonus: f64,
    pub total_points: f64,
    pub wrestlers_with_points: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_tokens_round_trip_and_order() {
        assert_eq!(WeightClass::from_token(" 149 "), Some(WeightClass::W149));
        assert_eq!(WeightClass::from_token("dh"), Some(WeightClass::Dh));
        assert_eq!(WeightClass::from_token("150"), None);
        assert!(WeightClass::W285 < WeightClass::Dh);
        assert!(!WeightClass::Dh.is_scoring());
        assert_eq!(WeightClass::W174.to_string(), "174");
    }

    #[test]
    fn weight_serializes_as_token() {
        let json = serde_json::to_string(&WeightClass::W197).unwrap();
        assert_eq!(json, "\"197\"");
    }

    #[test]
    fn seeds_parse_rank_digits() {
        assert_eq!(Seed::parse(""), None);
        assert_eq!(Seed::parse("#12").unwrap().rank, Some(12));
        assert_eq!(Seed::parse("3").unwrap().rank, Some(3));
        let unranked = Seed::parse("NR").unwrap();
        assert_eq!(unranked.raw, "NR");
        assert_eq!(unranked.rank, None);
    }

    #[test]
    fn placement_table_matches_ncaa_values() {
        let points: Vec<f64> = (1..=8).map(placement_points).collect();
        assert_eq!(points, vec![16.0, 12.0, 10.0, 9.0, 7.0, 6.0, 4.0, 3.0]);
        assert_eq!(placement_points(0), 0.0);
        assert_eq!(placement_points(9), 0.0);
    }

    #[test]
    fn win_method_bonus_values() {
        assert_eq!(WinMethod::Fall.bonus(), 2.0);
        assert_eq!(WinMethod::DefaultDq.bonus(), 2.0);
        assert_eq!(WinMethod::TechFall.bonus(), 1.5);
        assert_eq!(WinMethod::MajorDecision.bonus(), 1.0);
        assert_eq!(WinMethod::SuddenVictory.bonus(), 0.0);
        assert!(WinMethod::Tiebreaker.is_overtime());
    }

    #[test]
    fn roster_lists_teams_in_first_seen_order() {
        let entry = |team: &str, name: &str| RosterEntry {
            team: team.into(),
            weight: WeightClass::W125,
            name: name.into(),
            school: "Iowa".into(),
            seed: None,
        };
        let roster = Roster::new(vec![entry("B", "x"), entry("A", "y"), entry("B", "z")]);
        assert_eq!(roster.teams(), vec!["B", "A"]);
        assert_eq!(roster.get(EntryId(1)).unwrap().display_key(), "y (Iowa)");
    }
}
