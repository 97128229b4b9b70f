//! Round classification.
//!
//! Round labels in result text are free-form ("Cons. Round 3", "Quarterfinal",
//! "Champ Round 1"). A fixed table maps every known spelling to a
//! [`RoundDescriptor`]. Lookups are ASCII case-insensitive substring scans that
//! try longer spellings first, so "Consolation Pig Tails" never resolves to
//! the championship "Pig Tails".

use std::sync::LazyLock;

use tracing::{debug, warn};
use wrestledraft_types::{Bracket, RoundDescriptor};

const fn champ(ordinal: u8, label: &'static str) -> RoundDescriptor {
    RoundDescriptor {
        bracket: Bracket::Championship,
        ordinal,
        label,
        advancement: 1.0,
    }
}

const fn cons(ordinal: u8, label: &'static str) -> RoundDescriptor {
    RoundDescriptor {
        bracket: Bracket::Consolation,
        ordinal,
        label,
        advancement: 0.5,
    }
}

const fn placement(bracket: Bracket, ordinal: u8, label: &'static str) -> RoundDescriptor {
    RoundDescriptor {
        bracket,
        ordinal,
        label,
        advancement: 0.0,
    }
}

pub const PRELIM: RoundDescriptor = champ(0, "Prelim");
pub const CONS_PIG_TAILS: RoundDescriptor = cons(0, "Cons. Pig Tails");
pub const FINALS: RoundDescriptor = placement(Bracket::Championship, 5, "Finals");

/// Fallback when neither the line nor the current section names a round.
pub const UNKNOWN: RoundDescriptor = champ(0, "Unknown");

const ROUND_NAMES: &[(&str, RoundDescriptor)] = &[
    ("Prelim", PRELIM),
    ("Pig Tails", champ(0, "Pig Tails")),
    ("Champ. Round 1", champ(1, "Champ. R1")),
    ("Champ Round 1", champ(1, "Champ. R1")),
    ("Champ. Round 2", champ(2, "Champ. R2")),
    ("Champ Round 2", champ(2, "Champ. R2")),
    ("Quarterfinal", champ(3, "Quarters")),
    ("Semifinal", champ(4, "Semis")),
    ("1st Place Match", FINALS),
    ("Championships", FINALS),
    ("Consolation Pig Tails", CONS_PIG_TAILS),
    ("Cons. Pig Tails", CONS_PIG_TAILS),
    ("Cons. Round 1", cons(1, "Cons. R1")),
    ("Cons. Round 2", cons(2, "Cons. R2")),
    ("Cons. Round 3", cons(3, "Cons. R3")),
    ("Cons. Round 4", cons(4, "Cons. R4")),
    ("Cons. Round 5", cons(5, "Cons. R5")),
    ("Cons Round 1", cons(1, "Cons. R1")),
    ("Cons Round 2", cons(2, "Cons. R2")),
    ("Cons Round 3", cons(3, "Cons. R3")),
    ("Cons Round 4", cons(4, "Cons. R4")),
    ("Cons Round 5", cons(5, "Cons. R5")),
    ("Cons. Semi", cons(6, "Cons. Semis")),
    ("3rd Place Match", placement(Bracket::Placement, 7, "3rd Place")),
    ("5th Place Match", placement(Bracket::Placement, 7, "5th Place")),
    ("7th Place Match", placement(Bracket::Placement, 7, "7th Place")),
];

/// Grid column order for the canonical labels.
pub const CANONICAL_LABELS: [&str; 17] = [
    "Prelim",
    "Pig Tails",
    "Champ. R1",
    "Champ. R2",
    "Quarters",
    "Semis",
    "Finals",
    "Cons. Pig Tails",
    "Cons. R1",
    "Cons. R2",
    "Cons. R3",
    "Cons. R4",
    "Cons. R5",
    "Cons. Semis",
    "3rd Place",
    "5th Place",
    "7th Place",
];

/// `(lowercased spelling, descriptor)`, longest spelling first.
static SCAN_ORDER: LazyLock<Vec<(String, RoundDescriptor)>> = LazyLock::new(|| {
    let mut names: Vec<(String, RoundDescriptor)> = ROUND_NAMES
        .iter()
        .map(|(name, desc)| (name.to_ascii_lowercase(), *desc))
        .collect();
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    names
});

/// Find the first known round spelling contained in `text`.
pub fn lookup(text: &str) -> Option<RoundDescriptor> {
    let haystack = text.to_ascii_lowercase();
    SCAN_ORDER
        .iter()
        .find(|(name, _)| haystack.contains(name.as_str()))
        .map(|(_, desc)| *desc)
}

/// Position of a label in [`CANONICAL_LABELS`].
pub fn canonical_rank(label: &str) -> Option<usize> {
    CANONICAL_LABELS.iter().position(|l| *l == label)
}

/// Where a classification came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundSource {
    Line,
    Section,
    PrelimSection,
    Default,
}

/// Tracks the current section header and classifies match lines against it.
#[derive(Clone, Debug, Default)]
pub struct RoundClassifier {
    section: Option<RoundDescriptor>,
}

impl RoundClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a header candidate. The section only changes when the line names
    /// a known round; anything else is ignored.
    pub fn observe_header(&mut self, line: &str) -> bool {
        match lookup(line) {
            Some(desc) => {
                debug!("section header {:?} -> {}", line.trim(), desc.label);
                self.section = Some(desc);
                true
            }
            None => false,
        }
    }

    /// Classify a match line: the line's own text first, then the current
    /// section, then [`UNKNOWN`].
    pub fn classify(&self, line: &str) -> (RoundDescriptor, RoundSource) {
        if line.trim_start().starts_with("Prelim -") {
            let desc = match self.section {
                Some(section) if section == CONS_PIG_TAILS => CONS_PIG_TAILS,
                _ => PRELIM,
            };
            debug!("prelim bout assigned to {} bracket", desc.bracket);
            return (desc, RoundSource::PrelimSection);
        }
        if let Some(desc) = lookup(line) {
            return (desc, RoundSource::Line);
        }
        if let Some(section) = self.section {
            debug!("round taken from section header {}", section.label);
            return (section, RoundSource::Section);
        }
        warn!("no round found for line, defaulting to championship round 0: {line}");
        (UNKNOWN, RoundSource::Default)
    }
}
