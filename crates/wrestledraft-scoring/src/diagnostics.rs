use std::collections::BTreeSet;

use serde::Serialize;
use wrestledraft_types::{MatchRule, Seed, WeightClass, WinMethod};

/// A bout whose winner could not be tied to the roster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    pub name: String,
    pub school: String,
    pub weight: Option<WeightClass>,
    pub seed: Option<Seed>,
    pub method: WinMethod,
    pub method_text: String,
    pub points: f64,
    pub line: String,
}

/// A credited resolution an operator should double-check.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LowConfidenceMatch {
    pub raw_name: String,
    pub raw_school: String,
    pub resolved: String,
    pub rule: MatchRule,
    pub line: String,
}

/// Lines mentioning one watched name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WatchHits {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub lines_scanned: usize,
    pub matches_processed: usize,
    pub matches_found: usize,
    pub matches_missed: usize,
    pub sudden_victory: usize,
    pub tiebreaker: usize,
    pub placements: usize,
}

/// Everything a run noticed that is not a score.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub debug: Vec<String>,
    pub problems: Vec<String>,
    pub unparsed_lines: Vec<String>,
    pub win_method_texts: BTreeSet<String>,
    pub watch_hits: Vec<WatchHits>,
    pub low_confidence: Vec<LowConfidenceMatch>,
    pub missing_wrestlers: Vec<String>,
}

impl Diagnostics {
    pub fn debug(&mut self, message: impl Into<String>) {
        self.debug.push(message.into());
    }

    pub fn problem(&mut self, message: impl Into<String>) {
        self.problems.push(message.into());
    }

    /// Record `line` under every watched name it mentions.
    pub(crate) fn index_watch_hits(&mut self, line: &str) {
        let lowered = line.to_lowercase();
        for hits in &mut self.watch_hits {
            if lowered.contains(&hits.name.to_lowercase()) {
                hits.lines.push(line.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_index_is_case_insensitive() {
        let mut diagnostics = Diagnostics {
            watch_hits: vec![
                WatchHits { name: "Smith".into(), lines: Vec::new() },
                WatchHits { name: "Caleb Smith".into(), lines: Vec::new() },
            ],
            ..Diagnostics::default()
        };
        diagnostics.index_watch_hits("Semifinal - CALEB SMITH (Nebraska) won by fall over X (Y)");
        diagnostics.index_watch_hits("Semifinal - Tom Smithers (Iowa) won by fall over X (Y)");
        assert_eq!(diagnostics.watch_hits[0].lines.len(), 2);
        assert_eq!(diagnostics.watch_hits[1].lines.len(), 1);
    }
}
