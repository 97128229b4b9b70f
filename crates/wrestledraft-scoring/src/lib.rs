//! Results parsing and scoring for a draft league built on an NCAA wrestling
//! tournament.
//!
//! Free-form result text goes in, together with the drafted [`Roster`]; a
//! [`ScoringReport`] comes out with per-wrestler results, the round-by-round
//! grid, placements, team standings and everything an operator needs to fix
//! unmatched names.
//!
//! ```rust
//! use wrestledraft_scoring::{ScoringConfig, run};
//! use wrestledraft_types::{Roster, RosterEntry, WeightClass};
//!
//! let roster = Roster::new(vec![RosterEntry {
//!     team: "Big Cat".into(),
//!     weight: WeightClass::W125,
//!     name: "Jane Doe".into(),
//!     school: "State U".into(),
//!     seed: None,
//! }]);
//! let text = "125\nCons. Round 2 - Jane Doe (State U) won by fall over John Roe (Tech)\n";
//! let report = run(&roster, text, &ScoringConfig::default());
//! assert_eq!(report.standings[0].total_points, 2.5);
//! ```

pub mod accumulator;
pub mod analytics;
pub mod config;
pub mod diagnostics;
pub mod grid;
pub mod identity;
pub mod match_line;
pub mod normalize;
pub mod placement;
pub mod rounds;
pub mod teams;

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use thiserror::Error;
use tracing::error;
use wrestledraft_types::{
    EventId, MatchEvent, PlacementRecord, Roster, TeamStanding, WrestlerResult,
};

pub use accumulator::{recompute, score};
pub use analytics::{Analysis, MethodShare, TeamPlacements, TeamWinProfile};
pub use config::{ConfigError, NameOverride, ScoringConfig};
pub use diagnostics::{Diagnostics, LowConfidenceMatch, Mismatch, RunSummary, WatchHits};
pub use grid::{RoundGrid, RoundRow};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("cannot proceed: the roster has no entries")]
    EmptyRoster,
    #[error("cannot proceed: the results text is empty")]
    EmptyResults,
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    /// Inputs were missing or empty; nothing was scored.
    CannotProceed { reason: String },
    /// Scoring itself failed; nothing was scored.
    Failed { reason: String },
}

/// Everything one scoring run produces.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoringReport {
    pub status: RunStatus,
    /// Wrestlers with at least one credited bout or a placement, by team
    /// then weight.
    pub wrestlers: Vec<WrestlerResult>,
    /// Every parsed bout; [`wrestledraft_types::CreditedMatch`] points here.
    pub events: Vec<MatchEvent>,
    pub rounds: RoundGrid,
    pub placements: Vec<PlacementRecord>,
    pub mismatches: Vec<Mismatch>,
    pub standings: Vec<TeamStanding>,
    pub analysis: Analysis,
    pub summary: RunSummary,
    pub diagnostics: Diagnostics,
}

impl ScoringReport {
    /// A report with no results.
    pub fn empty(status: RunStatus) -> Self {
        Self {
            status,
            wrestlers: Vec::new(),
            events: Vec::new(),
            rounds: RoundGrid::default(),
            placements: Vec::new(),
            mismatches: Vec::new(),
            standings: Vec::new(),
            analysis: Analysis::default(),
            summary: RunSummary::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn cannot_proceed(reason: impl Into<String>) -> Self {
        Self::empty(RunStatus::CannotProceed {
            reason: reason.into(),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// Look up a wrestler by `"Name (School)"`.
    pub fn wrestler(&self, key: &str) -> Option<&WrestlerResult> {
        self.wrestlers.iter().find(|w| w.key == key)
    }

    pub fn event(&self, id: EventId) -> Option<&MatchEvent> {
        self.events.get(id.0)
    }
}

/// Score `text` against `roster`, never failing past this call.
///
/// Empty inputs yield an empty report with [`RunStatus::CannotProceed`]; a
/// panic inside scoring is logged and yields [`RunStatus::Failed`].
pub fn run(roster: &Roster, text: &str, config: &ScoringConfig) -> ScoringReport {
    match panic::catch_unwind(AssertUnwindSafe(|| score(roster, text, config))) {
        Ok(Ok(report)) => report,
        Ok(Err(err)) => {
            error!("{err}");
            ScoringReport::cannot_proceed(err.to_string())
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "scoring panicked".to_string());
            error!(
                "scoring failed ({} roster entries, {} bytes of results): {reason}",
                roster.len(),
                text.len()
            );
            ScoringReport::empty(RunStatus::Failed { reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_become_cannot_proceed() {
        let report = run(&Roster::default(), "125\n", &ScoringConfig::default());
        assert!(!report.is_complete());
        assert!(matches!(report.status, RunStatus::CannotProceed { .. }));
        assert!(report.wrestlers.is_empty());
        assert!(report.standings.is_empty());
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(RunStatus::CannotProceed {
            reason: "missing".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "cannot_proceed");
        assert_eq!(json["reason"], "missing");
        let json = serde_json::to_value(RunStatus::Complete).unwrap();
        assert_eq!(json["state"], "complete");
    }
}
