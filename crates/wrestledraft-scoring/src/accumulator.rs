//! The two-pass scoring run.
//!
//! Pass 1 collects explicit placement declarations, the watched-name line
//! index and the win-method survey. Pass 2 parses every bout, resolves both
//! sides and credits winners. Finalization then resolves placements and
//! recomputes every wrestler's figures from their credited bouts.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};
use wrestledraft_types::{
    Bracket, CreditedMatch, EntryId, EventId, MatchEvent, PlacementRecord, Roster, WeightClass,
    WinMethod, WrestlerResult, placement_points,
};

use crate::config::ScoringConfig;
use crate::diagnostics::{Diagnostics, LowConfidenceMatch, Mismatch, RunSummary, WatchHits};
use crate::grid::GridBuilder;
use crate::identity::{Candidate, IdentityResolver, Resolution, Role};
use crate::match_line::{method_phrase, parse_match_line};
use crate::placement::{PlacementDeclaration, parse_placement_line};
use crate::rounds::{RoundClassifier, RoundSource};
use crate::{RunStatus, ScoringError, ScoringReport, analytics, teams};

/// What one trimmed line of result text is.
#[derive(Debug)]
enum LineKind<'a> {
    Blank,
    Weight(WeightClass),
    Placement(PlacementDeclaration),
    Header(&'a str),
    Bout(&'a str),
}

fn classify_line(line: &str, weight: Option<WeightClass>) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if let Some(weight) = WeightClass::from_token(line) {
        return LineKind::Weight(weight);
    }
    if let Some(decl) = parse_placement_line(line, weight) {
        return LineKind::Placement(decl);
    }
    if !line.contains('-') {
        return LineKind::Header(line);
    }
    LineKind::Bout(line)
}

/// Recompute a wrestler's figures from their credited bouts and placement.
///
/// Pure in `matches`, `placement` and `events`: earlier totals are discarded.
pub fn recompute(result: &mut WrestlerResult, events: &[MatchEvent]) {
    result.champ_wins = 0;
    result.champ_bonus = 0.0;
    result.cons_wins = 0;
    result.cons_bonus = 0.0;

    for credited in &result.matches {
        let Some(event) = events.get(credited.event.0) else {
            continue;
        };
        if event.is_placement_match() {
            result.cons_bonus += event.bonus;
            continue;
        }
        match event.round.bracket {
            Bracket::Championship => {
                result.champ_wins += 1;
                result.champ_bonus += event.bonus;
            }
            Bracket::Consolation => {
                result.cons_wins += 1;
                result.cons_bonus += event.bonus;
            }
            Bracket::Placement => result.cons_bonus += event.bonus,
        }
    }

    result.champ_advancement =
        f64::from(result.champ_wins) * Bracket::Championship.advancement_per_win();
    result.cons_advancement =
        f64::from(result.cons_wins) * Bracket::Consolation.advancement_per_win();
    result.placement_points = result
        .placement
        .map(|rank| placement_points(u32::from(rank)))
        .unwrap_or(0.0);
    result.total_points = result.component_sum();
}

/// Placement records in discovery order, first writer wins per identity.
#[derive(Debug, Default)]
struct PlacementBook {
    records: Vec<PlacementRecord>,
    seen: HashMap<(String, String), usize>,
}

impl PlacementBook {
    fn insert(&mut self, key: (String, String), record: PlacementRecord) -> bool {
        if self.seen.contains_key(&key) {
            return false;
        }
        self.seen.insert(key, self.records.len());
        self.records.push(record);
        true
    }
}

struct Accumulator<'r> {
    roster: &'r Roster,
    resolver: IdentityResolver<'r>,
    watch: Vec<String>,
    diagnostics: Diagnostics,
    summary: RunSummary,
    placements: PlacementBook,
    events: Vec<MatchEvent>,
    results: BTreeMap<EntryId, WrestlerResult>,
    grid: GridBuilder,
    mismatches: Vec<Mismatch>,
}

impl<'r> Accumulator<'r> {
    fn new(roster: &'r Roster, config: &ScoringConfig) -> Self {
        let diagnostics = Diagnostics {
            watch_hits: config
                .indexed_names()
                .into_iter()
                .map(|name| WatchHits {
                    name,
                    lines: Vec::new(),
                })
                .collect(),
            ..Diagnostics::default()
        };
        Self {
            roster,
            resolver: IdentityResolver::new(roster, config),
            watch: config.watch_list.iter().map(|w| w.to_lowercase()).collect(),
            diagnostics,
            summary: RunSummary::default(),
            placements: PlacementBook::default(),
            events: Vec::new(),
            results: BTreeMap::new(),
            grid: GridBuilder::default(),
            mismatches: Vec::new(),
        }
    }

    fn mentions_watched(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.watch.iter().any(|w| lowered.contains(w.as_str()))
    }

    fn placement_key(&self, name: &str, school: &str) -> (String, String) {
        let normalizer = self.resolver.normalizer();
        (normalizer.normalize(name), normalizer.normalize(school))
    }

    fn record_placement(&mut self, record: PlacementRecord, source: &str) {
        let key = self.placement_key(&record.name, &record.school);
        let message = format!("placement {} for {} from {source}", record.rank, record.display_key());
        if self.placements.insert(key, record) {
            debug!("{message}");
            self.diagnostics.debug(message);
        } else {
            debug!("{message} ignored; an earlier placement stands");
        }
    }

    fn discover(&mut self, text: &str) {
        let mut rounds = RoundClassifier::new();
        let mut weight = None;
        for raw in text.lines() {
            self.summary.lines_scanned += 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            self.diagnostics.index_watch_hits(line);
            if let Some(phrase) = method_phrase(line) {
                self.diagnostics.win_method_texts.insert(phrase.to_string());
            }
            match classify_line(line, weight) {
                LineKind::Blank => {}
                LineKind::Weight(w) => weight = Some(w),
                LineKind::Placement(decl) => {
                    self.record_placement(decl.into_record(), "declaration");
                }
                LineKind::Header(header) => {
                    if rounds.observe_header(header) {
                        self.diagnostics.debug(format!("section header: {header}"));
                    }
                }
                LineKind::Bout(line) => {
                    if self.mentions_watched(line) {
                        let lowered = line.to_lowercase();
                        if lowered.contains("sudden victory")
                            || line.contains("SV-1")
                            || lowered.contains("tie breaker")
                            || line.contains("TB-1")
                        {
                            self.diagnostics
                                .problem(format!("possible overtime bout for a watched name: {line}"));
                        }
                    }
                }
            }
        }
        info!(
            "discovery pass: {} lines, {} placement records",
            self.summary.lines_scanned,
            self.placements.records.len()
        );
    }

    fn score_lines(&mut self, text: &str) {
        let mut rounds = RoundClassifier::new();
        let mut weight = None;
        for raw in text.lines() {
            match classify_line(raw.trim(), weight) {
                LineKind::Blank | LineKind::Placement(_) => {}
                LineKind::Weight(w) => weight = Some(w),
                LineKind::Header(header) => {
                    rounds.observe_header(header);
                }
                LineKind::Bout(line) => {
                    let (round, source) = rounds.classify(line);
                    if source == RoundSource::Default {
                        self.diagnostics.problem(format!(
                            "no round named before line, scored as {}: {line}",
                            round.label
                        ));
                    }
                    match parse_match_line(line, weight, &round) {
                        Some(event) => self.score_event(event),
                        None => self.unparsed(line),
                    }
                }
            }
        }
    }

    fn unparsed(&mut self, line: &str) {
        debug!("unparsed line: {line}");
        self.diagnostics.unparsed_lines.push(line.to_string());
        if self.mentions_watched(line) {
            self.diagnostics
                .problem(format!("failed to parse line with a watched name: {line}"));
        }
    }

    fn score_event(&mut self, event: MatchEvent) {
        self.summary.matches_processed += 1;
        let id = EventId(self.events.len());

        match event.method {
            WinMethod::SuddenVictory => {
                self.summary.sudden_victory += 1;
                self.diagnostics
                    .problem(format!("sudden victory bout: {}", event.line));
            }
            WinMethod::Tiebreaker => {
                self.summary.tiebreaker += 1;
                self.diagnostics.problem(format!("tiebreaker bout: {}", event.line));
            }
            _ => {}
        }

        if let Some(pair) = event.placement {
            let source = format!("{} bout", event.round.label);
            self.record_placement(
                PlacementRecord::new(
                    &event.winner.name,
                    &event.winner.school,
                    event.weight,
                    u32::from(pair.winner),
                ),
                &source,
            );
            self.record_placement(
                PlacementRecord::new(
                    &event.loser.name,
                    &event.loser.school,
                    event.weight,
                    u32::from(pair.loser),
                ),
                &source,
            );
        }

        self.grid.observe(event.round.label);

        let winner = self.resolver.resolve(&Candidate {
            name: &event.winner.name,
            school: &event.winner.school,
            weight: event.weight,
            seed: event.winner.seed.as_ref().and_then(|s| s.rank),
            role: Role::Winner,
        });
        match winner {
            Some(resolution) => self.credit_winner(id, &event, resolution),
            None => {
                self.summary.matches_missed += 1;
                warn!(
                    "no roster match for winner {} ({}) at {}",
                    event.winner.name,
                    event.winner.school,
                    event.weight.map(|w| w.as_str()).unwrap_or("?")
                );
                self.mismatches.push(Mismatch {
                    name: event.winner.name.clone(),
                    school: event.winner.school.clone(),
                    weight: event.weight,
                    seed: event.winner.seed.clone(),
                    method: event.method,
                    method_text: event.method_text.clone(),
                    points: event.total_points(),
                    line: event.line.clone(),
                });
            }
        }

        let loser = self.resolver.resolve(&Candidate {
            name: &event.loser.name,
            school: &event.loser.school,
            weight: event.weight,
            seed: None,
            role: Role::Loser,
        });
        match loser {
            Some(resolution) => {
                if resolution.rule.is_low_confidence() {
                    self.diagnostics.problem(format!(
                        "loser {} ({}) matched by {}: {}",
                        event.loser.name, event.loser.school, resolution.rule, event.line
                    ));
                }
                self.grid
                    .record_loss(resolution.entry, event.round.label, event.method);
            }
            None => {
                let message = format!(
                    "no roster match for loser {} ({})",
                    event.loser.name, event.loser.school
                );
                debug!("{message}");
                self.diagnostics.debug(message);
            }
        }

        self.events.push(event);
    }

    fn credit_winner(&mut self, id: EventId, event: &MatchEvent, resolution: Resolution) {
        let roster = self.roster;
        let Some(entry) = roster.get(resolution.entry) else {
            return;
        };
        self.summary.matches_found += 1;
        if resolution.rule.is_low_confidence() {
            self.diagnostics.problem(format!(
                "winner {} ({}) matched {} by {}",
                event.winner.name,
                event.winner.school,
                entry.display_key(),
                resolution.rule
            ));
            self.diagnostics.low_confidence.push(LowConfidenceMatch {
                raw_name: event.winner.name.clone(),
                raw_school: event.winner.school.clone(),
                resolved: entry.display_key(),
                rule: resolution.rule,
                line: event.line.clone(),
            });
        }
        self.grid
            .record_win(resolution.entry, event.round.label, event.method);
        if !entry.weight.is_scoring() {
            let message = format!(
                "{} holds the non-scoring {} slot; {} win not credited",
                entry.display_key(),
                entry.weight,
                event.round.label
            );
            debug!("{message}");
            self.diagnostics.debug(message);
            return;
        }
        self.results
            .entry(resolution.entry)
            .or_insert_with(|| WrestlerResult::new(resolution.entry, entry))
            .matches
            .push(CreditedMatch {
                event: id,
                rule: resolution.rule,
            });
    }

    /// Attach placements to entries, recompute every result and assemble
    /// the report.
    fn finalize(mut self) -> ScoringReport {
        let roster = self.roster;
        let mut placed: HashMap<EntryId, u32> = HashMap::new();
        for record in &self.placements.records {
            let resolution = self.resolver.resolve(&Candidate {
                name: &record.name,
                school: &record.school,
                weight: record.weight,
                seed: None,
                role: Role::Loser,
            });
            match resolution {
                Some(resolution) => {
                    placed.entry(resolution.entry).or_insert(record.rank);
                }
                None => debug!("placement for undrafted {}", record.display_key()),
            }
        }

        for (id, rank) in placed {
            let Some(entry) = roster.get(id) else {
                continue;
            };
            if !entry.weight.is_scoring() {
                debug!("placement {rank} for non-scoring {} ignored", entry.display_key());
                continue;
            }
            let result = self
                .results
                .entry(id)
                .or_insert_with(|| WrestlerResult::new(id, entry));
            result.placement = u8::try_from(rank).ok();
        }

        for result in self.results.values_mut() {
            recompute(result, &self.events);
        }

        self.diagnostics.missing_wrestlers = roster
            .iter()
            .filter(|(id, _)| !self.results.contains_key(id))
            .map(|(_, entry)| entry.display_key())
            .collect();
        for key in &self.diagnostics.missing_wrestlers {
            debug!("no results for {key}");
        }

        self.summary.placements = self.placements.records.len();
        let mut wrestlers: Vec<WrestlerResult> = self.results.into_values().collect();
        wrestlers.sort_by(|a, b| a.team.cmp(&b.team).then(a.weight.cmp(&b.weight)));
        let standings = teams::aggregate(&wrestlers);
        let analysis = analytics::analyze(roster, &wrestlers, &self.events);

        info!(
            "scored {} bouts: {} winners matched, {} missed, {} placements",
            self.summary.matches_processed,
            self.summary.matches_found,
            self.summary.matches_missed,
            self.summary.placements
        );

        ScoringReport {
            status: RunStatus::Complete,
            wrestlers,
            events: self.events,
            rounds: self.grid.finish(roster),
            placements: self.placements.records,
            mismatches: self.mismatches,
            standings,
            analysis,
            summary: self.summary,
            diagnostics: self.diagnostics,
        }
    }
}

/// Score `text` against `roster`.
///
/// Fails only when there is nothing to score; every per-line problem lands in
/// the report's diagnostics instead.
pub fn score(
    roster: &Roster,
    text: &str,
    config: &ScoringConfig,
) -> Result<ScoringReport, ScoringError> {
    if roster.is_empty() {
        return Err(ScoringError::EmptyRoster);
    }
    if text.trim().is_empty() {
        return Err(ScoringError::EmptyResults);
    }
    let mut acc = Accumulator::new(roster, config);
    acc.discover(text);
    acc.score_lines(text);
    Ok(acc.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrestledraft_types::{MatchRule, RosterEntry, Seed};

    fn entry(team: &str, weight: WeightClass, name: &str, school: &str, seed: Option<u32>) -> RosterEntry {
        RosterEntry {
            team: team.into(),
            weight,
            name: name.into(),
            school: school.into(),
            seed: seed.map(Seed::from_rank),
        }
    }

    fn roster() -> Roster {
        Roster::new(vec![
            entry("A", WeightClass::W125, "Jane Doe", "State U", Some(1)),
            entry("B", WeightClass::W125, "John Roe", "Tech", Some(8)),
        ])
    }

    fn score_text(text: &str) -> ScoringReport {
        score(&roster(), text, &ScoringConfig::empty()).unwrap()
    }

    fn wrestler<'a>(report: &'a ScoringReport, key: &str) -> &'a WrestlerResult {
        report.wrestlers.iter().find(|w| w.key == key).unwrap()
    }

    #[test]
    fn line_kinds() {
        assert!(matches!(classify_line("", None), LineKind::Blank));
        assert!(matches!(classify_line("285", None), LineKind::Weight(WeightClass::W285)));
        assert!(matches!(
            classify_line("1st: Jane Doe (State U)", None),
            LineKind::Placement(_)
        ));
        assert!(matches!(classify_line("Quarterfinal", None), LineKind::Header(_)));
        assert!(matches!(
            classify_line("Quarterfinal - A (B) won by fall over C (D)", None),
            LineKind::Bout(_)
        ));
    }

    #[test]
    fn empty_inputs_cannot_proceed() {
        let err = score(&Roster::default(), "125", &ScoringConfig::empty()).unwrap_err();
        assert!(matches!(err, ScoringError::EmptyRoster));
        let err = score(&roster(), "  \n ", &ScoringConfig::empty()).unwrap_err();
        assert!(matches!(err, ScoringError::EmptyResults));
    }

    #[test]
    fn credits_winner_and_marks_loser() {
        let report = score_text(
            "125\nChamp. Round 1 - Jane Doe (State U) won by decision over John Roe (Tech)\n\
             Cons. Round 2 - John Roe (Tech) won by fall over Someone Else (Nowhere)\n",
        );
        let jane = wrestler(&report, "Jane Doe (State U)");
        assert_eq!(jane.champ_wins, 1);
        assert_eq!(jane.champ_advancement, 1.0);
        assert_eq!(jane.champ_bonus, 0.0);
        assert_eq!(jane.total_points, 1.0);
        assert_eq!(jane.matches[0].rule, MatchRule::FullName);

        let john = wrestler(&report, "John Roe (Tech)");
        assert_eq!(john.cons_wins, 1);
        assert_eq!(john.cons_advancement, 0.5);
        assert_eq!(john.cons_bonus, 2.0);
        assert_eq!(john.total_points, 2.5);

        let john_row = report.rounds.rows.iter().find(|r| r.name == "John Roe").unwrap();
        assert_eq!(john_row.cells["Champ. R1"], "L");
        assert_eq!(john_row.cells["Cons. R2"], "W-Fall");
        assert_eq!(report.rounds.columns, vec!["Champ. R1", "Cons. R2"]);
        assert_eq!(report.summary.matches_processed, 2);
        assert_eq!(report.summary.matches_found, 2);
        assert!(report.mismatches.is_empty());
    }

    #[test]
    fn unresolved_winner_is_a_mismatch() {
        let report = score_text(
            "125\nQuarterfinal - Ghost Wrestler (Nowhere) won by tech fall over Jane Doe (State U)\n",
        );
        assert_eq!(report.summary.matches_missed, 1);
        let miss = &report.mismatches[0];
        assert_eq!(miss.name, "Ghost Wrestler");
        assert_eq!(miss.weight, Some(WeightClass::W125));
        assert_eq!(miss.points, 2.5);
        assert_eq!(report.rounds.rows[0].cells["Quarters"], "L");
        assert!(report.wrestlers.is_empty());
        assert_eq!(report.diagnostics.missing_wrestlers.len(), 2);
    }

    #[test]
    fn first_placement_declaration_wins() {
        let report = score_text(
            "125\n1st: Jane Doe (State U)\n3rd: Jane Doe (State U)\n\
             1st Place Match - John Roe (Tech) won by fall over Jane Doe (State U)\n",
        );
        let jane = wrestler(&report, "Jane Doe (State U)");
        assert_eq!(jane.placement, Some(1));
        assert_eq!(jane.placement_points, 16.0);
        assert_eq!(jane.total_points, 16.0);

        let john = wrestler(&report, "John Roe (Tech)");
        assert_eq!(john.placement, Some(1));
        assert_eq!(john.champ_wins, 0);
        assert_eq!(john.cons_bonus, 2.0);
        assert_eq!(john.total_points, 18.0);
        assert_eq!(report.placements.len(), 2);
    }

    #[test]
    fn placement_bout_sets_both_ranks() {
        let report = score_text(
            "125\n3rd Place Match - Jane Doe (State U) won by major decision over John Roe (Tech)\n",
        );
        let jane = wrestler(&report, "Jane Doe (State U)");
        assert_eq!(jane.placement, Some(3));
        assert_eq!(jane.champ_advancement + jane.cons_advancement, 0.0);
        assert_eq!(jane.cons_bonus, 1.0);
        assert_eq!(jane.total_points, 11.0);
        let john = wrestler(&report, "John Roe (Tech)");
        assert_eq!(john.placement, Some(4));
        assert_eq!(john.total_points, 9.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let report = score_text(
            "125\nChamp. Round 1 - Jane Doe (State U) won by fall over John Roe (Tech)\n\
             Quarterfinal - Jane Doe (State U) won by tech fall over X Y (Z)\n\
             Cons. Round 1 - John Roe (Tech) won by major decision over X Y (Z)\n\
             5th Place Match - John Roe (Tech) won by decision over Q R (S)\n",
        );
        for result in &report.wrestlers {
            assert_eq!(result.total_points, result.component_sum());
            let mut again = result.clone();
            recompute(&mut again, &report.events);
            assert_eq!(&again, result);
            recompute(&mut again, &report.events);
            assert_eq!(again.total_points.to_bits(), result.total_points.to_bits());
        }
        let jane = wrestler(&report, "Jane Doe (State U)");
        assert_eq!(jane.total_points, 2.0 + 2.0 + 1.5);
        let john = wrestler(&report, "John Roe (Tech)");
        assert_eq!(john.placement, Some(5));
        assert_eq!(john.total_points, 0.5 + 1.0 + 7.0);
    }

    #[test]
    fn bout_without_a_round_is_flagged() {
        let report = score_text(
            "125\nMat 3 - Jane Doe (State U) won by decision over John Roe (Tech)\n\
             Quarterfinal\n\
             Mat 4 - Jane Doe (State U) won by fall over Kim Poe (Army)\n",
        );
        let problems: Vec<_> = report
            .diagnostics
            .problems
            .iter()
            .filter(|p| p.starts_with("no round named"))
            .collect();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("scored as Unknown: Mat 3"));

        let jane = wrestler(&report, "Jane Doe (State U)");
        assert_eq!(jane.champ_wins, 2);
        assert_eq!(report.rounds.rows[0].cells["Quarters"], "W-Fall");
    }

    #[test]
    fn dh_slot_never_scores() {
        let roster = Roster::new(vec![
            entry("A", WeightClass::Dh, "Dee Aitch", "State U", Some(2)),
            entry("B", WeightClass::W125, "Jane Doe", "State U", Some(1)),
        ]);
        let text = "DH
                    Champ. Round 1 - Dee Aitch (State U) won by fall over John Roe (Tech)
                    1st Place Match - Dee Aitch (State U) won by major decision over Kim Poe (Army)
                    1st: Dee Aitch (State U)
";
        let report = score(&roster, text, &ScoringConfig::empty()).unwrap();
        assert!(report.wrestlers.is_empty());
        assert!(report.standings.is_empty());
        assert_eq!(report.summary.matches_found, 2);
        assert!(
            report
                .diagnostics
                .missing_wrestlers
                .contains(&"Dee Aitch (State U)".to_string())
        );

        let row = report
            .rounds
            .rows
            .iter()
            .find(|r| r.weight == WeightClass::Dh)
            .unwrap();
        assert_eq!(row.cells["Champ. R1"], "W-Fall");
        assert_eq!(row.cells["Finals"], "W-MD");
    }

    #[test]
    fn unparsed_lines_are_collected() {
        let report = score_text("125\nQuarterfinal - this line has no result\n");
        assert_eq!(report.diagnostics.unparsed_lines, vec!["Quarterfinal - this line has no result"]);
        assert_eq!(report.summary.matches_processed, 0);
        assert_eq!(report.status, RunStatus::Complete);
    }
}
