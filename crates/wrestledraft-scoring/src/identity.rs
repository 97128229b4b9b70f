//! Resolve raw (name, school) pairs from result text to roster entries.
//!
//! Resolution is an ordered cascade; the first rule that produces an entry
//! wins and is reported back as a [`MatchRule`]:
//!
//! 1. direct name overrides from the scoring config;
//! 2. the problem-wrestler registry, unless the pair already matches exactly;
//! 3. exact (name, school);
//! 4. name only;
//! 5. last name + school;
//! 6. weight + seed, for bout winners only.
//!
//! Every name rule first tries the normalized spelling as printed. Only when
//! that misses does it try [`Normalizer::normalize_wrestler_name`], where the
//! known phonetic variants meet on a shared stem, and a stem key is used only
//! when exactly one drafted wrestler carries it. Two drafted wrestlers whose
//! names differ by a stemmed variant therefore never share a result.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, warn};
use wrestledraft_types::{EntryId, MatchRule, Roster, WeightClass};

use crate::config::ScoringConfig;
use crate::normalize::{Normalizer, first_token, last_token};

/// Which side of a bout is being resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Winner,
    Loser,
}

/// A raw identity as printed in the result text.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub school: &'a str,
    pub weight: Option<WeightClass>,
    pub seed: Option<u32>,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub entry: EntryId,
    pub rule: MatchRule,
}

#[derive(Debug)]
struct ProblemEntry {
    entry: EntryId,
    name: String,
    weight: WeightClass,
}

pub struct IdentityResolver<'r> {
    roster: &'r Roster,
    normalizer: Normalizer,
    overrides: HashMap<String, EntryId>,
    problems: Vec<ProblemEntry>,
    exact: HashMap<(String, String), EntryId>,
    stemmed: HashMap<(String, String), Vec<EntryId>>,
    name_only: HashMap<String, EntryId>,
    stemmed_name_only: HashMap<String, Vec<EntryId>>,
    last_school: HashMap<(String, String), EntryId>,
    stemmed_last_school: HashMap<(String, String), Vec<EntryId>>,
    weight_seed: HashMap<(WeightClass, u32), EntryId>,
}

impl<'r> IdentityResolver<'r> {
    pub fn new(roster: &'r Roster, config: &ScoringConfig) -> Self {
        let normalizer = Normalizer::new(config);
        let watch: Vec<String> = config.watch_list.iter().map(|w| w.to_lowercase()).collect();

        let mut resolver = Self {
            roster,
            normalizer,
            overrides: HashMap::new(),
            problems: Vec::new(),
            exact: HashMap::new(),
            stemmed: HashMap::new(),
            name_only: HashMap::new(),
            stemmed_name_only: HashMap::new(),
            last_school: HashMap::new(),
            stemmed_last_school: HashMap::new(),
            weight_seed: HashMap::new(),
        };

        for (id, entry) in roster.iter() {
            let plain = resolver.normalizer.normalize(&entry.name);
            let stem = resolver.normalizer.normalize_wrestler_name(&entry.name);
            let school = resolver.normalizer.normalize(&entry.school);

            let lowered = entry.name.to_lowercase();
            if watch.iter().any(|w| lowered.contains(w.as_str())) {
                debug!("problem registry: {} at {}", entry.display_key(), entry.weight);
                resolver.problems.push(ProblemEntry {
                    entry: id,
                    name: plain.clone(),
                    weight: entry.weight,
                });
            }

            if let Some(rank) = entry.seed_rank() {
                match resolver.weight_seed.entry((entry.weight, rank)) {
                    Entry::Vacant(slot) => {
                        slot.insert(id);
                    }
                    Entry::Occupied(slot) => warn!(
                        "weight {} seed {} already taken by entry {}; {} not indexed",
                        entry.weight,
                        rank,
                        slot.get().0,
                        entry.display_key()
                    ),
                }
            }

            if stem.is_empty() {
                warn!("roster entry {} has no usable name", id.0);
                continue;
            }

            if let Some(previous) = resolver.exact.get(&(plain.clone(), school.clone())) {
                warn!(
                    "duplicate roster identity {}; keeping entry {}",
                    entry.display_key(),
                    previous.0
                );
            }
            resolver
                .last_school
                .entry((last_token(&plain).to_string(), school.clone()))
                .or_insert(id);
            resolver
                .stemmed_last_school
                .entry((last_token(&stem).to_string(), school.clone()))
                .or_default()
                .push(id);
            resolver.name_only.entry(plain.clone()).or_insert(id);
            resolver
                .stemmed_name_only
                .entry(stem.clone())
                .or_default()
                .push(id);
            resolver.exact.entry((plain, school.clone())).or_insert(id);
            resolver.stemmed.entry((stem, school)).or_default().push(id);
        }

        for item in &config.name_overrides {
            let key = resolver.normalizer.normalize(&item.raw);
            match resolver.find_override_target(&item.name, &item.school, item.team.as_deref()) {
                Some(id) => {
                    resolver.overrides.insert(key, id);
                }
                None => warn!(
                    "name override {:?} points at {} ({}), which is not on the roster",
                    item.raw, item.name, item.school
                ),
            }
        }

        debug!(
            "identity indices: {} exact, {} name-only, {} last-name, {} weight-seed, {} problem, {} overrides",
            resolver.exact.len(),
            resolver.name_only.len(),
            resolver.last_school.len(),
            resolver.weight_seed.len(),
            resolver.problems.len(),
            resolver.overrides.len()
        );
        resolver
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    fn find_override_target(&self, name: &str, school: &str, team: Option<&str>) -> Option<EntryId> {
        let name = self.normalizer.normalize(name);
        let school = self.normalizer.normalize(school);
        self.roster
            .iter()
            .find(|(_, entry)| {
                self.normalizer.normalize(&entry.name) == name
                    && self.normalizer.normalize(&entry.school) == school
                    && team.is_none_or(|t| t.eq_ignore_ascii_case(&entry.team))
            })
            .map(|(id, _)| id)
    }

    fn exact_match(&self, plain: &str, stem: &str, school: &str) -> Option<EntryId> {
        self.exact
            .get(&(plain.to_string(), school.to_string()))
            .copied()
            .or_else(|| sole(self.stemmed.get(&(stem.to_string(), school.to_string()))))
    }

    fn name_only_match(&self, plain: &str, stem: &str) -> Option<EntryId> {
        self.name_only
            .get(plain)
            .copied()
            .or_else(|| sole(self.stemmed_name_only.get(stem)))
    }

    fn last_school_match(&self, plain: &str, stem: &str, school: &str) -> Option<EntryId> {
        self.last_school
            .get(&(last_token(plain).to_string(), school.to_string()))
            .copied()
            .or_else(|| {
                sole(
                    self.stemmed_last_school
                        .get(&(last_token(stem).to_string(), school.to_string())),
                )
            })
    }

    fn problem_match(&self, plain: &str, weight: Option<WeightClass>) -> Option<EntryId> {
        let last = last_token(plain);
        let first = first_token(plain);
        let multi = plain.contains(' ');
        self.problems
            .iter()
            .find(|p| {
                p.name == plain
                    || (weight == Some(p.weight) && last_token(&p.name) == last)
                    || (multi
                        && p.name.contains(' ')
                        && first_token(&p.name) == first
                        && last_token(&p.name) == last)
            })
            .map(|p| p.entry)
    }

    /// Run the cascade. `None` means no rule matched.
    pub fn resolve(&self, candidate: &Candidate<'_>) -> Option<Resolution> {
        let plain = self.normalizer.normalize(candidate.name);
        let stem = self.normalizer.normalize_wrestler_name(candidate.name);
        let school = self.normalizer.normalize(candidate.school);
        let found = |entry: EntryId, rule: MatchRule| {
            if rule.is_low_confidence() {
                warn!(
                    "{:?} {} ({}) matched entry {} by {}",
                    candidate.role, candidate.name, candidate.school, entry.0, rule
                );
            } else {
                debug!(
                    "{:?} {} ({}) matched entry {} by {}",
                    candidate.role, candidate.name, candidate.school, entry.0, rule
                );
            }
            Some(Resolution { entry, rule })
        };

        if let Some(&id) = self.overrides.get(&plain) {
            return found(id, MatchRule::NameOverride);
        }

        let exact = if plain.is_empty() {
            None
        } else {
            self.exact_match(&plain, &stem, &school)
        };

        if exact.is_none() && !plain.is_empty() {
            if let Some(id) = self.problem_match(&plain, candidate.weight) {
                return found(id, MatchRule::ProblemList);
            }
        }
        if let Some(id) = exact {
            return found(id, MatchRule::FullName);
        }
        if !plain.is_empty() {
            if let Some(id) = self.name_only_match(&plain, &stem) {
                return found(id, MatchRule::NameOnly);
            }
            if let Some(id) = self.last_school_match(&plain, &stem, &school) {
                return found(id, MatchRule::LastName);
            }
        }
        if candidate.role == Role::Winner {
            if let (Some(weight), Some(seed)) = (candidate.weight, candidate.seed) {
                if let Some(&id) = self.weight_seed.get(&(weight, seed)) {
                    return found(id, MatchRule::WeightSeed);
                }
            }
        }

        debug!(
            "no roster match for {:?} {} ({})",
            candidate.role, candidate.name, candidate.school
        );
        None
    }
}

/// The entry behind a stem key, unless several drafted wrestlers share it.
fn sole(ids: Option<&Vec<EntryId>>) -> Option<EntryId> {
    match ids.map(Vec::as_slice) {
        Some([id]) => Some(*id),
        Some([]) | None => None,
        Some(shared) => {
            debug!("stem key shared by {} entries; not used", shared.len());
            None
        }
    }
}
