//! Round-by-round W/L grid.

use std::collections::BTreeMap;

use serde::Serialize;
use wrestledraft_types::{EntryId, Roster, Seed, WeightClass, WinMethod};

use crate::rounds::canonical_rank;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RoundGrid {
    /// Observed round labels in display order.
    pub columns: Vec<String>,
    pub rows: Vec<RoundRow>,
}

/// One drafted wrestler's outcomes, keyed by round label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundRow {
    pub key: String,
    pub team: String,
    pub weight: WeightClass,
    pub name: String,
    pub school: String,
    pub seed: Option<Seed>,
    pub cells: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub(crate) struct GridBuilder {
    observed: Vec<&'static str>,
    cells: BTreeMap<EntryId, BTreeMap<String, String>>,
}

impl GridBuilder {
    pub(crate) fn observe(&mut self, label: &'static str) {
        if !self.observed.contains(&label) {
            self.observed.push(label);
        }
    }

    pub(crate) fn record_win(&mut self, entry: EntryId, label: &'static str, method: WinMethod) {
        self.set(entry, label, format!("W-{}", method.code()));
    }

    pub(crate) fn record_loss(&mut self, entry: EntryId, label: &'static str, method: WinMethod) {
        let cell = if method.is_overtime() {
            format!("L-{}", method.code())
        } else {
            "L".to_string()
        };
        self.set(entry, label, cell);
    }

    fn set(&mut self, entry: EntryId, label: &'static str, cell: String) {
        self.cells
            .entry(entry)
            .or_default()
            .insert(label.to_string(), cell);
    }

    /// Canonical rounds first, then anything else in first-seen order. Rows
    /// cover the whole roster, by weight then seed with unseeded last.
    pub(crate) fn finish(mut self, roster: &Roster) -> RoundGrid {
        let mut canonical: Vec<(usize, &'static str)> = Vec::new();
        let mut other: Vec<&'static str> = Vec::new();
        for &label in &self.observed {
            match canonical_rank(label) {
                Some(rank) => canonical.push((rank, label)),
                None => other.push(label),
            }
        }
        canonical.sort_by_key(|(rank, _)| *rank);
        let columns = canonical
            .into_iter()
            .map(|(_, label)| label)
            .chain(other)
            .map(str::to_string)
            .collect();

        let mut rows: Vec<RoundRow> = roster
            .iter()
            .map(|(id, entry)| RoundRow {
                key: entry.display_key(),
                team: entry.team.clone(),
                weight: entry.weight,
                name: entry.name.clone(),
                school: entry.school.clone(),
                seed: entry.seed.clone(),
                cells: self.cells.remove(&id).unwrap_or_default(),
            })
            .collect();
        rows.sort_by_key(|row| {
            (
                row.weight,
                row.seed.as_ref().and_then(|s| s.rank).unwrap_or(u32::MAX),
            )
        });

        RoundGrid { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrestledraft_types::RosterEntry;

    fn entry(weight: WeightClass, name: &str, seed: Option<u32>) -> RosterEntry {
        RosterEntry {
            team: "T".into(),
            weight,
            name: name.into(),
            school: "S".into(),
            seed: seed.map(Seed::from_rank),
        }
    }

    #[test]
    fn orders_columns_and_rows() {
        let roster = Roster::new(vec![
            entry(WeightClass::W285, "heavy", Some(2)),
            entry(WeightClass::W125, "unseeded", None),
            entry(WeightClass::W125, "second", Some(2)),
            entry(WeightClass::W125, "first", Some(1)),
        ]);
        let mut grid = GridBuilder::default();
        for label in ["Cons. R1", "Unknown", "Champ. R1", "Quarters"] {
            grid.observe(label);
        }
        grid.record_win(EntryId(3), "Champ. R1", WinMethod::Fall);
        grid.record_loss(EntryId(2), "Champ. R1", WinMethod::SuddenVictory);
        grid.record_loss(EntryId(0), "Cons. R1", WinMethod::Decision);

        let grid = grid.finish(&roster);
        assert_eq!(grid.columns, vec!["Champ. R1", "Quarters", "Cons. R1", "Unknown"]);
        let names: Vec<&str> = grid.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "unseeded", "heavy"]);
        assert_eq!(grid.rows[0].cells["Champ. R1"], "W-Fall");
        assert_eq!(grid.rows[1].cells["Champ. R1"], "L-SV");
        assert_eq!(grid.rows[3].cells["Cons. R1"], "L");
        assert!(grid.rows[2].cells.is_empty());
    }
}
