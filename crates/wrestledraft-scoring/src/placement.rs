use std::sync::LazyLock;

use regex::Regex;
use wrestledraft_types::{PlacementRecord, WeightClass};

static PLACEMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:st|nd|rd|th):\s+(.*?)\s+\((.*?)\)").expect("placement line regex")
});

/// An explicit `1st: Name (School)` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementDeclaration {
    pub rank: u32,
    pub name: String,
    pub school: String,
    pub weight: Option<WeightClass>,
}

impl PlacementDeclaration {
    pub fn into_record(self) -> PlacementRecord {
        PlacementRecord::new(&self.name, &self.school, self.weight, self.rank)
    }
}

/// Parse a placement declaration. Ranks outside 1-8 are returned as-is;
/// they simply earn no points.
pub fn parse_placement_line(line: &str, weight: Option<WeightClass>) -> Option<PlacementDeclaration> {
    let caps = PLACEMENT_LINE.captures(line)?;
    let rank = caps[1].parse().ok()?;
    Some(PlacementDeclaration {
        rank,
        name: caps[2].trim().to_string(),
        school: caps[3].trim().to_string(),
        weight,
    })
}
