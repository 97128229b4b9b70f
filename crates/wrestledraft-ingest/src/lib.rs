//! Load the two inputs of a scoring run: the draft roster and the raw
//! tournament result text.
//!
//! The roster is a CSV with the header `Weight,Wrestler,School,Seed,Team Name`.
//! The result text is free-form and is handed to the scorer untouched apart
//! from UTF-8 decoding. Callers choose between memory-mapped files or owned
//! buffers at runtime via [`LoadMode`].
//!
//! # Example
//! ```no_run
//! use wrestledraft_ingest::{LoadMode, load_results, load_roster};
//!
//! # fn main() -> anyhow::Result<()> {
//! let roster = load_roster("Data/ncaa_wrestling_draft.csv", LoadMode::Mmap)?;
//! let text = load_results("Data/wrestling_results.txt", LoadMode::Owned)?;
//! println!("{} drafted wrestlers, {} result bytes", roster.len(), text.len());
//! # Ok(()) }
//! ```

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::Deserialize;
use tracing::{debug, warn};
use wrestledraft_types::{Roster, RosterEntry, Seed, WeightClass};

/// Strategy for loading input files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file.
    Mmap,
    /// Read the file into an owned buffer.
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

const REQUIRED_COLUMNS: [&str; 5] = ["Weight", "Wrestler", "School", "Seed", "Team Name"];

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    #[serde(rename = "Weight")]
    weight: String,
    #[serde(rename = "Wrestler")]
    name: String,
    #[serde(rename = "School")]
    school: String,
    #[serde(rename = "Seed", default)]
    seed: String,
    #[serde(rename = "Team Name")]
    team: String,
}

/// Load the draft roster CSV.
pub fn load_roster(path: impl AsRef<Path>, mode: LoadMode) -> Result<Roster> {
    let path = path.as_ref();
    let buffer = load_file(path, mode)?;
    parse_roster(buffer.as_slice()).with_context(|| format!("parse roster {}", path.display()))
}

/// Load the tournament result text.
///
/// Invalid UTF-8 is replaced rather than rejected; hand-typed dumps pasted
/// from web pages occasionally carry stray bytes.
pub fn load_results(path: impl AsRef<Path>, mode: LoadMode) -> Result<String> {
    let path = path.as_ref();
    let buffer = load_file(path, mode)?;
    let text = match String::from_utf8_lossy(buffer.as_slice()) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => {
            warn!("{} is not valid UTF-8; invalid bytes replaced", path.display());
            s
        }
    };
    debug!("loaded {} bytes of results from {}", text.len(), path.display());
    Ok(text)
}

/// Parse roster CSV bytes. Rows with an unknown weight or an empty name are
/// skipped with a warning; a missing column is an error.
pub fn parse_roster(bytes: &[u8]) -> Result<Roster> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().context("read roster header")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            anyhow::bail!("roster is missing the {column:?} column");
        }
    }

    let mut entries = Vec::new();
    for (idx, row) in reader.deserialize::<RawRosterRow>().enumerate() {
        // Header is line 1.
        let lineno = idx + 2;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!("skipping malformed roster line {lineno}: {err}");
                continue;
            }
        };
        let Some(weight) = WeightClass::from_token(&row.weight) else {
            warn!("skipping roster line {lineno}: unknown weight {:?}", row.weight);
            continue;
        };
        if row.name.is_empty() {
            warn!("skipping roster line {lineno}: empty wrestler name");
            continue;
        }
        entries.push(RosterEntry {
            team: row.team,
            weight,
            name: row.name,
            school: row.school,
            seed: Seed::parse(&row.seed),
        });
    }

    debug!("roster parsed with {} entries", entries.len());
    Ok(Roster::new(entries))
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    if !path.exists() {
        anyhow::bail!("missing input file: {}", path.display());
    }
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let len = file
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            if len == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_seeds() {
        let csv = b"Weight,Wrestler,School,Seed,Team Name\n\
125,Luke Lilledahl,Penn State,#1,Ty Walters\n\
285, Wyatt Hendrickson , Oklahoma State,,Big Cat\n";
        let roster = parse_roster(csv).unwrap();
        assert_eq!(roster.len(), 2);
        let first = &roster.entries()[0];
        assert_eq!(first.weight, WeightClass::W125);
        assert_eq!(first.seed_rank(), Some(1));
        let second = &roster.entries()[1];
        assert_eq!(second.name, "Wyatt Hendrickson");
        assert!(second.seed.is_none());
        assert_eq!(second.team, "Big Cat");
    }

    #[test]
    fn skips_rows_with_unknown_weight() {
        let csv = b"Weight,Wrestler,School,Seed,Team Name\n\
150,Nobody,Nowhere,#3,Team\n\
DH,Placeholder,Somewhere,,Team\n";
        let roster = parse_roster(csv).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.entries()[0].weight, WeightClass::Dh);
    }

    #[test]
    fn rejects_missing_column() {
        let csv = b"Weight,Wrestler,School,Team Name\n125,A,B,C\n";
        let err = parse_roster(csv).unwrap_err();
        assert!(err.to_string().contains("Seed"));
    }

    #[test]
    fn load_mode_parses_case_insensitively() {
        assert_eq!(LoadMode::parse("MMAP"), Some(LoadMode::Mmap));
        assert_eq!(LoadMode::parse("owned"), Some(LoadMode::Owned));
        assert_eq!(LoadMode::parse("disk"), None);
    }
}
