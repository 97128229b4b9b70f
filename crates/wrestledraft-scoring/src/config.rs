use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operator-maintained tables that steer normalization and identity resolution.
///
/// The defaults carry the tables the league has needed so far. A JSON file
/// loaded with [`ScoringConfig::load`] extends them: map entries are added
/// or replaced by key, list entries are appended.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoringConfig {
    /// Cleaned school spelling → canonical school.
    pub school_synonyms: BTreeMap<String, String>,
    /// Name token → shared stem for known phonetic variants.
    pub name_stems: BTreeMap<String, String>,
    /// Garbled names that must map to one specific drafted wrestler.
    pub name_overrides: Vec<NameOverride>,
    /// Name fragments of historically ambiguous wrestlers. Drives the
    /// problem registry and the per-name line index in diagnostics.
    pub watch_list: Vec<String>,
    /// Full names also indexed in diagnostics, without affecting resolution.
    pub search_names: Vec<String>,
}

/// A raw name as it appears in result text, pinned to a roster entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOverride {
    pub raw: String,
    pub name: String,
    pub school: String,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    school_synonyms: BTreeMap<String, String>,
    name_stems: BTreeMap<String, String>,
    name_overrides: Vec<NameOverride>,
    watch_list: Vec<String>,
    search_names: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scoring config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid scoring config: {0}")]
    Parse(#[from] serde_json::Error),
}

const SCHOOL_SYNONYMS: &[(&str, &str)] = &[
    ("virginia tech", "virginia tech"),
    ("viginia tech", "virginia tech"),
    ("vt", "virginia tech"),
    ("virginia", "virginia"),
    ("uva", "virginia"),
    ("penn state", "penn state"),
    ("psu", "penn state"),
    ("ohio state", "ohio state"),
    ("osu", "ohio state"),
    ("unc", "north carolina"),
    ("north carolina", "north carolina"),
    ("iowa state", "iowa state"),
    ("isu", "iowa state"),
    ("south dakota state", "south dakota state"),
    ("south dakota", "south dakota"),
    ("cal poly", "cal poly"),
    ("ncsu", "nc state"),
    ("nc state", "nc state"),
    ("oklahome state", "oklahoma state"),
    ("pittburgh", "pittsburgh"),
    ("califoria bakersfield", "csu bakersfield"),
    ("bakersfield", "csu bakersfield"),
    ("csub", "csu bakersfield"),
    ("northern", "northern"),
    ("pennsylvania", "pennsylvania"),
    ("penn", "pennsylvania"),
];

const NAME_STEMS: &[(&str, &str)] = &[
    ("thomson", "thoms"),
    ("thompson", "thoms"),
    ("keuter", "kuet"),
    ("kueter", "kuet"),
];

const WATCH_LIST: &[&str] = &[
    "Smith",
    "Knox",
    "Koderhandt",
    "Composto",
    "Johnson",
    "Thomson",
    "Thompson",
    "Thomsen",
    "Voelker",
    "Kueter",
    "Keuter",
    "Scott",
    "Edmond",
    "O'Toole",
];

const SEARCH_NAMES: &[&str] = &["Caleb Smith", "Garrett Thompson", "Ben Kueter"];

const NAME_OVERRIDES: &[(&str, &str, &str, &str)] = &[
    ("garrett thompson", "Garrett Thomson", "Ohio", "Lucas G"),
    ("caleb smith", "Caleb Smith", "Nebraska", "Big Cat"),
    ("ben kueter", "Ben Keuter", "Iowa", "Ty Walters"),
];

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            school_synonyms: pairs(SCHOOL_SYNONYMS),
            name_stems: pairs(NAME_STEMS),
            name_overrides: NAME_OVERRIDES
                .iter()
                .map(|(raw, name, school, team)| NameOverride {
                    raw: raw.to_string(),
                    name: name.to_string(),
                    school: school.to_string(),
                    team: Some(team.to_string()),
                })
                .collect(),
            watch_list: WATCH_LIST.iter().map(|s| s.to_string()).collect(),
            search_names: SEARCH_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScoringConfig {
    /// No synonyms, stems, overrides, watched or searched names.
    pub fn empty() -> Self {
        Self {
            school_synonyms: BTreeMap::new(),
            name_stems: BTreeMap::new(),
            name_overrides: Vec::new(),
            watch_list: Vec::new(),
            search_names: Vec::new(),
        }
    }

    /// Defaults extended by a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        let mut config = Self::default();
        config.extend(file);
        Ok(config)
    }

    /// Defaults extended by a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    fn extend(&mut self, file: ConfigFile) {
        self.school_synonyms.extend(
            file.school_synonyms
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_lowercase())),
        );
        self.name_stems.extend(
            file.name_stems
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_lowercase())),
        );
        self.name_overrides.extend(file.name_overrides);
        push_unique(&mut self.watch_list, file.watch_list);
        push_unique(&mut self.search_names, file.search_names);
    }

    /// Watched names followed by search names, without case-insensitive repeats.
    pub fn indexed_names(&self) -> Vec<String> {
        let mut names = self.watch_list.clone();
        push_unique(&mut names, self.search_names.iter().cloned());
        names
    }
}

fn push_unique(list: &mut Vec<String>, names: impl IntoIterator<Item = String>) {
    for name in names {
        if !list.iter().any(|w| w.eq_ignore_ascii_case(&name)) {
            list.push(name);
        }
    }
}

fn pairs(table: &[(&str, &str)]) -> BTreeMap<String, String> {
    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_builtin_tables() {
        let config = ScoringConfig::default();
        assert_eq!(config.school_synonyms["psu"], "penn state");
        assert_eq!(config.name_stems["kueter"], "kuet");
        assert_eq!(config.name_overrides.len(), 3);
        assert!(config.watch_list.iter().any(|w| w == "O'Toole"));
        assert_eq!(config.indexed_names().len(), WATCH_LIST.len() + SEARCH_NAMES.len());
    }

    #[test]
    fn json_extends_defaults() {
        let config = ScoringConfig::from_json_str(
            r#"{
                "school_synonyms": {"NIU": "Northern Iowa", "psu": "portland state"},
                "name_overrides": [
                    {"raw": "jon smyth", "name": "Jon Smith", "school": "Iowa"}
                ],
                "watch_list": ["Smyth", "smith"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.school_synonyms["niu"], "northern iowa");
        assert_eq!(config.school_synonyms["psu"], "portland state");
        assert_eq!(config.school_synonyms["vt"], "virginia tech");
        assert_eq!(config.name_overrides.len(), 4);
        assert_eq!(config.name_overrides[3].team, None);
        assert_eq!(config.watch_list.len(), WATCH_LIST.len() + 1);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = ScoringConfig::from_json_str(r#"{"school_synonym": {}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScoringConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
