//! Text normalization for names and schools.
//!
//! Both functions are total: any input, including the empty string, yields a
//! (possibly empty) normalized string.

use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::ScoringConfig;

const STRIPPED: &[char] = &[
    '\'', '`', '\u{2018}', '\u{2019}', '"', '\u{201C}', '\u{201D}', ',', '.', '(', ')', '-',
];

/// Lowercase, fold diacritics, drop punctuation and collapse whitespace.
/// No synonym lookup.
pub fn clean(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !STRIPPED.contains(c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizer bound to one configuration's synonym and stem tables.
#[derive(Clone, Debug)]
pub struct Normalizer {
    school_synonyms: BTreeMap<String, String>,
    name_stems: BTreeMap<String, String>,
}

impl Normalizer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            school_synonyms: config
                .school_synonyms
                .iter()
                .map(|(k, v)| (clean(k), v.clone()))
                .collect(),
            name_stems: config
                .name_stems
                .iter()
                .map(|(k, v)| (clean(k), v.clone()))
                .collect(),
        }
    }

    /// [`clean`], then the school synonym table.
    pub fn normalize(&self, text: &str) -> String {
        let cleaned = clean(text);
        match self.school_synonyms.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }

    /// [`Normalizer::normalize`], then each token is replaced by its stem when
    /// it is a known spelling variant.
    pub fn normalize_wrestler_name(&self, name: &str) -> String {
        let normalized = self.normalize(name);
        normalized
            .split(' ')
            .map(|token| {
                self.name_stems
                    .get(token)
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Last whitespace-separated token, or `""`.
pub fn last_token(name: &str) -> &str {
    name.rsplit(' ').next().unwrap_or("")
}

/// First whitespace-separated token, or `""`.
pub fn first_token(name: &str) -> &str {
    name.split(' ').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&ScoringConfig::default())
    }

    #[test]
    fn cleans_case_punctuation_and_spacing() {
        assert_eq!(clean("  Ryan   O'Toole "), "ryan otoole");
        assert_eq!(clean("St. John's, (NY)"), "st johns ny");
        assert_eq!(clean("\u{201C}Quoted\u{201D} \u{2018}x\u{2019}"), "quoted x");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn folds_diacritics() {
        assert_eq!(clean("José Muñoz"), "jose munoz");
        assert_eq!(clean("Zoë Brontë"), "zoe bronte");
    }

    #[test]
    fn applies_school_synonyms() {
        let n = normalizer();
        assert_eq!(n.normalize("VT"), "virginia tech");
        assert_eq!(n.normalize("P.S.U."), "penn state");
        assert_eq!(n.normalize("Penn"), "pennsylvania");
        assert_eq!(n.normalize("Iowa"), "iowa");
    }

    #[test]
    fn stems_phonetic_variants_per_token() {
        let n = normalizer();
        assert_eq!(n.normalize_wrestler_name("Garrett Thompson"), "garrett thoms");
        assert_eq!(n.normalize_wrestler_name("Garrett Thomson"), "garrett thoms");
        assert_eq!(n.normalize_wrestler_name("Ben Kueter"), n.normalize_wrestler_name("Ben Keuter"));
        assert_eq!(n.normalize_wrestler_name("Thomsen"), "thomsen");
        assert_eq!(n.normalize_wrestler_name(""), "");
    }

    #[test]
    fn name_tokens() {
        assert_eq!(last_token("jane q doe"), "doe");
        assert_eq!(first_token("jane q doe"), "jane");
        assert_eq!(last_token(""), "");
    }
}
