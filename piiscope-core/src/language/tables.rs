//! Lookup tables compiled from the lexicon configuration
//!
//! Word tables are case-insensitive and ignore a trailing period, so
//! `Dr`, `dr.` and `DR` hit the same entry.

use super::config::{DepartmentConfig, LexiconConfig};
use crate::error::{CoreError, Result};
use std::collections::HashSet;

/// Normalize a word for table lookup
pub(crate) fn normalize_word(word: &str) -> String {
    word.trim_end_matches('.').to_lowercase()
}

/// Case-insensitive set of single words
#[derive(Debug, Clone, Default)]
pub struct WordTable {
    words: HashSet<String>,
    /// Longest entry in bytes (quick reject)
    max_length: usize,
}

impl WordTable {
    /// Build from any list of words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for word in words {
            let normalized = normalize_word(word.as_ref());
            if normalized.is_empty() {
                continue;
            }
            table.max_length = table.max_length.max(normalized.len());
            table.words.insert(normalized);
        }
        table
    }

    /// Check whether `word` is in the table
    pub fn contains(&self, word: &str) -> bool {
        let trimmed = word.trim_end_matches('.');
        if trimmed.is_empty() || trimmed.len() > self.max_length * 2 {
            return false;
        }
        self.words.contains(&trimmed.to_lowercase())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Gazetteer of known place names
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    /// Original spellings, longest first
    names: Vec<String>,
    /// Lowercased, whitespace-collapsed spellings
    lookup: HashSet<String>,
}

impl LocationTable {
    /// Build from place names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        unique.sort();
        unique.dedup();
        unique.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let lookup = unique.iter().map(|n| collapse(n)).collect();
        Self {
            names: unique,
            lookup,
        }
    }

    /// Whether `text` names a known place (case-insensitive)
    pub fn contains(&self, text: &str) -> bool {
        self.lookup.contains(&collapse(text))
    }

    /// Original spellings, longest first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of places
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the gazetteer is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Compiled lexicon: every word list the scorer and recognizers consult
#[derive(Debug, Clone)]
pub struct Lexicon {
    code: String,
    honorifics: WordTable,
    job_roles: WordTable,
    job_modifiers: WordTable,
    company_suffixes: WordTable,
    filler_words: WordTable,
    departments: DepartmentConfig,
    locations: LocationTable,
}

impl Lexicon {
    /// Parse and compile a lexicon from TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: LexiconConfig = toml::from_str(content)
            .map_err(|e| CoreError::InvalidLexicon(format!("failed to parse lexicon: {e}")))?;
        Ok(Self::from_config(config))
    }

    /// Compile a parsed lexicon configuration
    pub fn from_config(config: LexiconConfig) -> Self {
        let locations = LocationTable::from_names(config.locations.categories.into_values().flatten());

        Self {
            code: config.metadata.code,
            honorifics: WordTable::from_words(&config.honorifics.words),
            job_roles: WordTable::from_words(&config.job_titles.roles),
            job_modifiers: WordTable::from_words(&config.job_titles.modifiers),
            company_suffixes: WordTable::from_words(&config.company_suffixes.words),
            filler_words: WordTable::from_words(&config.filler_words.words),
            departments: config.departments,
            locations,
        }
    }

    /// Language code from the lexicon metadata
    pub fn code(&self) -> &str {
        &self.code
    }

    /// `Mr`, `Dr.`, `Prof`, ...
    pub fn is_honorific(&self, word: &str) -> bool {
        self.honorifics.contains(word)
    }

    /// A noun naming a role on its own (`Engineer`, `CEO`)
    pub fn is_job_role(&self, word: &str) -> bool {
        self.job_roles.contains(word)
    }

    /// Any word that may appear inside a job title
    pub fn is_job_title_word(&self, word: &str) -> bool {
        self.job_roles.contains(word) || self.job_modifiers.contains(word)
    }

    /// `Inc`, `LLC`, `Group`, ...
    pub fn is_company_suffix(&self, word: &str) -> bool {
        self.company_suffixes.contains(word)
    }

    /// Prepositions, determiners and imperative verbs
    pub fn is_filler(&self, word: &str) -> bool {
        self.filler_words.contains(word)
    }

    /// Default department prefix/suffix lists
    pub fn departments(&self) -> &DepartmentConfig {
        &self.departments
    }

    /// Location gazetteer
    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }
}
