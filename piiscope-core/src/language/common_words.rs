//! Common-word dictionary used for the unknown-word ratio
//!
//! The dictionary is the only asynchronous collaborator of the scorer: a
//! host may install its own list after start-up. Until a list is ready the
//! scorer falls back to a neutral ratio instead of failing.

use crate::error::{CoreError, Result};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Lookup of everyday words
pub trait CommonWordLookup: Send + Sync {
    /// Whether `word` (any case) is a common word
    fn is_common(&self, word: &str) -> bool;

    /// Whether the lookup has finished loading
    fn is_ready(&self) -> bool {
        true
    }
}

/// An immutable set of lowercase words
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Build from words (lowercased)
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Parse a list with one word per line; `#` starts a comment
    pub fn parse(content: &str) -> Self {
        Self::from_words(
            content
                .lines()
                .map(|line| line.split('#').next().unwrap_or(""))
                .filter(|line| !line.trim().is_empty()),
        )
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl CommonWordLookup for WordList {
    fn is_common(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

static EMBEDDED_WORDS: OnceLock<WordList> = OnceLock::new();

/// The built-in list, parsed on first use and shared by every scan
pub fn embedded_common_words() -> &'static WordList {
    EMBEDDED_WORDS.get_or_init(|| WordList::parse(include_str!("../../configs/common_words.txt")))
}

/// A word list the host installs once, possibly after scans have started
#[derive(Debug, Default)]
pub struct SharedWordList {
    cell: OnceLock<WordList>,
}

impl SharedWordList {
    /// Create an empty, not-yet-ready list
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the words; fails if a list was already installed
    pub fn install(&self, words: WordList) -> Result<()> {
        self.cell
            .set(words)
            .map_err(|_| CoreError::WordListAlreadyLoaded)
    }
}

impl CommonWordLookup for SharedWordList {
    fn is_common(&self, word: &str) -> bool {
        self.cell.get().is_some_and(|list| list.is_common(word))
    }

    fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }
}
