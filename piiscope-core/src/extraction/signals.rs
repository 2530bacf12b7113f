//! Context flags computed around a capitalization-led run

use crate::domain::{Candidate, PiiType, Span};
use crate::language::{DepartmentConfig, Lexicon, WordTable};
use regex::Regex;
use std::sync::OnceLock;

/// A word (or `&`) and its position in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    pub fn is_ampersand(&self) -> bool {
        self.text == "&"
    }

    /// Starts with an uppercase letter
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// Words are letters/digits with internal apostrophes or hyphens
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let re = TOKEN_RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*|&").expect("Failed to compile token pattern")
    });

    re.find_iter(text)
        .map(|m| Token {
            text: m.as_str(),
            span: Span::new(m.start(), m.end()),
        })
        .collect()
}

/// Only spaces or tabs between two offsets (empty counts)
pub fn inline_gap(text: &str, from: usize, to: usize) -> bool {
    from <= to && text[from..to].chars().all(|c| c == ' ' || c == '\t')
}

/// Nothing but whitespace before `start`, or a `.`, `!` or `?` followed
/// by at most one space
pub fn is_sentence_start(text: &str, start: usize) -> bool {
    let before = &text[..start];
    if before.trim().is_empty() {
        return true;
    }

    let before = before.strip_suffix(' ').unwrap_or(before);
    before.ends_with(['.', '!', '?'])
}

/// First label of an email's domain, lowercased (`jane@acme.co` -> `acme`)
pub fn email_domain_label(email: &str) -> Option<String> {
    let (_, domain) = email.rsplit_once('@')?;
    let label = domain.split('.').next()?;
    (!label.is_empty()).then(|| label.to_lowercase())
}

/// Run words with company suffixes removed, alphanumerics only, lowercased
pub fn domain_key(words: &[&str], lexicon: &Lexicon) -> String {
    words
        .iter()
        .filter(|w| !lexicon.is_company_suffix(w))
        .flat_map(|w| w.chars())
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Structured candidates of the given types within `window` bytes of `span`
pub fn nearby<'c>(
    structured: &'c [Candidate],
    span: Span,
    window: usize,
    types: &'c [PiiType],
) -> impl Iterator<Item = &'c Candidate> + 'c {
    structured
        .iter()
        .filter(move |c| types.contains(&c.pii_type) && c.span.distance(&span) <= window)
}

/// Department and team name detection
#[derive(Debug, Clone, Default)]
pub struct DepartmentTable {
    prefixes: WordTable,
    suffixes: WordTable,
}

impl DepartmentTable {
    pub fn from_config(config: &DepartmentConfig) -> Self {
        Self {
            prefixes: WordTable::from_words(&config.prefixes),
            suffixes: WordTable::from_words(&config.suffixes),
        }
    }

    /// Last word is a department suffix, or every word is a prefix or suffix
    pub fn is_department(&self, words: &[&str]) -> bool {
        let Some(last) = words.last() else {
            return false;
        };
        self.suffixes.contains(last)
            || words
                .iter()
                .all(|w| self.prefixes.contains(w) || self.suffixes.contains(w))
    }
}

/// Everything the scorer knows about one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextFlags {
    pub has_honorific: bool,
    pub has_job_title: bool,
    pub standalone_job_title: bool,
    pub has_company_suffix: bool,
    pub is_sentence_start: bool,
    pub word_count: usize,
    pub near_other_pii: bool,
    pub email_domain_match: bool,
    pub inside_link: bool,
    pub is_department: bool,
    pub known_location: bool,
}
