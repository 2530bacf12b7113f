//! Proper-noun scoring for capitalization-led runs
//!
//! A run is a sequence of capitalized words on one line, optionally led by
//! an honorific or job title and closed by a company suffix. Each run gets a
//! weighted sum of context signals; every run is returned, including those
//! that will later fall under the threshold.

use super::signals::{
    domain_key, email_domain_label, inline_gap, is_sentence_start, nearby, tokenize,
    ContextFlags, DepartmentTable, Token,
};
use crate::domain::{
    Candidate, EntityRole, PiiType, ScoreBreakdown, Signal, SignalContribution, Span,
};
use crate::language::{english_lexicon, CommonWordLookup, DepartmentConfig, Lexicon};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default distance in bytes for "near other PII"
pub const DEFAULT_PROXIMITY_WINDOW: usize = 50;

/// Ratio reported while the common-word list is still loading
const UNKNOWN_RATIO_FALLBACK: f64 = 0.5;

/// Weight of every scoring signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub capitalization: f64,
    pub unknown_word_majority: f64,
    pub title_or_suffix: f64,
    pub multi_word: f64,
    pub not_sentence_start: f64,
    pub near_other_pii: f64,
    pub email_domain_match: f64,
    pub inside_link: f64,
    pub known_location: f64,
    pub department_penalty: f64,
    pub job_title_prefix_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            capitalization: 0.3,
            unknown_word_majority: 0.3,
            title_or_suffix: 0.4,
            multi_word: 0.2,
            not_sentence_start: 0.1,
            near_other_pii: 0.25,
            email_domain_match: 0.3,
            inside_link: 0.25,
            known_location: 0.5,
            department_penalty: -0.9,
            job_title_prefix_penalty: -0.25,
        }
    }
}

impl ScoringWeights {
    /// Weights with their configuration key names
    pub fn named(&self) -> [(&'static str, f64); 11] {
        [
            ("capitalization", self.capitalization),
            ("unknown_word_majority", self.unknown_word_majority),
            ("title_or_suffix", self.title_or_suffix),
            ("multi_word", self.multi_word),
            ("not_sentence_start", self.not_sentence_start),
            ("near_other_pii", self.near_other_pii),
            ("email_domain_match", self.email_domain_match),
            ("inside_link", self.inside_link),
            ("known_location", self.known_location),
            ("department_penalty", self.department_penalty),
            ("job_title_prefix_penalty", self.job_title_prefix_penalty),
        ]
    }
}

/// Results of earlier stages the scorer consults
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringContext<'a> {
    /// Structured candidates found in the same buffer
    pub structured: &'a [Candidate],
    /// Buffer ranges that are link text
    pub link_ranges: &'a [Span],
}

/// A capitalization-led run after filler stripping
#[derive(Debug)]
struct Run<'a> {
    span: Span,
    words: Vec<&'a str>,
    stripped: Vec<&'a str>,
}

/// Scores capitalization-led runs as proper-noun candidates
#[derive(Clone)]
pub struct ProperNounScorer {
    lexicon: &'static Lexicon,
    words: Arc<dyn CommonWordLookup>,
    weights: ScoringWeights,
    departments: DepartmentTable,
    proximity_window: usize,
}

impl std::fmt::Debug for ProperNounScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProperNounScorer")
            .field("lexicon", &self.lexicon.code())
            .field("words_ready", &self.words.is_ready())
            .field("weights", &self.weights)
            .field("proximity_window", &self.proximity_window)
            .finish()
    }
}

impl ProperNounScorer {
    /// Scorer with default weights and the lexicon's department lists
    pub fn new(words: Arc<dyn CommonWordLookup>) -> Self {
        let lexicon = english_lexicon();
        Self::with_settings(
            words,
            ScoringWeights::default(),
            lexicon.departments(),
            DEFAULT_PROXIMITY_WINDOW,
        )
    }

    /// Scorer with explicit weights, department lists and proximity window
    pub fn with_settings(
        words: Arc<dyn CommonWordLookup>,
        weights: ScoringWeights,
        departments: &DepartmentConfig,
        proximity_window: usize,
    ) -> Self {
        Self {
            lexicon: english_lexicon(),
            words,
            weights,
            departments: DepartmentTable::from_config(departments),
            proximity_window,
        }
    }

    /// Score every run in `text`
    pub fn score_candidates(&self, text: &str, ctx: &ScoringContext<'_>) -> Vec<Candidate> {
        let tokens = tokenize(text);
        let candidates: Vec<Candidate> = self
            .find_runs(text, &tokens)
            .into_iter()
            .map(|run| {
                let flags = self.context_flags(text, &run, ctx);
                let breakdown = self.score(&run, &flags);
                Candidate::from_heuristic(text, run.span, breakdown)
            })
            .collect();

        log::debug!("heuristic scorer produced {} candidates", candidates.len());
        candidates
    }

    fn find_runs<'a>(&self, text: &'a str, tokens: &[Token<'a>]) -> Vec<Run<'a>> {
        let mut runs = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let first = tokens[i];
            if first.is_ampersand() || !first.is_capitalized() {
                i += 1;
                continue;
            }

            let mut members = vec![first];
            let mut end = first.span.end();
            let mut j = i + 1;

            while j < tokens.len() {
                let last = members[members.len() - 1];
                let mut gap_start = end;
                // `Dr. Smith`: the honorific keeps its period
                if self.lexicon.is_honorific(last.text) && text[end..].starts_with('.') {
                    gap_start = end + 1;
                }

                let next = tokens[j];
                if next.is_ampersand() {
                    let joined = tokens.get(j + 1).filter(|after| {
                        after.is_capitalized()
                            && !after.is_ampersand()
                            && inline_gap(text, gap_start, next.span.start())
                            && inline_gap(text, next.span.end(), after.span.start())
                    });
                    match joined {
                        Some(after) => {
                            members.push(next);
                            members.push(*after);
                            end = after.span.end();
                            j += 2;
                        }
                        None => break,
                    }
                } else if next.is_capitalized()
                    && next.span.start() > gap_start
                    && inline_gap(text, gap_start, next.span.start())
                {
                    members.push(next);
                    end = next.span.end();
                    j += 1;
                } else {
                    break;
                }
            }
            i = j;

            if let Some(run) = self.strip_filler(text, &members, end) {
                runs.push(run);
            }
        }

        runs
    }

    fn strip_filler<'a>(&self, text: &'a str, members: &[Token<'a>], end: usize) -> Option<Run<'a>> {
        let mut stripped = Vec::new();
        let mut rest = members;
        while let Some((head, tail)) = rest.split_first() {
            if head.is_ampersand() {
                rest = tail;
            } else if self.lexicon.is_filler(head.text) {
                stripped.push(head.text);
                rest = tail;
            } else {
                break;
            }
        }

        let words: Vec<&str> = rest
            .iter()
            .filter(|t| !t.is_ampersand())
            .map(|t| t.text)
            .collect();
        let last = rest.last()?;
        let first = rest.first()?;

        if words.iter().all(|w| self.lexicon.is_honorific(w)) {
            return None;
        }

        let mut end = end.max(last.span.end());
        if words.len() >= 2
            && words
                .last()
                .is_some_and(|w| self.lexicon.is_company_suffix(w))
            && text[end..].starts_with('.')
        {
            end += 1;
        }

        let span = Span::new(first.span.start(), end);
        if text[span.start()..span.end()].chars().count() <= 1 {
            return None;
        }

        Some(Run {
            span,
            words,
            stripped,
        })
    }

    fn context_flags(&self, text: &str, run: &Run<'_>, ctx: &ScoringContext<'_>) -> ContextFlags {
        let lexicon = self.lexicon;
        let words = &run.words;

        let has_honorific = words.first().is_some_and(|w| lexicon.is_honorific(w));
        let standalone_job_title = words.iter().all(|w| lexicon.is_job_title_word(w));
        let has_job_title = !standalone_job_title
            && !has_honorific
            && words.first().is_some_and(|w| lexicon.is_job_title_word(w));
        let has_company_suffix =
            words.len() >= 2 && words.last().is_some_and(|w| lexicon.is_company_suffix(w));

        let near_other_pii = nearby(
            ctx.structured,
            run.span,
            self.proximity_window,
            &[PiiType::Email, PiiType::Phone],
        )
        .next()
        .is_some();

        let key = domain_key(words, lexicon);
        let email_domain_match = !key.is_empty()
            && nearby(ctx.structured, run.span, self.proximity_window, &[PiiType::Email])
                .filter_map(|c| email_domain_label(&c.text))
                .any(|label| label == key);

        let is_department = self.departments.is_department(words) || {
            let mut with_filler = run.stripped.clone();
            with_filler.extend(words.iter().copied());
            !run.stripped.is_empty() && self.departments.is_department(&with_filler)
        };

        ContextFlags {
            has_honorific,
            has_job_title,
            standalone_job_title,
            has_company_suffix,
            is_sentence_start: is_sentence_start(text, run.span.start()),
            word_count: words.len(),
            near_other_pii,
            email_domain_match,
            inside_link: ctx.link_ranges.iter().any(|r| r.overlaps(&run.span)),
            is_department,
            known_location: lexicon
                .locations()
                .contains(&text[run.span.start()..run.span.end()]),
        }
    }

    fn unknown_word_ratio(&self, words: &[&str]) -> f64 {
        if !self.words.is_ready() {
            return UNKNOWN_RATIO_FALLBACK;
        }

        let counted: Vec<&&str> = words
            .iter()
            .filter(|w| !self.lexicon.is_honorific(w) && !self.lexicon.is_company_suffix(w))
            .collect();
        if counted.is_empty() {
            return 0.0;
        }

        let unknown = counted.iter().filter(|w| !self.words.is_common(w)).count();
        unknown as f64 / counted.len() as f64
    }

    fn score(&self, run: &Run<'_>, flags: &ContextFlags) -> ScoreBreakdown {
        let w = &self.weights;
        let ratio = self.unknown_word_ratio(&run.words);

        let fired = [
            (Signal::Capitalization, true, w.capitalization),
            (Signal::UnknownWordMajority, ratio > 0.5, w.unknown_word_majority),
            (
                Signal::TitleOrSuffix,
                flags.has_honorific || flags.has_job_title || flags.has_company_suffix,
                w.title_or_suffix,
            ),
            (Signal::MultiWord, flags.word_count >= 2, w.multi_word),
            (Signal::NotSentenceStart, !flags.is_sentence_start, w.not_sentence_start),
            (Signal::NearOtherPii, flags.near_other_pii, w.near_other_pii),
            (Signal::EmailDomainMatch, flags.email_domain_match, w.email_domain_match),
            (Signal::InsideLink, flags.inside_link, w.inside_link),
            (Signal::KnownLocation, flags.known_location, w.known_location),
            (Signal::DepartmentName, flags.is_department, w.department_penalty),
            (Signal::JobTitlePrefix, flags.has_job_title, w.job_title_prefix_penalty),
            (Signal::StandaloneJobTitle, flags.standalone_job_title, 0.0),
        ];

        let contributions = fired
            .into_iter()
            .filter(|(_, on, _)| *on)
            .map(|(signal, _, weight)| SignalContribution { signal, weight })
            .collect();

        let role = if flags.has_company_suffix || (flags.email_domain_match && !flags.has_honorific) {
            EntityRole::Company
        } else if flags.has_honorific || flags.has_job_title {
            EntityRole::Person
        } else if flags.word_count == 1 && ratio > 0.5 {
            EntityRole::CompanyOrPerson
        } else {
            EntityRole::Person
        };

        ScoreBreakdown {
            contributions,
            unknown_word_ratio: ratio,
            forced_zero: flags.standalone_job_title,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{embedded_common_words, SharedWordList};

    fn scorer() -> ProperNounScorer {
        ProperNounScorer::new(Arc::new(embedded_common_words().clone()))
    }

    fn score(text: &str) -> Vec<Candidate> {
        scorer().score_candidates(text, &ScoringContext::default())
    }

    fn find<'c>(candidates: &'c [Candidate], text: &str) -> &'c Candidate {
        candidates
            .iter()
            .find(|c| c.text == text)
            .unwrap_or_else(|| panic!("no candidate {text:?} in {candidates:?}"))
    }

    #[test]
    fn test_filler_stripped_and_name_scored() {
        let candidates = score("Hello John Smith, welcome aboard.");
        assert_eq!(candidates.len(), 1);
        let john = &candidates[0];
        assert_eq!(john.text, "John Smith");
        assert_eq!(john.span, Span::new(6, 16));

        let breakdown = john.breakdown().unwrap();
        assert!(breakdown.has(Signal::Capitalization));
        assert!(breakdown.has(Signal::UnknownWordMajority));
        assert!(breakdown.has(Signal::MultiWord));
        assert!(breakdown.has(Signal::NotSentenceStart));
        assert!((john.confidence - 0.9).abs() < 1e-9);
        assert_eq!(john.role(), Some(EntityRole::Person));
    }

    #[test]
    fn test_filler_only_run_yields_nothing() {
        assert!(score("Please Contact the desk").is_empty());
        assert!(score("").is_empty());
        assert!(score("all lowercase words").is_empty());
    }

    #[test]
    fn test_single_letter_runs_ignored() {
        assert!(score("I think so").is_empty());
    }

    #[test]
    fn test_honorific_keeps_period() {
        let candidates = score("We met Dr. Jane Okafor yesterday");
        let jane = find(&candidates, "Dr. Jane Okafor");
        let breakdown = jane.breakdown().unwrap();
        assert!(breakdown.has(Signal::TitleOrSuffix));
        assert_eq!(jane.role(), Some(EntityRole::Person));
        assert_eq!(breakdown.unknown_word_ratio, 1.0);
    }

    #[test]
    fn test_company_suffix_and_period() {
        let candidates = score("She joined Acme Widgets Inc. last year");
        let acme = find(&candidates, "Acme Widgets Inc.");
        assert_eq!(acme.role(), Some(EntityRole::Company));
        assert!(acme.breakdown().unwrap().has(Signal::TitleOrSuffix));
    }

    #[test]
    fn test_ampersand_joins_run() {
        let candidates = score("Ask Johnson & Johnson about it");
        find(&candidates, "Johnson & Johnson");
    }

    #[test]
    fn test_line_break_splits_run() {
        let candidates = score("Zorblat\nQuixley");
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_department_penalized() {
        let candidates = score("Contact Human Resources today");
        let hr = find(&candidates, "Human Resources");
        assert!(hr.breakdown().unwrap().has(Signal::DepartmentName));
        assert!(hr.confidence < 0.75);
    }

    #[test]
    fn test_department_checked_with_filler() {
        let candidates = score("Contact Support");
        let support = find(&candidates, "Support");
        assert!(support.breakdown().unwrap().has(Signal::DepartmentName));
    }

    #[test]
    fn test_standalone_job_title_forced_zero() {
        let candidates = score("The Tech Reporter wrote it");
        let title = find(&candidates, "Tech Reporter");
        assert_eq!(title.confidence, 0.0);
        assert!(title.breakdown().unwrap().forced_zero);
    }

    #[test]
    fn test_job_title_prefix_penalty() {
        let candidates = score("by Senior Editor Marisol Vantongeren");
        let run = find(&candidates, "Senior Editor Marisol Vantongeren");
        let breakdown = run.breakdown().unwrap();
        assert!(breakdown.has(Signal::JobTitlePrefix));
        assert!(breakdown.has(Signal::TitleOrSuffix));
        assert_eq!(run.role(), Some(EntityRole::Person));
    }

    #[test]
    fn test_email_domain_match_and_proximity() {
        let text = "Reach Globex at info@globex.com for details";
        let structured = vec![Candidate::from_pattern(
            PiiType::Email,
            text,
            Span::new(16, 31),
            "email",
        )];
        let ctx = ScoringContext {
            structured: &structured,
            link_ranges: &[],
        };

        let candidates = scorer().score_candidates(text, &ctx);
        let globex = find(&candidates, "Globex");
        let breakdown = globex.breakdown().unwrap();
        assert!(breakdown.has(Signal::NearOtherPii));
        assert!(breakdown.has(Signal::EmailDomainMatch));
        assert_eq!(globex.role(), Some(EntityRole::Company));
    }

    #[test]
    fn test_inside_link() {
        let text = "Visit Zenthic Labs news";
        let links = [Span::new(6, 18)];
        let ctx = ScoringContext {
            structured: &[],
            link_ranges: &links,
        };
        let candidates = scorer().score_candidates(text, &ctx);
        let labs = find(&candidates, "Zenthic Labs");
        assert!(labs.breakdown().unwrap().has(Signal::InsideLink));
    }

    #[test]
    fn test_known_location() {
        let candidates = score("Offices in Bay Area and beyond");
        let bay = find(&candidates, "Bay Area");
        assert!(bay.breakdown().unwrap().has(Signal::KnownLocation));
    }

    #[test]
    fn test_word_list_not_ready_uses_fallback() {
        let shared: Arc<dyn CommonWordLookup> = Arc::new(SharedWordList::new());
        let candidates = ProperNounScorer::new(shared)
            .score_candidates("met Zorblat today", &ScoringContext::default());
        let breakdown = candidates[0].breakdown().unwrap();
        assert_eq!(breakdown.unknown_word_ratio, 0.5);
        assert!(!breakdown.has(Signal::UnknownWordMajority));
    }

    #[test]
    fn test_single_unknown_word_role() {
        let candidates = score("met Zorblat today");
        assert_eq!(candidates[0].role(), Some(EntityRole::CompanyOrPerson));
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoringWeights {
            capitalization: 1.0,
            ..ScoringWeights::default()
        };
        let scorer = ProperNounScorer::with_settings(
            Arc::new(embedded_common_words().clone()),
            weights,
            &DepartmentConfig::default(),
            DEFAULT_PROXIMITY_WINDOW,
        );
        let candidates = scorer.score_candidates("Quorvia", &ScoringContext::default());
        assert_eq!(candidates[0].confidence, 1.0);
        assert!(candidates[0].breakdown().unwrap().raw_score() > 1.0);
    }
}
