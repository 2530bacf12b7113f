//! Provisional detections and their explainability payloads

use super::types::{EntityRole, PiiType, Span};
use serde::Serialize;
use std::fmt;

/// Bytes of surrounding text captured on each side of a candidate
pub const CONTEXT_RADIUS: usize = 24;

/// A provisional, possibly-overlapping detection of one PII type at one span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Detected type
    pub pii_type: PiiType,
    /// Matched text, exactly as it appears in the buffer
    pub text: String,
    /// Position in the buffer
    pub span: Span,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Surrounding text, for audit output
    pub context: String,
    /// Index of the segment containing `span.start()`, if known
    pub segment: Option<usize>,
    /// Where the candidate came from
    pub origin: CandidateOrigin,
}

/// Kind-specific payload of a candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateOrigin {
    /// Structured recognizer with a fixed confidence
    Pattern {
        /// Name of the recognizer that matched
        recognizer: &'static str,
    },
    /// Capitalization heuristic with a computed score
    Heuristic(Box<ScoreBreakdown>),
}

impl Candidate {
    /// Build a structured-pattern candidate carrying the type's fixed confidence
    pub fn from_pattern(
        pii_type: PiiType,
        text: &str,
        span: Span,
        recognizer: &'static str,
    ) -> Self {
        Self {
            pii_type,
            text: text[span.start()..span.end()].to_string(),
            span,
            confidence: pii_type.pattern_confidence(),
            context: context_window(text, span, CONTEXT_RADIUS),
            segment: None,
            origin: CandidateOrigin::Pattern { recognizer },
        }
    }

    /// Build a heuristic proper-noun candidate from its score breakdown
    pub fn from_heuristic(text: &str, span: Span, breakdown: ScoreBreakdown) -> Self {
        Self {
            pii_type: PiiType::ProperNoun,
            text: text[span.start()..span.end()].to_string(),
            span,
            confidence: breakdown.confidence(),
            context: context_window(text, span, CONTEXT_RADIUS),
            segment: None,
            origin: CandidateOrigin::Heuristic(Box::new(breakdown)),
        }
    }

    /// Score breakdown, for heuristic candidates
    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match &self.origin {
            CandidateOrigin::Heuristic(breakdown) => Some(breakdown),
            CandidateOrigin::Pattern { .. } => None,
        }
    }

    /// Semantic role, for heuristic candidates
    pub fn role(&self) -> Option<EntityRole> {
        self.breakdown().map(|b| b.role)
    }
}

/// One heuristic signal that can contribute to a proper-noun score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// The run starts with a capital letter (always fires)
    Capitalization,
    /// More than half of the run's words are not common words
    UnknownWordMajority,
    /// Honorific, job title or company suffix present
    TitleOrSuffix,
    /// Two or more words
    MultiWord,
    /// The run does not open a sentence
    NotSentenceStart,
    /// An email or phone number sits within the proximity window
    NearOtherPii,
    /// The run names a nearby email's domain
    EmailDomainMatch,
    /// The run is link text
    InsideLink,
    /// The run is a known place name
    KnownLocation,
    /// The run names a department or team
    DepartmentName,
    /// The run is a job title followed by a name
    JobTitlePrefix,
    /// The run is nothing but a job title
    StandaloneJobTitle,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::Capitalization => "capitalization",
            Signal::UnknownWordMajority => "unknown_word_majority",
            Signal::TitleOrSuffix => "title_or_suffix",
            Signal::MultiWord => "multi_word",
            Signal::NotSentenceStart => "not_sentence_start",
            Signal::NearOtherPii => "near_other_pii",
            Signal::EmailDomainMatch => "email_domain_match",
            Signal::InsideLink => "inside_link",
            Signal::KnownLocation => "known_location",
            Signal::DepartmentName => "department_name",
            Signal::JobTitlePrefix => "job_title_prefix",
            Signal::StandaloneJobTitle => "standalone_job_title",
        };
        f.write_str(label)
    }
}

/// A fired signal and the weight it added
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalContribution {
    /// Which signal fired
    pub signal: Signal,
    /// Weight added to the raw score (negative for penalties)
    pub weight: f64,
}

/// Heuristic scores are kept to nine decimal places
const SCORE_PRECISION: f64 = 1e9;

/// Explains how a heuristic confidence was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Every signal that fired, in evaluation order
    pub contributions: Vec<SignalContribution>,
    /// Fraction of words missing from the common-word list
    pub unknown_word_ratio: f64,
    /// Set when the run was rejected outright (score forced to zero)
    pub forced_zero: bool,
    /// Semantic role of the run
    pub role: EntityRole,
}

impl ScoreBreakdown {
    /// Sum of contributions before clamping
    pub fn raw_score(&self) -> f64 {
        self.contributions.iter().map(|c| c.weight).sum()
    }

    /// Final confidence: the clamped raw score, or zero when forced.
    ///
    /// Rounded to nine decimal places, so `0.3 + 0.4 + 0.2 + 0.1 - 0.25` is exactly `0.75`.
    pub fn confidence(&self) -> f64 {
        if self.forced_zero {
            return 0.0;
        }
        let clamped = self.raw_score().clamp(0.0, 1.0);
        (clamped * SCORE_PRECISION).round() / SCORE_PRECISION
    }

    /// Whether a given signal fired
    pub fn has(&self, signal: Signal) -> bool {
        self.contributions.iter().any(|c| c.signal == signal)
    }
}

/// Extract up to `radius` bytes on each side of `span`, snapped to char boundaries
pub fn context_window(text: &str, span: Span, radius: usize) -> String {
    let mut start = span.start().saturating_sub(radius);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (span.end() + radius).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_string()
}
