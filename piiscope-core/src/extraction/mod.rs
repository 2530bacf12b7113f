//! Candidate extraction: structured recognizers and the proper-noun scorer

pub mod heuristic;
pub mod patterns;
pub mod signals;

pub use heuristic::{ProperNounScorer, ScoringContext, ScoringWeights, DEFAULT_PROXIMITY_WINDOW};
pub use patterns::{luhn_valid, PatternExtractor, Recognizer};
