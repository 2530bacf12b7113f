//! PII detection with overlap-aware entity resolution
//!
//! This crate finds personally identifiable information in text: structured
//! values (emails, phone numbers, money, dates, card numbers, ...) through
//! validated pattern recognizers, and free-form names through a weighted
//! capitalization heuristic. Competing detections over the same text are
//! settled by one priority-driven resolver, and same-text detections are
//! grouped into entities with every occurrence mapped back to the document
//! segment it came from.
//!
//! # Architecture
//!
//! - **Domain layer**: spans, candidates, segmentation, the overlap resolver
//!   and the entity dictionary
//! - **Extraction layer**: pattern recognizers and the proper-noun scorer
//! - **Language layer**: the embedded lexicon and common-word list
//! - **API layer**: [`PiiDetector`], [`Config`], [`Input`], [`Output`]
//!
//! # Example
//!
//! ```rust
//! use piiscope_core::{PiiDetector, PiiType};
//!
//! let detector = PiiDetector::new();
//! let entities = detector.detect("Meeting on Jan 17, 2026 with jane@acme.io", None);
//!
//! assert!(entities.iter().any(|e| e.pii_type == PiiType::Date && e.text == "Jan 17, 2026"));
//! assert!(entities.iter().any(|e| e.pii_type == PiiType::Email));
//! assert!(!entities.iter().any(|e| e.text == "17"));
//! ```

pub mod api;
pub mod domain;
pub mod error;
pub mod extraction;
pub mod language;

pub use api::{
    Config, ConfigBuilder, EnabledTypes, EntityStats, Error as ApiError, Input, Output,
    PiiDetector, ProcessingMetadata,
};
pub use domain::{
    AcceptAll, Candidate, CandidateOrigin, ContainerFilter, Document, Entity, EntityId,
    EntityRole, Leaf, LeafDocument, LeafFilter, Occurrence, PiiType, PlainDocument,
    ScoreBreakdown, Signal, Span, TextMap,
};
pub use error::CoreError;
pub use extraction::ScoringWeights;
pub use language::{CommonWordLookup, SharedWordList, WordList};
