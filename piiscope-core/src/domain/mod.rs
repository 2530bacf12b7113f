//! Detection domain: value types, segmentation, arbitration and the
//! entity dictionary
//!
//! Nothing in this layer performs I/O; every operation is a pure function
//! of its inputs and the read-only lexicon.

pub mod candidate;
pub mod dictionary;
pub mod resolver;
pub mod text_map;
pub mod types;

pub use candidate::{
    context_window, Candidate, CandidateOrigin, ScoreBreakdown, Signal, SignalContribution,
    CONTEXT_RADIUS,
};
pub use dictionary::{Dictionary, Entity, EntityId, EntityStats, Occurrence, TypeThresholds};
pub use resolver::{
    pick_primary, resolve, resolve_spanning, same_text_preference, Arbitrable, TypePriorities,
};
pub use text_map::{
    AcceptAll, ContainerFilter, Document, Leaf, LeafDocument, LeafFilter, PlainDocument, Segment,
    SegmentSlice, SegmentSlices, Segmenter, TextMap, span_scopes, SEGMENT_SEPARATOR,
};
pub use types::{EnabledTypes, EntityRole, PiiType, Span};
