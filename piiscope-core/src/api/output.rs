//! Output types for the detection API

use crate::domain::{Entity, EntityStats};
use std::time::Duration;

/// Detection output with metadata
#[derive(Debug, Clone)]
pub struct Output {
    /// Published entities, in order of first appearance
    pub entities: Vec<Entity>,
    /// Processing metadata
    pub metadata: ProcessingMetadata,
}

/// Metadata about one scan
#[derive(Debug, Clone)]
pub struct ProcessingMetadata {
    /// Total processing duration
    pub duration: Duration,
    /// Bytes of text scanned
    pub bytes_processed: usize,
    /// Characters of text scanned
    pub chars_processed: usize,
    /// Content segments in the scanned buffer
    pub segment_count: usize,
    /// Raw candidates before arbitration
    pub candidate_count: usize,
    /// Counts over the published entities
    pub stats: EntityStats,
}

impl Output {
    pub(crate) fn new(
        entities: Vec<Entity>,
        text: &str,
        segment_count: usize,
        candidate_count: usize,
        duration: Duration,
    ) -> Self {
        let stats = EntityStats::from_entities(&entities);
        Self {
            entities,
            metadata: ProcessingMetadata {
                duration,
                bytes_processed: text.len(),
                chars_processed: text.chars().count(),
                segment_count,
                candidate_count,
                stats,
            },
        }
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
