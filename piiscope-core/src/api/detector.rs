//! Main PII detector implementation

use std::sync::Arc;
use std::time::Instant;

use crate::api::{Config, Error, Input, Output};
use crate::domain::{
    resolve_spanning, span_scopes, Candidate, Dictionary, Document, EnabledTypes, Entity,
    EntityStats, LeafFilter, PiiType, Segmenter, TextMap,
};
use crate::extraction::{PatternExtractor, ProperNounScorer, ScoringContext};
use crate::language::{embedded_common_words, CommonWordLookup};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// PII detector with a clean API
///
/// Detection runs every recognizer regardless of which types the caller
/// asked for; the type filter is applied to the final entity set, so a
/// disabled type can still win an overlap against an enabled one.
#[derive(Clone)]
pub struct PiiDetector {
    config: Arc<Config>,
    extractor: PatternExtractor,
    scorer: ProperNounScorer,
}

impl std::fmt::Debug for PiiDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiiDetector")
            .field("config", &self.config)
            .field("scorer", &self.scorer)
            .finish()
    }
}

impl PiiDetector {
    /// Create a detector with the default configuration and word list
    pub fn new() -> Self {
        Self::assemble(Arc::new(Config::default()), Self::default_words())
    }

    /// Create a detector with custom configuration
    pub fn with_config(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::assemble(Arc::new(config), Self::default_words()))
    }

    /// Use another common-word lookup (e.g. a [`SharedWordList`](crate::language::SharedWordList)
    /// installed after start-up)
    pub fn with_word_list(self, words: Arc<dyn CommonWordLookup>) -> Self {
        Self::assemble(self.config, words)
    }

    fn default_words() -> Arc<dyn CommonWordLookup> {
        Arc::new(embedded_common_words().clone())
    }

    fn assemble(config: Arc<Config>, words: Arc<dyn CommonWordLookup>) -> Self {
        let scorer = ProperNounScorer::with_settings(
            words,
            config.weights,
            &config.departments,
            config.proximity_window,
        );
        Self {
            config,
            extractor: PatternExtractor::new(),
            scorer,
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Detect entities in plain text; `enabled` filters the result by type name
    pub fn detect(&self, text: &str, enabled: Option<&[&str]>) -> Vec<Entity> {
        let map = TextMap::from_text(text);
        self.detect_map(&map, enabled).0
    }

    /// Detect entities in a segmented document
    pub fn detect_document(
        &self,
        document: &dyn Document,
        filter: &dyn LeafFilter,
        enabled: Option<&[&str]>,
    ) -> Vec<Entity> {
        let map = Segmenter::segment(document, filter);
        self.detect_map(&map, enabled).0
    }

    /// Overlap-resolved candidates without grouping or thresholds
    ///
    /// Exposes each candidate's confidence and origin for inspection.
    pub fn detect_with_debug(
        &self,
        document: &dyn Document,
        filter: &dyn LeafFilter,
        enabled: Option<&[&str]>,
    ) -> Vec<Candidate> {
        let map = Segmenter::segment(document, filter);
        let enabled = EnabledTypes::from_option(enabled);

        let mut kept = resolve_spanning(self.candidates(&map), &self.config.priorities, |c| {
            span_scopes(c.segment, &map.segments_for_range(c.span.start(), c.span.end()))
        });
        kept.retain(|c| enabled.contains(c.pii_type));
        kept
    }

    /// Read the input, detect, and report entities with metadata
    pub fn process(&self, input: Input) -> Result<Output, Error> {
        self.process_with_types(input, None)
    }

    /// [`process`](Self::process) keeping only the `enabled` types
    pub fn process_with_types(
        &self,
        input: Input,
        enabled: Option<&[&str]>,
    ) -> Result<Output, Error> {
        let start = Instant::now();
        log::debug!("processing {:?}", input);

        let map = input.into_map()?;
        let (entities, candidate_count) = self.detect_map(&map, enabled);

        Ok(Output::new(
            entities,
            map.full_text(),
            map.segments().len(),
            candidate_count,
            start.elapsed(),
        ))
    }

    /// Independent scans of several texts
    pub fn detect_batch(&self, texts: &[&str], enabled: Option<&[&str]>) -> Vec<Vec<Entity>> {
        #[cfg(feature = "parallel")]
        {
            texts
                .par_iter()
                .map(|text| self.detect(text, enabled))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            texts.iter().map(|text| self.detect(text, enabled)).collect()
        }
    }

    /// Change the properNoun threshold (clamped to `[0, 1]`)
    pub fn set_proper_noun_threshold(&mut self, value: f64) {
        if value.is_nan() {
            log::warn!("ignoring NaN properNoun threshold");
            return;
        }
        Arc::make_mut(&mut self.config)
            .thresholds
            .set(PiiType::ProperNoun, value.clamp(0.0, 1.0));
    }

    /// Current properNoun threshold
    pub fn proper_noun_threshold(&self) -> f64 {
        self.config.threshold(PiiType::ProperNoun)
    }

    /// Entity and occurrence counts
    pub fn get_stats(&self, entities: &[Entity]) -> EntityStats {
        EntityStats::from_entities(entities)
    }

    /// Keep entities whose confidence is at least `min`
    pub fn filter_by_confidence(&self, entities: Vec<Entity>, min: f64) -> Vec<Entity> {
        entities
            .into_iter()
            .filter(|e| e.confidence >= min)
            .collect()
    }

    /// Structured and heuristic candidates tagged with their owning segment
    fn candidates(&self, map: &TextMap) -> Vec<Candidate> {
        if map.is_empty() {
            return Vec::new();
        }

        let text = map.full_text();
        let structured = self.extractor.extract(text);
        let links = map.link_ranges();
        let ctx = ScoringContext {
            structured: &structured,
            link_ranges: &links,
        };
        let heuristic = self.scorer.score_candidates(text, &ctx);

        let mut candidates = structured;
        candidates.extend(heuristic);
        for candidate in &mut candidates {
            candidate.segment = map.owning_segment(candidate.span);
        }

        log::debug!(
            "{} candidates across {} segments",
            candidates.len(),
            map.segments().len()
        );
        candidates
    }

    fn detect_map(&self, map: &TextMap, enabled: Option<&[&str]>) -> (Vec<Entity>, usize) {
        let candidates = self.candidates(map);
        let candidate_count = candidates.len();
        if candidates.is_empty() {
            return (Vec::new(), 0);
        }

        let mut dictionary = Dictionary::build(candidates, map, Arc::clone(&self.config));
        dictionary.refine();

        let enabled = EnabledTypes::from_option(enabled);
        let entities = dictionary
            .into_entities()
            .into_iter()
            .filter(|e| enabled.contains(e.pii_type))
            .collect();
        (entities, candidate_count)
    }
}

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}
