//! Entity dictionary: one entry per distinct detected text
//!
//! Building groups same-text candidates into entities with occurrences.
//! Refining settles overlaps between occurrences of different entities,
//! then applies the per-type confidence thresholds.

use super::candidate::Candidate;
use super::resolver::{pick_primary, resolve_spanning, Arbitrable};
use super::text_map::{span_scopes, SegmentSlices, TextMap};
use super::types::{EnabledTypes, EntityRole, PiiType, Span};
use crate::api::Config;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Minimum confidence per type.
///
/// A type without an entry has threshold 0.0. When read from configuration,
/// listed entries override the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PiiType, f64>", into = "BTreeMap<PiiType, f64>")]
pub struct TypeThresholds {
    table: BTreeMap<PiiType, f64>,
}

impl TypeThresholds {
    pub fn new(table: BTreeMap<PiiType, f64>) -> Self {
        Self { table }
    }

    /// Threshold for `ty`
    pub fn get(&self, ty: PiiType) -> f64 {
        self.table.get(&ty).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, ty: PiiType, threshold: f64) {
        self.table.insert(ty, threshold);
    }

    pub fn entries(&self) -> &BTreeMap<PiiType, f64> {
        &self.table
    }
}

impl Default for TypeThresholds {
    fn default() -> Self {
        Self {
            table: PiiType::ALL
                .iter()
                .map(|ty| (*ty, ty.default_threshold()))
                .collect(),
        }
    }
}

impl From<BTreeMap<PiiType, f64>> for TypeThresholds {
    fn from(overrides: BTreeMap<PiiType, f64>) -> Self {
        let mut thresholds = Self::default();
        thresholds.table.extend(overrides);
        thresholds
    }
}

impl From<TypeThresholds> for BTreeMap<PiiType, f64> {
    fn from(thresholds: TypeThresholds) -> Self {
        thresholds.table
    }
}

/// Sequential entity identifier, unique within one dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// One place an entity appears
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    /// Range in the buffer
    pub span: Span,
    /// Segment containing the span's first byte
    pub segment: Option<usize>,
    /// Segment-local ranges covered by the span
    pub slices: SegmentSlices,
}

/// A distinct piece of detected text and everywhere it appears
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub pii_type: PiiType,
    pub text: String,
    pub confidence: f64,
    /// Threshold the confidence was checked against
    pub threshold: f64,
    /// Semantic role, for proper nouns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<EntityRole>,
    pub occurrences: Vec<Occurrence>,
    pub linked_entities: Vec<EntityId>,
}

impl Entity {
    /// Spans of every occurrence, in buffer order
    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.occurrences.iter().map(|o| o.span)
    }
}

impl Occurrence {
    /// Segments this occurrence is arbitrated in
    pub fn scopes(&self) -> SmallVec<[usize; 2]> {
        span_scopes(self.segment, &self.slices)
    }
}

/// Counts over a set of entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    pub total_entities: usize,
    pub total_occurrences: usize,
    /// Entity count per type
    pub by_type: BTreeMap<PiiType, usize>,
}

impl EntityStats {
    pub fn from_entities<'a, I>(entities: I) -> Self
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut stats = Self::default();
        for entity in entities {
            stats.total_entities += 1;
            stats.total_occurrences += entity.occurrences.len();
            *stats.by_type.entry(entity.pii_type).or_insert(0) += 1;
        }
        stats
    }
}

/// An occurrence reference taking part in overlap arbitration
struct OccurrenceRef {
    entity: usize,
    occurrence: usize,
    span: Span,
    scopes: SmallVec<[usize; 2]>,
    pii_type: PiiType,
    confidence: f64,
}

impl Arbitrable for OccurrenceRef {
    fn span(&self) -> Span {
        self.span
    }

    fn pii_type(&self) -> PiiType {
        self.pii_type
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// The set of entities found in one scan
#[derive(Debug, Clone)]
pub struct Dictionary {
    entities: Vec<Entity>,
    config: Arc<Config>,
}

impl Dictionary {
    /// Group candidates by exact text, in order of first appearance
    pub fn build(candidates: Vec<Candidate>, map: &TextMap, config: Arc<Config>) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<Candidate>> = HashMap::new();
        for candidate in candidates {
            if !groups.contains_key(&candidate.text) {
                order.push(candidate.text.clone());
            }
            groups
                .entry(candidate.text.clone())
                .or_default()
                .push(candidate);
        }

        let priorities = config.priorities();
        let mut entities = Vec::with_capacity(order.len());
        for text in order {
            let Some(mut group) = groups.remove(&text) else {
                continue;
            };
            let Some(primary) = pick_primary(&group, priorities) else {
                continue;
            };

            let head = &group[primary];
            let pii_type = head.pii_type;
            let confidence = head.confidence;
            let role = head.role();

            // One occurrence per candidate; same-span duplicates are settled by `refine`
            group.sort_by_key(|c| c.span);
            let occurrences = group
                .iter()
                .map(|c| Occurrence {
                    span: c.span,
                    segment: c.segment.or_else(|| map.owning_segment(c.span)),
                    slices: map.segments_for_range(c.span.start(), c.span.end()),
                })
                .collect();

            entities.push(Entity {
                id: EntityId(entities.len() as u64 + 1),
                pii_type,
                text,
                confidence,
                threshold: config.thresholds().get(pii_type),
                role,
                occurrences,
                linked_entities: Vec::new(),
            });
        }

        log::debug!("dictionary built with {} entities", entities.len());
        Self { entities, config }
    }

    /// Settle overlaps, apply thresholds, link related entities
    pub fn refine(&mut self) -> &mut Self {
        self.resolve_overlaps();
        self.apply_thresholds();
        self.link_related_entities();
        self
    }

    fn resolve_overlaps(&mut self) {
        let refs: Vec<OccurrenceRef> = self
            .entities
            .iter()
            .enumerate()
            .flat_map(|(e, entity)| {
                entity
                    .occurrences
                    .iter()
                    .enumerate()
                    .map(move |(o, occ)| OccurrenceRef {
                        entity: e,
                        occurrence: o,
                        span: occ.span,
                        scopes: occ.scopes(),
                        pii_type: entity.pii_type,
                        confidence: entity.confidence,
                    })
            })
            .collect();
        let total = refs.len();

        let survivors: HashSet<(usize, usize)> =
            resolve_spanning(refs, self.config.priorities(), |r| r.scopes.clone())
                .into_iter()
                .map(|r| (r.entity, r.occurrence))
                .collect();

        for (e, entity) in self.entities.iter_mut().enumerate() {
            let mut o = 0;
            entity.occurrences.retain(|_| {
                let keep = survivors.contains(&(e, o));
                o += 1;
                keep
            });
        }
        self.entities.retain(|entity| !entity.occurrences.is_empty());

        log::debug!(
            "overlap resolution kept {} of {} occurrences",
            survivors.len(),
            total
        );
    }

    fn apply_thresholds(&mut self) {
        let thresholds = self.config.thresholds();
        for entity in &mut self.entities {
            entity.threshold = thresholds.get(entity.pii_type);
        }

        let before = self.entities.len();
        self.entities
            .retain(|entity| entity.confidence >= entity.threshold);
        log::debug!(
            "threshold filter dropped {} entities",
            before - self.entities.len()
        );
    }

    /// Extension point for cross-entity links (e.g. a person and their
    /// email). Currently links nothing.
    fn link_related_entities(&mut self) {}

    /// Every entity, in order of first appearance
    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    /// Entities of one type
    pub fn by_type(&self, ty: PiiType) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.pii_type == ty).collect()
    }

    /// Entities whose type is named in `names` (see [`EnabledTypes::parse`])
    pub fn enabled(&self, names: &[&str]) -> Vec<&Entity> {
        let enabled = EnabledTypes::parse(names);
        self.entities
            .iter()
            .filter(|e| enabled.contains(e.pii_type))
            .collect()
    }

    /// Entity and occurrence counts
    pub fn stats(&self) -> EntityStats {
        EntityStats::from_entities(&self.entities)
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}
