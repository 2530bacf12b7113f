//! Document segmentation into one position-mapped text buffer
//!
//! A document is an ordered sequence of text-bearing leaves. The segmenter
//! joins the content leaves with a single space (so words split across
//! leaves stay separate) and remembers which buffer range each leaf owns,
//! so any detected span can be mapped back to the leaves it touches.

use super::types::Span;
use serde::Serialize;
use smallvec::SmallVec;

/// Separator inserted between consecutive leaves
pub const SEGMENT_SEPARATOR: &str = " ";

/// One text-bearing leaf of a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Stable identity assigned by the host document
    pub id: String,
    /// Leaf text
    pub text: String,
    /// Tag name of the enclosing element, when the host knows it
    pub container: Option<String>,
    /// Whether the leaf is rendered as hyperlink text
    pub in_link: bool,
    /// Whether the host considers the leaf invisible
    pub hidden: bool,
}

impl Leaf {
    /// Create a plain content leaf
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            container: None,
            in_link: false,
            hidden: false,
        }
    }

    /// Set the enclosing container tag
    pub fn with_container(mut self, tag: impl Into<String>) -> Self {
        self.container = Some(tag.into());
        self
    }

    /// Mark the leaf as link text
    pub fn in_link(mut self) -> Self {
        self.in_link = true;
        self
    }

    /// Mark the leaf as hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A source of ordered text leaves
pub trait Document {
    /// Leaves in document order
    fn leaves(&self) -> Vec<Leaf>;
}

/// Predicate deciding which leaves are not real content
pub trait LeafFilter: Send + Sync {
    /// Return `true` to exclude the leaf from the buffer
    fn is_non_content(&self, leaf: &Leaf) -> bool;
}

impl<F> LeafFilter for F
where
    F: Fn(&Leaf) -> bool + Send + Sync,
{
    fn is_non_content(&self, leaf: &Leaf) -> bool {
        self(leaf)
    }
}

/// Filter that keeps every non-empty leaf
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LeafFilter for AcceptAll {
    fn is_non_content(&self, _leaf: &Leaf) -> bool {
        false
    }
}

/// Filter that drops hidden leaves and leaves inside non-content containers
#[derive(Debug, Clone)]
pub struct ContainerFilter {
    excluded: Vec<String>,
}

impl ContainerFilter {
    /// Containers that never hold readable content
    pub const DEFAULT_EXCLUDED: [&'static str; 8] = [
        "script", "style", "noscript", "template", "head", "title", "meta", "svg",
    ];

    /// Create the filter with the default exclusion list
    pub fn new() -> Self {
        Self {
            excluded: Self::DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Also exclude the given container tags
    pub fn with_excluded<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded
            .extend(tags.into_iter().map(|t| t.into().to_ascii_lowercase()));
        self
    }
}

impl Default for ContainerFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafFilter for ContainerFilter {
    fn is_non_content(&self, leaf: &Leaf) -> bool {
        if leaf.hidden {
            return true;
        }
        leaf.container.as_deref().is_some_and(|tag| {
            self.excluded
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(tag))
        })
    }
}

/// Plain text split into paragraph leaves at blank lines
#[derive(Debug, Clone)]
pub struct PlainDocument {
    name: String,
    text: String,
}

impl PlainDocument {
    /// Wrap plain text; `name` prefixes the generated leaf ids
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl Document for PlainDocument {
    fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();

        let flush = |paragraph: &mut Vec<&str>, leaves: &mut Vec<Leaf>| {
            if !paragraph.is_empty() {
                let id = format!("{}#p{}", self.name, leaves.len());
                leaves.push(Leaf::new(id, paragraph.join("\n")));
                paragraph.clear();
            }
        };

        for line in self.text.lines() {
            if line.trim().is_empty() {
                flush(&mut paragraph, &mut leaves);
            } else {
                paragraph.push(line);
            }
        }
        flush(&mut paragraph, &mut leaves);

        leaves
    }
}

/// Document built from explicit leaves
#[derive(Debug, Clone, Default)]
pub struct LeafDocument {
    leaves: Vec<Leaf>,
}

impl LeafDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf
    pub fn push(mut self, leaf: Leaf) -> Self {
        self.leaves.push(leaf);
        self
    }

    /// Append a plain text leaf
    pub fn text(self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(Leaf::new(id, text))
    }
}

impl From<Vec<Leaf>> for LeafDocument {
    fn from(leaves: Vec<Leaf>) -> Self {
        Self { leaves }
    }
}

impl Document for LeafDocument {
    fn leaves(&self) -> Vec<Leaf> {
        self.leaves.clone()
    }
}

/// One content leaf placed in the buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Position of the segment in the map
    pub index: usize,
    /// Identity of the originating leaf
    pub leaf_id: String,
    /// Leaf text
    pub text: String,
    /// Range occupied in the buffer
    pub range: Span,
    /// Whether the leaf is link text
    pub in_link: bool,
}

/// A segment touched by a buffer range, with the segment-relative sub-range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentSlice {
    /// Segment index
    pub segment: usize,
    /// Range relative to the segment's own text
    pub local: Span,
}

/// Slices touched by one span; almost always one or two
pub type SegmentSlices = SmallVec<[SegmentSlice; 2]>;

/// Scope keys for overlap arbitration: the owning segment, then every
/// further segment the span runs into
pub fn span_scopes(owner: Option<usize>, slices: &[SegmentSlice]) -> SmallVec<[usize; 2]> {
    let mut scopes: SmallVec<[usize; 2]> = owner.into_iter().collect();
    let skip = usize::from(owner.is_some());
    scopes.extend(slices.iter().skip(skip).map(|slice| slice.segment));
    scopes
}

/// The concatenated buffer of a scan plus its segment table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextMap {
    full_text: String,
    segments: Vec<Segment>,
}

impl TextMap {
    /// Single-segment map over raw text
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        Self {
            full_text: text.to_string(),
            segments: vec![Segment {
                index: 0,
                leaf_id: "text".to_string(),
                text: text.to_string(),
                range: Span::new(0, text.len()),
                in_link: false,
            }],
        }
    }

    /// Concatenated buffer
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Segments in buffer order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the map holds no content
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every segment intersecting `[start, end)` with the segment-relative range.
    ///
    /// An empty query range resolves to the segment containing `start`, if any.
    pub fn segments_for_range(&self, start: usize, end: usize) -> SegmentSlices {
        let mut slices = SegmentSlices::new();
        if start == end {
            if let Some(segment) = self.segment_for_position(start) {
                let local = start - segment.range.start();
                slices.push(SegmentSlice {
                    segment: segment.index,
                    local: Span::new(local, local),
                });
            }
            return slices;
        }

        let query = Span::new(start, end);
        let first = self.segments.partition_point(|s| s.range.end() <= start);
        for segment in &self.segments[first..] {
            if segment.range.start() >= end {
                break;
            }
            if segment.range.overlaps(&query) {
                let base = segment.range.start();
                let local_start = start.max(base) - base;
                let local_end = end.min(segment.range.end()) - base;
                slices.push(SegmentSlice {
                    segment: segment.index,
                    local: Span::new(local_start, local_end),
                });
            }
        }
        slices
    }

    /// Segment containing `pos`; separator positions belong to no segment
    pub fn segment_for_position(&self, pos: usize) -> Option<&Segment> {
        self.segment_index_for_position(pos)
            .map(|index| &self.segments[index])
    }

    /// Index of the segment containing `pos`
    pub fn segment_index_for_position(&self, pos: usize) -> Option<usize> {
        let index = self.segments.partition_point(|s| s.range.end() <= pos);
        self.segments
            .get(index)
            .filter(|s| s.range.contains(pos))
            .map(|s| s.index)
    }

    /// Owning segment of a span: the one containing its first byte
    pub fn owning_segment(&self, span: Span) -> Option<usize> {
        self.segment_index_for_position(span.start())
    }

    /// Buffer ranges of link-text segments
    pub fn link_ranges(&self) -> Vec<Span> {
        self.segments
            .iter()
            .filter(|s| s.in_link)
            .map(|s| s.range)
            .collect()
    }
}

/// Builds a [`TextMap`] from a document
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter;

impl Segmenter {
    /// Concatenate the content leaves of `document`
    pub fn segment(document: &dyn Document, filter: &dyn LeafFilter) -> TextMap {
        let mut full_text = String::new();
        let mut segments = Vec::new();

        for leaf in document.leaves() {
            if leaf.text.trim().is_empty() || filter.is_non_content(&leaf) {
                continue;
            }
            if !segments.is_empty() {
                full_text.push_str(SEGMENT_SEPARATOR);
            }
            let start = full_text.len();
            full_text.push_str(&leaf.text);
            segments.push(Segment {
                index: segments.len(),
                range: Span::new(start, full_text.len()),
                leaf_id: leaf.id,
                text: leaf.text,
                in_link: leaf.in_link,
            });
        }

        log::debug!(
            "segmented document into {} segments ({} bytes)",
            segments.len(),
            full_text.len()
        );

        TextMap {
            full_text,
            segments,
        }
    }
}
