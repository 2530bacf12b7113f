//! Overlap arbitration shared by the candidate and dictionary stages
//!
//! Two kinds of conflict are settled here:
//!
//! - **Overlapping spans** ([`resolve`]): within one scope, a left-to-right
//!   sweep keeps one item per overlapping cluster, preferring higher type
//!   priority, then higher confidence, then the longer span, then whichever
//!   was kept first.
//! - **Same text, different type** ([`same_text_preference`]): longer text,
//!   then higher type priority, then higher confidence.
//!
//! Both orders are defined once, here.

use super::candidate::Candidate;
use super::types::{PiiType, Span};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Integer ranking used to arbitrate conflicting types.
///
/// A type without an entry ranks 0: it loses to every configured type but
/// never breaks the sweep. When read from configuration, listed entries
/// override the defaults and unlisted types keep theirs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PiiType, i32>", into = "BTreeMap<PiiType, i32>")]
pub struct TypePriorities {
    table: BTreeMap<PiiType, i32>,
}

impl TypePriorities {
    /// Table with an explicit set of entries
    pub fn new(table: BTreeMap<PiiType, i32>) -> Self {
        Self { table }
    }

    /// Priority of `ty`
    pub fn get(&self, ty: PiiType) -> i32 {
        self.table.get(&ty).copied().unwrap_or(0)
    }

    /// Override one entry
    pub fn set(&mut self, ty: PiiType, priority: i32) {
        self.table.insert(ty, priority);
    }

    /// Raw entries
    pub fn entries(&self) -> &BTreeMap<PiiType, i32> {
        &self.table
    }
}

impl Default for TypePriorities {
    fn default() -> Self {
        Self {
            table: PiiType::ALL
                .iter()
                .map(|ty| (*ty, ty.default_priority()))
                .collect(),
        }
    }
}

impl From<BTreeMap<PiiType, i32>> for TypePriorities {
    fn from(overrides: BTreeMap<PiiType, i32>) -> Self {
        let mut priorities = Self::default();
        priorities.table.extend(overrides);
        priorities
    }
}

impl From<TypePriorities> for BTreeMap<PiiType, i32> {
    fn from(priorities: TypePriorities) -> Self {
        priorities.table
    }
}

/// Anything that can take part in overlap arbitration
pub trait Arbitrable {
    /// Buffer range claimed by the item
    fn span(&self) -> Span;
    /// Detected type
    fn pii_type(&self) -> PiiType;
    /// Confidence in `[0, 1]`
    fn confidence(&self) -> f64;
}

impl Arbitrable for Candidate {
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

/// Decide whether `challenger` should replace `kept` when their spans overlap
fn challenger_wins<T: Arbitrable>(challenger: &T, kept: &T, priorities: &TypePriorities) -> bool {
    let by_priority = priorities
        .get(challenger.pii_type())
        .cmp(&priorities.get(kept.pii_type()));

    match by_priority {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => match challenger.confidence().total_cmp(&kept.confidence()) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => challenger.span().len() > kept.span().len(),
        },
    }
}

/// Keep a non-overlapping subset of `items` within each scope.
///
/// Items are partitioned by `scope_key`; items in different scopes never
/// conflict, even when their offsets coincide. The result lists scopes in
/// key order, each in ascending start order.
pub fn resolve<T, K, F>(items: Vec<T>, priorities: &TypePriorities, scope_key: F) -> Vec<T>
where
    T: Arbitrable,
    K: Ord,
    F: Fn(&T) -> K,
{
    resolve_spanning(items, priorities, |item| std::iter::once(scope_key(item)))
}

/// [`resolve`] for items that may belong to several scopes at once.
///
/// An item enters the sweep of every scope `scope_keys` yields for it and
/// survives only if it is kept in all of them, so a span straddling two
/// segments is arbitrated against both. An item with no scope is dropped.
pub fn resolve_spanning<T, K, F, I>(items: Vec<T>, priorities: &TypePriorities, scope_keys: F) -> Vec<T>
where
    T: Arbitrable,
    K: Ord,
    F: Fn(&T) -> I,
    I: IntoIterator<Item = K>,
{
    let mut partitions: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    let mut entered = vec![0usize; items.len()];
    for (index, item) in items.iter().enumerate() {
        let span = item.span();
        debug_assert!(
            span.start() <= span.end(),
            "malformed span {span} reached the resolver"
        );
        if span.start() > span.end() {
            log::error!("dropping malformed span {span}");
            continue;
        }
        for key in scope_keys(item) {
            partitions.entry(key).or_default().push(index);
            entered[index] += 1;
        }
        if entered[index] == 0 {
            log::error!("dropping span {span} with no scope");
        }
    }

    let mut kept_in = vec![0usize; items.len()];
    // (scope ordinal, sweep position) of the first scope that kept the item
    let mut first_kept: Vec<Option<(usize, usize)>> = vec![None; items.len()];
    for (ordinal, (_, mut partition)) in partitions.into_iter().enumerate() {
        // Stable: equal keys keep their input order
        partition.sort_by(|&a, &b| {
            let (a, b) = (&items[a], &items[b]);
            a.span()
                .start()
                .cmp(&b.span().start())
                .then_with(|| priorities.get(b.pii_type()).cmp(&priorities.get(a.pii_type())))
        });

        let mut kept: Vec<usize> = Vec::with_capacity(partition.len());
        for index in partition {
            let item = &items[index];
            let overlaps_last = kept
                .last()
                .is_some_and(|&last| item.span().start() < items[last].span().end());
            if !overlaps_last {
                kept.push(index);
                continue;
            }

            let replaces_last = kept
                .last()
                .is_some_and(|&last| challenger_wins(item, &items[last], priorities));
            if replaces_last {
                kept.pop();
                kept.push(index);
            }
        }

        for (position, &index) in kept.iter().enumerate() {
            kept_in[index] += 1;
            first_kept[index].get_or_insert((ordinal, position));
        }
    }

    let mut survivors: Vec<((usize, usize), T)> = items
        .into_iter()
        .enumerate()
        .filter(|&(index, _)| entered[index] > 0 && kept_in[index] == entered[index])
        .filter_map(|(index, item)| first_kept[index].map(|order| (order, item)))
        .collect();
    survivors.sort_by_key(|(order, _)| *order);
    survivors.into_iter().map(|(_, item)| item).collect()
}

/// Order two same-text candidates; `Ordering::Greater` means `a` is preferred.
///
/// Longer text wins, then higher type priority, then higher confidence.
pub fn same_text_preference<T: Arbitrable>(a: &T, b: &T, priorities: &TypePriorities) -> Ordering {
    a.span()
        .len()
        .cmp(&b.span().len())
        .then_with(|| priorities.get(a.pii_type()).cmp(&priorities.get(b.pii_type())))
        .then_with(|| a.confidence().total_cmp(&b.confidence()))
}

/// Index of the preferred item under [`same_text_preference`]; the earliest wins ties
pub fn pick_primary<T: Arbitrable>(group: &[T], priorities: &TypePriorities) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, item) in group.iter().enumerate() {
        match best {
            Some(current)
                if same_text_preference(item, &group[current], priorities) != Ordering::Greater => {}
            _ => best = Some(index),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::CandidateOrigin;

    fn candidate(ty: PiiType, start: usize, end: usize, confidence: f64) -> Candidate {
        Candidate {
            pii_type: ty,
            text: "x".repeat(end - start),
            span: Span::new(start, end),
            confidence,
            context: String::new(),
            segment: Some(0),
            origin: CandidateOrigin::Pattern { recognizer: "test" },
        }
    }

    fn whole(items: Vec<Candidate>) -> Vec<Candidate> {
        resolve(items, &TypePriorities::default(), |_| ())
    }

    #[test]
    fn test_date_beats_inner_quantity_in_any_order() {
        let date = candidate(PiiType::Date, 0, 12, 0.8);
        let qty = candidate(PiiType::Quantity, 4, 6, 1.0);

        let forward = whole(vec![date.clone(), qty.clone()]);
        let backward = whole(vec![qty, date.clone()]);

        assert_eq!(forward, vec![date.clone()]);
        assert_eq!(backward, vec![date]);
    }

    #[test]
    fn test_non_overlapping_items_all_survive() {
        let out = whole(vec![
            candidate(PiiType::Email, 20, 30, 1.0),
            candidate(PiiType::Phone, 0, 10, 1.0),
            candidate(PiiType::Quantity, 10, 12, 1.0),
        ]);
        let starts: Vec<usize> = out.iter().map(|c| c.span.start()).collect();
        assert_eq!(starts, vec![0, 10, 20]);
    }

    #[test]
    fn test_confidence_breaks_priority_tie() {
        let weak = candidate(PiiType::ProperNoun, 0, 10, 0.6);
        let strong = candidate(PiiType::ProperNoun, 5, 12, 0.9);
        assert_eq!(whole(vec![weak, strong.clone()]), vec![strong]);
    }

    #[test]
    fn test_length_breaks_confidence_tie() {
        let short = candidate(PiiType::ProperNoun, 0, 4, 0.8);
        let long = candidate(PiiType::ProperNoun, 2, 12, 0.8);
        assert_eq!(whole(vec![short, long.clone()]), vec![long]);
    }

    #[test]
    fn test_full_tie_keeps_earlier() {
        let first = candidate(PiiType::ProperNoun, 0, 6, 0.8);
        let second = candidate(PiiType::ProperNoun, 3, 9, 0.8);
        assert_eq!(whole(vec![first.clone(), second]), vec![first]);
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut a = candidate(PiiType::Location, 78, 86, 0.9);
        a.segment = Some(1);
        let mut b = candidate(PiiType::ProperNoun, 78, 86, 0.8);
        b.segment = Some(2);

        let out = resolve(vec![a.clone(), b.clone()], &TypePriorities::default(), |c| {
            c.segment
        });
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn test_straddling_item_competes_in_every_scope() {
        // A date crossing from segment 0 into segment 1, with a quantity inside it
        let date = candidate(PiiType::Date, 11, 23, 0.8);
        let qty = candidate(PiiType::Quantity, 15, 17, 1.0);
        let scopes = |c: &Candidate| {
            if c.span.start() < 14 {
                vec![0, 1]
            } else {
                vec![1]
            }
        };

        let out = resolve_spanning(
            vec![qty.clone(), date.clone()],
            &TypePriorities::default(),
            scopes,
        );
        assert_eq!(out, vec![date]);

        // A straddling loser is dropped even though it won its first scope
        let noun = candidate(PiiType::ProperNoun, 13, 26, 0.9);
        let place = candidate(PiiType::Location, 21, 26, 0.9);
        let scopes = |c: &Candidate| {
            if c.span.start() < 20 {
                vec![0, 1]
            } else {
                vec![1]
            }
        };
        let out = resolve_spanning(
            vec![noun, place.clone()],
            &TypePriorities::default(),
            scopes,
        );
        assert_eq!(out, vec![place]);
    }

    #[test]
    fn test_item_without_scope_is_dropped() {
        let lone = candidate(PiiType::Email, 0, 10, 1.0);
        let out = resolve_spanning(vec![lone], &TypePriorities::default(), |_| Vec::<usize>::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_priority_ranks_lowest() {
        let mut table = BTreeMap::new();
        table.insert(PiiType::ProperNoun, 5);
        let priorities = TypePriorities::new(table);

        let unknown = candidate(PiiType::Money, 0, 10, 1.0);
        let noun = candidate(PiiType::ProperNoun, 2, 8, 0.5);
        let out = resolve(vec![unknown, noun.clone()], &priorities, |_| ());
        assert_eq!(out, vec![noun]);
    }

    #[test]
    fn test_same_text_preference_order() {
        let priorities = TypePriorities::default();
        let noun = candidate(PiiType::ProperNoun, 0, 8, 1.0);
        let location = candidate(PiiType::Location, 30, 38, 0.9);
        assert_eq!(
            same_text_preference(&location, &noun, &priorities),
            Ordering::Greater
        );
        assert_eq!(pick_primary(&[noun, location], &priorities), Some(1));
    }

    #[test]
    fn test_pick_primary_empty_group() {
        let empty: [Candidate; 0] = [];
        assert_eq!(pick_primary(&empty, &TypePriorities::default()), None);
    }
}
