//! Pairwise intersection of two dispatch trees.
//!
//! The merger walks both trees at once while tracking the [`ActiveBound`]
//! each call is responsible for. A region whose bound is empty is skipped,
//! and punctual entries outside the bound are dropped: they belong to a
//! sibling region and would otherwise fabricate rules that no key can reach.

use core::marker::PhantomData;
use std::collections::BTreeMap;
use std::sync::Arc;

use itertools::{EitherOrBoth, Itertools};
use tracing::trace;

use crate::bound::ActiveBound;
use crate::node::{Node, PunctualSplit, RangeSplit};
use crate::operator::Comparison;
use crate::RangeError;

type Merged<K, A> = Result<Arc<Node<K, A>>, RangeError>;

/// Combines two trees node by node under a caller supplied combinator.
///
/// Operands are reordered so the more complex node is always handled first;
/// `swapped` records when that happened so the combinator still receives its
/// arguments in the caller's order.
pub(crate) struct Merger<K, A, F> {
    combinator: F,
    combined: usize,
    pruned: usize,
    _marker: PhantomData<fn(&K) -> A>,
}

impl<K, A, F> Merger<K, A, F>
where
    K: Ord + Clone,
    A: Clone,
    F: FnMut(&A, &A) -> A,
{
    pub(crate) const fn new(combinator: F) -> Self {
        Self {
            combinator,
            combined: 0,
            pruned: 0,
            _marker: PhantomData,
        }
    }

    /// Number of combinator invocations so far.
    pub(crate) const fn combined(&self) -> usize {
        self.combined
    }

    /// Number of regions skipped because they fell outside the active bound.
    pub(crate) const fn pruned(&self) -> usize {
        self.pruned
    }

    pub(crate) fn combine(&mut self, a: &A, b: &A, swapped: bool) -> A {
        self.combined += 1;
        if swapped {
            (self.combinator)(b, a)
        } else {
            (self.combinator)(a, b)
        }
    }

    pub(crate) fn merge(
        &mut self,
        a: &Node<K, A>,
        b: &Node<K, A>,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Merged<K, A> {
        match (a, b) {
            (Node::Action(x), Node::Action(y)) => Ok(Node::leaf(self.combine(x, y, swapped))),
            _ if a.rank() < b.rank() => self.merge(b, a, bound, !swapped),
            (Node::Range(r), Node::Range(s)) => self.range_range(r, s, bound, swapped),
            (Node::Range(r), Node::Punctual(p)) => self.range_punctual(r, p, bound, swapped),
            (Node::Range(r), Node::Action(_)) => self.range_leaf(r, b, bound, swapped),
            (Node::Punctual(p), Node::Punctual(q)) => {
                self.punctual_punctual(p, q, bound, swapped)
            }
            (Node::Punctual(p), Node::Action(x)) => self.punctual_leaf(p, b, x, bound, swapped),
            (Node::Action(_) | Node::Punctual(_), _) => Err(RangeError::Unreachable),
        }
    }

    /// Merges one region, or skips it when the region lies outside the bound.
    fn region(
        &mut self,
        a: &Node<K, A>,
        b: &Node<K, A>,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Result<Option<Arc<Node<K, A>>>, RangeError> {
        if bound.is_empty() {
            self.pruned += 1;
            trace!("skipping region outside the active bound");
            return Ok(None);
        }
        self.merge(a, b, bound, swapped).map(Some)
    }

    fn range_leaf(
        &mut self,
        split: &RangeSplit<K, A>,
        leaf: &Node<K, A>,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Merged<K, A> {
        let (separator, class) = (split.separator(), split.class());
        let left = self.region(
            split.left_interval(),
            leaf,
            bound.left_of(separator, class),
            swapped,
        )?;
        let right = self.region(
            split.right_interval(),
            leaf,
            bound.right_of(separator, class),
            swapped,
        )?;
        rebuild(split.comparison(), separator, left, right)
    }

    fn range_punctual(
        &mut self,
        split: &RangeSplit<K, A>,
        punctual: &PunctualSplit<K, A>,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Merged<K, A> {
        let (separator, class) = (split.separator(), split.class());
        let left_bound = bound.left_of(separator, class);
        let right_bound = bound.right_of(separator, class);

        let left_entries = collect_within(punctual, &left_bound);
        let right_entries = collect_within(punctual, &right_bound);
        trace!(
            left = left_entries.len(),
            right = right_entries.len(),
            "partitioned punctual entries around separator"
        );

        let left_group = group(left_entries, punctual);
        let right_group = group(right_entries, punctual);

        let left = self.region(
            split.left_interval(),
            left_group.as_ref().unwrap_or(punctual.default()),
            left_bound,
            swapped,
        )?;
        let right = self.region(
            split.right_interval(),
            right_group.as_ref().unwrap_or(punctual.default()),
            right_bound,
            swapped,
        )?;
        rebuild(split.comparison(), separator, left, right)
    }

    fn range_range(
        &mut self,
        a: &RangeSplit<K, A>,
        b: &RangeSplit<K, A>,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Merged<K, A> {
        // At a shared separator the `<` class split comes first, so the middle
        // region is exactly the separator (or empty when both classes agree).
        let a_first = (a.separator(), a.class()) <= (b.separator(), b.class());
        let (first, second) = if a_first { (a, b) } else { (b, a) };

        let low_bound = bound.left_of(first.separator(), first.class());
        let mid_bound = bound
            .right_of(first.separator(), first.class())
            .left_of(second.separator(), second.class());
        let high_bound = bound.right_of(second.separator(), second.class());

        let (mid_a, mid_b) = if a_first {
            (a.right_interval(), b.left_interval())
        } else {
            (a.left_interval(), b.right_interval())
        };

        let low = self.region(a.left_interval(), b.left_interval(), low_bound, swapped)?;
        let mid = self.region(mid_a, mid_b, mid_bound, swapped)?;
        let high = self.region(a.right_interval(), b.right_interval(), high_bound, swapped)?;

        let upper = match (mid, high) {
            (Some(mid), Some(high)) => Some(split_node(
                Comparison::leftward(second.class()),
                second.separator(),
                mid,
                high,
            )),
            (mid, high) => mid.or(high),
        };
        rebuild(
            Comparison::leftward(first.class()),
            first.separator(),
            low,
            upper,
        )
    }

    fn punctual_punctual(
        &mut self,
        a: &PunctualSplit<K, A>,
        b: &PunctualSplit<K, A>,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Merged<K, A> {
        let default = self.merge(a.default(), b.default(), bound, swapped)?;

        let mut entries = BTreeMap::new();
        let pairs = a
            .entries_within(&bound)
            .merge_join_by(b.entries_within(&bound), |(x, _), (y, _)| x.cmp(y));
        for pair in pairs {
            let (key, action) = match pair {
                EitherOrBoth::Both((key, x), (_, y)) => (key, self.combine(x, y, swapped)),
                EitherOrBoth::Left((key, x)) => {
                    (key, self.combine(x, b.default().find(key), swapped))
                }
                EitherOrBoth::Right((key, y)) => {
                    (key, self.combine(a.default().find(key), y, swapped))
                }
            };
            let _previous = entries.insert(key.clone(), action);
        }

        Ok(punctual_or_default(entries, default))
    }

    fn punctual_leaf(
        &mut self,
        punctual: &PunctualSplit<K, A>,
        leaf: &Node<K, A>,
        action: &A,
        bound: ActiveBound<'_, K>,
        swapped: bool,
    ) -> Merged<K, A> {
        let default = self.merge(punctual.default(), leaf, bound, swapped)?;

        let entries: BTreeMap<_, _> = punctual
            .entries_within(&bound)
            .map(|(key, entry)| (key.clone(), self.combine(entry, action, swapped)))
            .collect();
        if entries.len() < punctual.entries().len() {
            trace!(
                kept = entries.len(),
                total = punctual.entries().len(),
                "dropped punctual entries outside the active bound"
            );
        }

        Ok(punctual_or_default(entries, default))
    }
}

fn collect_within<K, A>(punctual: &PunctualSplit<K, A>, bound: &ActiveBound<'_, K>) -> BTreeMap<K, A>
where
    K: Ord + Clone,
    A: Clone,
{
    punctual
        .entries_within(bound)
        .map(|(key, action)| (key.clone(), action.clone()))
        .collect()
}

/// Temporary punctual split sharing the default subtree of `punctual`.
fn group<K, A>(entries: BTreeMap<K, A>, punctual: &PunctualSplit<K, A>) -> Option<Node<K, A>> {
    (!entries.is_empty())
        .then(|| Node::Punctual(PunctualSplit::from_parts(entries, punctual.shared_default())))
}

fn split_node<K: Clone, A>(
    comparison: Comparison,
    separator: &K,
    left: Arc<Node<K, A>>,
    right: Arc<Node<K, A>>,
) -> Arc<Node<K, A>> {
    Arc::new(Node::Range(RangeSplit::from_intervals(
        comparison,
        separator.clone(),
        left,
        right,
    )))
}

/// Wraps the surviving regions of a split; a single survivor replaces the split.
fn rebuild<K: Clone, A>(
    comparison: Comparison,
    separator: &K,
    left: Option<Arc<Node<K, A>>>,
    right: Option<Arc<Node<K, A>>>,
) -> Merged<K, A> {
    match (left, right) {
        (Some(left), Some(right)) => Ok(split_node(comparison, separator, left, right)),
        (Some(node), None) | (None, Some(node)) => Ok(node),
        (None, None) => Err(RangeError::Unreachable),
    }
}

fn punctual_or_default<K, A>(entries: BTreeMap<K, A>, default: Arc<Node<K, A>>) -> Arc<Node<K, A>> {
    if entries.is_empty() {
        default
    } else {
        Arc::new(Node::Punctual(PunctualSplit::from_parts(entries, default)))
    }
}
