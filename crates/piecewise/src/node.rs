//! Tree node model: action leaves, range splits and punctual splits.

use core::hash::Hash;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;

use crate::bound::ActiveBound;
use crate::operator::{Comparison, OperatorClass, RangeOperator};
use crate::traverse::Visitor;
use crate::RangeError;

/// A node of a dispatch tree.
///
/// Children are reference counted and may be shared between trees produced
/// by merges or clones. Shared nodes are never edited in place; edits go
/// through [`Arc::make_mut`] and copy the node first.
#[derive(Clone, Debug)]
pub enum Node<K, A> {
    Action(A),
    Range(RangeSplit<K, A>),
    Punctual(PunctualSplit<K, A>),
}

/// `key <op> separator` selects `matched`, anything else selects `default`.
#[derive(Clone, Debug)]
pub struct RangeSplit<K, A> {
    comparison: Comparison,
    separator: K,
    matched: Arc<Node<K, A>>,
    default: Arc<Node<K, A>>,
}

/// Exact-match entries with a default subtree for every other key.
#[derive(Clone, Debug)]
pub struct PunctualSplit<K, A> {
    entries: BTreeMap<K, A>,
    default: Arc<Node<K, A>>,
}

/// Shape of a tree, counted per logical path (shared subtrees count once per parent).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub range_splits: usize,
    pub punctual_splits: usize,
    pub punctual_entries: usize,
    pub action_leaves: usize,
    pub depth: usize,
}

impl<K, A> Node<K, A> {
    pub(crate) fn leaf(action: A) -> Arc<Self> {
        Arc::new(Self::Action(action))
    }

    /// Operand precedence used by the merge engine: range > punctual > action.
    pub(crate) const fn rank(&self) -> u8 {
        match self {
            Self::Action(_) => 0,
            Self::Punctual(_) => 1,
            Self::Range(_) => 2,
        }
    }

    /// Pre-order walk, matched subtree before default subtree.
    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: Visitor<K, A> + ?Sized,
    {
        match self {
            Self::Action(action) => visitor.visit_action(action),
            Self::Range(split) => {
                visitor.visit_range(split.comparison.operator(), &split.separator);
                split.matched.traverse(visitor);
                split.default.traverse(visitor);
            }
            Self::Punctual(split) => {
                visitor.visit_punctual(RangeOperator::Equal, &split.entries);
                split.default.traverse(visitor);
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> NodeStats {
        let mut stats = NodeStats::default();
        self.accumulate(&mut stats, 0);
        stats
    }

    fn accumulate(&self, stats: &mut NodeStats, depth: usize) {
        stats.depth = stats.depth.max(depth);
        match self {
            Self::Action(_) => stats.action_leaves += 1,
            Self::Range(split) => {
                stats.range_splits += 1;
                split.matched.accumulate(stats, depth + 1);
                split.default.accumulate(stats, depth + 1);
            }
            Self::Punctual(split) => {
                stats.punctual_splits += 1;
                stats.punctual_entries += split.entries.len();
                split.default.accumulate(stats, depth + 1);
            }
        }
    }
}

impl<K: Ord, A> Node<K, A> {
    /// Action selected for `key`.
    pub fn find(&self, key: &K) -> &A {
        match self {
            Self::Action(action) => action,
            Self::Range(split) => split.select(key).find(key),
            Self::Punctual(split) => match split.entries.get(key) {
                Some(action) => action,
                None => split.default.find(key),
            },
        }
    }

    /// Root created by the first rule added to an empty tree.
    pub(crate) fn first_rule(
        default: A,
        op: RangeOperator,
        key: K,
        action: A,
    ) -> Result<Self, RangeError> {
        if op == RangeOperator::Equal {
            let mut split = PunctualSplit::new(Self::leaf(default));
            let _previous = split.insert(key, action);
            return Ok(Self::Punctual(split));
        }

        let comparison = Comparison::try_from(op)?;
        Ok(Self::Range(RangeSplit {
            comparison,
            separator: key,
            matched: Self::leaf(action),
            default: Self::leaf(default),
        }))
    }
}

impl<K: Clone, A: Clone + Eq + Hash> Node<K, A> {
    /// Adds every action reachable from this node to `out`, pre-order.
    pub fn collect_actions(&self, out: &mut IndexSet<A>) {
        match self {
            Self::Action(action) => {
                let _inserted = out.insert(action.clone());
            }
            Self::Range(split) => {
                split.matched.collect_actions(out);
                split.default.collect_actions(out);
            }
            Self::Punctual(split) => {
                out.extend(split.entries.values().cloned());
                split.default.collect_actions(out);
            }
        }
    }

    fn mentions_any(&self, mapping: &HashMap<A, A>) -> bool {
        match self {
            Self::Action(action) => mapping.contains_key(action),
            Self::Range(split) => {
                split.matched.mentions_any(mapping) || split.default.mentions_any(mapping)
            }
            Self::Punctual(split) => {
                split.entries.values().any(|action| mapping.contains_key(action))
                    || split.default.mentions_any(mapping)
            }
        }
    }

    /// Replaces every action found in `mapping`, returning how many were replaced.
    ///
    /// Subtrees that mention no mapped action are left untouched, so they stay
    /// shared with any other tree referencing them.
    pub(crate) fn change_actions(node: &mut Arc<Self>, mapping: &HashMap<A, A>) -> usize {
        if !node.mentions_any(mapping) {
            return 0;
        }

        match Arc::make_mut(node) {
            Self::Action(action) => match mapping.get(&*action) {
                Some(replacement) => {
                    *action = replacement.clone();
                    1
                }
                None => 0,
            },
            Self::Range(split) => {
                Self::change_actions(&mut split.matched, mapping)
                    + Self::change_actions(&mut split.default, mapping)
            }
            Self::Punctual(split) => {
                let mut changed = 0;
                for action in split.entries.values_mut() {
                    if let Some(replacement) = mapping.get(&*action) {
                        *action = replacement.clone();
                        changed += 1;
                    }
                }
                changed + Self::change_actions(&mut split.default, mapping)
            }
        }
    }
}

impl<K, A> RangeSplit<K, A> {
    /// Builds a split from a rule operator.
    ///
    /// Fails for `==` and the invalid sentinel, which cannot define an interval.
    pub fn new(
        op: RangeOperator,
        separator: K,
        matched: Arc<Node<K, A>>,
        default: Arc<Node<K, A>>,
    ) -> Result<Self, RangeError> {
        Ok(Self {
            comparison: Comparison::try_from(op)?,
            separator,
            matched,
            default,
        })
    }

    /// Builds a split from the subtrees covering each side of the separator.
    pub(crate) fn from_intervals(
        comparison: Comparison,
        separator: K,
        left: Arc<Node<K, A>>,
        right: Arc<Node<K, A>>,
    ) -> Self {
        let (matched, default) = if comparison.matches_left() {
            (left, right)
        } else {
            (right, left)
        };
        Self {
            comparison,
            separator,
            matched,
            default,
        }
    }

    #[must_use]
    pub fn operator(&self) -> RangeOperator {
        self.comparison.operator()
    }

    #[must_use]
    pub const fn comparison(&self) -> Comparison {
        self.comparison
    }

    #[must_use]
    pub const fn class(&self) -> OperatorClass {
        self.comparison.class()
    }

    #[must_use]
    pub const fn separator(&self) -> &K {
        &self.separator
    }

    #[must_use]
    pub fn matched(&self) -> &Node<K, A> {
        &self.matched
    }

    #[must_use]
    pub fn default(&self) -> &Node<K, A> {
        &self.default
    }

    /// Subtree covering the keys below the separator.
    #[must_use]
    pub fn left_interval(&self) -> &Node<K, A> {
        if self.comparison.matches_left() {
            &self.matched
        } else {
            &self.default
        }
    }

    /// Subtree covering the keys above the separator.
    #[must_use]
    pub fn right_interval(&self) -> &Node<K, A> {
        if self.comparison.matches_left() {
            &self.default
        } else {
            &self.matched
        }
    }
}

impl<K: Ord, A> RangeSplit<K, A> {
    fn select(&self, key: &K) -> &Node<K, A> {
        if self.comparison.holds(key, &self.separator) {
            &self.matched
        } else {
            &self.default
        }
    }
}

impl<K, A> PunctualSplit<K, A> {
    pub(crate) const fn new(default: Arc<Node<K, A>>) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    pub(crate) const fn from_parts(entries: BTreeMap<K, A>, default: Arc<Node<K, A>>) -> Self {
        Self { entries, default }
    }

    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<K, A> {
        &self.entries
    }

    #[must_use]
    pub fn default(&self) -> &Node<K, A> {
        &self.default
    }

    pub(crate) fn shared_default(&self) -> Arc<Node<K, A>> {
        Arc::clone(&self.default)
    }
}

impl<K: Ord, A> PunctualSplit<K, A> {
    pub(crate) fn insert(&mut self, key: K, action: A) -> Option<A> {
        self.entries.insert(key, action)
    }

    /// Entries whose key lies inside `bound`, in increasing key order.
    ///
    /// The scan starts at the low edge and stops at the first key above the
    /// high edge.
    pub(crate) fn entries_within<'s>(
        &'s self,
        bound: &'s ActiveBound<'s, K>,
    ) -> impl Iterator<Item = (&'s K, &'s A)> + 's {
        self.entries
            .range::<K, _>(bound.from_low())
            .take_while(move |(key, _)| !bound.is_out_of_high(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(op: RangeOperator, sep: i32) -> Node<i32, &'static str> {
        Node::first_rule("default", op, sep, "hit").unwrap()
    }

    #[test]
    fn leaf_ignores_key() {
        let node: Node<i32, _> = Node::Action("only");
        assert_eq!(*node.find(&i32::MIN), "only");
        assert_eq!(*node.find(&0), "only");
    }

    #[test]
    fn intervals_follow_direction() {
        for op in RangeOperator::COMPARISONS {
            let node = split(op, 5);
            let Node::Range(range) = &node else {
                panic!("expected a range split for {op}");
            };
            let left = *range.left_interval().find(&0);
            let right = *range.right_interval().find(&0);
            if matches!(op, RangeOperator::LessThan | RangeOperator::LessEqualThan) {
                assert_eq!((left, right), ("hit", "default"), "{op}");
            } else {
                assert_eq!((left, right), ("default", "hit"), "{op}");
            }
        }
    }

    #[test]
    fn range_split_rejects_equality() {
        let leaf = Node::<i32, u8>::leaf(0);
        let result = RangeSplit::new(RangeOperator::Equal, 1, Arc::clone(&leaf), leaf);
        assert!(matches!(
            result,
            Err(RangeError::NotComparison {
                op: RangeOperator::Equal
            })
        ));
    }

    #[test]
    fn first_rule_rejects_invalid() {
        let result = Node::<i32, u8>::first_rule(0, RangeOperator::Invalid, 1, 1);
        assert!(matches!(result, Err(RangeError::InvalidOperator)));
    }

    #[test]
    fn from_intervals_places_left_under_matched() {
        let left = Node::<i32, &str>::leaf("left");
        let right = Node::leaf("right");
        let split = RangeSplit::from_intervals(Comparison::Greater, 3, left, right);
        assert_eq!(*split.matched().find(&0), "right");
        assert_eq!(*split.left_interval().find(&0), "left");
    }

    #[test]
    fn change_actions_keeps_untouched_subtrees_shared() {
        let shared = Node::<i32, &str>::leaf("keep");
        let mut node = Arc::new(Node::Range(RangeSplit::from_intervals(
            Comparison::Less,
            0,
            Node::leaf("swap"),
            Arc::clone(&shared),
        )));
        let mapping = HashMap::from([("swap", "swapped")]);
        assert_eq!(Node::change_actions(&mut node, &mapping), 1);

        let Node::Range(split) = &*node else {
            panic!("root must stay a range split");
        };
        assert!(Arc::ptr_eq(&split.default, &shared));
        assert_eq!(*split.matched().find(&-1), "swapped");
    }

    #[test]
    fn stats_count_every_variant() {
        let mut punctual = PunctualSplit::new(Node::leaf("d"));
        let _previous = punctual.insert(1, "one");
        let _previous = punctual.insert(2, "two");
        let node = Node::Range(RangeSplit::from_intervals(
            Comparison::LessEqual,
            0,
            Node::leaf("neg"),
            Arc::new(Node::Punctual(punctual)),
        ));
        assert_eq!(
            node.stats(),
            NodeStats {
                range_splits: 1,
                punctual_splits: 1,
                punctual_entries: 2,
                action_leaves: 2,
                depth: 2,
            }
        );
    }
}
