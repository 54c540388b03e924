use core::hash::Hash;
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::bound::ActiveBound;
use crate::merge::Merger;
use crate::node::{Node, NodeStats};
use crate::traverse::Visitor;
use crate::{RangeError, RangeOperator};

/// A piecewise mapping from ordered keys `K` to actions `A`.
///
/// A range starts with a default action only. The first rule added decides
/// the shape of its root: an inequality creates a range split, `==` creates a
/// punctual split. Afterwards:
///
/// - a range-split root honors only its first rule, later inequalities are
///   ignored and `==` is rejected;
/// - a punctual root accepts any number of `==` rules and rejects inequalities.
///
/// Deeper trees are only produced by [`Range::intersect`].
///
/// Cloning is cheap: the tree is shared and copied on the first edit.
#[derive(Clone, Debug)]
pub struct Range<K, A> {
    default: A,
    root: Option<Arc<Node<K, A>>>,
}

impl<K, A> Range<K, A> {
    /// Creates a range that maps every key to `default`.
    pub const fn new(default: A) -> Self {
        Self {
            default,
            root: None,
        }
    }

    /// Wraps a tree built by hand from [`Node`] values.
    pub fn from_root(default: A, root: Node<K, A>) -> Self {
        Self {
            default,
            root: Some(Arc::new(root)),
        }
    }

    #[must_use]
    pub const fn default_action(&self) -> &A {
        &self.default
    }

    #[must_use]
    pub fn root(&self) -> Option<&Node<K, A>> {
        self.root.as_deref()
    }

    /// True when no rule has been added and no merge produced a tree.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Walks the tree in pre-order, see [`Visitor`].
    ///
    /// A range without a tree reports its default action.
    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: Visitor<K, A> + ?Sized,
    {
        match &self.root {
            Some(root) => root.traverse(visitor),
            None => visitor.visit_action(&self.default),
        }
    }

    #[must_use]
    pub fn stats(&self) -> NodeStats {
        self.root.as_deref().map(Node::stats).unwrap_or_default()
    }
}

impl<K: Ord, A> Range<K, A> {
    /// Action selected for `key`. Never fails.
    pub fn find(&self, key: &K) -> &A {
        match &self.root {
            Some(root) => root.find(key),
            None => &self.default,
        }
    }
}

impl<K: Ord + Clone, A: Clone> Range<K, A> {
    /// Adds the rule `key <op> _ => action`.
    ///
    /// On error the range is left unchanged.
    pub fn add_range(&mut self, op: RangeOperator, key: K, action: A) -> Result<(), RangeError> {
        if op == RangeOperator::Invalid {
            return Err(RangeError::InvalidOperator);
        }

        let Some(root) = self.root.as_mut() else {
            let root = Node::first_rule(self.default.clone(), op, key, action)?;
            self.root = Some(Arc::new(root));
            return Ok(());
        };

        match &**root {
            Node::Action(_) => Err(RangeError::LeafRoot),
            Node::Range(_) if op == RangeOperator::Equal => Err(RangeError::NotComparison { op }),
            Node::Range(split) => {
                debug!(
                    %op,
                    existing = %split.operator(),
                    "range split already holds its rule, ignoring comparison"
                );
                Ok(())
            }
            Node::Punctual(_) if op != RangeOperator::Equal => {
                Err(RangeError::NotEquality { op })
            }
            Node::Punctual(_) => {
                if let Node::Punctual(split) = Arc::make_mut(root) {
                    let _previous = split.insert(key, action);
                }
                Ok(())
            }
        }
    }

    /// Builds the range mapping every key `k` to `combinator(a.find(k), b.find(k))`.
    ///
    /// The combinator always receives the action from `a` first. A side with
    /// no tree takes part as a leaf holding its default action, so the
    /// combinator is applied on every path of the result.
    ///
    /// ```
    /// use piecewise::{Range, RangeOperator};
    ///
    /// let mut low = Range::new("high".to_owned());
    /// low.add_range(RangeOperator::LessThan, 10, "low".to_owned()).unwrap();
    /// let mut four = Range::new("other".to_owned());
    /// four.add_range(RangeOperator::Equal, 4, "four".to_owned()).unwrap();
    ///
    /// let merged = Range::intersect(&low, &four, |a, b| format!("{a}/{b}")).unwrap();
    /// assert_eq!(merged.find(&4), "low/four");
    /// assert_eq!(merged.find(&5), "low/other");
    /// assert_eq!(merged.find(&12), "high/other");
    /// ```
    pub fn intersect<F>(a: &Self, b: &Self, combinator: F) -> Result<Self, RangeError>
    where
        F: FnMut(&A, &A) -> A,
    {
        let mut merger = Merger::new(combinator);
        let default = merger.combine(&a.default, &b.default, false);
        let bound = ActiveBound::unbounded();

        let root = match (&a.root, &b.root) {
            (None, None) => None,
            (Some(left), None) => {
                let leaf = Node::Action(b.default.clone());
                Some(merger.merge(left, &leaf, bound, false)?)
            }
            (None, Some(right)) => {
                let leaf = Node::Action(a.default.clone());
                Some(merger.merge(&leaf, right, bound, false)?)
            }
            (Some(left), Some(right)) => Some(merger.merge(left, right, bound, false)?),
        };

        let merged = Self { default, root };
        debug!(
            combined = merger.combined(),
            pruned = merger.pruned(),
            stats = ?merged.stats(),
            "intersected ranges"
        );
        Ok(merged)
    }

    /// [`Range::intersect`] with an explicit context handed to every combinator call.
    pub fn intersect_with<Ctx, F>(
        a: &Self,
        b: &Self,
        context: &mut Ctx,
        mut combinator: F,
    ) -> Result<Self, RangeError>
    where
        Ctx: ?Sized,
        F: FnMut(&A, &A, &mut Ctx) -> A,
    {
        Self::intersect(a, b, |x, y| combinator(x, y, context))
    }
}

impl<K: Clone, A: Clone + Eq + Hash> Range<K, A> {
    /// Every distinct action reachable, starting with the default action.
    #[must_use]
    pub fn find_all(&self) -> IndexSet<A> {
        let mut actions = IndexSet::new();
        let _inserted = actions.insert(self.default.clone());
        if let Some(root) = &self.root {
            root.collect_actions(&mut actions);
        }
        actions
    }

    /// Replaces every action inside the tree that is a key of `mapping`.
    ///
    /// The top-level default action is kept as is; it only changes where it
    /// also appears as a leaf or entry inside the tree. Returns the number of
    /// replaced actions.
    pub fn change_actions(&mut self, mapping: &HashMap<A, A>) -> usize {
        let changed = self
            .root
            .as_mut()
            .map_or(0, |root| Node::change_actions(root, mapping));
        debug!(changed, "remapped actions");
        changed
    }
}
