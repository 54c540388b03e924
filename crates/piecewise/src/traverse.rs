//! Pre-order traversal callbacks.

use core::fmt;
use std::collections::BTreeMap;

use crate::RangeOperator;

/// Receives the nodes of a tree in pre-order.
///
/// Range splits are reported before their matched subtree, which comes
/// before their default subtree. Punctual entries are reported in bulk with
/// their split, never as separate nodes. Every method defaults to a no-op.
pub trait Visitor<K, A> {
    fn visit_range(&mut self, _op: RangeOperator, _separator: &K) {}

    fn visit_punctual(&mut self, _op: RangeOperator, _entries: &BTreeMap<K, A>) {}

    fn visit_action(&mut self, _action: &A) {}
}

type RangeCallback<'a, K> = Box<dyn FnMut(RangeOperator, &K) + 'a>;
type PunctualCallback<'a, K, A> = Box<dyn FnMut(RangeOperator, &BTreeMap<K, A>) + 'a>;
type ActionCallback<'a, A> = Box<dyn FnMut(&A) + 'a>;

/// A [`Visitor`] assembled from optional closures.
///
/// ```
/// use piecewise::{Callbacks, Range, RangeOperator};
///
/// let mut range = Range::new("outside");
/// range.add_range(RangeOperator::LessThan, 5, "inside").unwrap();
///
/// let mut actions = Vec::new();
/// range.traverse(&mut Callbacks::new().on_action(|action: &&str| actions.push(*action)));
/// assert_eq!(actions, ["inside", "outside"]);
/// ```
pub struct Callbacks<'a, K, A> {
    range: Option<RangeCallback<'a, K>>,
    punctual: Option<PunctualCallback<'a, K, A>>,
    action: Option<ActionCallback<'a, A>>,
}

impl<'a, K, A> Callbacks<'a, K, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            range: None,
            punctual: None,
            action: None,
        }
    }

    #[must_use]
    pub fn on_range(mut self, callback: impl FnMut(RangeOperator, &K) + 'a) -> Self {
        self.range = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_punctual(
        mut self,
        callback: impl FnMut(RangeOperator, &BTreeMap<K, A>) + 'a,
    ) -> Self {
        self.punctual = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_action(mut self, callback: impl FnMut(&A) + 'a) -> Self {
        self.action = Some(Box::new(callback));
        self
    }
}

impl<K, A> Default for Callbacks<'_, K, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, A> fmt::Debug for Callbacks<'_, K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("range", &self.range.is_some())
            .field("punctual", &self.punctual.is_some())
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl<K, A> Visitor<K, A> for Callbacks<'_, K, A> {
    fn visit_range(&mut self, op: RangeOperator, separator: &K) {
        if let Some(callback) = self.range.as_mut() {
            callback(op, separator);
        }
    }

    fn visit_punctual(&mut self, op: RangeOperator, entries: &BTreeMap<K, A>) {
        if let Some(callback) = self.punctual.as_mut() {
            callback(op, entries);
        }
    }

    fn visit_action(&mut self, action: &A) {
        if let Some(callback) = self.action.as_mut() {
            callback(action);
        }
    }
}
