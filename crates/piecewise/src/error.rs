use thiserror::Error;

use crate::RangeOperator;

/// Errors raised while building or merging a [`Range`](crate::Range).
///
/// Every fallible operation checks its input before touching the tree, so an
/// `Err` always leaves the receiver exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RangeError {
    /// The invalid sentinel was passed as a rule operator.
    #[error("the invalid operator cannot be used in a rule")]
    InvalidOperator,

    /// `==` was passed where a range split needs an inequality.
    #[error("operator `{op}` is not a comparison and cannot extend a range split")]
    NotComparison { op: RangeOperator },

    /// An inequality was passed where a punctual split only accepts `==`.
    #[error("operator `{op}` cannot extend a punctual split, which only accepts `==`")]
    NotEquality { op: RangeOperator },

    /// Rules cannot be added below an action leaf root, see [`Range::from_root`](crate::Range::from_root).
    #[error("cannot add a rule to a tree whose root is an action leaf")]
    LeafRoot,

    /// A merge eliminated every region of a split. Signals a broken invariant.
    #[error("merge produced no region for a split; the active bound was empty")]
    Unreachable,
}
