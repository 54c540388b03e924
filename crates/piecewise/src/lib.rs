//! Piecewise dispatch trees over ordered keys.
//!
//! A [`Range`] maps every key of an ordered domain to an action, through a
//! chain of conditions such as "below 5 → A, equal to 7 → B, otherwise D".
//! Two ranges can be intersected under a combinator: the result answers
//! `combinator(a.find(k), b.find(k))` for every key `k`, computed from the
//! tree structure alone, without enumerating the key domain.
//!
//! ## Core Concepts
//!
//! - **Node**: an action leaf, a range split (`<`, `<=`, `>`, `>=` against a
//!   separator) or a punctual split (exact-match entries plus a default)
//! - **Range**: a default action plus an optional root node; built by adding
//!   rules, queried with [`Range::find`]
//! - **Merge**: [`Range::intersect`] combines two trees while tracking the key
//!   interval each recursive step is responsible for
//!
//! Nodes are immutable once shared. Merges and clones share subtrees through
//! `Arc`, and edits copy a node before touching it, so ranges can be handed
//! to other threads and merged concurrently without locking.

mod bound;
mod error;
mod merge;
mod node;
mod operator;
mod range;
mod traverse;

pub use error::RangeError;
pub use node::{Node, NodeStats, PunctualSplit, RangeSplit};
pub use operator::{Comparison, OperatorClass, RangeOperator};
pub use range::Range;
pub use traverse::{Callbacks, Visitor};
