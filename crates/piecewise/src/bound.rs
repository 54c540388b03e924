//! The key interval a merge call is responsible for.

use core::ops::Bound;

use crate::operator::OperatorClass;

/// Sub-interval of the key domain reachable by a node under construction.
///
/// Every recursive merge step narrows the bound when it descends past a
/// separator. Punctual entries and regions outside the bound are dropped
/// rather than merged, since they can only be reached through a sibling.
#[derive(Debug)]
pub(crate) struct ActiveBound<'k, K> {
    low: Bound<&'k K>,
    high: Bound<&'k K>,
}

impl<K> Clone for ActiveBound<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ActiveBound<'_, K> {}

impl<'k, K: Ord> ActiveBound<'k, K> {
    pub(crate) const fn unbounded() -> Self {
        Self {
            low: Bound::Unbounded,
            high: Bound::Unbounded,
        }
    }

    /// True when `value` lies above the high edge.
    pub(crate) fn is_out_of_high(&self, value: &K) -> bool {
        match self.high {
            Bound::Unbounded => false,
            Bound::Included(high) => value > high,
            Bound::Excluded(high) => value >= high,
        }
    }

    /// True when no key, even in a dense completion of `K`, lies inside.
    ///
    /// For discrete keys an interval such as `(3, 4)` is reported non-empty;
    /// merging it only yields an unreachable subtree.
    pub(crate) fn is_empty(&self) -> bool {
        match (self.low, self.high) {
            (Bound::Included(low), Bound::Included(high)) => low > high,
            (Bound::Included(low) | Bound::Excluded(low), Bound::Excluded(high))
            | (Bound::Excluded(low), Bound::Included(high)) => low >= high,
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
        }
    }

    /// Narrows to the keys left of `separator` for a split of `class`.
    pub(crate) fn left_of(self, separator: &'k K, class: OperatorClass) -> Self {
        let edge = match class {
            OperatorClass::Less => Bound::Excluded(separator),
            OperatorClass::LessEqual => Bound::Included(separator),
        };
        Self {
            low: self.low,
            high: tighter_high(self.high, edge),
        }
    }

    /// Narrows to the keys right of `separator` for a split of `class`.
    pub(crate) fn right_of(self, separator: &'k K, class: OperatorClass) -> Self {
        let edge = match class {
            OperatorClass::Less => Bound::Included(separator),
            OperatorClass::LessEqual => Bound::Excluded(separator),
        };
        Self {
            low: tighter_low(self.low, edge),
            high: self.high,
        }
    }

    /// The bound as a `RangeBounds` pair.
    pub(crate) const fn as_range(&self) -> (Bound<&'k K>, Bound<&'k K>) {
        (self.low, self.high)
    }

    /// Everything from the low edge upwards, for ordered map lookups that
    /// stop on their own once [`ActiveBound::is_out_of_high`] holds.
    pub(crate) const fn from_low(&self) -> (Bound<&'k K>, Bound<&'k K>) {
        (self.low, Bound::Unbounded)
    }
}

fn tighter_high<'k, K: Ord>(current: Bound<&'k K>, edge: Bound<&'k K>) -> Bound<&'k K> {
    match (current, edge) {
        (Bound::Unbounded, _) => edge,
        (_, Bound::Unbounded) => current,
        (
            Bound::Included(a) | Bound::Excluded(a),
            Bound::Included(b) | Bound::Excluded(b),
        ) => {
            if a < b {
                current
            } else if b < a {
                edge
            } else if matches!(current, Bound::Excluded(_)) {
                current
            } else {
                edge
            }
        }
    }
}

fn tighter_low<'k, K: Ord>(current: Bound<&'k K>, edge: Bound<&'k K>) -> Bound<&'k K> {
    match (current, edge) {
        (Bound::Unbounded, _) => edge,
        (_, Bound::Unbounded) => current,
        (
            Bound::Included(a) | Bound::Excluded(a),
            Bound::Included(b) | Bound::Excluded(b),
        ) => {
            if a > b {
                current
            } else if b > a {
                edge
            } else if matches!(current, Bound::Excluded(_)) {
                current
            } else {
                edge
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::ops::RangeBounds;

    use super::*;

    fn admits(bound: &ActiveBound<'_, i32>, key: i32) -> bool {
        bound.as_range().contains(&key)
    }

    #[test]
    fn unbounded_admits_everything() {
        let bound = ActiveBound::<i32>::unbounded();
        assert!(admits(&bound, i32::MIN));
        assert!(admits(&bound, i32::MAX));
        assert!(!bound.is_empty());
    }

    #[test]
    fn inclusivity_follows_class() {
        let sep = 10;
        let left_lt = ActiveBound::unbounded().left_of(&sep, OperatorClass::Less);
        assert!(admits(&left_lt, 9));
        assert!(!admits(&left_lt, 10));

        let left_le = ActiveBound::unbounded().left_of(&sep, OperatorClass::LessEqual);
        assert!(admits(&left_le, 10));
        assert!(!admits(&left_le, 11));

        let right_lt = ActiveBound::unbounded().right_of(&sep, OperatorClass::Less);
        assert!(admits(&right_lt, 10));
        assert!(!admits(&right_lt, 9));

        let right_le = ActiveBound::unbounded().right_of(&sep, OperatorClass::LessEqual);
        assert!(!admits(&right_le, 10));
        assert!(admits(&right_le, 11));
    }

    #[test]
    fn narrowing_never_widens() {
        let (five, ten) = (5, 10);
        let bound = ActiveBound::unbounded().left_of(&five, OperatorClass::Less);
        let narrowed = bound.left_of(&ten, OperatorClass::LessEqual);
        assert!(!admits(&narrowed, 5));
        assert!(!admits(&narrowed, 10));
        assert!(narrowed.is_out_of_high(&5));
        assert!(!narrowed.is_out_of_high(&4));

        let same_edge = bound.left_of(&five, OperatorClass::LessEqual);
        assert!(!admits(&same_edge, 5), "excluded edge must win a tie");
    }

    #[test]
    fn emptiness_at_a_shared_separator() {
        let sep = 3;
        let point = ActiveBound::unbounded()
            .right_of(&sep, OperatorClass::Less)
            .left_of(&sep, OperatorClass::LessEqual);
        assert!(!point.is_empty());
        assert!(admits(&point, 3));

        let gap = ActiveBound::unbounded()
            .right_of(&sep, OperatorClass::LessEqual)
            .left_of(&sep, OperatorClass::Less);
        assert!(gap.is_empty());

        let same = ActiveBound::unbounded()
            .right_of(&sep, OperatorClass::Less)
            .left_of(&sep, OperatorClass::Less);
        assert!(same.is_empty());
    }

    #[test]
    fn crossed_bounds_are_empty() {
        let (low, high) = (8, 2);
        let bound = ActiveBound::unbounded()
            .right_of(&low, OperatorClass::Less)
            .left_of(&high, OperatorClass::LessEqual);
        assert!(bound.is_empty());
    }
}
