//! Rule operators and their interval classification.

use core::cmp::Ordering;
use core::fmt;

use strum::EnumString;

use crate::RangeError;

/// Operator attached to a rule.
///
/// The four inequality operators build range splits, [`RangeOperator::Equal`]
/// builds punctual splits. [`RangeOperator::Invalid`] only exists to report
/// misuse and is rejected everywhere a rule is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString)]
pub enum RangeOperator {
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessEqualThan,
    #[strum(serialize = ">")]
    GreatThan,
    #[strum(serialize = ">=")]
    GreatEqualThan,
    #[strum(serialize = "==")]
    Equal,
    #[strum(disabled)]
    Invalid,
}

impl RangeOperator {
    /// The four operators accepted by a range split, in declaration order.
    pub const COMPARISONS: [Self; 4] = [
        Self::LessThan,
        Self::LessEqualThan,
        Self::GreatThan,
        Self::GreatEqualThan,
    ];

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessEqualThan => "<=",
            Self::GreatThan => ">",
            Self::GreatEqualThan => ">=",
            Self::Equal => "==",
            Self::Invalid => "<invalid>",
        }
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessEqualThan | Self::GreatThan | Self::GreatEqualThan
        )
    }

    /// Interval class of a comparison, `None` for `==` and the invalid sentinel.
    #[must_use]
    pub const fn normalized(self) -> Option<OperatorClass> {
        match self {
            Self::LessThan | Self::GreatEqualThan => Some(OperatorClass::Less),
            Self::LessEqualThan | Self::GreatThan => Some(OperatorClass::LessEqual),
            Self::Equal | Self::Invalid => None,
        }
    }

    /// Evaluates `key <op> separator`.
    pub fn evaluate<K: Ord + ?Sized>(self, key: &K, separator: &K) -> Result<bool, RangeError> {
        match self {
            Self::Equal => Ok(key == separator),
            Self::Invalid => Err(RangeError::InvalidOperator),
            _ => Comparison::try_from(self).map(|cmp| cmp.holds(key, separator)),
        }
    }
}

impl fmt::Display for RangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Which side of the separator the separator itself belongs to.
///
/// `Less` puts the separator in the right interval (`< s` | `>= s`),
/// `LessEqual` puts it in the left interval (`<= s` | `> s`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorClass {
    Less,
    LessEqual,
}

/// An operator that is known to be one of the four inequalities.
///
/// Range splits store this instead of [`RangeOperator`], so a split can never
/// hold `==` or the invalid sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    /// The `<` / `<=` comparison whose matched subtree is the left interval of `class`.
    #[must_use]
    pub const fn leftward(class: OperatorClass) -> Self {
        match class {
            OperatorClass::Less => Self::Less,
            OperatorClass::LessEqual => Self::LessEqual,
        }
    }

    #[must_use]
    pub const fn operator(self) -> RangeOperator {
        match self {
            Self::Less => RangeOperator::LessThan,
            Self::LessEqual => RangeOperator::LessEqualThan,
            Self::Greater => RangeOperator::GreatThan,
            Self::GreaterEqual => RangeOperator::GreatEqualThan,
        }
    }

    #[must_use]
    pub const fn class(self) -> OperatorClass {
        match self {
            Self::Less | Self::GreaterEqual => OperatorClass::Less,
            Self::LessEqual | Self::Greater => OperatorClass::LessEqual,
        }
    }

    /// True when the matched subtree of a split covers the left interval.
    #[must_use]
    pub const fn matches_left(self) -> bool {
        matches!(self, Self::Less | Self::LessEqual)
    }

    pub fn holds<K: Ord + ?Sized>(self, key: &K, separator: &K) -> bool {
        let ordering = key.cmp(separator);
        match self {
            Self::Less => ordering == Ordering::Less,
            Self::LessEqual => ordering != Ordering::Greater,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterEqual => ordering != Ordering::Less,
        }
    }
}

impl TryFrom<RangeOperator> for Comparison {
    type Error = RangeError;

    fn try_from(op: RangeOperator) -> Result<Self, Self::Error> {
        match op {
            RangeOperator::LessThan => Ok(Self::Less),
            RangeOperator::LessEqualThan => Ok(Self::LessEqual),
            RangeOperator::GreatThan => Ok(Self::Greater),
            RangeOperator::GreatEqualThan => Ok(Self::GreaterEqual),
            RangeOperator::Equal => Err(RangeError::NotComparison { op }),
            RangeOperator::Invalid => Err(RangeError::InvalidOperator),
        }
    }
}

impl From<Comparison> for RangeOperator {
    fn from(cmp: Comparison) -> Self {
        cmp.operator()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.operator().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbols() {
        assert_eq!("<".parse::<RangeOperator>(), Ok(RangeOperator::LessThan));
        assert_eq!(">=".parse::<RangeOperator>(), Ok(RangeOperator::GreatEqualThan));
        assert_eq!("==".parse::<RangeOperator>(), Ok(RangeOperator::Equal));
        assert!("<invalid>".parse::<RangeOperator>().is_err());
        assert!("!=".parse::<RangeOperator>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for op in RangeOperator::COMPARISONS {
            assert_eq!(op.to_string().parse::<RangeOperator>(), Ok(op));
        }
    }

    #[test]
    fn normalization_pairs_opposite_directions() {
        assert_eq!(
            RangeOperator::LessThan.normalized(),
            RangeOperator::GreatEqualThan.normalized()
        );
        assert_eq!(
            RangeOperator::LessEqualThan.normalized(),
            RangeOperator::GreatThan.normalized()
        );
        assert_eq!(RangeOperator::Equal.normalized(), None);
        assert_eq!(RangeOperator::Invalid.normalized(), None);
    }

    #[test]
    fn evaluate_matches_std_ordering() {
        for key in 0..3 {
            assert_eq!(RangeOperator::LessThan.evaluate(&key, &1), Ok(key < 1));
            assert_eq!(RangeOperator::LessEqualThan.evaluate(&key, &1), Ok(key <= 1));
            assert_eq!(RangeOperator::GreatThan.evaluate(&key, &1), Ok(key > 1));
            assert_eq!(RangeOperator::GreatEqualThan.evaluate(&key, &1), Ok(key >= 1));
            assert_eq!(RangeOperator::Equal.evaluate(&key, &1), Ok(key == 1));
        }
        assert_eq!(
            RangeOperator::Invalid.evaluate(&0, &1),
            Err(RangeError::InvalidOperator)
        );
    }

    #[test]
    fn comparison_rejects_equality() {
        assert_eq!(
            Comparison::try_from(RangeOperator::Equal),
            Err(RangeError::NotComparison {
                op: RangeOperator::Equal
            })
        );
        assert_eq!(
            Comparison::try_from(RangeOperator::Invalid),
            Err(RangeError::InvalidOperator)
        );
    }

    #[test]
    fn matched_side_follows_direction() {
        assert!(Comparison::Less.matches_left());
        assert!(Comparison::LessEqual.matches_left());
        assert!(!Comparison::Greater.matches_left());
        assert!(!Comparison::GreaterEqual.matches_left());
    }
}
