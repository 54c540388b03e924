use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;

use eyre::{Result as EyreResult, WrapErr};
use piecewise::{Range, RangeOperator};
use serde::Deserialize;
use thiserror::Error as ThisError;

pub type Key = i64;
pub type Rules = Range<Key, String>;

/// A single `<OP><KEY>:<ACTION>` rule, e.g. `<10:low` or `==7:seven`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rule {
    pub op: RangeOperator,
    pub key: Key,
    pub action: String,
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("rule `{0}` is missing `:` between key and action")]
    MissingSeparator(String),
    #[error("rule `{rule}` starts with unknown operator `{op}`, expected one of <, <=, >, >=, ==")]
    UnknownOperator { rule: String, op: String },
    #[error("rule `{rule}` has an invalid key")]
    InvalidKey {
        rule: String,
        #[source]
        source: ParseIntError,
    },
    #[error("rule `{0}` has an empty action")]
    EmptyAction(String),
}

impl FromStr for Rule {
    type Err = RuleParseError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let rule = rule.trim();
        let (condition, action) = rule
            .split_once(':')
            .ok_or_else(|| RuleParseError::MissingSeparator(rule.to_owned()))?;

        let split = condition
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '!'))
            .unwrap_or(condition.len());
        let (op, key) = condition.split_at(split);

        let op = op
            .parse::<RangeOperator>()
            .map_err(|_| RuleParseError::UnknownOperator {
                rule: rule.to_owned(),
                op: op.to_owned(),
            })?;
        let key = key
            .trim()
            .parse::<Key>()
            .map_err(|source| RuleParseError::InvalidKey {
                rule: rule.to_owned(),
                source,
            })?;

        let action = action.trim();
        if action.is_empty() {
            return Err(RuleParseError::EmptyAction(rule.to_owned()));
        }

        Ok(Self {
            op,
            key,
            action: action.to_owned(),
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", self.op, self.key, self.action)
    }
}

impl TryFrom<String> for Rule {
    type Error = RuleParseError;

    fn try_from(rule: String) -> Result<Self, Self::Error> {
        rule.parse()
    }
}

/// A default action and the rules to add to it, in order.
#[derive(Clone, Debug, Deserialize)]
pub struct RuleSet {
    pub default: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn build(&self) -> EyreResult<Rules> {
        let mut range = Range::new(self.default.clone());
        for rule in &self.rules {
            range
                .add_range(rule.op, rule.key, rule.action.clone())
                .wrap_err_with(|| format!("failed to add rule `{rule}`"))?;
        }
        Ok(range)
    }
}
