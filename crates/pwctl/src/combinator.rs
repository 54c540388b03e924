use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the actions of two rule sets are combined for a shared key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// `left+right`
    #[default]
    Join,
    /// Keep the action of the first rule set
    Left,
    /// Keep the action of the second rule set
    Right,
}

impl Combinator {
    pub fn apply(self, left: &str, right: &str) -> String {
        match self {
            Self::Join => format!("{left}+{right}"),
            Self::Left => left.to_owned(),
            Self::Right => right.to_owned(),
        }
    }
}
