use core::str::FromStr;
use std::fs;
use std::path::Path;

use eyre::{Result as EyreResult, WrapErr};
use serde::Deserialize;

use crate::combinator::Combinator;
use crate::rule::{Key, RuleSet};

/// Two rule sets to intersect, read from a TOML file:
///
/// ```toml
/// combinator = "join"
/// probes = [0, 4, 10]
///
/// [left]
/// default = "high"
/// rules = ["<10:low"]
///
/// [right]
/// default = "other"
/// rules = ["==4:four"]
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    pub left: RuleSet,
    pub right: RuleSet,
    pub combinator: Option<Combinator>,
    #[serde(default)]
    pub probes: Vec<Key>,
}

impl RuleFile {
    pub fn load(path: &Path) -> EyreResult<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read rule file {}", path.display()))?;
        content.parse()
    }
}

impl FromStr for RuleFile {
    type Err = eyre::Report;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        toml::from_str(content).wrap_err("failed to parse rule file")
    }
}
