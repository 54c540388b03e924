use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use clap::Parser;
use eyre::{Result as EyreResult, WrapErr};
use piecewise::{Range, RangeOperator, Visitor};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Environment, MergeMismatch};
use crate::combinator::Combinator;
use crate::output::{probe_table, Probe, Report, TreeReport};
use crate::rule::{Key, Rules};
use crate::rule_file::RuleFile;

/// Intersect the two rule sets of a TOML file and check the result key by key
#[derive(Debug, Parser)]
pub struct MergeCommand {
    /// Rule file with `left` and `right` rule sets
    #[arg(long, short, value_name = "PATH")]
    pub file: PathBuf,

    /// Combinator for the actions of both sets, overrides the file
    #[arg(long, value_enum)]
    pub combinator: Option<Combinator>,

    /// Extra key to check, may be repeated
    #[arg(long = "probe", value_name = "KEY", allow_negative_numbers = true)]
    pub probes: Vec<Key>,
}

#[derive(Debug, Serialize)]
struct MergeReport {
    combinator: Combinator,
    tree: TreeReport,
    probes: Vec<Probe>,
}

impl Report for MergeReport {
    fn report(&self) {
        println!("combinator: {:?}", self.combinator);
        self.tree.report();
        println!("{}", probe_table(&self.probes));
    }
}

impl MergeCommand {
    pub fn run(self, environment: &Environment) -> EyreResult<()> {
        let file = RuleFile::load(&self.file)?;
        info!(path = %self.file.display(), "loaded rule file");

        let left = file.left.build().wrap_err("invalid `left` rule set")?;
        let right = file.right.build().wrap_err("invalid `right` rule set")?;

        let combinator = self.combinator.or(file.combinator).unwrap_or_default();
        let merged = Range::intersect(&left, &right, |a, b| combinator.apply(a, b))?;

        let mut keys: BTreeSet<Key> = file.probes.iter().chain(&self.probes).copied().collect();
        if keys.is_empty() {
            keys = boundary_keys(&[&left, &right]);
        }

        let probes: Vec<_> = keys
            .into_iter()
            .map(|key| {
                let (a, b) = (left.find(&key), right.find(&key));
                Probe {
                    key,
                    left: a.clone(),
                    right: b.clone(),
                    expected: combinator.apply(a, b),
                    merged: merged.find(&key).clone(),
                }
            })
            .collect();

        let mismatched: Vec<_> = probes
            .iter()
            .filter(|probe| !probe.holds())
            .map(|probe| probe.key)
            .collect();
        info!(
            probes = probes.len(),
            mismatched = mismatched.len(),
            "checked merged rule set"
        );

        environment.output.write(&MergeReport {
            combinator,
            tree: TreeReport::new(&merged),
            probes,
        });

        if !mismatched.is_empty() {
            warn!(keys = ?mismatched, "merged rule set disagrees with its operands");
            return Err(MergeMismatch { keys: mismatched }.into());
        }

        Ok(())
    }
}

/// Every separator and punctual key of the given ranges, with both neighbours.
#[derive(Debug, Default)]
struct BoundaryKeys(BTreeSet<Key>);

impl BoundaryKeys {
    fn around(&mut self, key: Key) {
        self.0.extend([key.saturating_sub(1), key, key.saturating_add(1)]);
    }
}

impl Visitor<Key, String> for BoundaryKeys {
    fn visit_range(&mut self, _op: RangeOperator, separator: &Key) {
        self.around(*separator);
    }

    fn visit_punctual(&mut self, _op: RangeOperator, entries: &BTreeMap<Key, String>) {
        for key in entries.keys() {
            self.around(*key);
        }
    }
}

fn boundary_keys(ranges: &[&Rules]) -> BTreeSet<Key> {
    let mut keys = BoundaryKeys::default();
    for range in ranges {
        range.traverse(&mut keys);
    }
    if keys.0.is_empty() {
        let _inserted = keys.0.insert(0);
    }
    keys.0
}
