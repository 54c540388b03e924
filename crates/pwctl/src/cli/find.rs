use clap::Parser;
use eyre::Result as EyreResult;
use serde::Serialize;

use crate::cli::{Environment, RuleArgs};
use crate::output::{lookup_table, Lookup, Report};
use crate::rule::Key;

/// Build a rule set and look up the action selected for each key
#[derive(Debug, Parser)]
pub struct FindCommand {
    #[command(flatten)]
    pub rules: RuleArgs,

    /// Keys to look up
    #[arg(value_name = "KEY", required = true, allow_negative_numbers = true)]
    pub keys: Vec<Key>,
}

#[derive(Debug, Serialize)]
struct FindReport {
    lookups: Vec<Lookup>,
}

impl Report for FindReport {
    fn report(&self) {
        println!("{}", lookup_table(&self.lookups));
    }
}

impl FindCommand {
    pub fn run(self, environment: &Environment) -> EyreResult<()> {
        let range = self.rules.rule_set().build()?;

        let lookups = self
            .keys
            .iter()
            .map(|key| Lookup {
                key: *key,
                action: range.find(key).clone(),
            })
            .collect();

        environment.output.write(&FindReport { lookups });

        Ok(())
    }
}
