use clap::Parser;
use eyre::Result as EyreResult;
use tracing::debug;

use crate::cli::{Environment, RuleArgs};
use crate::output::TreeReport;

/// Build a rule set and print its tree
#[derive(Debug, Parser)]
pub struct ShowCommand {
    #[command(flatten)]
    pub rules: RuleArgs,
}

impl ShowCommand {
    pub fn run(self, environment: &Environment) -> EyreResult<()> {
        let range = self.rules.rule_set().build()?;
        debug!(rules = self.rules.rules.len(), "built rule set");

        environment.output.write(&TreeReport::new(&range));

        Ok(())
    }
}
