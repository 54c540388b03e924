use std::process::ExitCode;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, Table};
use const_format::concatcp;
use eyre::Report as EyreReport;
use serde::{Serialize, Serializer};
use thiserror::Error as ThisError;

use crate::output::{Format, Output, Report};
use crate::rule::{Key, Rule, RuleSet};

mod find;
mod merge;
mod show;

use find::FindCommand;
use merge::MergeCommand;
use show::ShowCommand;

pub const DEFAULT_LOG_DIRECTIVES: &str = "pwctl=info,piecewise=info";

pub const EXAMPLES: &str = r"
  # Print the tree built from a rule
  $ pwctl show --default high --rule '<10:low'

  # Look up keys against punctual rules
  $ pwctl find --default other --rule ==4:four --rule ==7:seven 4 5 7

  # Intersect the two rule sets of a file and check the result
  $ pwctl merge --file rules.toml --combinator join --probe 10
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  PWCTL_RULES    Comma separated rules for show and find\n",
    "  RUST_LOG       Log filter, defaults to ",
    DEFAULT_LOG_DIRECTIVES,
    "\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Show(ShowCommand),
    Find(FindCommand),
    Merge(MergeCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t, value_enum, global = true)]
    pub format: Format,
}

/// A rule set given on the command line.
#[derive(Debug, Parser)]
pub struct RuleArgs {
    /// Action for keys that no rule selects
    #[arg(long, value_name = "ACTION")]
    pub default: String,

    /// Rule of the form `<OP><KEY>:<ACTION>`, e.g. `<10:low` or `==7:seven`
    #[arg(long = "rule", value_name = "RULE")]
    #[arg(env = "PWCTL_RULES", value_delimiter = ',')]
    pub rules: Vec<Rule>,
}

impl RuleArgs {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            default: self.default.clone(),
            rules: self.rules.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Environment {
    pub output: Output,
}

impl Environment {
    pub const fn new(output: Output) -> Self {
        Self { output }
    }
}

impl RootCommand {
    pub fn run(self) -> Result<(), CliError> {
        let environment = Environment::new(Output::new(self.args.format));

        let result = match self.action {
            SubCommands::Show(show) => show.run(&environment),
            SubCommands::Find(find) => find.run(&environment),
            SubCommands::Merge(merge) => merge.run(&environment),
        };

        if let Err(err) = result {
            let err = match err.downcast::<MergeMismatch>() {
                Ok(err) => CliError::Mismatch(err),
                Err(err) => CliError::Other(err),
            };

            environment.output.write(&err);
            return Err(err);
        }

        Ok(())
    }
}

/// Probes where the merged range disagrees with its operands.
#[derive(Debug, Serialize, ThisError)]
#[error("merged range disagrees with its operands at keys {keys:?}")]
pub struct MergeMismatch {
    pub keys: Vec<Key>,
}

#[derive(Debug, Serialize, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Mismatch(#[from] MergeMismatch),

    #[error(transparent)]
    Other(
        #[from]
        #[serde(serialize_with = "serialize_eyre_report")]
        EyreReport,
    ),
}

impl From<CliError> for ExitCode {
    fn from(error: CliError) -> Self {
        match error {
            CliError::Mismatch(_) => Self::from(3),
            CliError::Other(_) => Self::FAILURE,
        }
    }
}

impl Report for CliError {
    fn report(&self) {
        let mut table = Table::new();
        let _ = table.set_header(vec![Cell::new("ERROR").fg(Color::Red)]);
        let _ = table.add_row(vec![match self {
            Self::Mismatch(err) => err.to_string(),
            Self::Other(err) => format!("{err:?}"),
        }]);
        println!("{table}");
    }
}

fn serialize_eyre_report<S>(report: &EyreReport, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(report.chain().map(ToString::to_string))
}
