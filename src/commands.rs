//! CLI command definitions
//!
//! Defines the clap commands for the scenario runner CLI.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// List the suites and scenarios that would run
    Discover {
        #[command(flatten)]
        discovery: DiscoveryArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Discover and run every scenario
    Run {
        #[command(flatten)]
        discovery: DiscoveryArgs,

        /// Decision engine program, run once per scenario
        /// (default: decision.command from the config file)
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Argument passed to the decision engine program
        /// Can be specified multiple times: --engine-arg --model --engine-arg loan.dmn
        #[arg(long = "engine-arg", allow_hyphen_values = true)]
        engine_args: Vec<String>,

        /// Run only this suite or scenario, given by unique id (repeatable)
        /// e.g. --filter '[engine:scenario-simulation]/[testscenario:Loan]'
        #[arg(long = "filter", value_name = "UNIQUE_ID")]
        filters: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show scenario file paths
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Arguments shared by every command that discovers scenarios
#[derive(Args, Debug, Clone)]
pub struct DiscoveryArgs {
    /// Directory to search for scenario files (repeatable)
    #[arg(long = "root", short = 'r')]
    pub roots: Vec<PathBuf>,

    /// Scenario file extension without the dot (default: scesim)
    #[arg(long)]
    pub extension: Option<String>,

    /// Configuration file (default: platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip files that cannot be loaded instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
