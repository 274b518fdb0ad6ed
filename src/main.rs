//! Scenario Runner CLI
//!
//! Discovers scenario simulation files and runs every scenario as a test.

use clap::Parser;
use scenario_runner::commands::Commands;
use scenario_runner::{cli, common::logging};

#[derive(Parser)]
#[command(name = "scesim", about = "Scenario simulation test runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.debug);

    match cli::dispatch(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
