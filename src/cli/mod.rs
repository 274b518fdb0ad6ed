//! CLI command handling
//!
//! Resolves configuration and flags into a discovery request, drives the
//! engine and formats output.

use colored::Colorize;
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;

use crate::commands::{Commands, DiscoveryArgs, OutputFormat};
use crate::common::config::{Config, DiscoveryPolicy};
use crate::common::{Error, Result};
use crate::engine::{DiscoveryReport, DiscoveryRequest, ScenarioEngine, TestEngine};
use crate::execution::{CommandEngine, StandardRunnerHelper};
use crate::loader::YamlModelReader;
use crate::reporting::{ConsoleReporter, JsonReporter, SummaryListener, TeeListener, TestSummary};
use crate::tree::{Descriptor, UniqueId};

/// Dispatch a CLI command
///
/// Returns `Ok(false)` when discovery skipped files or any node failed.
pub fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Discover { discovery, format } => {
            let config = load_config(&discovery)?;
            let request = discovery_request(&discovery, &config)?;
            let engine = ScenarioEngine::new(YamlModelReader, ()).with_identity(&config.engine);

            let report = engine.discover_tree(&request)?;
            match format {
                OutputFormat::Text => print_tree(&report),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&TreeView::from(&report))?)
                }
            }
            Ok(report.errors.is_empty())
        }

        Commands::Run {
            discovery,
            engine,
            engine_args,
            filters,
            format,
            verbose,
        } => {
            let config = load_config(&discovery)?;
            let request = discovery_request(&discovery, &config)?;
            let filters = filters
                .iter()
                .map(|f| UniqueId::parse(f))
                .collect::<Result<Vec<_>>>()?;

            let (program, args) = match engine {
                Some(program) => (program, engine_args),
                None => {
                    let program = config.decision.command.clone().ok_or_else(|| {
                        Error::Config(
                            "No decision engine. Pass --engine or set decision.command".to_string(),
                        )
                    })?;
                    let args = if engine_args.is_empty() {
                        config.decision.args.clone()
                    } else {
                        engine_args
                    };
                    (program, args)
                }
            };

            let helper = StandardRunnerHelper::new(CommandEngine::new(program, args));
            let engine =
                ScenarioEngine::new(YamlModelReader, helper).with_identity(&config.engine);

            let report = engine.discover(&request)?;
            print_discovery_errors(&report);
            let root = if filters.is_empty() {
                Cow::Borrowed(&report.root)
            } else {
                Cow::Owned(report.root.select(&filters)?)
            };

            let mut summary = SummaryListener::default();
            match format {
                OutputFormat::Text => {
                    let mut console = ConsoleReporter::stdout(verbose);
                    let mut tee = TeeListener::new().with(&mut console).with(&mut summary);
                    engine.execute(&root, &mut tee);
                }
                OutputFormat::Json => {
                    let mut json = JsonReporter::new(std::io::stdout().lock());
                    let mut tee = TeeListener::new().with(&mut json).with(&mut summary);
                    engine.execute(&root, &mut tee);
                }
            }

            let summary = summary.into_summary();
            if format == OutputFormat::Text {
                print_summary(&summary);
            }
            Ok(report.errors.is_empty() && !summary.has_failures())
        }
    }
}

fn load_config(args: &DiscoveryArgs) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Flags take precedence over the config file
fn discovery_request(args: &DiscoveryArgs, config: &Config) -> Result<DiscoveryRequest> {
    let mut request = DiscoveryRequest::from(&config.discovery);
    if !args.roots.is_empty() {
        request.search_roots = args.roots.clone();
    }
    if let Some(extension) = &args.extension {
        request.extension = extension.trim_start_matches('.').to_string();
    }
    if args.skip_invalid {
        request.policy = DiscoveryPolicy::SkipInvalid;
    }
    if request.search_roots.is_empty() {
        return Err(Error::Config(
            "No search roots. Pass --root or set discovery.search_roots".to_string(),
        ));
    }
    Ok(request)
}

fn print_discovery_errors(report: &DiscoveryReport) {
    for error in &report.errors {
        eprintln!("{} {}", "Skipped:".yellow().bold(), error);
    }
}

fn print_tree(report: &DiscoveryReport) {
    let root = &report.root;
    println!(
        "{} {}",
        root.descriptor.display_name.white().bold(),
        root.descriptor.unique_id.to_string().dimmed()
    );
    for suite in &root.suites {
        println!(
            "  {} ({} scenario(s)) {}",
            suite.descriptor.display_name.cyan(),
            suite.tests.len(),
            suite.file.path().display().to_string().dimmed()
        );
        for test in &suite.tests {
            println!("    {}", test.descriptor.display_name);
        }
    }
    print_discovery_errors(report);
}

fn print_summary(summary: &TestSummary) {
    let line = format!(
        "{} passed, {} failed, {} total",
        summary.passed,
        summary.failed,
        summary.total()
    );
    if summary.has_failures() {
        println!("\n{} {}\n", "✗".red().bold(), line.red().bold());
    } else {
        println!("\n{} {}\n", "✓".green().bold(), line.green().bold());
    }
}

#[derive(Serialize)]
struct TreeView<'a> {
    root: &'a Descriptor,
    suites: Vec<SuiteView<'a>>,
    errors: Vec<ErrorView>,
}

#[derive(Serialize)]
struct SuiteView<'a> {
    suite: &'a Descriptor,
    tests: Vec<&'a Descriptor>,
}

#[derive(Serialize)]
struct ErrorView {
    path: PathBuf,
    message: String,
}

impl<'a> From<&'a DiscoveryReport> for TreeView<'a> {
    fn from(report: &'a DiscoveryReport) -> Self {
        Self {
            root: &report.root.descriptor,
            suites: report
                .root
                .suites
                .iter()
                .map(|suite| SuiteView {
                    suite: &suite.descriptor,
                    tests: suite.tests.iter().map(|t| &t.descriptor).collect(),
                })
                .collect(),
            errors: report
                .errors
                .iter()
                .map(|e| ErrorView {
                    path: e.path.clone(),
                    message: e.error.to_string(),
                })
                .collect(),
        }
    }
}
