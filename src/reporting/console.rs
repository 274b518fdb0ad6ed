//! Human-readable console output

use colored::Colorize;
use std::fmt;
use std::io::Write;

use super::{ExecutionListener, ExecutionResult};
use crate::tree::{self, Descriptor, NodeType};

/// Prints suites and scenarios as they run
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    suite_passed: usize,
    suite_failed: usize,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(std::io::stdout(), verbose)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            suite_passed: 0,
            suite_failed: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            tracing::warn!("Failed to write console report: {}", e);
        }
    }
}

impl<W: Write> ExecutionListener for ConsoleReporter<W> {
    fn execution_started(&mut self, node: &Descriptor) {
        if node.node_type != NodeType::Container || node.source.is_none() {
            return;
        }
        self.suite_passed = 0;
        self.suite_failed = 0;
        self.line(format_args!(
            "\n{} {}",
            "Running Suite:".blue().bold(),
            node.display_name.white().bold()
        ));
        if self.verbose {
            if let Some(path) = tree::source_of(node) {
                self.line(format_args!("  {}", path.display().to_string().dimmed()));
            }
        }
    }

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
        match (node.node_type, result) {
            (NodeType::Test, ExecutionResult::Successful) => {
                self.suite_passed += 1;
                self.line(format_args!("  {} {}", "✓".green(), node.display_name));
            }
            (NodeType::Test, ExecutionResult::Failed(failure)) => {
                self.suite_failed += 1;
                self.line(format_args!("  {} {}", "✗".red(), node.display_name));
                for line in failure.message.lines() {
                    self.line(format_args!("      {}", line.red()));
                }
            }
            (NodeType::Container, _) if node.source.is_none() => {}
            (NodeType::Container, ExecutionResult::Successful) => {
                let passed = self.suite_passed.to_string().green();
                let failed = self.suite_failed.to_string().red();
                self.line(format_args!("  {passed} passed, {failed} failed"));
            }
            (NodeType::Container, ExecutionResult::Failed(failure)) => {
                self.line(format_args!(
                    "  {} {}",
                    "Suite failed:".red().bold(),
                    failure.message.red()
                ));
            }
        }
    }
}
