//! Execution reporting
//!
//! The engine reports every node through an [`ExecutionListener`]: once when
//! it starts and once when it finishes. Listeners only observe; they cannot
//! influence execution.

mod console;
mod json;
mod summary;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use summary::{SummaryListener, TestSummary};

use serde::Serialize;
use std::fmt;

use crate::tree::Descriptor;

/// Why a node failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The scenario's results did not match its expectations
    Scenario,
    /// Anything else raised while running the scenario
    Unexpected,
    /// The suite could not be prepared for execution
    Suite,
}

/// Failure attached to a finished node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome reported when a node finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Successful,
    Failed(Failure),
}

impl ExecutionResult {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed(Failure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, ExecutionResult::Successful)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ExecutionResult::Successful => None,
            ExecutionResult::Failed(failure) => Some(failure),
        }
    }
}

/// Receives start/finish notifications for tree nodes
pub trait ExecutionListener {
    fn execution_started(&mut self, node: &Descriptor);

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult);
}

impl<L: ExecutionListener + ?Sized> ExecutionListener for &mut L {
    fn execution_started(&mut self, node: &Descriptor) {
        (**self).execution_started(node);
    }

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
        (**self).execution_finished(node, result);
    }
}

impl<L: ExecutionListener + ?Sized> ExecutionListener for Box<L> {
    fn execution_started(&mut self, node: &Descriptor) {
        (**self).execution_started(node);
    }

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
        (**self).execution_finished(node, result);
    }
}

/// Forwards every notification to each listener in turn
#[derive(Default)]
pub struct TeeListener<'a> {
    listeners: Vec<&'a mut dyn ExecutionListener>,
}

impl<'a> TeeListener<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: &'a mut dyn ExecutionListener) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl ExecutionListener for TeeListener<'_> {
    fn execution_started(&mut self, node: &Descriptor) {
        for listener in &mut self.listeners {
            listener.execution_started(node);
        }
    }

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
        for listener in &mut self.listeners {
            listener.execution_finished(node, result);
        }
    }
}
