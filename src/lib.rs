//! Scenario Runner - runs scenario simulation files as tests
//!
//! Scenario files are discovered below a set of search roots, turned into a
//! tree of one suite per file and one test per scenario, and executed one
//! scenario at a time with every result reported to an execution listener.

pub mod cli;
pub mod commands;
pub mod common;
pub mod engine;
pub mod execution;
pub mod loader;
pub mod locator;
pub mod model;
pub mod naming;
pub mod reporting;
pub mod tree;

// Re-export commonly used types for tests
pub use common::{DiscoveryError, Error, Result};
pub use engine::{DiscoveryReport, DiscoveryRequest, ScenarioEngine, TestEngine};
pub use reporting::{ExecutionListener, ExecutionResult};
