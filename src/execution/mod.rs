//! Scenario execution
//!
//! Provides:
//! - The coordinator that walks a discovered tree and reports every node
//! - The helper seam that evaluates a single scenario
//! - Expected-value expression evaluation
//! - A decision engine that delegates to an external process

mod command;
mod coordinator;
mod evaluator;
mod helper;

pub use command::CommandEngine;
pub use coordinator::ExecutionCoordinator;
pub use evaluator::{
    EngineKind, EqualityEvaluator, ExpressionEvaluator, ExpressionEvaluatorFactory,
    UnaryTestEvaluator,
};
pub use helper::{
    DecisionEngine, DecisionRequest, FactMap, ResultCheck, ScenarioError, ScenarioRunnerData,
    ScenarioRunnerHelper, StandardRunnerHelper,
};
