//! Running a single scenario
//!
//! [`ScenarioRunnerHelper`] is the seam between the engine and whatever
//! actually evaluates a scenario. [`StandardRunnerHelper`] is the stock
//! implementation: it feeds background and given facts to a
//! [`DecisionEngine`] and checks the expected facts against the results.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use super::evaluator::ExpressionEvaluatorFactory;
use crate::model::{Background, FactValue, ModelDescriptor, ScenarioEntry, Settings};

/// Facts keyed by `fact.field`
pub type FactMap = BTreeMap<String, Value>;

/// Ways a scenario can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    /// Results did not reconcile with the expectations
    #[error("{0}")]
    Failed(String),

    /// Anything else, including engine and helper defects
    #[error("Unexpected test error: {0}")]
    Unexpected(String),
}

/// Outcome of checking one expected fact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCheck {
    pub key: String,
    pub expression: Value,
    pub actual: Option<Value>,
    pub passed: bool,
    pub error: Option<String>,
}

/// Working state of one scenario execution
///
/// A fresh value is created for every scenario and dropped when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioRunnerData {
    /// Inputs handed to the engine (background first, then given)
    pub given: FactMap,
    /// Expectations of the scenario
    pub expected: Vec<FactValue>,
    /// Outputs produced by the engine
    pub results: FactMap,
    /// One entry per expected fact
    pub checks: Vec<ResultCheck>,
}

impl ScenarioRunnerData {
    pub fn is_empty(&self) -> bool {
        self.given.is_empty()
            && self.expected.is_empty()
            && self.results.is_empty()
            && self.checks.is_empty()
    }
}

/// Evaluates one scenario entry
pub trait ScenarioRunnerHelper {
    fn run(
        &self,
        descriptor: &ModelDescriptor,
        entry: &ScenarioEntry,
        evaluators: &ExpressionEvaluatorFactory,
        data: &mut ScenarioRunnerData,
        settings: &Settings,
        background: &Background,
    ) -> Result<(), ScenarioError>;
}

/// Input passed to a [`DecisionEngine`]
#[derive(Debug, Serialize)]
pub struct DecisionRequest<'a> {
    pub settings: &'a Settings,
    pub model: &'a ModelDescriptor,
    pub inputs: &'a FactMap,
}

/// Rule or decision engine that turns inputs into results
pub trait DecisionEngine {
    fn evaluate(&self, request: &DecisionRequest<'_>) -> Result<FactMap, String>;
}

impl<F> DecisionEngine for F
where
    F: Fn(&DecisionRequest<'_>) -> Result<FactMap, String>,
{
    fn evaluate(&self, request: &DecisionRequest<'_>) -> Result<FactMap, String> {
        self(request)
    }
}

/// Given/expect runner on top of a [`DecisionEngine`]
#[derive(Debug, Clone)]
pub struct StandardRunnerHelper<E> {
    engine: E,
}

impl<E: DecisionEngine> StandardRunnerHelper<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    fn check_declared(descriptor: &ModelDescriptor, facts: &[FactValue]) -> Result<(), ScenarioError> {
        if descriptor.facts.is_empty() {
            return Ok(());
        }
        match facts
            .iter()
            .find(|f| !descriptor.facts.iter().any(|d| d.name == f.fact))
        {
            Some(undeclared) => Err(ScenarioError::Failed(format!(
                "Fact '{}' is not declared in the model descriptor",
                undeclared.fact
            ))),
            None => Ok(()),
        }
    }
}

impl<E: DecisionEngine> ScenarioRunnerHelper for StandardRunnerHelper<E> {
    fn run(
        &self,
        descriptor: &ModelDescriptor,
        entry: &ScenarioEntry,
        evaluators: &ExpressionEvaluatorFactory,
        data: &mut ScenarioRunnerData,
        settings: &Settings,
        background: &Background,
    ) -> Result<(), ScenarioError> {
        Self::check_declared(descriptor, &background.facts)?;
        Self::check_declared(descriptor, &entry.given)?;
        Self::check_declared(descriptor, &entry.expect)?;

        for fact in background.facts.iter().chain(&entry.given) {
            data.given.insert(fact.key(), fact.value.clone());
        }
        data.expected = entry.expect.clone();

        data.results = self
            .engine
            .evaluate(&DecisionRequest {
                settings,
                model: descriptor,
                inputs: &data.given,
            })
            .map_err(ScenarioError::Unexpected)?;

        let evaluator = evaluators.evaluator();
        for expected in &entry.expect {
            let key = expected.key();
            let actual = data.results.get(&key).cloned();
            let outcome = evaluator.evaluate(&expected.value, actual.as_ref().unwrap_or(&Value::Null));
            let (passed, error) = match outcome {
                Ok(passed) => (passed, None),
                Err(e) => (false, Some(e)),
            };
            data.checks.push(ResultCheck {
                key,
                expression: expected.value.clone(),
                actual,
                passed,
                error,
            });
        }

        let mismatches: Vec<String> = data
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| {
                let actual = c
                    .actual
                    .as_ref()
                    .map_or_else(|| "<missing>".to_string(), Value::to_string);
                match &c.error {
                    Some(e) => format!("{}: expected {}, got {} ({})", c.key, c.expression, actual, e),
                    None => format!("{}: expected {}, got {}", c.key, c.expression, actual),
                }
            })
            .collect();

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::Failed(format!(
                "Scenario '#{}: {}' failed:\n{}",
                entry.index,
                entry.description,
                mismatches.join("\n")
            )))
        }
    }
}
