//! Expected-value expressions
//!
//! An expected fact carries an expression rather than a plain value. How that
//! expression is read depends on the engine type of the suite: decision
//! models accept unary tests (`"> 18"`, `"-"`), rule sessions compare for
//! equality.

use serde_json::Value;
use std::cmp::Ordering;

use crate::common::{Error, Result};

/// Checks an actual result against an expected expression
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &Value, actual: &Value) -> std::result::Result<bool, String>;
}

/// Engine a scenario document targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Dmn,
    Rule,
}

impl EngineKind {
    pub fn parse(engine_type: &str) -> Result<Self> {
        match engine_type.trim().to_ascii_uppercase().as_str() {
            "DMN" => Ok(EngineKind::Dmn),
            "RULE" => Ok(EngineKind::Rule),
            _ => Err(Error::UnsupportedEngineType(engine_type.to_string())),
        }
    }
}

/// Hands out the evaluator matching a suite's engine type
#[derive(Debug, Clone, Copy)]
pub struct ExpressionEvaluatorFactory {
    kind: EngineKind,
}

impl ExpressionEvaluatorFactory {
    /// Fails with [`Error::UnsupportedEngineType`] for unknown types
    pub fn create(engine_type: &str) -> Result<Self> {
        Ok(Self {
            kind: EngineKind::parse(engine_type)?,
        })
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn evaluator(&self) -> &'static dyn ExpressionEvaluator {
        match self.kind {
            EngineKind::Dmn => &UnaryTestEvaluator,
            EngineKind::Rule => &EqualityEvaluator,
        }
    }
}

/// Strict equality, with numbers compared by value
#[derive(Debug, Default, Clone, Copy)]
pub struct EqualityEvaluator;

impl ExpressionEvaluator for EqualityEvaluator {
    fn evaluate(&self, expression: &Value, actual: &Value) -> std::result::Result<bool, String> {
        Ok(values_equal(expression, actual))
    }
}

/// Unary tests: `-`, `= v`, `!= v`, `< v`, `<= v`, `> v`, `>= v`, or a literal
#[derive(Debug, Default, Clone, Copy)]
pub struct UnaryTestEvaluator;

const OPERATORS: [&str; 6] = [">=", "<=", "!=", ">", "<", "="];

impl ExpressionEvaluator for UnaryTestEvaluator {
    fn evaluate(&self, expression: &Value, actual: &Value) -> std::result::Result<bool, String> {
        let Value::String(text) = expression else {
            return Ok(values_equal(expression, actual));
        };
        let text = text.trim();
        if text == "-" {
            return Ok(true);
        }

        let Some(op) = OPERATORS.iter().find(|op| text.starts_with(**op)) else {
            return Ok(values_equal(&literal(text, actual), actual));
        };
        let operand = literal(text[op.len()..].trim(), actual);

        match *op {
            "=" => Ok(values_equal(&operand, actual)),
            "!=" => Ok(!values_equal(&operand, actual)),
            _ => {
                let ordering = compare(actual, &operand).ok_or_else(|| {
                    format!("cannot compare {actual} with {operand} in '{text}'")
                })?;
                Ok(match *op {
                    ">=" => ordering != Ordering::Less,
                    "<=" => ordering != Ordering::Greater,
                    ">" => ordering == Ordering::Greater,
                    _ => ordering == Ordering::Less,
                })
            }
        }
    }
}

/// Read `text` as a JSON literal unless the actual value is a string
fn literal(text: &str, actual: &Value) -> Value {
    if actual.is_string() {
        let unquoted = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text);
        return Value::String(unquoted.to_string());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) if left.is_number() && right.is_number() => l == r,
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
