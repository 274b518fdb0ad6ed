//! Scenario document model
//!
//! Defines the in-memory form of a scenario file as produced by a
//! [`ModelReader`](crate::loader::ModelReader). The model is immutable once
//! loaded and shared read-only by every test derived from it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A complete scenario document
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument {
    /// Suite-level execution settings
    pub settings: Settings,
    /// Facts shared by every scenario in the document
    #[serde(default)]
    pub background: Background,
    /// Description of the simulated model (fact and field catalogue)
    #[serde(default)]
    pub model_descriptor: ModelDescriptor,
    /// The scenarios, in document order
    #[serde(default)]
    pub scenarios: Vec<ScenarioEntry>,
}

/// Settings that select and configure the engine a document runs against
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Engine type: "DMN" or "RULE"
    #[serde(rename = "type")]
    pub engine_type: String,
    /// Decision model file (DMN only)
    pub dmn_file_path: Option<PathBuf>,
    /// Decision model namespace (DMN only)
    pub dmn_namespace: Option<String>,
    /// Decision model name (DMN only)
    pub dmn_name: Option<String>,
    /// Rule flow group to activate (RULE only)
    pub rule_flow_group: Option<String>,
    /// Whether the rule session is stateless (RULE only)
    #[serde(default)]
    pub stateless: bool,
}

/// Background data applied before every scenario of a document
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Background {
    #[serde(default)]
    pub facts: Vec<FactValue>,
}

/// Catalogue of the facts a document talks about
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ModelDescriptor {
    #[serde(default)]
    pub facts: Vec<FactDescriptor>,
}

/// One fact declared in the model descriptor
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FactDescriptor {
    /// Fact name (e.g. "Applicant")
    pub name: String,
    /// Fact class or DMN type
    #[serde(rename = "type")]
    pub type_name: Option<String>,
}

/// One scenario: given facts and expected results
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ScenarioEntry {
    /// Index declared by the document; never renumbered
    pub index: u32,
    /// Human description
    #[serde(default)]
    pub description: String,
    /// Input facts
    #[serde(default)]
    pub given: Vec<FactValue>,
    /// Expected output facts
    #[serde(default)]
    pub expect: Vec<FactValue>,
}

/// A single value bound to `fact.field`
///
/// For given facts `value` is the raw input. For expected facts it is the
/// expression handed to the expression evaluator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FactValue {
    pub fact: String,
    pub field: String,
    pub value: serde_json::Value,
}

impl FactValue {
    /// `fact.field` key used in fact maps
    pub fn key(&self) -> String {
        format!("{}.{}", self.fact, self.field)
    }
}
