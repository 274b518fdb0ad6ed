//! Error types for the scenario runner
//!
//! Discovery-time problems (unreadable files, malformed documents, identity
//! collisions) are fatal to the file they concern. Execution-time problems
//! never surface here; they are attached to the failing scenario instead
//! (see [`crate::execution::ScenarioError`]).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Discovery Errors ===
    #[error("Failed to read scenario file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Issue on parsing scenario file '{path}': {message}")]
    ScenarioParse { path: String, message: String },

    #[error("Duplicate test identity '{id}' produced by '{}' and '{}'", first.display(), second.display())]
    IdentityCollision {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid unique id: {0}")]
    InvalidUniqueId(String),

    #[error("No suite or scenario with id '{0}'")]
    UnknownNode(String),

    // === Execution Setup Errors ===
    #[error("Unsupported scenario engine type '{0}'. Supported types: 'DMN', 'RULE'")]
    UnsupportedEngineType(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a file read error for `path`
    pub fn file_read(path: &Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a parse error for `path`
    pub fn scenario_parse(path: &Path, message: impl ToString) -> Self {
        Self::ScenarioParse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

/// A scenario file that could not contribute to the test tree
#[derive(Debug)]
pub struct DiscoveryError {
    /// File the error was raised for
    pub path: PathBuf,
    /// Underlying cause
    pub error: Error,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
