//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where and how to look for scenario files
    #[serde(default)]
    pub discovery: DiscoverySettings,

    /// Identity of the test engine in reported trees
    #[serde(default)]
    pub engine: EngineSettings,

    /// External decision engine used by `scesim run`
    #[serde(default)]
    pub decision: DecisionSettings,
}

/// What discovery does with a file that cannot be loaded
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicy {
    /// Abort the whole discovery run on the first bad file
    #[default]
    FailFast,
    /// Record the bad file and keep discovering its siblings
    SkipInvalid,
}

/// Discovery settings
#[derive(Debug, Deserialize)]
pub struct DiscoverySettings {
    /// Directories searched recursively for scenario files
    #[serde(default)]
    pub search_roots: Vec<PathBuf>,

    /// Scenario file extension, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Handling of unreadable or malformed files
    #[serde(default)]
    pub policy: DiscoveryPolicy,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            search_roots: Vec::new(),
            extension: default_extension(),
            policy: DiscoveryPolicy::default(),
        }
    }
}

fn default_extension() -> String {
    crate::naming::SCESIM_EXTENSION.to_string()
}

/// Engine identity settings
#[derive(Debug, Deserialize)]
pub struct EngineSettings {
    /// Value of the root `[engine:<id>]` segment
    #[serde(default = "default_engine_id")]
    pub id: String,

    /// Display name of the root node
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            id: default_engine_id(),
            display_name: default_display_name(),
        }
    }
}

fn default_engine_id() -> String {
    "scenario-simulation".to_string()
}

fn default_display_name() -> String {
    "Scenario Simulation".to_string()
}

/// External decision engine process
#[derive(Debug, Deserialize, Default)]
pub struct DecisionSettings {
    /// Program invoked once per scenario
    pub command: Option<PathBuf>,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
