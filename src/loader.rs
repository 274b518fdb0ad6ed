//! Scenario file loading
//!
//! Reads a scenario file, hands its text to a [`ModelReader`] and wraps the
//! parsed document together with its originating path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::{Error, Result};
use crate::model::{Background, ModelDescriptor, ScenarioDocument, ScenarioEntry, Settings};
use crate::naming;

/// Parses raw scenario file text into a [`ScenarioDocument`]
pub trait ModelReader {
    fn parse(&self, raw: &str) -> std::result::Result<ScenarioDocument, String>;
}

/// Reads scenario documents written in YAML (or JSON)
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlModelReader;

impl ModelReader for YamlModelReader {
    fn parse(&self, raw: &str) -> std::result::Result<ScenarioDocument, String> {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    }
}

impl<F> ModelReader for F
where
    F: Fn(&str) -> std::result::Result<ScenarioDocument, String>,
{
    fn parse(&self, raw: &str) -> std::result::Result<ScenarioDocument, String> {
        self(raw)
    }
}

/// A parsed scenario file
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFile {
    path: PathBuf,
    short_name: String,
    document: ScenarioDocument,
}

impl ScenarioFile {
    pub fn new(path: PathBuf, document: ScenarioDocument) -> Self {
        let short_name = naming::short_name_of(&path);
        Self {
            path,
            short_name,
            document,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn document(&self) -> &ScenarioDocument {
        &self.document
    }

    pub fn settings(&self) -> &Settings {
        &self.document.settings
    }

    pub fn background(&self) -> &Background {
        &self.document.background
    }

    pub fn model_descriptor(&self) -> &ModelDescriptor {
        &self.document.model_descriptor
    }

    pub fn scenarios(&self) -> &[ScenarioEntry] {
        &self.document.scenarios
    }
}

/// Loads scenario files through a [`ModelReader`]
#[derive(Debug, Clone, Default)]
pub struct ScenarioLoader<R> {
    reader: R,
}

impl<R: ModelReader> ScenarioLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read and parse one file
    ///
    /// The file handle is closed before parsing starts.
    pub fn load(&self, path: &Path) -> Result<Arc<ScenarioFile>> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;

        let document = self
            .reader
            .parse(&raw)
            .map_err(|message| Error::scenario_parse(path, message))?;

        tracing::debug!(
            "Loaded {} with {} scenario(s)",
            path.display(),
            document.scenarios.len()
        );

        Ok(Arc::new(ScenarioFile::new(path.to_path_buf(), document)))
    }
}
