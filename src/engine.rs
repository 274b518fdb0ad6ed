//! The scenario test engine
//!
//! A host drives an engine in two strictly sequential phases: [`discover`]
//! builds the whole tree (all file I/O happens here), then [`execute`] runs
//! it and reports through an [`ExecutionListener`].
//!
//! [`discover`]: TestEngine::discover
//! [`execute`]: TestEngine::execute

use std::path::PathBuf;

use crate::common::config::{DiscoveryPolicy, DiscoverySettings, EngineSettings};
use crate::common::{DiscoveryError, Result};
use crate::execution::{ExecutionCoordinator, ScenarioRunnerHelper};
use crate::loader::{ModelReader, ScenarioLoader};
use crate::locator::ResourceLocator;
use crate::reporting::ExecutionListener;
use crate::tree::{EngineNode, TreeBuilder, UniqueId};

/// What to discover
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    /// Directories searched recursively
    pub search_roots: Vec<PathBuf>,
    /// File extension, without the leading dot
    pub extension: String,
    pub policy: DiscoveryPolicy,
}

impl DiscoveryRequest {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        let defaults = DiscoverySettings::default();
        Self {
            search_roots,
            extension: defaults.extension,
            policy: defaults.policy,
        }
    }

    pub fn with_policy(mut self, policy: DiscoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl From<&DiscoverySettings> for DiscoveryRequest {
    fn from(settings: &DiscoverySettings) -> Self {
        Self {
            search_roots: settings.search_roots.clone(),
            extension: settings.extension.clone(),
            policy: settings.policy,
        }
    }
}

/// A discovered tree plus the files that were left out of it
#[derive(Debug)]
pub struct DiscoveryReport {
    pub root: EngineNode,
    /// Only populated under [`DiscoveryPolicy::SkipInvalid`]
    pub errors: Vec<DiscoveryError>,
}

/// Host-facing engine interface
pub trait TestEngine {
    fn id(&self) -> &str;

    fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryReport>;

    fn execute(&self, root: &EngineNode, listener: &mut dyn ExecutionListener);
}

/// Discovers scenario files and runs them through a helper
pub struct ScenarioEngine<R, H> {
    id: String,
    display_name: String,
    loader: ScenarioLoader<R>,
    helper: H,
}

impl<R: ModelReader, H> ScenarioEngine<R, H> {
    pub fn new(reader: R, helper: H) -> Self {
        let defaults = EngineSettings::default();
        Self {
            id: defaults.id,
            display_name: defaults.display_name,
            loader: ScenarioLoader::new(reader),
            helper,
        }
    }

    /// Override the root identity and display name
    pub fn with_identity(mut self, settings: &EngineSettings) -> Self {
        self.id = settings.id.clone();
        self.display_name = settings.display_name.clone();
        self
    }

    /// Locate, load and attach every scenario file
    ///
    /// Needs no helper, so a tree can be listed without anything to run it.
    pub fn discover_tree(&self, request: &DiscoveryRequest) -> Result<DiscoveryReport> {
        let locator = ResourceLocator::new(request.search_roots.iter().cloned());
        let mut builder = TreeBuilder::new(UniqueId::engine(&self.id), &self.display_name);
        let mut errors = Vec::new();

        for path in locator.locate(&request.extension) {
            let added = self
                .loader
                .load(&path)
                .and_then(|file| builder.add_file(file));

            if let Err(error) = added {
                match request.policy {
                    DiscoveryPolicy::FailFast => return Err(error),
                    DiscoveryPolicy::SkipInvalid => {
                        tracing::warn!("Skipping {}: {}", path.display(), error);
                        errors.push(DiscoveryError { path, error });
                    }
                }
            }
        }

        let root = builder.finish();
        tracing::info!(
            "Discovered {} suite(s) with {} test(s)",
            root.suites.len(),
            root.test_count()
        );
        Ok(DiscoveryReport { root, errors })
    }
}

impl<R: ModelReader, H: ScenarioRunnerHelper> TestEngine for ScenarioEngine<R, H> {
    fn id(&self) -> &str {
        &self.id
    }

    fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryReport> {
        self.discover_tree(request)
    }

    fn execute(&self, root: &EngineNode, listener: &mut dyn ExecutionListener) {
        ExecutionCoordinator::new(&self.helper).execute(root, listener);
    }
}
