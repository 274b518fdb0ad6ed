//! Test tree construction
//!
//! The tree has exactly two levels below the engine root: one suite per
//! scenario file and one test per scenario inside it. Nodes hold no execution
//! state; a test only references the shared, read-only [`ScenarioFile`] it was
//! built from.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::{Error, Result};
use crate::loader::ScenarioFile;
use crate::model::ScenarioEntry;
use crate::naming;

/// One `[kind:value]` segment of a [`UniqueId`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    pub kind: String,
    pub value: String,
}

/// Hierarchical node identity, e.g. `[engine:x]/[testscenario:Loan]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueId {
    segments: Vec<Segment>,
}

impl UniqueId {
    /// Root identity for an engine
    pub fn engine(id: &str) -> Self {
        Self {
            segments: vec![Segment {
                kind: "engine".to_string(),
                value: id.to_string(),
            }],
        }
    }

    /// A new identity with one more segment
    pub fn append(&self, kind: &str, value: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            kind: kind.to_string(),
            value: value.to_string(),
        });
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Whether `prefix` is this identity or one of its ancestors
    pub fn has_prefix(&self, prefix: &UniqueId) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Parse the `[kind:value]/[kind:value]` form produced by `Display`
    pub fn parse(s: &str) -> Result<Self> {
        let segments = s
            .split('/')
            .map(|part| {
                let inner = part
                    .strip_prefix('[')
                    .and_then(|p| p.strip_suffix(']'))
                    .ok_or_else(|| Error::InvalidUniqueId(s.to_string()))?;
                let (kind, value) = inner
                    .split_once(':')
                    .ok_or_else(|| Error::InvalidUniqueId(s.to_string()))?;
                if kind.is_empty() {
                    return Err(Error::InvalidUniqueId(s.to_string()));
                }
                Ok(Segment {
                    kind: kind.to_string(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "[{}:{}]", segment.kind, segment.value)?;
        }
        Ok(())
    }
}

impl Serialize for UniqueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Kind of node in the reported tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Container,
    Test,
}

/// What a reporter needs to know about a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub unique_id: UniqueId,
    pub display_name: String,
    pub node_type: NodeType,
    /// Scenario file the node was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// Root of a discovered tree
#[derive(Debug, Clone)]
pub struct EngineNode {
    pub descriptor: Descriptor,
    pub suites: Vec<SuiteNode>,
}

/// One scenario file
#[derive(Debug, Clone)]
pub struct SuiteNode {
    pub descriptor: Descriptor,
    pub file: Arc<ScenarioFile>,
    pub tests: Vec<TestNode>,
}

/// One scenario
#[derive(Debug, Clone)]
pub struct TestNode {
    pub descriptor: Descriptor,
    pub file: Arc<ScenarioFile>,
    /// Position of the entry in `file.scenarios()`
    position: usize,
}

impl TestNode {
    pub fn entry(&self) -> &ScenarioEntry {
        &self.file.scenarios()[self.position]
    }

    pub fn index(&self) -> u32 {
        self.entry().index
    }
}

impl EngineNode {
    pub fn test_count(&self) -> usize {
        self.suites.iter().map(|s| s.tests.len()).sum()
    }

    /// Every test in execution order
    pub fn tests(&self) -> impl Iterator<Item = &TestNode> {
        self.suites.iter().flat_map(|s| s.tests.iter())
    }

    /// Find any node by identity
    pub fn find(&self, id: &UniqueId) -> Option<&Descriptor> {
        if &self.descriptor.unique_id == id {
            return Some(&self.descriptor);
        }
        self.suites.iter().find_map(|suite| {
            if &suite.descriptor.unique_id == id {
                Some(&suite.descriptor)
            } else if id.has_prefix(&suite.descriptor.unique_id) {
                suite
                    .tests
                    .iter()
                    .find(|t| &t.descriptor.unique_id == id)
                    .map(|t| &t.descriptor)
            } else {
                None
            }
        })
    }
}

impl EngineNode {
    /// The subtree selected by `ids`
    ///
    /// A selected suite keeps all of its tests; a selected test keeps its
    /// suite. Every id must name a node of this tree.
    pub fn select(&self, ids: &[UniqueId]) -> Result<EngineNode> {
        if let Some(unknown) = ids.iter().find(|id| self.find(id).is_none()) {
            return Err(Error::UnknownNode(unknown.to_string()));
        }

        let selected = |id: &UniqueId| ids.iter().any(|wanted| id.has_prefix(wanted));
        let suites = self
            .suites
            .iter()
            .filter_map(|suite| {
                let tests: Vec<TestNode> = suite
                    .tests
                    .iter()
                    .filter(|t| selected(&t.descriptor.unique_id))
                    .cloned()
                    .collect();
                let keep = !tests.is_empty() || selected(&suite.descriptor.unique_id);
                keep.then(|| SuiteNode {
                    descriptor: suite.descriptor.clone(),
                    file: Arc::clone(&suite.file),
                    tests,
                })
            })
            .collect();

        Ok(EngineNode {
            descriptor: self.descriptor.clone(),
            suites,
        })
    }
}

/// Incrementally builds an [`EngineNode`]
///
/// Files are attached in the order they are added. A file whose suite or
/// test identities would collide with an existing node is rejected as a
/// whole and leaves the tree untouched.
pub struct TreeBuilder {
    root: EngineNode,
    /// Suite identity -> file that claimed it
    claimed: HashMap<UniqueId, PathBuf>,
}

impl TreeBuilder {
    pub fn new(root_id: UniqueId, display_name: &str) -> Self {
        Self {
            root: EngineNode {
                descriptor: Descriptor {
                    unique_id: root_id,
                    display_name: display_name.to_string(),
                    node_type: NodeType::Container,
                    source: None,
                },
                suites: Vec::new(),
            },
            claimed: HashMap::new(),
        }
    }

    /// Attach one suite for `file` with one test per scenario
    pub fn add_file(&mut self, file: Arc<ScenarioFile>) -> Result<()> {
        let short_name = file.short_name().to_string();
        let suite_id = naming::suite_identity(&self.root.descriptor.unique_id, &short_name);

        if let Some(first) = self.claimed.get(&suite_id) {
            return Err(Error::IdentityCollision {
                id: suite_id.to_string(),
                first: first.clone(),
                second: file.path().to_path_buf(),
            });
        }

        let description = {
            let path = file.path().to_string_lossy();
            naming::describe_simulation(Some(path.as_ref()), file.scenarios())
        };

        let mut seen = HashMap::new();
        let mut tests = Vec::with_capacity(file.scenarios().len());
        for ((position, entry), scenario) in
            file.scenarios().iter().enumerate().zip(description.children)
        {
            let test_id = naming::leaf_identity(&suite_id, &short_name, entry.index);
            if seen.insert(test_id.clone(), position).is_some() {
                return Err(Error::IdentityCollision {
                    id: test_id.to_string(),
                    first: file.path().to_path_buf(),
                    second: file.path().to_path_buf(),
                });
            }
            tests.push(TestNode {
                descriptor: Descriptor {
                    unique_id: test_id,
                    display_name: scenario.name,
                    node_type: NodeType::Test,
                    source: Some(file.path().to_path_buf()),
                },
                file: Arc::clone(&file),
                position,
            });
        }

        tracing::debug!("Suite {} with {} test(s)", suite_id, tests.len());
        self.claimed
            .insert(suite_id.clone(), file.path().to_path_buf());
        self.root.suites.push(SuiteNode {
            descriptor: Descriptor {
                unique_id: suite_id,
                display_name: description.name,
                node_type: NodeType::Container,
                source: Some(file.path().to_path_buf()),
            },
            file,
            tests,
        });
        Ok(())
    }

    pub fn finish(self) -> EngineNode {
        self.root
    }
}

/// Build a tree from `files`, failing on the first identity collision
pub fn build_tree(
    root_id: UniqueId,
    display_name: &str,
    files: impl IntoIterator<Item = Arc<ScenarioFile>>,
) -> Result<EngineNode> {
    let mut builder = TreeBuilder::new(root_id, display_name);
    for file in files {
        builder.add_file(file)?;
    }
    Ok(builder.finish())
}

/// Path of the file a node was built from, if any
pub fn source_of(descriptor: &Descriptor) -> Option<&Path> {
    descriptor.source.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScenarioDocument, Settings};

    fn file(path: &str, indices: &[u32]) -> Arc<ScenarioFile> {
        let document = ScenarioDocument {
            settings: Settings {
                engine_type: "RULE".to_string(),
                dmn_file_path: None,
                dmn_namespace: None,
                dmn_name: None,
                rule_flow_group: None,
                stateless: false,
            },
            background: Default::default(),
            model_descriptor: Default::default(),
            scenarios: indices
                .iter()
                .map(|&index| ScenarioEntry {
                    index,
                    description: format!("case {index}"),
                    given: Vec::new(),
                    expect: Vec::new(),
                })
                .collect(),
        };
        Arc::new(ScenarioFile::new(PathBuf::from(path), document))
    }

    fn root() -> UniqueId {
        UniqueId::engine("scenario-simulation")
    }

    #[test]
    fn test_unique_id_roundtrip() {
        let id = root().append("testscenario", "Loan").append("testscenario", "Loan1");
        let parsed = UniqueId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_unique_id_parse_rejects_garbage() {
        assert!(UniqueId::parse("engine:x").is_err());
        assert!(UniqueId::parse("[engine]").is_err());
        assert!(UniqueId::parse("[:x]").is_err());
    }

    #[test]
    fn test_build_counts() {
        let tree = build_tree(
            root(),
            "Scenario Simulation",
            vec![file("/r/A.scesim", &[0, 1]), file("/r/B.scesim", &[0])],
        )
        .unwrap();

        assert_eq!(tree.suites.len(), 2);
        assert_eq!(tree.test_count(), 3);
        let a: Vec<u32> = tree.suites[0].tests.iter().map(TestNode::index).collect();
        let b: Vec<u32> = tree.suites[1].tests.iter().map(TestNode::index).collect();
        assert_eq!(a, vec![0, 1]);
        assert_eq!(b, vec![0]);
        assert_eq!(tree.suites[0].descriptor.display_name, "A");
        assert_eq!(tree.suites[0].tests[1].descriptor.display_name, "#1: case 1");
        assert_eq!(tree.suites[0].descriptor.node_type, NodeType::Container);
        assert_eq!(tree.suites[0].tests[0].descriptor.node_type, NodeType::Test);
    }

    #[test]
    fn test_indices_are_taken_verbatim() {
        let tree = build_tree(root(), "root", vec![file("/r/A.scesim", &[5, 2, 9])]).unwrap();
        let indices: Vec<u32> = tree.tests().map(TestNode::index).collect();
        assert_eq!(indices, vec![5, 2, 9]);
        assert_eq!(
            tree.suites[0].tests[0].descriptor.unique_id.to_string(),
            "[engine:scenario-simulation]/[testscenario:A]/[testscenario:A5]"
        );
    }

    #[test]
    fn test_tests_share_their_file() {
        let tree = build_tree(root(), "root", vec![file("/r/A.scesim", &[0, 1])]).unwrap();
        let suite = &tree.suites[0];
        assert!(Arc::ptr_eq(&suite.file, &suite.tests[0].file));
        assert!(Arc::ptr_eq(&suite.tests[0].file, &suite.tests[1].file));
    }

    #[test]
    fn test_same_short_name_in_two_roots_collides() {
        let mut builder = TreeBuilder::new(root(), "root");
        builder.add_file(file("/one/Loan.scesim", &[0])).unwrap();
        let err = builder.add_file(file("/two/Loan.scesim", &[0])).unwrap_err();
        match err {
            Error::IdentityCollision { first, second, .. } => {
                assert_eq!(first, PathBuf::from("/one/Loan.scesim"));
                assert_eq!(second, PathBuf::from("/two/Loan.scesim"));
            }
            other => panic!("Expected IdentityCollision, got {other:?}"),
        }
        assert_eq!(builder.finish().suites.len(), 1);
    }

    #[test]
    fn test_duplicate_index_collides() {
        let err = build_tree(root(), "root", vec![file("/r/A.scesim", &[1, 1])]).unwrap_err();
        assert!(matches!(err, Error::IdentityCollision { .. }));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let ids = |tree: &EngineNode| -> Vec<UniqueId> {
            tree.suites
                .iter()
                .flat_map(|s| {
                    std::iter::once(s.descriptor.unique_id.clone())
                        .chain(s.tests.iter().map(|t| t.descriptor.unique_id.clone()))
                })
                .collect()
        };
        let files = || vec![file("/r/A.scesim", &[0, 1]), file("/r/B.scesim", &[3])];
        let first = build_tree(root(), "root", files()).unwrap();
        let second = build_tree(root(), "root", files()).unwrap();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_find() {
        let tree = build_tree(root(), "root", vec![file("/r/A.scesim", &[0, 1])]).unwrap();
        let id = tree.suites[0].tests[1].descriptor.unique_id.clone();
        assert_eq!(tree.find(&id).map(|d| d.display_name.as_str()), Some("#1: case 1"));
        assert!(tree.find(&root().append("testscenario", "Nope")).is_none());
        assert_eq!(source_of(tree.find(&id).unwrap()), Some(Path::new("/r/A.scesim")));
    }

    #[test]
    fn test_select_suite_and_single_test() {
        let tree = build_tree(
            root(),
            "root",
            vec![file("/r/A.scesim", &[0, 1]), file("/r/B.scesim", &[0, 1, 2])],
        )
        .unwrap();
        let suite_a = UniqueId::parse("[engine:scenario-simulation]/[testscenario:A]").unwrap();
        let b2 = UniqueId::parse(
            "[engine:scenario-simulation]/[testscenario:B]/[testscenario:B2]",
        )
        .unwrap();

        let selected = tree.select(&[suite_a, b2]).unwrap();
        assert_eq!(selected.suites.len(), 2);
        assert_eq!(selected.suites[0].tests.len(), 2);
        let b: Vec<u32> = selected.suites[1].tests.iter().map(TestNode::index).collect();
        assert_eq!(b, vec![2]);
        assert_eq!(tree.test_count(), 5);
    }

    #[test]
    fn test_select_root_keeps_everything() {
        let tree = build_tree(root(), "root", vec![file("/r/A.scesim", &[0, 1])]).unwrap();
        let selected = tree.select(&[root()]).unwrap();
        assert_eq!(selected.test_count(), 2);
    }

    #[test]
    fn test_select_unknown_id_fails() {
        let tree = build_tree(root(), "root", vec![file("/r/A.scesim", &[0])]).unwrap();
        let err = tree
            .select(&[root().append("testscenario", "Missing")])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownNode(_)));
    }
}
