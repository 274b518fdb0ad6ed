//! Tree execution
//!
//! Suites run in order and tests within a suite run in order, one at a time.
//! Each test gets its own [`ScenarioRunnerData`] and is run behind a
//! catch-all boundary, so a failing or panicking scenario is reported on its
//! own node and the run moves on.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::evaluator::ExpressionEvaluatorFactory;
use super::helper::{ScenarioError, ScenarioRunnerData, ScenarioRunnerHelper};
use crate::reporting::{ExecutionListener, ExecutionResult, FailureKind};
use crate::tree::{EngineNode, SuiteNode, TestNode};

/// Drives a discovered tree through a [`ScenarioRunnerHelper`]
pub struct ExecutionCoordinator<'h, H: ?Sized> {
    helper: &'h H,
}

impl<'h, H: ScenarioRunnerHelper + ?Sized> ExecutionCoordinator<'h, H> {
    pub fn new(helper: &'h H) -> Self {
        Self { helper }
    }

    /// Run every test of `root`, reporting each node exactly once
    pub fn execute(&self, root: &EngineNode, listener: &mut dyn ExecutionListener) {
        tracing::info!(
            "Executing {} suite(s), {} test(s)",
            root.suites.len(),
            root.test_count()
        );
        listener.execution_started(&root.descriptor);
        for suite in &root.suites {
            self.execute_suite(suite, listener);
        }
        listener.execution_finished(&root.descriptor, &ExecutionResult::Successful);
    }

    fn execute_suite(&self, suite: &SuiteNode, listener: &mut dyn ExecutionListener) {
        listener.execution_started(&suite.descriptor);

        let suite_result = match ExpressionEvaluatorFactory::create(&suite.file.settings().engine_type) {
            Ok(evaluators) => {
                for test in &suite.tests {
                    listener.execution_started(&test.descriptor);
                    let result = self.execute_test(test, &evaluators);
                    listener.execution_finished(&test.descriptor, &result);
                }
                ExecutionResult::Successful
            }
            Err(e) => {
                tracing::error!("Cannot execute suite {}: {}", suite.descriptor.unique_id, e);
                let result = ExecutionResult::failed(FailureKind::Suite, e.to_string());
                for test in &suite.tests {
                    listener.execution_started(&test.descriptor);
                    listener.execution_finished(&test.descriptor, &result);
                }
                result
            }
        };

        listener.execution_finished(&suite.descriptor, &suite_result);
    }

    fn execute_test(&self, test: &TestNode, evaluators: &ExpressionEvaluatorFactory) -> ExecutionResult {
        let file = &test.file;
        let mut data = ScenarioRunnerData::default();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.helper.run(
                file.model_descriptor(),
                test.entry(),
                evaluators,
                &mut data,
                file.settings(),
                file.background(),
            )
        }));

        let result = match outcome {
            Ok(Ok(())) => ExecutionResult::Successful,
            Ok(Err(ScenarioError::Failed(message))) => {
                ExecutionResult::failed(FailureKind::Scenario, message)
            }
            Ok(Err(e @ ScenarioError::Unexpected(_))) => {
                ExecutionResult::failed(FailureKind::Unexpected, e.to_string())
            }
            Err(payload) => ExecutionResult::failed(
                FailureKind::Unexpected,
                format!("Unexpected test error: panicked: {}", panic_message(payload.as_ref())),
            ),
        };

        match result.failure() {
            Some(failure) => {
                tracing::error!("{} failed: {}", test.descriptor.unique_id, failure)
            }
            None => tracing::debug!("{} passed", test.descriptor.unique_id),
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ScenarioFile;
    use crate::model::{Background, ModelDescriptor, ScenarioDocument, ScenarioEntry, Settings};
    use crate::tree::{build_tree, Descriptor, NodeType, UniqueId};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        results: Vec<(String, ExecutionResult)>,
    }

    impl ExecutionListener for Recorder {
        fn execution_started(&mut self, node: &Descriptor) {
            self.events.push(format!("start {}", node.display_name));
        }

        fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
            self.events.push(format!("finish {}", node.display_name));
            if node.node_type == NodeType::Test {
                self.results.push((node.display_name.clone(), result.clone()));
            }
        }
    }

    /// Fails index 1 as a mismatch, index 2 as an engine error, panics on 3
    struct Scripted {
        seen_dirty_data: RefCell<bool>,
    }

    impl ScenarioRunnerHelper for Scripted {
        fn run(
            &self,
            _descriptor: &ModelDescriptor,
            entry: &ScenarioEntry,
            _evaluators: &ExpressionEvaluatorFactory,
            data: &mut ScenarioRunnerData,
            _settings: &Settings,
            _background: &Background,
        ) -> Result<(), ScenarioError> {
            if !data.is_empty() {
                *self.seen_dirty_data.borrow_mut() = true;
            }
            data.given.insert("touched".to_string(), serde_json::json!(entry.index));
            match entry.index {
                1 => Err(ScenarioError::Failed("mismatch".to_string())),
                2 => Err(ScenarioError::Unexpected("engine down".to_string())),
                3 => panic!("helper bug"),
                _ => Ok(()),
            }
        }
    }

    fn file(name: &str, engine_type: &str, indices: &[u32]) -> Arc<ScenarioFile> {
        Arc::new(ScenarioFile::new(
            PathBuf::from(format!("/r/{name}.scesim")),
            ScenarioDocument {
                settings: Settings {
                    engine_type: engine_type.to_string(),
                    dmn_file_path: None,
                    dmn_namespace: None,
                    dmn_name: None,
                    rule_flow_group: None,
                    stateless: false,
                },
                background: Background::default(),
                model_descriptor: ModelDescriptor::default(),
                scenarios: indices
                    .iter()
                    .map(|&index| ScenarioEntry {
                        index,
                        description: name.to_string(),
                        given: Vec::new(),
                        expect: Vec::new(),
                    })
                    .collect(),
            },
        ))
    }

    fn run(files: Vec<Arc<ScenarioFile>>) -> (Recorder, bool) {
        let tree = build_tree(UniqueId::engine("x"), "root", files).unwrap();
        let helper = Scripted {
            seen_dirty_data: RefCell::new(false),
        };
        let mut recorder = Recorder::default();
        ExecutionCoordinator::new(&helper).execute(&tree, &mut recorder);
        let dirty = *helper.seen_dirty_data.borrow();
        (recorder, dirty)
    }

    #[test]
    fn test_event_order() {
        let (recorder, _) = run(vec![file("A", "DMN", &[0, 4]), file("B", "RULE", &[5])]);
        assert_eq!(
            recorder.events,
            vec![
                "start root",
                "start A",
                "start #0: A",
                "finish #0: A",
                "start #4: A",
                "finish #4: A",
                "finish A",
                "start B",
                "start #5: B",
                "finish #5: B",
                "finish B",
                "finish root",
            ]
        );
    }

    #[test]
    fn test_failures_stay_on_their_test() {
        let (recorder, _) = run(vec![file("A", "DMN", &[0, 1, 2, 3, 4]), file("B", "DMN", &[0])]);
        let kinds: Vec<Option<FailureKind>> = recorder
            .results
            .iter()
            .map(|(_, r)| r.failure().map(|f| f.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                None,
                Some(FailureKind::Scenario),
                Some(FailureKind::Unexpected),
                Some(FailureKind::Unexpected),
                None,
                None,
            ]
        );
        let panic_failure = recorder.results[3].1.failure().unwrap();
        assert!(panic_failure.message.contains("helper bug"));
        let engine_failure = recorder.results[2].1.failure().unwrap();
        assert!(engine_failure.message.contains("engine down"));
    }

    #[test]
    fn test_each_test_gets_fresh_data() {
        let (_, dirty) = run(vec![file("A", "DMN", &[0, 4, 5])]);
        assert!(!dirty);
    }

    #[test]
    fn test_unsupported_engine_type_fails_suite_and_its_tests() {
        let (recorder, _) = run(vec![file("A", "PMML", &[0, 4]), file("B", "DMN", &[0])]);
        assert_eq!(recorder.results.len(), 3);
        for (_, result) in &recorder.results[..2] {
            assert_eq!(result.failure().map(|f| f.kind), Some(FailureKind::Suite));
        }
        assert!(recorder.results[2].1.is_successful());
        assert!(recorder.events.contains(&"finish A".to_string()));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
