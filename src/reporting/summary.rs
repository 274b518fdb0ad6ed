//! Pass/fail bookkeeping

use serde::Serialize;

use super::{ExecutionListener, ExecutionResult, Failure};
use crate::tree::{Descriptor, NodeType, UniqueId};

/// Totals over one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestSummary {
    /// Tests that finished successfully
    pub passed: usize,
    /// Tests that finished with a failure
    pub failed: usize,
    /// Suites that finished with a failure of their own
    pub failed_suites: usize,
    /// Every failure, in report order
    pub failures: Vec<(UniqueId, Failure)>,
}

impl TestSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.failed_suites > 0
    }
}

/// Collects a [`TestSummary`]
#[derive(Debug, Default)]
pub struct SummaryListener {
    summary: TestSummary,
}

impl SummaryListener {
    pub fn summary(&self) -> &TestSummary {
        &self.summary
    }

    pub fn into_summary(self) -> TestSummary {
        self.summary
    }
}

impl ExecutionListener for SummaryListener {
    fn execution_started(&mut self, _node: &Descriptor) {}

    fn execution_finished(&mut self, node: &Descriptor, result: &ExecutionResult) {
        let failure = result.failure();
        match (node.node_type, failure) {
            (NodeType::Test, None) => self.summary.passed += 1,
            (NodeType::Test, Some(_)) => self.summary.failed += 1,
            (NodeType::Container, Some(_)) => self.summary.failed_suites += 1,
            (NodeType::Container, None) => {}
        }
        if let Some(failure) = failure {
            self.summary
                .failures
                .push((node.unique_id.clone(), failure.clone()));
        }
    }
}
