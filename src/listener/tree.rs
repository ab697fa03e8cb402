// Tree-model lifecycle adapter
//
// The runner models the suite as a tree of containers whose leaves are the
// actual tests. Every callback carries the full node identity, so the adapter
// keeps no per-test state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::LifecycleAdapter;
use crate::report::TestwiseReporter;
use crate::state::{ExecutionOutcome, SourceStatus, TestPath};

/// Classification of a node in the runner's test tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    Test,
    ContainerAndTest,
}

impl NodeKind {
    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test | Self::ContainerAndTest)
    }
}

/// Where a node was declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestSource {
    /// A test method of a class
    Method {
        class_name: String,
        method_name: String,
    },
    /// A resource on the classpath, e.g. a feature file driving scenarios
    ClasspathResource { resource_name: String },
    Class { class_name: String },
    File { path: String },
    Other { descriptor: String },
}

impl fmt::Display for TestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method {
                class_name,
                method_name,
            } => write!(f, "{}#{}", class_name, method_name),
            Self::ClasspathResource { resource_name } => write!(f, "classpath:{}", resource_name),
            Self::Class { class_name } => f.write_str(class_name),
            Self::File { path } => f.write_str(path),
            Self::Other { descriptor } => f.write_str(descriptor),
        }
    }
}

/// Identity of a node as handed over by the runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestIdentifier {
    pub unique_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub kind: NodeKind,
    #[serde(default)]
    pub source: Option<TestSource>,
    pub legacy_reporting_name: String,
}

impl TestIdentifier {
    pub fn is_test(&self) -> bool {
        self.kind.is_test()
    }

    /// Stable path of this node, or `None` if the runner gave no source
    pub fn test_path(&self) -> Option<TestPath> {
        let source = self.source.as_ref()?;
        let path = match source {
            TestSource::Method { class_name, .. } => {
                format!("{}.{}", class_name, self.legacy_reporting_name)
            }
            TestSource::ClasspathResource { resource_name } => format!(
                "{}/{}",
                strip_extension(resource_name),
                self.legacy_reporting_name
            ),
            other => other.to_string(),
        };
        Some(TestPath::new(path))
    }
}

/// Result of a finished node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestExecutionResult {
    pub status: SourceStatus,
    #[serde(default)]
    pub cause: Option<String>,
}

impl TestExecutionResult {
    pub fn successful() -> Self {
        Self {
            status: SourceStatus::Successful,
            cause: None,
        }
    }

    pub fn aborted(cause: Option<String>) -> Self {
        Self {
            status: SourceStatus::Aborted,
            cause,
        }
    }

    pub fn failed(cause: Option<String>) -> Self {
        Self {
            status: SourceStatus::Failed,
            cause,
        }
    }

    pub fn outcome(&self) -> ExecutionOutcome {
        self.status.into()
    }
}

/// Recorded tree-model callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TreeEvent {
    ExecutionStarted {
        #[serde(default)]
        node: Option<TestIdentifier>,
    },
    ExecutionFinished {
        #[serde(default)]
        node: Option<TestIdentifier>,
        #[serde(default)]
        result: Option<TestExecutionResult>,
    },
}

pub struct TreeListener {
    reporter: Arc<TestwiseReporter>,
}

impl TreeListener {
    pub fn new(reporter: Arc<TestwiseReporter>) -> Self {
        Self { reporter }
    }

    pub fn execution_started(&self, node: Option<&TestIdentifier>) {
        let Some(node) = node else {
            return;
        };
        if !node.is_test() {
            return;
        }
        let Some(path) = node.test_path() else {
            debug!(node = %node.unique_id, "Ignoring test start without source");
            return;
        };

        self.reporter.start_test(&path);
    }

    pub fn execution_finished(
        &self,
        node: Option<&TestIdentifier>,
        result: Option<&TestExecutionResult>,
    ) {
        let Some(node) = node else {
            return;
        };
        if node.parent_id.is_none() || node.source.is_none() {
            debug!(node = %node.unique_id, "Ignoring finished node without parent or source");
            return;
        }

        match (node.is_test(), result, node.test_path()) {
            (true, Some(result), Some(path)) => {
                self.reporter
                    .end_test(&path, result.outcome(), result.cause.as_deref());
            }
            _ => self.reporter.end_run(),
        }
    }
}

impl LifecycleAdapter for TreeListener {
    type Event = TreeEvent;

    fn handle(&self, event: TreeEvent) {
        match event {
            TreeEvent::ExecutionStarted { node } => self.execution_started(node.as_ref()),
            TreeEvent::ExecutionFinished { node, result } => {
                self.execution_finished(node.as_ref(), result.as_ref())
            }
        }
    }

    fn reporter(&self) -> &TestwiseReporter {
        &self.reporter
    }
}

/// Drop the file extension of the last path component
fn strip_extension(resource: &str) -> &str {
    let file_start = resource.rfind('/').map_or(0, |i| i + 1);
    match resource[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &resource[..file_start + dot],
        _ => resource,
    }
}
