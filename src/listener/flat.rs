// Flat-model lifecycle adapter
//
// The runner reports start, failure and finish as separate callbacks, so the
// outcome of each running test is tracked until its finish arrives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::LifecycleAdapter;
use crate::report::TestwiseReporter;
use crate::state::{ExecutionOutcome, TestPath};

/// Identity of a test in the flat model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub display_name: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub method_name: Option<String>,
}

impl Description {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            class_name: None,
            method_name: None,
        }
    }

    pub fn test_path(&self) -> TestPath {
        TestPath::new(self.display_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub description: Description,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub trace: Option<String>,
}

impl Failure {
    pub fn new(description: Description, message: Option<String>) -> Self {
        Self {
            description,
            message,
            trace: None,
        }
    }

    /// Human-readable diagnostic, falling back to the first trace line
    pub fn diagnostic(&self) -> Option<String> {
        self.message.clone().or_else(|| {
            self.trace
                .as_deref()
                .and_then(|trace| trace.lines().next())
                .map(str::to_string)
        })
    }
}

/// Counters the runner hands over when the run is over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub run_count: usize,
    #[serde(default)]
    pub failure_count: usize,
    #[serde(default)]
    pub ignore_count: usize,
}

/// Outcome of a test between its start and finish callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightTest {
    pub outcome: ExecutionOutcome,
    pub message: Option<String>,
}

impl Default for InFlightTest {
    fn default() -> Self {
        Self {
            outcome: ExecutionOutcome::Passed,
            message: None,
        }
    }
}

/// Recorded flat-model callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlatEvent {
    TestStarted {
        #[serde(default)]
        description: Option<Description>,
    },
    TestFailure {
        #[serde(default)]
        failure: Option<Failure>,
    },
    TestAssumptionFailure {
        #[serde(default)]
        failure: Option<Failure>,
    },
    TestIgnored {
        #[serde(default)]
        description: Option<Description>,
    },
    TestFinished {
        #[serde(default)]
        description: Option<Description>,
    },
    TestRunFinished {
        #[serde(default)]
        result: RunResult,
    },
}

pub struct FlatListener {
    reporter: Arc<TestwiseReporter>,
    in_flight: Mutex<HashMap<String, InFlightTest>>,
}

impl FlatListener {
    pub fn new(reporter: Arc<TestwiseReporter>) -> Self {
        Self {
            reporter,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, InFlightTest>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of tests started but not yet finished
    pub fn running(&self) -> usize {
        self.in_flight().len()
    }

    pub fn test_started(&self, description: &Description) {
        self.in_flight()
            .insert(description.display_name.clone(), InFlightTest::default());
        self.reporter.start_test(&description.test_path());
    }

    pub fn test_failure(&self, failure: &Failure) {
        let mut in_flight = self.in_flight();
        let Some(test) = in_flight.get_mut(&failure.description.display_name) else {
            debug!(test = %failure.description.display_name, "Ignoring failure of a test that is not running");
            return;
        };
        test.outcome = ExecutionOutcome::Failed;
        test.message = failure.diagnostic();
    }

    /// A violated assumption skips the test unless it already failed
    pub fn test_assumption_failure(&self, failure: &Failure) {
        let mut in_flight = self.in_flight();
        let Some(test) = in_flight.get_mut(&failure.description.display_name) else {
            debug!(test = %failure.description.display_name, "Ignoring assumption failure of a test that is not running");
            return;
        };
        if test.outcome != ExecutionOutcome::Failed {
            test.outcome = ExecutionOutcome::Skipped;
            test.message = failure.diagnostic();
        }
    }

    /// Ignored tests never start, so they are reported as an immediate skip
    pub fn test_ignored(&self, description: &Description) {
        let path = description.test_path();
        self.reporter.start_test(&path);
        self.reporter
            .end_test(&path, ExecutionOutcome::Skipped, None);
    }

    pub fn test_finished(&self, description: &Description) {
        let test = self
            .in_flight()
            .remove(&description.display_name)
            .unwrap_or_default();
        self.reporter
            .end_test(&description.test_path(), test.outcome, test.message.as_deref());
    }

    pub fn test_run_finished(&self, result: &RunResult) {
        debug!(
            run = result.run_count,
            failed = result.failure_count,
            ignored = result.ignore_count,
            "Test run finished"
        );
        self.reporter.end_run();
    }
}

impl LifecycleAdapter for FlatListener {
    type Event = FlatEvent;

    fn handle(&self, event: FlatEvent) {
        match event {
            FlatEvent::TestStarted {
                description: Some(description),
            } => self.test_started(&description),
            FlatEvent::TestFailure {
                failure: Some(failure),
            } => self.test_failure(&failure),
            FlatEvent::TestAssumptionFailure {
                failure: Some(failure),
            } => self.test_assumption_failure(&failure),
            FlatEvent::TestIgnored {
                description: Some(description),
            } => self.test_ignored(&description),
            FlatEvent::TestFinished {
                description: Some(description),
            } => self.test_finished(&description),
            FlatEvent::TestRunFinished { result } => self.test_run_finished(&result),
            other => debug!(event = ?other, "Ignoring callback without test identity"),
        }
    }

    fn reporter(&self) -> &TestwiseReporter {
        &self.reporter
    }
}
