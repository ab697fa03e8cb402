// State module - test identity, outcomes and reporting tallies

pub mod outcome;
pub mod path;

pub use outcome::{ExecutionOutcome, SourceStatus};
pub use path::TestPath;

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters of notifications handed to the coverage agent
#[derive(Debug, Default)]
pub struct ReportTally {
    started: AtomicUsize,
    passed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    runs_finished: AtomicUsize,
    transport_failures: AtomicUsize,
}

/// Point-in-time copy of a [`ReportTally`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TallySnapshot {
    pub started: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub runs_finished: usize,
    pub transport_failures: usize,
}

impl TallySnapshot {
    /// Get total ended tests
    pub fn ended(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

impl ReportTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_start(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_end(&self, outcome: ExecutionOutcome) {
        let counter = match outcome {
            ExecutionOutcome::Passed => &self.passed,
            ExecutionOutcome::Failed => &self.failed,
            ExecutionOutcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_finished(&self) {
        self.runs_finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            started: self.started.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            runs_finished: self.runs_finished.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}
