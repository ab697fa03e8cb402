// Listener module - lifecycle adapters for the supported runner models

pub mod flat;
pub mod tree;

pub use flat::{Description, Failure, FlatEvent, FlatListener, InFlightTest, RunResult};
pub use tree::{NodeKind, TestExecutionResult, TestIdentifier, TestSource, TreeEvent, TreeListener};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io::BufRead;

use crate::error::{BridgeError, Result};
use crate::report::TestwiseReporter;
use crate::state::TallySnapshot;

/// A runner lifecycle model bridged onto the reporting core
pub trait LifecycleAdapter: Send + Sync {
    /// Callback of this lifecycle model in recorded form
    type Event: DeserializeOwned;

    /// Dispatch one callback
    fn handle(&self, event: Self::Event);

    /// Reporting core the adapter forwards to
    fn reporter(&self) -> &TestwiseReporter;
}

/// Outcome of replaying a recorded lifecycle stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub reporting_enabled: bool,
    pub tally: TallySnapshot,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.reporting_enabled {
            return write!(
                f,
                "Replayed {} events (no coverage agent configured, nothing reported)",
                self.events
            );
        }
        write!(
            f,
            "Replayed {} events: {} started, {} passed, {} failed, {} skipped, {} run end(s), {} transport failure(s)",
            self.events,
            self.tally.started,
            self.tally.passed,
            self.tally.failed,
            self.tally.skipped,
            self.tally.runs_finished,
            self.tally.transport_failures
        )
    }
}

/// Feed JSON-lines encoded callbacks through an adapter.
///
/// Blank lines are skipped. Stops at the first line that does not decode,
/// reporting its 1-based number.
pub fn replay<A, R>(adapter: &A, reader: R) -> Result<ReplaySummary>
where
    A: LifecycleAdapter,
    R: BufRead,
{
    let mut events = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: A::Event = serde_json::from_str(line).map_err(|source| {
            BridgeError::MalformedEvent {
                line: index + 1,
                source,
            }
        })?;
        adapter.handle(event);
        events += 1;
    }

    let reporter = adapter.reporter();
    Ok(ReplaySummary {
        events,
        reporting_enabled: reporter.is_enabled(),
        tally: reporter.tally(),
    })
}
