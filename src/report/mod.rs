// Report module - forwards lifecycle notifications to the coverage agent

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::{CoverageAgent, HttpAgent, TestExecution};
use crate::config::AgentConfig;
use crate::error::Result;
use crate::state::{ExecutionOutcome, ReportTally, TallySnapshot, TestPath};

/// Reporting core shared by every lifecycle adapter.
///
/// Without an agent every operation is a no-op. Transport failures are
/// logged and swallowed: a coverage report must never break the test run.
pub struct TestwiseReporter {
    agent: Option<Arc<dyn CoverageAgent>>,
    accept_partial: bool,
    tally: ReportTally,
}

impl TestwiseReporter {
    pub fn new(agent: Option<Arc<dyn CoverageAgent>>) -> Self {
        Self {
            agent,
            accept_partial: false,
            tally: ReportTally::new(),
        }
    }

    /// Reporter that never contacts an agent
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Build a reporter talking HTTP to the configured agent, or a disabled
    /// one if no agent URL is configured
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let Some(url) = config.agent_url() else {
            info!("No coverage agent configured, test-wise reporting disabled");
            return Ok(Self::disabled());
        };

        let agent = HttpAgent::new(url)?;
        debug!(url = agent.base_url(), "Reporting to coverage agent");

        Ok(Self::new(Some(Arc::new(agent))).with_accept_partial(config.accept_partial))
    }

    pub fn with_accept_partial(mut self, accept_partial: bool) -> Self {
        self.accept_partial = accept_partial;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.agent.is_some()
    }

    pub fn tally(&self) -> TallySnapshot {
        self.tally.snapshot()
    }

    pub fn start_test(&self, path: &TestPath) {
        let Some(agent) = &self.agent else {
            return;
        };

        self.tally.record_start();
        if let Err(e) = agent.test_started(&path.encoded()) {
            self.tally.record_transport_failure();
            warn!(test = %path, error = %e, "Error while reporting test start");
        }
    }

    pub fn end_test(&self, path: &TestPath, outcome: ExecutionOutcome, message: Option<&str>) {
        let Some(agent) = &self.agent else {
            return;
        };

        self.tally.record_end(outcome);
        let execution = TestExecution::new(outcome, message.map(str::to_string));
        if let Err(e) = agent.test_ended(&path.encoded(), &execution) {
            self.tally.record_transport_failure();
            warn!(test = %path, %outcome, error = %e, "Error while reporting test end");
        }
    }

    /// Tell the agent the run is over. Repeated calls each send their own
    /// notification.
    pub fn end_run(&self) {
        let Some(agent) = &self.agent else {
            return;
        };

        self.tally.record_run_finished();
        if let Err(e) = agent.test_run_finished(self.accept_partial) {
            self.tally.record_transport_failure();
            warn!(error = %e, "Error while reporting end of test run");
        }
    }
}

impl std::fmt::Debug for TestwiseReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestwiseReporter")
            .field("enabled", &self.is_enabled())
            .field("accept_partial", &self.accept_partial)
            .field("tally", &self.tally())
            .finish()
    }
}
