// Agent module - the remote test-wise coverage agent API

pub mod http;

pub use http::HttpAgent;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::ExecutionOutcome;

/// Body of a "test ended" notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestExecution {
    pub result: ExecutionOutcome,
    pub message: Option<String>,
}

impl TestExecution {
    pub fn new(result: ExecutionOutcome, message: Option<String>) -> Self {
        Self { result, message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("request to coverage agent failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("coverage agent answered {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to start agent runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("agent runtime stopped before the request completed")]
    Interrupted,
}

/// Calls understood by a test-wise coverage agent.
///
/// Paths are passed already encoded as a single URL path segment. Every call
/// blocks until the agent has answered or the transport gave up.
pub trait CoverageAgent: Send + Sync {
    /// A test is about to run
    fn test_started(&self, encoded_path: &str) -> Result<(), AgentError>;

    /// A test has finished with the given outcome
    fn test_ended(&self, encoded_path: &str, execution: &TestExecution) -> Result<(), AgentError>;

    /// The whole run is over; `partial` tells the agent whether an incomplete
    /// run may still be persisted
    fn test_run_finished(&self, partial: bool) -> Result<(), AgentError>;
}
