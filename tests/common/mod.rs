// In-memory coverage agent recording every call it receives
#![allow(dead_code)]

use percent_encoding::percent_decode_str;
use std::sync::{Arc, Mutex};

use testwise_bridge::agent::{AgentError, CoverageAgent, TestExecution};
use testwise_bridge::{ExecutionOutcome, TestwiseReporter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Started(String),
    Ended(String, ExecutionOutcome, Option<String>),
    RunFinished(bool),
}

pub fn ended(path: &str, outcome: ExecutionOutcome, message: Option<&str>) -> Call {
    Call::Ended(path.to_string(), outcome, message.map(str::to_string))
}

pub fn started(path: &str) -> Call {
    Call::Started(path.to_string())
}

#[derive(Default)]
pub struct RecordingAgent {
    calls: Mutex<Vec<Call>>,
    raw_paths: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Agent that records every call and then reports a transport failure
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// Recorded calls with paths decoded back to their uniform form
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths exactly as they were handed to the agent
    pub fn raw_paths(&self) -> Vec<String> {
        self.raw_paths.lock().unwrap().clone()
    }

    pub fn run_finished_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::RunFinished(_)))
            .count()
    }

    fn record(&self, call: Call, raw_path: Option<&str>) -> Result<(), AgentError> {
        self.calls.lock().unwrap().push(call);
        if let Some(raw) = raw_path {
            self.raw_paths.lock().unwrap().push(raw.to_string());
        }
        if self.fail {
            return Err(AgentError::Status {
                endpoint: "recording".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(())
    }
}

fn decode(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().to_string()
}

impl CoverageAgent for RecordingAgent {
    fn test_started(&self, encoded_path: &str) -> Result<(), AgentError> {
        self.record(Call::Started(decode(encoded_path)), Some(encoded_path))
    }

    fn test_ended(&self, encoded_path: &str, execution: &TestExecution) -> Result<(), AgentError> {
        self.record(
            Call::Ended(
                decode(encoded_path),
                execution.result,
                execution.message.clone(),
            ),
            Some(encoded_path),
        )
    }

    fn test_run_finished(&self, partial: bool) -> Result<(), AgentError> {
        self.record(Call::RunFinished(partial), None)
    }
}

pub fn reporter_for(agent: &Arc<RecordingAgent>) -> Arc<TestwiseReporter> {
    let agent: Arc<dyn CoverageAgent> = agent.clone();
    Arc::new(TestwiseReporter::new(Some(agent)))
}
