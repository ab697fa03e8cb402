// HTTP client for the coverage agent

use std::sync::mpsc;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;
use url::Url;

use super::{AgentError, CoverageAgent, TestExecution};
use crate::error::{BridgeError, Result};

const USER_AGENT_VALUE: &str = concat!("testwise-bridge/", env!("CARGO_PKG_VERSION"));

/// Coverage agent reached over HTTP.
///
/// Requests run on a single-worker Tokio runtime owned by the agent; the
/// invoking runner thread waits on a channel for the answer, so calls block
/// without entering a runtime and work from plain and async threads alike.
#[derive(Debug)]
pub struct HttpAgent {
    client: reqwest::Client,
    base_url: String,
    handle: Handle,
    runtime: Option<Runtime>,
}

impl HttpAgent {
    pub fn new(base_url: &str) -> Result<Self> {
        let url = parse_base_url(base_url)?;

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("testwise-agent")
            .enable_all()
            .build()
            .map_err(AgentError::Runtime)?;

        let client = {
            let _guard = runtime.enter();
            reqwest::Client::builder()
                .user_agent(USER_AGENT_VALUE)
                .build()
                .map_err(AgentError::Request)?
        };

        Ok(Self {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/{}", self.base_url, tail)
    }

    fn post(&self, endpoint: String, body: Option<&TestExecution>) -> Result<(), AgentError> {
        debug!(url = %endpoint, "notifying coverage agent");

        let mut request = self.client.post(&endpoint);
        if let Some(body) = body {
            request = request.json(body);
        }

        let (tx, rx) = mpsc::sync_channel(1);
        self.handle.spawn(async move {
            let result = match request.send().await {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => Err(AgentError::Status {
                    endpoint,
                    status: response.status(),
                }),
                Err(e) => Err(AgentError::Request(e)),
            };
            let _ = tx.send(result);
        });

        rx.recv().unwrap_or(Err(AgentError::Interrupted))
    }
}

impl Drop for HttpAgent {
    fn drop(&mut self) {
        // Dropping a runtime blocks and panics inside async contexts
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl CoverageAgent for HttpAgent {
    fn test_started(&self, encoded_path: &str) -> Result<(), AgentError> {
        self.post(self.endpoint(&format!("test-started/{}", encoded_path)), None)
    }

    fn test_ended(&self, encoded_path: &str, execution: &TestExecution) -> Result<(), AgentError> {
        self.post(
            self.endpoint(&format!("test-ended/{}", encoded_path)),
            Some(execution),
        )
    }

    fn test_run_finished(&self, partial: bool) -> Result<(), AgentError> {
        self.post(
            self.endpoint(&format!("test-run-finished?partial={}", partial)),
            None,
        )
    }
}

/// Validate a configured agent base URL
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| BridgeError::InvalidAgentUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }

    Ok(url)
}
