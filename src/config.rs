// Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AgentConfig {
    /// Base URL of the test-wise coverage agent; reporting is disabled when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Let the agent persist coverage of a run that did not execute every test
    #[serde(default)]
    pub accept_partial: bool,
}

impl AgentConfig {
    /// Configured agent URL, or `None` when absent or blank
    pub fn agent_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

pub const ENV_AGENT_URL: &str = "TESTWISE_AGENT_URL";
pub const CONFIG_FILE_NAME: &str = ".testwiserc.toml";

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Result<Option<Self>> {
        // Check locations in order:
        // 1. .testwiserc.toml (current directory)
        // 2. ~/.testwiserc.toml (home directory)
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }

        for path in &paths {
            if path.exists() {
                return Self::load_from_file(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Apply `TESTWISE_AGENT_URL` when it is set
    pub fn with_env_overrides(self) -> Self {
        self.with_agent_url_override(std::env::var(ENV_AGENT_URL).ok())
    }

    /// Replace the agent URL if an override is given; an empty override
    /// disables reporting
    pub fn with_agent_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.agent.url = Some(url);
        }
        self
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))
    }
}
