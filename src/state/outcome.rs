// Execution outcomes and the runner status vocabulary they are mapped from

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// Canonical outcome reported to the coverage agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    Passed,
    Failed,
    Skipped,
}

impl ExecutionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status vocabulary of tree-model runners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceStatus {
    Successful,
    Aborted,
    Failed,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl From<SourceStatus> for ExecutionOutcome {
    fn from(status: SourceStatus) -> Self {
        match status {
            SourceStatus::Successful => Self::Passed,
            SourceStatus::Aborted => Self::Skipped,
            SourceStatus::Failed => Self::Failed,
        }
    }
}

impl FromStr for SourceStatus {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "successful" => Ok(Self::Successful),
            "aborted" => Ok(Self::Aborted),
            "failed" => Ok(Self::Failed),
            _ => Err(BridgeError::UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for SourceStatus {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceStatus> for String {
    fn from(status: SourceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
