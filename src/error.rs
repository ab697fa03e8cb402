// Error types surfaced by the library

use thiserror::Error;

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The configured coverage agent URL could not be parsed
    #[error("invalid coverage agent URL '{url}': {reason}")]
    InvalidAgentUrl { url: String, reason: String },

    /// A runner reported a status outside the known vocabulary
    #[error("unknown execution status '{0}'")]
    UnknownStatus(String),

    /// A recorded lifecycle event could not be decoded
    #[error("malformed lifecycle event on line {line}: {source}")]
    MalformedEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Agent(#[from] crate::agent::AgentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
