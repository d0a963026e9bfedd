use thiserror::Error;

use crate::agent::AgentApiError;
use crate::protocol::TlvError;

/// Errors raised by the session control layer
#[derive(Debug, Error)]
pub enum ClientError {
    /// Outbound frame could not be built
    #[error("Failed to encode frame: {0}")]
    Encoding(#[source] TlvError),

    /// Inbound frame could not be parsed
    #[error("Failed to decode frame: {0}")]
    Decoding(#[source] TlvError),

    /// Command issued while the agent is not running
    #[error("Command rejected: agent is not enabled")]
    CommandRejected,

    /// Remote StartVoiceChat call failed
    #[error("Failed to start agent: {0}")]
    AgentStartFailed(#[source] AgentApiError),

    /// Remote StopVoiceChat call failed
    #[error("Failed to stop agent: {0}")]
    AgentStopFailed(#[source] AgentApiError),

    /// Agent asked for a tool this client does not provide
    #[error("Unknown tool call: {0}")]
    UnknownToolCall(String),

    /// Another start/stop is still in flight
    #[error("Another agent lifecycle transition is in progress")]
    TransitionInProgress,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
