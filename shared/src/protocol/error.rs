//! Protocol error types.

use thiserror::Error;

/// Errors raised by the protocol layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A second `await_state` was issued while another wait is outstanding.
    /// This is a caller bug, not a network condition.
    #[error("a state wait is already outstanding on this protocol")]
    AlreadyWaiting,

    #[error("state wait abandoned before the expected transition")]
    WaitAbandoned,

    #[error("could not parse JSON message: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("message has no string 'type' field")]
    MissingType,

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("invalid '{message_type}' message: {source}")]
    InvalidPayload {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode message: {0}")]
    Encode(#[source] serde_json::Error),
}
