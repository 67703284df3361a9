use thiserror::Error;

/// Errors raised while moving messages between the wire and the model.
#[derive(Error, Debug)]
pub enum FloorError {
    /// Inbound frame is not valid JSON, has an unknown `type`, or misses a field.
    #[error("Malformed message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    /// Outbound message could not be serialized.
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A specialized Result type for floor operations.
pub type Result<T> = std::result::Result<T, FloorError>;
