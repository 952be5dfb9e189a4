//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    /// The inbound frame was not a well-formed event.
    #[error("failed to decode event: {0}")]
    Decode(#[source] serde_json::Error),
}
