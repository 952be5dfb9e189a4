//! JSON encode/decode helpers for the wire boundary.
//!
//! Text frames in, text frames out. Kept as free functions — the server
//! speaks exactly one format.

use crate::{ClientEvent, ProtocolError, ServerEvent};

/// Serializes a server event to the JSON text that goes on the wire.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}

/// Parses one inbound text frame into a client event.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}
