//! The outbound delivery seam.
//!
//! The orchestrator never touches sockets: it hands [`ServerEvent`]s to
//! a [`Gateway`], which knows how to reach each participant. The real
//! implementation fans out over per-connection channels; tests swap in
//! a recorder.

use std::collections::HashMap;

use parlor_protocol::{ParticipantId, ServerEvent, encode_server_event};
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;

/// Outbound boundary consumed by the orchestrator: attach/detach a
/// participant's send channel, unicast to one, broadcast to all.
/// Room-scoped sends are unicast fan-outs over the registry's member
/// list, so the gateway itself knows nothing about rooms.
pub trait Gateway: Send + 'static {
    /// The per-connection send handle the transport hands over.
    type Sink: Send + 'static;

    fn attach(&mut self, participant_id: ParticipantId, sink: Self::Sink);

    fn detach(&mut self, participant_id: ParticipantId);

    fn unicast(&mut self, participant_id: ParticipantId, event: &ServerEvent);

    fn broadcast(&mut self, event: &ServerEvent);
}

/// Production gateway: one unbounded channel per connection, drained
/// by that connection's writer task.
#[derive(Default)]
pub struct WsGateway {
    links: HashMap<ParticipantId, UnboundedSender<Message>>,
}

impl WsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(event: &ServerEvent) -> Option<Message> {
        match encode_server_event(event) {
            Ok(json) => Some(Message::text(json)),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outbound event");
                None
            }
        }
    }
}

impl Gateway for WsGateway {
    type Sink = UnboundedSender<Message>;

    fn attach(&mut self, participant_id: ParticipantId, sink: Self::Sink) {
        self.links.insert(participant_id, sink);
    }

    fn detach(&mut self, participant_id: ParticipantId) {
        self.links.remove(&participant_id);
    }

    fn unicast(&mut self, participant_id: ParticipantId, event: &ServerEvent) {
        let Some(message) = Self::encode(event) else { return };
        if let Some(sink) = self.links.get(&participant_id) {
            // A send failure means the writer task is gone; the reader
            // side will surface the disconnect shortly.
            let _ = sink.send(message);
        }
    }

    fn broadcast(&mut self, event: &ServerEvent) {
        let Some(message) = Self::encode(event) else { return };
        for sink in self.links.values() {
            let _ = sink.send(message.clone());
        }
    }
}
