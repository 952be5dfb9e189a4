//! Wire protocol for the Parlor chat server.
//!
//! Everything a client and the server exchange lives here: identity
//! newtypes, the inbound/outbound event enums, and the shared data
//! shapes (messages, room summaries, invites, game views) embedded in
//! those events. The orchestrator and engines depend on this crate;
//! nothing here depends on them.
//!
//! Events serialize as internally tagged JSON with kebab-case tags and
//! camelCase fields, so `ClientEvent::JoinRoom { room_id, .. }` travels
//! as `{"type": "join-room", "roomId": ...}`.

mod codec;
mod error;
mod events;
mod ids;
mod types;

pub use codec::{decode_client_event, encode_server_event};
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use ids::{ChallengeId, GameId, InviteId, ParticipantId, RoomId};
pub use types::{
    Cell, ChatMessage, Direction, GameKind, GameRef, InviteSummary,
    RoomSummary, RpsMove, RpsResultView, SnakeGameView, SnakeView,
};
