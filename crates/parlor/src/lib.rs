//! # Parlor
//!
//! A real-time chat server whose rooms host small ephemeral
//! mini-games: a tick-driven multi-snake arena and turn-based
//! rock-paper-scissors, both advertised through time-limited invites.
//!
//! The heart of the crate is the [`Orchestrator`]: one actor task that
//! owns the room registry, message store, invite board, and both game
//! engines, and applies every inbound event and timer firing on a
//! single serialized timeline. The WebSocket layer ([`ParlorServer`])
//! only parses frames and forwards them; the [`Gateway`] trait is the
//! outbound seam, so tests drive the orchestrator with a recording
//! gateway instead of sockets.

mod error;
mod gateway;
mod orchestrator;
mod server;

pub use error::ParlorError;
pub use gateway::{Gateway, WsGateway};
pub use orchestrator::{Command, Orchestrator, OrchestratorConfig};
pub use server::ParlorServer;
