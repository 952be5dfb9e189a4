//! Mini-games hosted inside Parlor rooms.
//!
//! Three pieces, all owned by the orchestrator and mutated only on its
//! single timeline:
//!
//! - [`InviteBoard`] — time-limited, room-visible game invitations
//! - [`SnakeEngine`] — tick-driven multi-snake simulation
//! - [`RpsEngine`] — turn-based rock-paper-scissors protocol
//!
//! Timers (invite TTLs, snake ticks) never mutate state directly: they
//! deliver an [`EngineEvent`] onto the orchestrator's event channel and
//! the orchestrator calls back into the engine, so every mutation stays
//! serialized with inbound traffic.

mod error;
mod invite;
mod rps;
mod snake;

pub use error::GameError;
pub use invite::{GameInvite, INVITE_TTL, InviteBoard};
pub use rps::{ChoiceOutcome, MatchedPair, RpsChallenge, RpsEngine};
pub use snake::{
    GRID_HEIGHT, GRID_WIDTH, SNAKE_TICK_PERIOD, SnakeEngine, SnakeGame,
    SnakeOutcome, SnakeUpdate,
};

use parlor_protocol::{GameId, InviteId};

/// A timer firing that the orchestrator must apply to engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// An invite's TTL elapsed without it being consumed or cancelled.
    InviteExpired(InviteId),
    /// A snake game's fixed-period tick is due.
    SnakeTick(GameId),
}
