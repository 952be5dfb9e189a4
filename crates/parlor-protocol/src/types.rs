//! Shared data shapes embedded in wire events.

use serde::{Deserialize, Serialize};

use crate::{ChallengeId, GameId, InviteId, RoomId};

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A single chat message. Immutable once created.
///
/// `id` is the unix-epoch millisecond timestamp at creation, which also
/// serves as a monotonic ordering key. `timestamp` is the human-readable
/// `HH:MM:SS` label clients display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub username: String,
    pub message: String,
    pub timestamp: String,
}

/// Room listing entry sent in `rooms-list` / `rooms-updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub is_private: bool,
    pub participant_count: usize,
}

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

/// The kind of game an invite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Snake,
    Rps,
}

/// A typed reference to the game or challenge behind an invite.
///
/// Serializes flat as `"kind": "snake", "gameId": 3` so clients can feed
/// the id straight back into `snake-join` / `rps-accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "gameId", rename_all = "lowercase")]
pub enum GameRef {
    Snake(GameId),
    Rps(ChallengeId),
}

impl GameRef {
    /// The invite-board kind for this reference.
    pub fn kind(&self) -> GameKind {
        match self {
            Self::Snake(_) => GameKind::Snake,
            Self::Rps(_) => GameKind::Rps,
        }
    }
}

/// A pending invite as shown to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteSummary {
    pub invite_id: InviteId,
    #[serde(flatten)]
    pub game: GameRef,
    pub creator_username: String,
}

// ---------------------------------------------------------------------------
// Snake
// ---------------------------------------------------------------------------

/// A grid cell. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

/// A snake heading. `snake-move` carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The 180-degree reverse of this heading.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The (dx, dy) step one tick moves a head in this heading.
    pub fn delta(self) -> (i16, i16) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// One snake as broadcast in `snake-state`. Body cells are head-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeView {
    pub username: String,
    pub body: Vec<Cell>,
}

/// Full per-game snapshot broadcast to the owning room every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeGameView {
    pub game_id: GameId,
    pub snakes: Vec<SnakeView>,
    pub food: Cell,
    pub grid_width: i16,
    pub grid_height: i16,
}

// ---------------------------------------------------------------------------
// Rock-paper-scissors
// ---------------------------------------------------------------------------

/// A rock-paper-scissors move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpsMove {
    Rock,
    Paper,
    Scissors,
}

impl RpsMove {
    /// Standard rules: rock beats scissors, scissors beats paper,
    /// paper beats rock.
    pub fn beats(self, other: RpsMove) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors)
                | (Self::Scissors, Self::Paper)
                | (Self::Paper, Self::Rock)
        )
    }
}

/// Outcome of a resolved match, broadcast to the room in `rps-result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpsResultView {
    pub challenge_id: ChallengeId,
    pub challenger_username: String,
    pub acceptor_username: String,
    pub challenger_move: RpsMove,
    pub acceptor_move: RpsMove,
    /// `None` on a tie.
    pub winner: Option<String>,
}
