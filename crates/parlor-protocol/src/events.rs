//! The inbound and outbound event enums.
//!
//! One variant per wire event. Tags are the kebab-case event names the
//! original browser client speaks (`create-room`, `snake-move`, ...);
//! payload fields ride alongside the tag in camelCase.

use serde::{Deserialize, Serialize};

use crate::{
    ChallengeId, ChatMessage, Direction, GameId, InviteId, InviteSummary,
    RoomId, RoomSummary, RpsMove, RpsResultView, SnakeGameView,
};

/// Everything a client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Create a room. The creator does not join it implicitly.
    CreateRoom {
        name: String,
        is_private: bool,
        password: Option<String>,
    },

    /// Request the current room listing.
    GetRooms,

    /// Join a room, choosing a username for the stay.
    JoinRoom {
        room_id: RoomId,
        password: Option<String>,
        username: String,
    },

    /// Post a chat message to the sender's current room.
    SendMessage { room_id: RoomId, message: String },

    /// Start a snake game in the sender's room.
    SnakeCreate { room_id: RoomId },

    /// Join a forming snake game.
    SnakeJoin { game_id: GameId },

    /// Steer the sender's snake. Applied at the next tick.
    SnakeMove { game_id: GameId, direction: Direction },

    /// Post a rock-paper-scissors challenge in the sender's room.
    RpsChallenge { room_id: RoomId },

    /// Accept someone else's challenge.
    RpsAccept { challenge_id: ChallengeId },

    /// Submit a move for a matched challenge.
    RpsChoice { challenge_id: ChallengeId, choice: RpsMove },

    /// Withdraw an invite the sender created.
    GameInviteCancel { invite_id: InviteId },
}

/// Everything the server can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    // -- Rooms --
    /// To the creator: the room exists now.
    RoomCreated { room_id: RoomId, name: String },

    /// To one requester: the current listing.
    RoomsList { rooms: Vec<RoomSummary> },

    /// To everyone: the listing changed (room created or deleted).
    RoomsUpdated { rooms: Vec<RoomSummary> },

    /// To a failed joiner only.
    JoinError { reason: String },

    /// To a successful joiner: full room snapshot.
    RoomJoined {
        room_id: RoomId,
        name: String,
        messages: Vec<ChatMessage>,
        users: Vec<String>,
        invites: Vec<InviteSummary>,
    },

    /// To the rest of the room when someone joins.
    UserJoined { username: String },

    /// To the rest of the room when someone leaves.
    UserLeft { username: String },

    /// To the whole room whenever membership changes.
    UsersUpdated { users: Vec<String> },

    // -- Chat --
    /// To the whole room, sender included.
    NewMessage { message: ChatMessage },

    /// To the sender only; the message was not stored or forwarded.
    MessageRejected { reason: String },

    // -- Invites --
    /// To the whole room: a new invite is pending.
    GameInviteNew { invite: InviteSummary },

    /// To the whole room: an invite expired, was cancelled, or was
    /// consumed. Sent exactly once per invite.
    GameInviteRemoved { invite_id: InviteId },

    // -- Snake --
    /// To the creator: game id plus the initial board.
    SnakeCreated(SnakeGameView),

    /// To the whole room: the board after a tick or a join.
    SnakeState(SnakeGameView),

    /// To the whole room: the game ended. `winner` is the sole
    /// survivor's username, or `None` if nobody survived.
    SnakeOver { game_id: GameId, winner: Option<String> },

    // -- Rock-paper-scissors --
    /// To both players: the challenge was accepted, submit a move.
    RpsMatched { challenge_id: ChallengeId, opponent: String },

    /// To the whole room: the match was torn down before resolving.
    RpsCancelled { challenge_id: ChallengeId },

    /// To the whole room: both moves are in.
    RpsResult(RpsResultView),

    // -- Errors --
    /// To one participant: a rejected operation worth explaining.
    Error { message: String },
}
