//! Error types for the game layer.

use parlor_protocol::{ChallengeId, GameId, InviteId};

/// Errors that can occur on the invite board or in either engine.
///
/// Most of these are reported to nobody — invalid game input is dropped
/// (logged at debug) per the permissive-but-safe policy. The exception
/// is [`Unauthorized`], which the offender is told about.
///
/// [`Unauthorized`]: GameError::Unauthorized
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The invite id is unknown (already expired, consumed, or fake).
    #[error("invite {0} not found")]
    InviteNotFound(InviteId),

    /// Only the invite's creator may cancel it.
    #[error("only the creator can cancel invite {0}")]
    Unauthorized(InviteId),

    /// The snake game id is unknown.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// The joiner is not in the game's room.
    #[error("joiner is not in game {0}'s room")]
    NotInGameRoom(GameId),

    /// The joiner already has a snake in this game.
    #[error("already playing in game {0}")]
    AlreadyInGame(GameId),

    /// The challenge id is unknown.
    #[error("challenge {0} not found")]
    ChallengeNotFound(ChallengeId),

    /// The challenge was already accepted by someone else.
    #[error("challenge {0} is already matched")]
    AlreadyMatched(ChallengeId),

    /// A challenger cannot accept their own challenge.
    #[error("cannot accept own challenge {0}")]
    OwnChallenge(ChallengeId),

    /// The acceptor is not in the challenge's room.
    #[error("acceptor is not in challenge {0}'s room")]
    NotInChallengeRoom(ChallengeId),
}
