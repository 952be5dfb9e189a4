//! Error types for the room layer.

use parlor_protocol::{ParticipantId, RoomId};

/// Errors that can occur joining, leaving, or posting to rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room id is unknown.
    #[error("Room not found")]
    NotFound(RoomId),

    /// The room is private and the supplied password did not match.
    #[error("Incorrect password")]
    IncorrectPassword(RoomId),

    /// The participant is already in a room; leave first.
    #[error("participant {0} is already in room {1}")]
    AlreadyInRoom(ParticipantId, RoomId),

    /// The participant is not a member of the room they addressed.
    #[error("participant {0} is not a member of room {1}")]
    NotAMember(ParticipantId, RoomId),

    /// The moderation filter blocked the message.
    #[error("Message rejected by moderation")]
    MessageRejected,
}
