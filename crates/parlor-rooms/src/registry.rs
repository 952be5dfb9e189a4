//! The room registry: creates, tracks, and destroys rooms, and routes
//! membership and chat through them.

use std::collections::HashMap;

use parlor_moderation::Blocklist;
use parlor_protocol::{ChatMessage, ParticipantId, RoomId, RoomSummary};

use crate::room::make_message;
use crate::{Room, RoomError};

/// What a successful join hands back to the joiner.
#[derive(Debug, Clone)]
pub struct JoinSnapshot {
    pub room_id: RoomId,
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub users: Vec<String>,
}

/// What happened when a participant left.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub room_id: RoomId,
    pub username: String,
    /// Usernames still in the room (empty when the room was deleted).
    pub remaining: Vec<String>,
    /// The room became empty and was destroyed.
    pub room_deleted: bool,
}

/// Owns every live room and the participant → room index.
///
/// A participant can be in at most ONE room at a time (key invariant);
/// callers that allow switching rooms leave the old one first.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ParticipantId, RoomId>,
    blocklist: Blocklist,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            blocklist: Blocklist::default(),
        }
    }

    /// Replaces the default blocklist. Test knob and operator hook.
    pub fn with_blocklist(mut self, blocklist: Blocklist) -> Self {
        self.blocklist = blocklist;
        self
    }

    /// Creates a room and returns its freshly generated id.
    /// The creator does not join implicitly.
    pub fn create_room(
        &mut self,
        name: String,
        is_private: bool,
        password: Option<String>,
    ) -> RoomId {
        let room = Room::new(name, is_private, password);
        let room_id = room.id.clone();
        tracing::info!(room_id = %room_id, name = %room.name, "room created");
        self.rooms.insert(room_id.clone(), room);
        room_id
    }

    /// Listing of every live room.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<_> = self.rooms.values().map(Room::summary).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Adds a participant to a room and returns the snapshot they need
    /// to render it.
    pub fn join(
        &mut self,
        room_id: &RoomId,
        password: Option<&str>,
        participant_id: ParticipantId,
        username: String,
    ) -> Result<JoinSnapshot, RoomError> {
        if let Some(current) = self.memberships.get(&participant_id) {
            return Err(RoomError::AlreadyInRoom(participant_id, current.clone()));
        }

        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if !room.password_accepted(password) {
            return Err(RoomError::IncorrectPassword(room_id.clone()));
        }

        room.add_participant(participant_id, username.clone());
        self.memberships.insert(participant_id, room_id.clone());
        tracing::info!(
            room_id = %room_id,
            %participant_id,
            %username,
            participants = room.usernames().len(),
            "participant joined"
        );

        Ok(JoinSnapshot {
            room_id: room_id.clone(),
            name: room.name.clone(),
            messages: room.messages(),
            users: room.usernames(),
        })
    }

    /// Removes a participant from their current room, destroying the
    /// room if it became empty. `None` if they were in no room.
    pub fn leave(&mut self, participant_id: ParticipantId) -> Option<LeaveOutcome> {
        let room_id = self.memberships.remove(&participant_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        let username = room.remove_participant(participant_id)?;
        let remaining = room.usernames();
        let room_deleted = room.is_empty();

        if room_deleted {
            self.rooms.remove(&room_id);
            tracing::info!(room_id = %room_id, "room deleted (empty)");
        }

        Some(LeaveOutcome {
            room_id,
            username,
            remaining,
            room_deleted,
        })
    }

    /// Screens and posts a message. On success the message is buffered
    /// (cap applied) and returned for broadcast and persistence.
    pub fn post_message(
        &mut self,
        room_id: &RoomId,
        participant_id: ParticipantId,
        text: &str,
    ) -> Result<ChatMessage, RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let username = room
            .username_of(participant_id)
            .ok_or_else(|| RoomError::NotAMember(participant_id, room_id.clone()))?
            .to_string();

        if self.blocklist.screen(text).is_blocked() {
            tracing::debug!(room_id = %room_id, %participant_id, "message blocked");
            return Err(RoomError::MessageRejected);
        }

        let message = make_message(&username, text);
        room.push_message(message.clone());
        Ok(message)
    }

    /// The room a participant is currently in, if any.
    pub fn room_of(&self, participant_id: ParticipantId) -> Option<RoomId> {
        self.memberships.get(&participant_id).cloned()
    }

    /// Whether a participant is a member of the given room.
    pub fn is_member(&self, participant_id: ParticipantId, room_id: &RoomId) -> bool {
        self.memberships.get(&participant_id) == Some(room_id)
    }

    /// Participant ids of a room's members, for outbound fan-out.
    pub fn members(&self, room_id: &RoomId) -> Vec<ParticipantId> {
        self.rooms
            .get(room_id)
            .map(Room::member_ids)
            .unwrap_or_default()
    }

    /// Usernames of a room's members, join order.
    pub fn usernames(&self, room_id: &RoomId) -> Vec<String> {
        self.rooms
            .get(room_id)
            .map(Room::usernames)
            .unwrap_or_default()
    }

    /// Username a participant joined under.
    pub fn username_of(&self, participant_id: ParticipantId) -> Option<String> {
        let room_id = self.memberships.get(&participant_id)?;
        self.rooms
            .get(room_id)?
            .username_of(participant_id)
            .map(str::to_string)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
