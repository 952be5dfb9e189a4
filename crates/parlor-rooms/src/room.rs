//! A single chat room.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use parlor_protocol::{ChatMessage, ParticipantId, RoomId, RoomSummary};
use rand::Rng as _;
use rand::distr::Alphanumeric;

/// Maximum messages buffered per room; the oldest is dropped first.
pub const MESSAGE_CAP: usize = 100;

const ROOM_ID_SUFFIX_LEN: usize = 9;

/// One chat room: identity, privacy settings, the bounded message
/// buffer, and the current participants (join order preserved).
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub is_private: bool,
    password: Option<String>,
    messages: VecDeque<ChatMessage>,
    participants: Vec<(ParticipantId, String)>,
}

impl Room {
    pub(crate) fn new(name: String, is_private: bool, password: Option<String>) -> Self {
        Self {
            id: generate_room_id(),
            name,
            is_private,
            password,
            messages: VecDeque::new(),
            participants: Vec::new(),
        }
    }

    /// Whether `supplied` opens this room.
    ///
    /// Public rooms accept anything. Private rooms require a supplied
    /// password equal to the stored one — a missing password is a
    /// mismatch, and a private room created without a password admits
    /// nobody.
    pub fn password_accepted(&self, supplied: Option<&str>) -> bool {
        if !self.is_private {
            return true;
        }
        match (self.password.as_deref(), supplied) {
            (Some(stored), Some(given)) => stored == given,
            _ => false,
        }
    }

    /// Appends a message, evicting the oldest past [`MESSAGE_CAP`].
    pub(crate) fn push_message(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > MESSAGE_CAP {
            self.messages.pop_front();
        }
    }

    /// The buffered history, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub(crate) fn add_participant(&mut self, id: ParticipantId, username: String) {
        self.participants.push((id, username));
    }

    /// Removes a participant, returning their username.
    pub(crate) fn remove_participant(&mut self, id: ParticipantId) -> Option<String> {
        let index = self.participants.iter().position(|(pid, _)| *pid == id)?;
        Some(self.participants.remove(index).1)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.iter().any(|(pid, _)| *pid == id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Usernames in join order.
    pub fn usernames(&self) -> Vec<String> {
        self.participants.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Participant ids, for outbound fan-out.
    pub fn member_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|(id, _)| *id).collect()
    }

    pub fn username_of(&self, id: ParticipantId) -> Option<&str> {
        self.participants
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, name)| name.as_str())
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            is_private: self.is_private,
            participant_count: self.participants.len(),
        }
    }
}

/// A fresh random room id. Regenerated on every creation — ids of
/// deleted rooms are effectively never reused.
fn generate_room_id() -> RoomId {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_ID_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    RoomId(format!("room-{suffix}"))
}

/// Builds a chat message stamped with the current wall clock: the id is
/// the unix-epoch millisecond, the label is `HH:MM:SS` UTC.
pub(crate) fn make_message(username: &str, text: &str) -> ChatMessage {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let day_secs = now.as_secs() % 86_400;
    ChatMessage {
        id: now.as_millis() as u64,
        username: username.to_string(),
        message: text.to_string(),
        timestamp: format!(
            "{:02}:{:02}:{:02}",
            day_secs / 3600,
            (day_secs / 60) % 60,
            day_secs % 60
        ),
    }
}
