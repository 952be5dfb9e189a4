//! The invite board: time-limited, per-room game invitations.
//!
//! Expiry, cancellation, and consumption are mutually exclusive
//! terminal transitions. Whichever happens first removes the invite and
//! cancels its TTL timer; the other paths then see a lookup miss and do
//! nothing, which is what makes the removal notification exactly-once.

use std::collections::HashMap;
use std::time::Duration;

use parlor_protocol::{GameRef, InviteId, InviteSummary, ParticipantId, RoomId};
use parlor_timer::TimerHandle;
use tokio::sync::mpsc::UnboundedSender;

use crate::{EngineEvent, GameError};

/// How long an invite stays on the board before expiring on its own.
pub const INVITE_TTL: Duration = Duration::from_secs(60);

/// One pending invitation, tied to exactly one room and one underlying
/// game or challenge.
#[derive(Debug)]
pub struct GameInvite {
    pub id: InviteId,
    pub room_id: RoomId,
    pub game: GameRef,
    pub creator: ParticipantId,
    pub creator_username: String,
    /// TTL timer; aborted on drop, so every removal path cancels it.
    _timer: TimerHandle,
}

impl GameInvite {
    pub fn summary(&self) -> InviteSummary {
        InviteSummary {
            invite_id: self.id,
            game: self.game,
            creator_username: self.creator_username.clone(),
        }
    }
}

/// All pending invites, across every room.
pub struct InviteBoard {
    invites: HashMap<InviteId, GameInvite>,
    events: UnboundedSender<EngineEvent>,
    ttl: Duration,
    next_id: u64,
}

impl InviteBoard {
    pub fn new(events: UnboundedSender<EngineEvent>) -> Self {
        Self {
            invites: HashMap::new(),
            events,
            ttl: INVITE_TTL,
            next_id: 1,
        }
    }

    /// Overrides the TTL. Test knob.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Posts an invite and schedules its expiry.
    ///
    /// At most one invite exists per underlying game — engines create
    /// exactly one invite per game/challenge they spawn.
    pub fn post(
        &mut self,
        room_id: RoomId,
        game: GameRef,
        creator: ParticipantId,
        creator_username: String,
    ) -> &GameInvite {
        let id = InviteId(self.next_id);
        self.next_id += 1;

        let timer = parlor_timer::oneshot(
            self.ttl,
            self.events.clone(),
            EngineEvent::InviteExpired(id),
        );
        tracing::info!(invite_id = %id, room_id = %room_id, ?game, "invite posted");

        self.invites
            .entry(id)
            .or_insert(GameInvite {
                id,
                room_id,
                game,
                creator,
                creator_username,
                _timer: timer,
            })
    }

    /// Removes an invite whose TTL fired. `None` means the invite was
    /// consumed or cancelled first and this firing is stale.
    pub fn expire(&mut self, id: InviteId) -> Option<GameInvite> {
        let invite = self.invites.remove(&id)?;
        tracing::info!(invite_id = %id, room_id = %invite.room_id, "invite expired");
        Some(invite)
    }

    /// Withdraws an invite at its creator's request.
    pub fn cancel(
        &mut self,
        id: InviteId,
        requester: ParticipantId,
    ) -> Result<GameInvite, GameError> {
        let invite = self
            .invites
            .get(&id)
            .ok_or(GameError::InviteNotFound(id))?;
        if invite.creator != requester {
            return Err(GameError::Unauthorized(id));
        }
        let invite = self.invites.remove(&id).expect("checked just above");
        tracing::info!(invite_id = %id, room_id = %invite.room_id, "invite cancelled");
        Ok(invite)
    }

    /// Removes the invite pointing at a game that was joined, accepted,
    /// or torn down. `None` if it already left the board.
    pub fn consume_for(&mut self, game: GameRef) -> Option<GameInvite> {
        let id = self
            .invites
            .values()
            .find(|invite| invite.game == game)
            .map(|invite| invite.id)?;
        let invite = self.invites.remove(&id)?;
        tracing::debug!(invite_id = %id, ?game, "invite consumed");
        Some(invite)
    }

    /// Pending invites visible to one room, for the join snapshot.
    pub fn for_room(&self, room_id: &RoomId) -> Vec<InviteSummary> {
        let mut summaries: Vec<_> = self
            .invites
            .values()
            .filter(|invite| &invite.room_id == room_id)
            .map(GameInvite::summary)
            .collect();
        summaries.sort_by_key(|s| s.invite_id.0);
        summaries
    }

    pub fn len(&self) -> usize {
        self.invites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invites.is_empty()
    }
}
