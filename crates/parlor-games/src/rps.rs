//! Turn-based rock-paper-scissors.
//!
//! One record carries a challenge from Challenged (challenger only)
//! through Matched (both roles bound, awaiting moves) to resolution,
//! at which point it is removed. There is no timer here — the pending
//! phase is bounded by the invite's TTL, and disconnects tear the
//! record down through [`RpsEngine::remove_by_participant`].

use std::collections::HashMap;

use parlor_protocol::{ChallengeId, ParticipantId, RoomId, RpsMove, RpsResultView};

use crate::GameError;

/// A challenge, and once accepted, the match itself.
#[derive(Debug)]
pub struct RpsChallenge {
    pub id: ChallengeId,
    pub room_id: RoomId,
    pub challenger: ParticipantId,
    pub challenger_username: String,
    acceptor: Option<(ParticipantId, String)>,
    challenger_move: Option<RpsMove>,
    acceptor_move: Option<RpsMove>,
}

impl RpsChallenge {
    /// Both roles bound, match underway.
    pub fn is_matched(&self) -> bool {
        self.acceptor.is_some()
    }

    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.challenger == participant
            || self.acceptor.as_ref().is_some_and(|(id, _)| *id == participant)
    }

    pub fn acceptor(&self) -> Option<ParticipantId> {
        self.acceptor.as_ref().map(|(id, _)| *id)
    }
}

/// What both players get told when a challenge is accepted.
#[derive(Debug, Clone)]
pub struct MatchedPair {
    pub challenge_id: ChallengeId,
    pub room_id: RoomId,
    pub challenger: ParticipantId,
    pub challenger_username: String,
    pub acceptor: ParticipantId,
    pub acceptor_username: String,
}

/// Outcome of one `choose` call.
#[derive(Debug)]
pub enum ChoiceOutcome {
    /// Unknown match, unbound participant, or repeated choice —
    /// dropped without effect.
    Ignored,
    /// First of the two moves; waiting for the other.
    Recorded,
    /// Both moves in: the match resolved and was destroyed.
    Resolved {
        room_id: RoomId,
        result: RpsResultView,
    },
}

/// All live challenges and matches, across every room.
pub struct RpsEngine {
    challenges: HashMap<ChallengeId, RpsChallenge>,
    next_id: u64,
}

impl RpsEngine {
    pub fn new() -> Self {
        Self {
            challenges: HashMap::new(),
            next_id: 1,
        }
    }

    /// Posts a challenge owned by `challenger`.
    pub fn challenge(
        &mut self,
        room_id: RoomId,
        challenger: ParticipantId,
        username: String,
    ) -> &RpsChallenge {
        let id = ChallengeId(self.next_id);
        self.next_id += 1;
        tracing::info!(challenge_id = %id, room_id = %room_id, "rps challenge posted");

        self.challenges.entry(id).or_insert(RpsChallenge {
            id,
            room_id,
            challenger,
            challenger_username: username,
            acceptor: None,
            challenger_move: None,
            acceptor_move: None,
        })
    }

    /// Binds an acceptor to a pending challenge.
    ///
    /// `acceptor_room` is the room the acceptor is currently in; it
    /// must be the challenge's room.
    pub fn accept(
        &mut self,
        id: ChallengeId,
        acceptor: ParticipantId,
        username: String,
        acceptor_room: Option<&RoomId>,
    ) -> Result<MatchedPair, GameError> {
        let challenge = self
            .challenges
            .get_mut(&id)
            .ok_or(GameError::ChallengeNotFound(id))?;
        if challenge.is_matched() {
            return Err(GameError::AlreadyMatched(id));
        }
        if challenge.challenger == acceptor {
            return Err(GameError::OwnChallenge(id));
        }
        if acceptor_room != Some(&challenge.room_id) {
            return Err(GameError::NotInChallengeRoom(id));
        }

        challenge.acceptor = Some((acceptor, username.clone()));
        tracing::info!(challenge_id = %id, "rps challenge accepted");

        Ok(MatchedPair {
            challenge_id: id,
            room_id: challenge.room_id.clone(),
            challenger: challenge.challenger,
            challenger_username: challenge.challenger_username.clone(),
            acceptor,
            acceptor_username: username,
        })
    }

    /// Records a move for whichever role `participant` holds. Resolves
    /// and destroys the match once both moves are in.
    pub fn choose(
        &mut self,
        id: ChallengeId,
        participant: ParticipantId,
        choice: RpsMove,
    ) -> ChoiceOutcome {
        let Some(challenge) = self.challenges.get_mut(&id) else {
            return ChoiceOutcome::Ignored;
        };
        let Some(acceptor_id) = challenge.acceptor() else {
            // Not matched yet; moves only exist once both roles bound.
            return ChoiceOutcome::Ignored;
        };

        let slot = if participant == challenge.challenger {
            &mut challenge.challenger_move
        } else if participant == acceptor_id {
            &mut challenge.acceptor_move
        } else {
            return ChoiceOutcome::Ignored;
        };
        if slot.is_some() {
            // First choice stands; repeats are dropped.
            return ChoiceOutcome::Ignored;
        }
        *slot = Some(choice);

        let (Some(challenger_move), Some(acceptor_move)) =
            (challenge.challenger_move, challenge.acceptor_move)
        else {
            return ChoiceOutcome::Recorded;
        };

        let challenge = self.challenges.remove(&id).expect("present just above");
        let (_, acceptor_username) = challenge.acceptor.expect("matched");
        let winner = if challenger_move.beats(acceptor_move) {
            Some(challenge.challenger_username.clone())
        } else if acceptor_move.beats(challenger_move) {
            Some(acceptor_username.clone())
        } else {
            None
        };
        tracing::info!(challenge_id = %id, ?winner, "rps match resolved");

        ChoiceOutcome::Resolved {
            room_id: challenge.room_id,
            result: RpsResultView {
                challenge_id: id,
                challenger_username: challenge.challenger_username,
                acceptor_username,
                challenger_move,
                acceptor_move,
                winner,
            },
        }
    }

    /// Tears down one challenge (invite cancelled or expired).
    pub fn remove(&mut self, id: ChallengeId) -> Option<RpsChallenge> {
        self.challenges.remove(&id)
    }

    /// Tears down every challenge or match a disconnecting participant
    /// is bound to, returning the removed records for notification.
    pub fn remove_by_participant(
        &mut self,
        participant: ParticipantId,
    ) -> Vec<RpsChallenge> {
        let ids: Vec<ChallengeId> = self
            .challenges
            .values()
            .filter(|c| c.involves(participant))
            .map(|c| c.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.challenges.remove(&id))
            .collect()
    }

    pub fn get(&self, id: ChallengeId) -> Option<&RpsChallenge> {
        self.challenges.get(&id)
    }

    pub fn challenge_count(&self) -> usize {
        self.challenges.len()
    }
}

impl Default for RpsEngine {
    fn default() -> Self {
        Self::new()
    }
}
