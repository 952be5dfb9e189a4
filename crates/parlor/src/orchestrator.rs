//! The session orchestrator: one actor task owning all mutable state.
//!
//! Two channels feed the actor — parsed client events from the
//! connection tasks, and timer firings from the engines — and a single
//! `select!` loop drains both. Every handler is a synchronous
//! validate→mutate→notify function, so no two mutations ever
//! interleave and no handler yields mid-mutation. The only work that
//! leaves this timeline is the store's debounced disk write, which it
//! schedules on its own background task.

use std::time::Duration;

use parlor_games::{
    ChoiceOutcome, EngineEvent, GameError, INVITE_TTL, InviteBoard, RpsEngine,
    SNAKE_TICK_PERIOD, SnakeEngine, SnakeOutcome, SnakeUpdate,
};
use parlor_protocol::{
    ClientEvent, GameRef, ParticipantId, RoomId, ServerEvent,
};
use parlor_rooms::{RoomError, RoomRegistry};
use parlor_store::MessageStore;
use tokio::sync::mpsc;

use crate::Gateway;

/// What the transport layer feeds the orchestrator.
pub enum Command<S> {
    /// A connection finished its WebSocket handshake.
    Connected {
        participant_id: ParticipantId,
        sink: S,
    },
    /// A parsed inbound event from one connection.
    Inbound {
        participant_id: ParticipantId,
        event: ClientEvent,
    },
    /// The connection closed (cleanly or not).
    Closed { participant_id: ParticipantId },
}

/// Timing knobs. Production uses the defaults; tests shrink them.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub invite_ttl: Duration,
    pub snake_tick: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            invite_ttl: INVITE_TTL,
            snake_tick: SNAKE_TICK_PERIOD,
        }
    }
}

/// Routes inbound events to the right subsystem, fans notifications
/// out to the right audience, and reconciles teardown across
/// subsystems on disconnect.
pub struct Orchestrator<G: Gateway> {
    gateway: G,
    registry: RoomRegistry,
    store: MessageStore,
    invites: InviteBoard,
    snakes: SnakeEngine,
    rps: RpsEngine,
    commands: mpsc::UnboundedReceiver<Command<G::Sink>>,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
}

impl<G: Gateway> Orchestrator<G> {
    /// Builds the orchestrator and the command handle the transport
    /// layer uses to reach it.
    pub fn new(
        gateway: G,
        store: MessageStore,
        config: OrchestratorConfig,
    ) -> (Self, mpsc::UnboundedSender<Command<G::Sink>>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            gateway,
            registry: RoomRegistry::new(),
            store,
            invites: InviteBoard::new(event_tx.clone()).with_ttl(config.invite_ttl),
            snakes: SnakeEngine::new(event_tx).with_tick_period(config.snake_tick),
            rps: RpsEngine::new(),
            commands: command_rx,
            engine_events: event_rx,
        };
        (orchestrator, command_tx)
    }

    /// The actor loop. Runs until every command sender is gone.
    pub async fn run(mut self) {
        tracing::info!("orchestrator started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.engine_events.recv() => {
                    self.handle_engine_event(event);
                }
            }
        }
        tracing::info!("orchestrator stopped");
        self.store.flush_now().await;
    }

    fn handle_command(&mut self, command: Command<G::Sink>) {
        match command {
            Command::Connected { participant_id, sink } => {
                tracing::debug!(%participant_id, "participant connected");
                self.gateway.attach(participant_id, sink);
            }
            Command::Inbound { participant_id, event } => {
                self.handle_event(participant_id, event);
            }
            Command::Closed { participant_id } => {
                tracing::debug!(%participant_id, "participant disconnected");
                self.handle_disconnect(participant_id);
            }
        }
    }

    /// The dispatch table: one arm per inbound event.
    fn handle_event(&mut self, sender: ParticipantId, event: ClientEvent) {
        match event {
            ClientEvent::CreateRoom { name, is_private, password } => {
                self.on_create_room(sender, name, is_private, password);
            }
            ClientEvent::GetRooms => {
                let rooms = self.registry.summaries();
                self.gateway.unicast(sender, &ServerEvent::RoomsList { rooms });
            }
            ClientEvent::JoinRoom { room_id, password, username } => {
                self.on_join_room(sender, room_id, password, username);
            }
            ClientEvent::SendMessage { room_id, message } => {
                self.on_send_message(sender, room_id, message);
            }
            ClientEvent::SnakeCreate { room_id } => {
                self.on_snake_create(sender, room_id);
            }
            ClientEvent::SnakeJoin { game_id } => {
                let Some(username) = self.registry.username_of(sender) else {
                    return;
                };
                let room = self.registry.room_of(sender);
                match self.snakes.join(game_id, sender, username, room.as_ref()) {
                    Ok(update) => {
                        // First join consumes the invite; the game is
                        // discoverable through its state from here on.
                        self.remove_invite_for(GameRef::Snake(game_id));
                        self.apply_snake_update(update);
                    }
                    Err(e) => {
                        tracing::debug!(%sender, error = %e, "snake join rejected");
                    }
                }
            }
            ClientEvent::SnakeMove { game_id, direction } => {
                self.snakes.set_direction(game_id, sender, direction);
            }
            ClientEvent::RpsChallenge { room_id } => {
                self.on_rps_challenge(sender, room_id);
            }
            ClientEvent::RpsAccept { challenge_id } => {
                self.on_rps_accept(sender, challenge_id);
            }
            ClientEvent::RpsChoice { challenge_id, choice } => {
                match self.rps.choose(challenge_id, sender, choice) {
                    ChoiceOutcome::Resolved { room_id, result } => {
                        self.send_room(&room_id, &ServerEvent::RpsResult(result));
                    }
                    ChoiceOutcome::Recorded | ChoiceOutcome::Ignored => {}
                }
            }
            ClientEvent::GameInviteCancel { invite_id } => {
                match self.invites.cancel(invite_id, sender) {
                    Ok(invite) => {
                        match invite.game {
                            GameRef::Snake(game_id) => {
                                self.snakes.destroy(game_id);
                            }
                            GameRef::Rps(challenge_id) => {
                                self.rps.remove(challenge_id);
                            }
                        }
                        self.send_room(
                            &invite.room_id,
                            &ServerEvent::GameInviteRemoved { invite_id },
                        );
                    }
                    Err(GameError::Unauthorized(_)) => {
                        self.gateway.unicast(
                            sender,
                            &ServerEvent::Error {
                                message: "Only the invite creator can cancel it"
                                    .into(),
                            },
                        );
                    }
                    Err(e) => {
                        tracing::debug!(%sender, error = %e, "invite cancel ignored");
                    }
                }
            }
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::InviteExpired(invite_id) => {
                // A stale firing (consumed or cancelled first) misses
                // the lookup and is dropped here.
                let Some(invite) = self.invites.expire(invite_id) else {
                    return;
                };
                match invite.game {
                    GameRef::Snake(game_id) => {
                        self.snakes.destroy(game_id);
                    }
                    GameRef::Rps(challenge_id) => {
                        self.rps.remove(challenge_id);
                    }
                }
                self.send_room(
                    &invite.room_id,
                    &ServerEvent::GameInviteRemoved { invite_id },
                );
            }
            EngineEvent::SnakeTick(game_id) => {
                if let Some(update) = self.snakes.advance(game_id) {
                    self.apply_snake_update(update);
                }
            }
        }
    }

    // -- Rooms ------------------------------------------------------------

    fn on_create_room(
        &mut self,
        sender: ParticipantId,
        name: String,
        is_private: bool,
        password: Option<String>,
    ) {
        let room_id = self.registry.create_room(name.clone(), is_private, password);
        self.gateway
            .unicast(sender, &ServerEvent::RoomCreated { room_id, name });
        let rooms = self.registry.summaries();
        self.gateway.broadcast(&ServerEvent::RoomsUpdated { rooms });
    }

    fn on_join_room(
        &mut self,
        sender: ParticipantId,
        room_id: RoomId,
        password: Option<String>,
        username: String,
    ) {
        // One room at a time: switching rooms abandons the old room's
        // games and leaves it, with full notifications, first.
        if self.registry.room_of(sender).is_some() {
            self.teardown_participant_games(sender);
            self.leave_current_room(sender);
        }

        let snapshot = match self.registry.join(
            &room_id,
            password.as_deref(),
            sender,
            username.clone(),
        ) {
            Ok(snapshot) => snapshot,
            Err(e @ (RoomError::NotFound(_) | RoomError::IncorrectPassword(_))) => {
                self.gateway.unicast(
                    sender,
                    &ServerEvent::JoinError { reason: e.to_string() },
                );
                return;
            }
            Err(e) => {
                tracing::debug!(%sender, error = %e, "join rejected");
                return;
            }
        };

        let invites = self.invites.for_room(&snapshot.room_id);
        self.gateway.unicast(
            sender,
            &ServerEvent::RoomJoined {
                room_id: snapshot.room_id.clone(),
                name: snapshot.name,
                messages: snapshot.messages,
                users: snapshot.users.clone(),
                invites,
            },
        );
        self.send_room_except(
            &snapshot.room_id,
            sender,
            &ServerEvent::UserJoined { username },
        );
        self.send_room(
            &snapshot.room_id,
            &ServerEvent::UsersUpdated { users: snapshot.users },
        );
    }

    fn on_send_message(&mut self, sender: ParticipantId, room_id: RoomId, text: String) {
        match self.registry.post_message(&room_id, sender, &text) {
            Ok(message) => {
                self.store.append(&room_id, message.clone());
                self.send_room(&room_id, &ServerEvent::NewMessage { message });
            }
            Err(e @ RoomError::MessageRejected) => {
                self.gateway.unicast(
                    sender,
                    &ServerEvent::MessageRejected { reason: e.to_string() },
                );
            }
            Err(e) => {
                tracing::debug!(%sender, error = %e, "message dropped");
            }
        }
    }

    /// Leaves the sender's current room, notifying the remaining
    /// members — or everyone, when the room emptied and was deleted.
    fn leave_current_room(&mut self, participant_id: ParticipantId) {
        let Some(outcome) = self.registry.leave(participant_id) else {
            return;
        };
        if outcome.room_deleted {
            let rooms = self.registry.summaries();
            self.gateway.broadcast(&ServerEvent::RoomsUpdated { rooms });
        } else {
            self.send_room(
                &outcome.room_id,
                &ServerEvent::UserLeft { username: outcome.username },
            );
            self.send_room(
                &outcome.room_id,
                &ServerEvent::UsersUpdated { users: outcome.remaining },
            );
        }
    }

    // -- Games ------------------------------------------------------------

    fn on_snake_create(&mut self, sender: ParticipantId, room_id: RoomId) {
        if !self.registry.is_member(sender, &room_id) {
            tracing::debug!(%sender, room_id = %room_id, "snake create from non-member");
            return;
        }
        let Some(username) = self.registry.username_of(sender) else {
            return;
        };

        let (game_id, view) = {
            let game = self.snakes.create(room_id.clone(), sender, username.clone());
            (game.id, game.view())
        };
        let summary = self
            .invites
            .post(room_id.clone(), GameRef::Snake(game_id), sender, username)
            .summary();

        self.gateway.unicast(sender, &ServerEvent::SnakeCreated(view));
        self.send_room(&room_id, &ServerEvent::GameInviteNew { invite: summary });
    }

    fn on_rps_challenge(&mut self, sender: ParticipantId, room_id: RoomId) {
        if !self.registry.is_member(sender, &room_id) {
            tracing::debug!(%sender, room_id = %room_id, "rps challenge from non-member");
            return;
        }
        let Some(username) = self.registry.username_of(sender) else {
            return;
        };

        let challenge_id = self
            .rps
            .challenge(room_id.clone(), sender, username.clone())
            .id;
        let summary = self
            .invites
            .post(room_id.clone(), GameRef::Rps(challenge_id), sender, username)
            .summary();
        self.send_room(&room_id, &ServerEvent::GameInviteNew { invite: summary });
    }

    fn on_rps_accept(&mut self, sender: ParticipantId, challenge_id: parlor_protocol::ChallengeId) {
        let Some(username) = self.registry.username_of(sender) else {
            return;
        };
        let room = self.registry.room_of(sender);
        match self.rps.accept(challenge_id, sender, username, room.as_ref()) {
            Ok(pair) => {
                self.remove_invite_for(GameRef::Rps(challenge_id));
                self.gateway.unicast(
                    pair.challenger,
                    &ServerEvent::RpsMatched {
                        challenge_id,
                        opponent: pair.acceptor_username.clone(),
                    },
                );
                self.gateway.unicast(
                    pair.acceptor,
                    &ServerEvent::RpsMatched {
                        challenge_id,
                        opponent: pair.challenger_username,
                    },
                );
            }
            Err(e) => {
                tracing::debug!(%sender, error = %e, "rps accept rejected");
            }
        }
    }

    /// Broadcasts the aftermath of a snake mutation: the new board, or
    /// the end of the game (tearing down a still-pending invite for a
    /// game that died while forming).
    fn apply_snake_update(&mut self, update: SnakeUpdate) {
        match update.outcome {
            SnakeOutcome::State(view) => {
                self.send_room(&update.room_id, &ServerEvent::SnakeState(view));
            }
            SnakeOutcome::Over { winner } => {
                self.remove_invite_for(GameRef::Snake(update.game_id));
                self.send_room(
                    &update.room_id,
                    &ServerEvent::SnakeOver {
                        game_id: update.game_id,
                        winner,
                    },
                );
            }
        }
    }

    /// Consumes the invite for a game, if still pending, and tells the
    /// room. Safe to call on already-consumed invites.
    fn remove_invite_for(&mut self, game: GameRef) {
        if let Some(invite) = self.invites.consume_for(game) {
            self.send_room(
                &invite.room_id,
                &ServerEvent::GameInviteRemoved { invite_id: invite.id },
            );
        }
    }

    // -- Disconnect reconciliation ---------------------------------------

    /// Tears down everything a departing participant was involved in:
    /// RPS challenges and matches, snakes (with the usual end check),
    /// then room membership. Each affected entity notifies its room
    /// exactly once; all of its timers die with it.
    fn handle_disconnect(&mut self, participant_id: ParticipantId) {
        self.teardown_participant_games(participant_id);
        self.leave_current_room(participant_id);
        self.gateway.detach(participant_id);
    }

    /// Removes a participant from every game and challenge they are
    /// bound to. Shared by disconnect and room switching — a player
    /// who leaves a room must not keep a snake or a match alive there.
    fn teardown_participant_games(&mut self, participant_id: ParticipantId) {
        for challenge in self.rps.remove_by_participant(participant_id) {
            self.remove_invite_for(GameRef::Rps(challenge.id));
            if challenge.is_matched() {
                self.send_room(
                    &challenge.room_id,
                    &ServerEvent::RpsCancelled { challenge_id: challenge.id },
                );
            }
        }

        for update in self.snakes.remove_participant(participant_id) {
            self.apply_snake_update(update);
        }
    }

    // -- Fan-out helpers --------------------------------------------------

    fn send_room(&mut self, room_id: &RoomId, event: &ServerEvent) {
        for member in self.registry.members(room_id) {
            self.gateway.unicast(member, event);
        }
    }

    fn send_room_except(
        &mut self,
        room_id: &RoomId,
        except: ParticipantId,
        event: &ServerEvent,
    ) {
        for member in self.registry.members(room_id) {
            if member != except {
                self.gateway.unicast(member, event);
            }
        }
    }
}
