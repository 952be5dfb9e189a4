//! Tick-driven multi-snake simulation.
//!
//! One game hosts one grid and any number of snakes from the owning
//! room. A game forms with just its creator, starts properly once a
//! second snake joins, and ends when the survivor count drops to one
//! (or to zero while still forming). The tick resolves all snakes
//! against positions as of the start of the tick, so the order snakes
//! are processed in never matters.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use parlor_protocol::{
    Cell, Direction, GameId, ParticipantId, RoomId, SnakeGameView, SnakeView,
};
use parlor_timer::TimerHandle;
use rand::Rng as _;
use tokio::sync::mpsc::UnboundedSender;

use crate::{EngineEvent, GameError};

pub const GRID_WIDTH: i16 = 20;
pub const GRID_HEIGHT: i16 = 20;

/// Fixed simulation period.
pub const SNAKE_TICK_PERIOD: Duration = Duration::from_millis(150);

#[derive(Debug)]
struct Snake {
    username: String,
    /// Grid cells, head first.
    body: VecDeque<Cell>,
    heading: Direction,
}

impl Snake {
    fn head(&self) -> Cell {
        *self.body.front().expect("snake body is never empty")
    }
}

/// One running (or forming) game.
#[derive(Debug)]
pub struct SnakeGame {
    pub id: GameId,
    pub room_id: RoomId,
    snakes: HashMap<ParticipantId, Snake>,
    food: Cell,
    /// `false` while forming (creator only); set once a second snake
    /// joins. The ≤1-survivor end check applies only once running.
    running: bool,
    /// Tick timer; aborted on drop, so destroying the game stops it.
    _ticker: TimerHandle,
}

impl SnakeGame {
    /// Snapshot for broadcast. Snakes are ordered by username so the
    /// view is deterministic.
    pub fn view(&self) -> SnakeGameView {
        let mut snakes: Vec<SnakeView> = self
            .snakes
            .values()
            .map(|snake| SnakeView {
                username: snake.username.clone(),
                body: snake.body.iter().copied().collect(),
            })
            .collect();
        snakes.sort_by(|a, b| a.username.cmp(&b.username));
        SnakeGameView {
            game_id: self.id,
            snakes,
            food: self.food,
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
        }
    }

    pub fn has_snake(&self, participant: ParticipantId) -> bool {
        self.snakes.contains_key(&participant)
    }

    fn occupied(&self) -> HashSet<Cell> {
        self.snakes
            .values()
            .flat_map(|snake| snake.body.iter().copied())
            .collect()
    }
}

/// What the orchestrator must broadcast after mutating one game.
#[derive(Debug)]
pub struct SnakeUpdate {
    pub game_id: GameId,
    pub room_id: RoomId,
    pub outcome: SnakeOutcome,
}

#[derive(Debug)]
pub enum SnakeOutcome {
    /// The game continues; broadcast the new board.
    State(SnakeGameView),
    /// The game ended and was destroyed. `winner` is the sole
    /// survivor's username, `None` if nobody survived.
    Over { winner: Option<String> },
}

/// All snake games, across every room.
pub struct SnakeEngine {
    games: HashMap<GameId, SnakeGame>,
    events: UnboundedSender<EngineEvent>,
    tick_period: Duration,
    next_id: u64,
}

impl SnakeEngine {
    pub fn new(events: UnboundedSender<EngineEvent>) -> Self {
        Self {
            games: HashMap::new(),
            events,
            tick_period: SNAKE_TICK_PERIOD,
            next_id: 1,
        }
    }

    /// Overrides the tick period. Test knob.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Creates a forming game: the creator's single-cell snake at the
    /// grid center, food somewhere free, tick loop started.
    pub fn create(
        &mut self,
        room_id: RoomId,
        creator: ParticipantId,
        username: String,
    ) -> &SnakeGame {
        let id = GameId(self.next_id);
        self.next_id += 1;

        let center = Cell {
            x: GRID_WIDTH / 2,
            y: GRID_HEIGHT / 2,
        };
        let mut snakes = HashMap::new();
        snakes.insert(
            creator,
            Snake {
                username,
                body: VecDeque::from([center]),
                heading: random_direction(),
            },
        );

        let taken = HashSet::from([center]);
        let food = random_free_cell(&taken);

        let ticker = parlor_timer::repeating(
            self.tick_period,
            self.events.clone(),
            EngineEvent::SnakeTick(id),
        );
        tracing::info!(game_id = %id, room_id = %room_id, "snake game created");

        self.games.entry(id).or_insert(SnakeGame {
            id,
            room_id,
            snakes,
            food,
            running: false,
            _ticker: ticker,
        })
    }

    /// Adds a joiner's snake at a collision-avoiding random cell.
    ///
    /// `joiner_room` is the room the joiner is currently in; it must be
    /// the game's room.
    pub fn join(
        &mut self,
        game_id: GameId,
        participant: ParticipantId,
        username: String,
        joiner_room: Option<&RoomId>,
    ) -> Result<SnakeUpdate, GameError> {
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(GameError::GameNotFound(game_id))?;
        if joiner_room != Some(&game.room_id) {
            return Err(GameError::NotInGameRoom(game_id));
        }
        if game.snakes.contains_key(&participant) {
            return Err(GameError::AlreadyInGame(game_id));
        }

        let mut taken = game.occupied();
        taken.insert(game.food);
        let spawn = random_free_cell(&taken);

        game.snakes.insert(
            participant,
            Snake {
                username,
                body: VecDeque::from([spawn]),
                heading: random_direction(),
            },
        );
        if game.snakes.len() >= 2 {
            game.running = true;
        }
        tracing::info!(
            game_id = %game_id,
            %participant,
            snakes = game.snakes.len(),
            "snake joined"
        );

        Ok(SnakeUpdate {
            game_id,
            room_id: game.room_id.clone(),
            outcome: SnakeOutcome::State(game.view()),
        })
    }

    /// Re-aims a snake for the next tick. Silently ignored if the
    /// participant has no snake here or the turn would be a 180-degree
    /// reversal into its own neck.
    pub fn set_direction(
        &mut self,
        game_id: GameId,
        participant: ParticipantId,
        direction: Direction,
    ) {
        let Some(snake) = self
            .games
            .get_mut(&game_id)
            .and_then(|game| game.snakes.get_mut(&participant))
        else {
            tracing::debug!(game_id = %game_id, %participant, "move for absent snake, ignoring");
            return;
        };
        if direction == snake.heading.opposite() {
            return;
        }
        snake.heading = direction;
    }

    /// Applies one tick to a game. `None` means the game is already
    /// gone and this tick event is stale.
    pub fn advance(&mut self, game_id: GameId) -> Option<SnakeUpdate> {
        let game = self.games.get_mut(&game_id)?;

        // Collision checks use positions as of the start of the tick,
        // so resolution is order-independent across snakes.
        let occupied_at_start = game.occupied();

        // Phase 1: everyone's candidate next head, or death.
        let mut next_heads: HashMap<ParticipantId, Cell> = HashMap::new();
        let mut dead: Vec<ParticipantId> = Vec::new();
        for (participant, snake) in &game.snakes {
            let (dx, dy) = snake.heading.delta();
            let head = snake.head();
            let next = Cell {
                x: head.x + dx,
                y: head.y + dy,
            };
            let out_of_bounds =
                next.x < 0 || next.y < 0 || next.x >= GRID_WIDTH || next.y >= GRID_HEIGHT;
            if out_of_bounds || occupied_at_start.contains(&next) {
                dead.push(*participant);
            } else {
                next_heads.insert(*participant, next);
            }
        }

        // Two survivors aiming at the same empty cell both die, keeping
        // the one-snake-per-cell invariant.
        let mut landing_counts: HashMap<Cell, u32> = HashMap::new();
        for cell in next_heads.values() {
            *landing_counts.entry(*cell).or_default() += 1;
        }
        for (participant, cell) in &next_heads {
            if landing_counts[cell] > 1 {
                dead.push(*participant);
            }
        }
        next_heads.retain(|participant, _| !dead.contains(participant));

        // Phase 2: apply deaths and moves.
        for participant in &dead {
            if let Some(snake) = game.snakes.remove(participant) {
                tracing::debug!(game_id = %game_id, username = %snake.username, "snake died");
            }
        }
        let mut food_eaten = false;
        for (participant, next) in &next_heads {
            let snake = game
                .snakes
                .get_mut(participant)
                .expect("survivor still present");
            snake.body.push_front(*next);
            if *next == game.food {
                food_eaten = true; // grow: keep the tail
            } else {
                snake.body.pop_back();
            }
        }
        if food_eaten {
            let taken = game.occupied();
            game.food = random_free_cell(&taken);
        }

        // Phase 3: end check. While forming, only a dead creator ends
        // the game; once running, dropping to one survivor does.
        let survivors = game.snakes.len();
        let ended = if game.running {
            survivors <= 1
        } else {
            survivors == 0
        };

        let room_id = game.room_id.clone();
        if ended {
            let winner = if game.running {
                game.snakes.values().next().map(|s| s.username.clone())
            } else {
                None
            };
            self.games.remove(&game_id);
            tracing::info!(game_id = %game_id, ?winner, "snake game over");
            Some(SnakeUpdate {
                game_id,
                room_id,
                outcome: SnakeOutcome::Over { winner },
            })
        } else {
            Some(SnakeUpdate {
                game_id,
                room_id,
                outcome: SnakeOutcome::State(game.view()),
            })
        }
    }

    /// Removes a disconnecting participant's snakes, applying the same
    /// end check a tick would. One update per affected game.
    pub fn remove_participant(&mut self, participant: ParticipantId) -> Vec<SnakeUpdate> {
        let affected: Vec<GameId> = self
            .games
            .values()
            .filter(|game| game.snakes.contains_key(&participant))
            .map(|game| game.id)
            .collect();

        let mut updates = Vec::new();
        for game_id in affected {
            let game = self.games.get_mut(&game_id).expect("listed just above");
            game.snakes.remove(&participant);

            let survivors = game.snakes.len();
            let ended = if game.running {
                survivors <= 1
            } else {
                survivors == 0
            };
            let room_id = game.room_id.clone();

            if ended {
                let winner = if game.running {
                    game.snakes.values().next().map(|s| s.username.clone())
                } else {
                    None
                };
                self.games.remove(&game_id);
                tracing::info!(game_id = %game_id, ?winner, "snake game over (disconnect)");
                updates.push(SnakeUpdate {
                    game_id,
                    room_id,
                    outcome: SnakeOutcome::Over { winner },
                });
            } else {
                updates.push(SnakeUpdate {
                    game_id,
                    room_id,
                    outcome: SnakeOutcome::State(game.view()),
                });
            }
        }
        updates
    }

    /// Tears down a game whose invite was cancelled or expired while
    /// still forming. Dropping the game aborts its ticker.
    pub fn destroy(&mut self, game_id: GameId) -> Option<RoomId> {
        let game = self.games.remove(&game_id)?;
        tracing::info!(game_id = %game_id, "snake game destroyed");
        Some(game.room_id)
    }

    pub fn game(&self, game_id: GameId) -> Option<&SnakeGame> {
        self.games.get(&game_id)
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}

fn random_direction() -> Direction {
    match rand::rng().random_range(0..4) {
        0 => Direction::Up,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Right,
    }
}

/// A uniformly random cell not in `taken`. Falls back to a linear scan
/// if sampling keeps missing (crowded grid).
fn random_free_cell(taken: &HashSet<Cell>) -> Cell {
    let mut rng = rand::rng();
    for _ in 0..64 {
        let cell = Cell {
            x: rng.random_range(0..GRID_WIDTH),
            y: rng.random_range(0..GRID_HEIGHT),
        };
        if !taken.contains(&cell) {
            return cell;
        }
    }
    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH {
            let cell = Cell { x, y };
            if !taken.contains(&cell) {
                return cell;
            }
        }
    }
    // Grid completely full; park food in the corner.
    Cell { x: 0, y: 0 }
}
