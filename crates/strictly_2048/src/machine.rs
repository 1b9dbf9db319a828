//! Turn sequencing: input, resolution, animation, scoring, spawning and
//! terminal detection.
//!
//! ```text
//! Idle ──start──▶ WaitingInput ──submit──▶ Resolving ──complete_turn──▶ WaitingInput
//!                      ▲                                   │
//!                      │                                   ├──▶ Won ──continue_game──┐
//!                      └───────────────────────────────────┴──▶ GameOver             │
//!                      ▲                                                             │
//!                      └─────────────────────────────────────────────────────────────┘
//! ```

use crate::board::Board;
use crate::collaborators::{
    AnimationPlayer, BestScoreStore, GameNotifier, InputGate, MemoryScoreStore, NoopInput,
    NoopNotifier,
};
use crate::config::GameConfig;
use crate::contracts::{self, Contract, ResolveContract};
use crate::direction::Direction;
use crate::error::GameError;
use crate::resolver::{MoveResolver, Turn};
use crate::rules::{can_move, reached_win};
use crate::score::ScoreTracker;
use crate::spawner::Spawner;
use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Lifecycle phase of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum GamePhase {
    /// Created but not started.
    Idle,
    /// Accepting a move.
    WaitingInput,
    /// A turn is in flight, waiting for its animation to finish.
    Resolving,
    /// The win value was reached; the player may continue.
    Won,
    /// No move can change the board.
    GameOver,
}

impl GamePhase {
    /// True for phases that end play until an explicit action.
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::GameOver)
    }
}

/// Identifies the turn in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnTicket(u64);

impl TurnTicket {
    /// Returns the raw ticket number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A resolved turn awaiting its completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    ticket: TurnTicket,
    turn: Turn,
}

impl TurnPlan {
    /// Ticket to hand back to [`GameStateMachine::complete_turn`].
    pub fn ticket(&self) -> TurnTicket {
        self.ticket
    }

    /// The motions and merges to animate.
    pub fn turn(&self) -> &Turn {
        &self.turn
    }
}

/// Outcome of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    turn: Turn,
    spawned: Vec<TileId>,
    score_gained: u64,
    phase: GamePhase,
    round: u64,
}

impl TurnReport {
    /// The completed turn.
    pub fn turn(&self) -> &Turn {
        &self.turn
    }

    /// Tiles spawned after the move.
    pub fn spawned(&self) -> &[TileId] {
        &self.spawned
    }

    /// Points earned by this turn's merges.
    pub fn score_gained(&self) -> u64 {
        self.score_gained
    }

    /// Phase the machine settled in.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Completed turns including this one.
    pub fn round(&self) -> u64 {
        self.round
    }
}

#[derive(Debug)]
struct InFlight {
    ticket: TurnTicket,
    turn: Turn,
}

/// Drives one game from start to finish.
///
/// Exactly one turn can be in flight. A turn begins with [`submit`] and
/// ends with [`complete_turn`], normally after the animation collaborator
/// has finished; [`play`] does both around an [`AnimationPlayer`].
///
/// [`submit`]: GameStateMachine::submit
/// [`complete_turn`]: GameStateMachine::complete_turn
/// [`play`]: GameStateMachine::play
pub struct GameStateMachine {
    config: GameConfig,
    board: Board,
    spawner: Spawner,
    score: ScoreTracker,
    input: Box<dyn InputGate>,
    notifier: Box<dyn GameNotifier>,
    phase: GamePhase,
    has_won: bool,
    round: u64,
    next_ticket: u64,
    in_flight: Option<InFlight>,
}

impl std::fmt::Debug for GameStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStateMachine")
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("has_won", &self.has_won)
            .field("score", &self.score)
            .field("board", &self.board)
            .finish_non_exhaustive()
    }
}

impl GameStateMachine {
    /// Creates an idle machine with headless collaborators.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if `config` fails validation.
    #[instrument(skip(config))]
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::new(*config.width(), *config.height())?;
        let spawner = Spawner::from_config(&config);
        Ok(Self {
            config,
            board,
            spawner,
            score: ScoreTracker::new(Box::new(MemoryScoreStore::default())),
            input: Box::new(NoopInput),
            notifier: Box::new(NoopNotifier),
            phase: GamePhase::Idle,
            has_won: false,
            round: 0,
            next_ticket: 0,
            in_flight: None,
        })
    }

    /// Uses `input` to gate player moves.
    pub fn with_input(mut self, input: impl InputGate + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Sends game events to `notifier`.
    pub fn with_notifier(mut self, notifier: impl GameNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Persists the best score through `store`.
    pub fn with_score_store(mut self, store: impl BestScoreStore + 'static) -> Self {
        self.score = ScoreTracker::new(Box::new(store));
        self
    }

    /// Replaces the tile spawner.
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    /// Starts from a prepared board instead of an empty one.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if the board does not match the
    /// configured size.
    pub fn with_board(mut self, board: Board) -> Result<Self, GameError> {
        if board.width() != *self.config.width() || board.height() != *self.config.height() {
            return Err(GameError::InvalidConfig(format!(
                "board is {}x{}, config expects {}x{}",
                board.width(),
                board.height(),
                self.config.width(),
                self.config.height()
            )));
        }
        self.board = board;
        Ok(self)
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The board. During `Resolving` it already holds the resolved positions.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Rules in effect.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current score.
    pub fn score(&self) -> u64 {
        self.score.current()
    }

    /// Best score.
    pub fn best_score(&self) -> u64 {
        self.score.best()
    }

    /// True once the win value was reached in this game.
    pub fn has_won(&self) -> bool {
        self.has_won
    }

    /// Completed turns since the game started.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Ticket of the turn in flight, if any.
    pub fn in_flight(&self) -> Option<TurnTicket> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }

    /// Loads the best score, spawns the opening tiles and waits for input.
    ///
    /// # Errors
    ///
    /// Returns `GameError::WrongPhase` unless the machine is `Idle`.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Idle {
            return Err(GameError::WrongPhase {
                action: "start",
                phase: self.phase,
            });
        }
        let best = self.score.load_best();
        info!(best, "Starting game");
        self.open_board();
        Ok(())
    }

    /// Resolves a move and puts it in flight.
    ///
    /// Returns `Ok(None)` when the move changes nothing; the machine keeps
    /// waiting and nothing is spawned.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InputDisabled` outside `WaitingInput`.
    #[instrument(skip(self))]
    pub fn submit(&mut self, direction: Direction) -> Result<Option<TurnPlan>, GameError> {
        if self.phase != GamePhase::WaitingInput {
            debug!(phase = %self.phase, "Input rejected");
            return Err(GameError::InputDisabled(self.phase));
        }

        let before = cfg!(debug_assertions).then(|| self.board.clone());
        if let Some(before) = &before {
            ResolveContract::pre(before, &direction)?;
        }

        let turn = MoveResolver::resolve(&mut self.board, direction)?;

        if let Some(before) = &before {
            if let Err(e) = ResolveContract::post(before, &self.board) {
                error!(error = %e, "Move resolution broke a board invariant");
                debug_assert!(false, "{}", e);
                return Err(e);
            }
        }

        if turn.is_noop() {
            debug!(%direction, "Move changes nothing");
            return Ok(None);
        }

        let ticket = TurnTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            turn: turn.clone(),
        });
        self.enter(GamePhase::Resolving);
        self.notifier.on_move_start(direction);
        debug!(ticket = ticket.get(), merges = turn.merges().len(), "Turn in flight");

        Ok(Some(TurnPlan { ticket, turn }))
    }

    /// Validates a raw input vector, then submits it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidDirection` for anything but a unit vector
    /// along one axis; the machine is left untouched.
    pub fn submit_vector(&mut self, dx: i32, dy: i32) -> Result<Option<TurnPlan>, GameError> {
        let direction = Direction::from_vector(dx, dy)?;
        self.submit(direction)
    }

    /// Finishes the turn in flight: scores merges, spawns a tile and
    /// settles into the next phase.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoTurnInFlight` when nothing was submitted and
    /// `GameError::StaleTicket` when `ticket` belongs to another turn. The
    /// in-flight turn is kept on error.
    #[instrument(skip(self), fields(ticket = ticket.get()))]
    pub fn complete_turn(&mut self, ticket: TurnTicket) -> Result<TurnReport, GameError> {
        let expected = match &self.in_flight {
            None => return Err(GameError::NoTurnInFlight),
            Some(flight) => flight.ticket,
        };
        if expected != ticket {
            return Err(GameError::StaleTicket {
                expected: expected.get(),
                got: ticket.get(),
            });
        }
        let InFlight { turn, .. } = self.in_flight.take().ok_or(GameError::NoTurnInFlight)?;

        let mut score_gained = 0;
        for merge in turn.merges() {
            self.notifier.on_merge(merge.value);
            let change = self.score.add_score(u64::from(merge.value));
            score_gained += u64::from(merge.value);
            self.notifier.on_score_changed(change.current);
            if let Some(best) = change.new_best {
                self.notifier.on_best_score_changed(best);
            }
        }

        let spawned = self.spawner.spawn(&mut self.board, 1);
        self.announce_spawn(&spawned);
        self.round += 1;

        contracts::assert_invariants(&self.board);
        self.settle();

        info!(
            round = self.round,
            score = self.score.current(),
            phase = %self.phase,
            "Turn complete"
        );

        Ok(TurnReport {
            turn,
            spawned,
            score_gained,
            phase: self.phase,
            round: self.round,
        })
    }

    /// Submits a move, waits for `animation` to play it, then completes it.
    ///
    /// Returns `Ok(None)` for a move that changes nothing.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`submit`](Self::submit) and
    /// [`complete_turn`](Self::complete_turn).
    #[instrument(skip(self, animation))]
    pub async fn play(
        &mut self,
        direction: Direction,
        animation: &mut dyn AnimationPlayer,
    ) -> Result<Option<TurnReport>, GameError> {
        let Some(plan) = self.submit(direction)? else {
            return Ok(None);
        };
        animation.play(&self.board, plan.turn()).await;
        self.complete_turn(plan.ticket()).map(Some)
    }

    /// Resumes play after a win.
    ///
    /// # Errors
    ///
    /// Returns `GameError::WrongPhase` unless the machine is `Won`.
    #[instrument(skip(self))]
    pub fn continue_game(&mut self) -> Result<GamePhase, GameError> {
        if self.phase != GamePhase::Won {
            return Err(GameError::WrongPhase {
                action: "continue",
                phase: self.phase,
            });
        }
        info!("Continuing after win");
        if can_move(&self.board) {
            self.enter(GamePhase::WaitingInput);
        } else {
            self.enter(GamePhase::GameOver);
        }
        Ok(self.phase)
    }

    /// Clears the board and score and opens a fresh game.
    ///
    /// # Errors
    ///
    /// Returns `GameError::WrongPhase` while a turn is in flight.
    #[instrument(skip(self))]
    pub fn restart(&mut self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Resolving => Err(GameError::WrongPhase {
                action: "restart",
                phase: self.phase,
            }),
            GamePhase::Idle => self.start(),
            _ => {
                info!(round = self.round, score = self.score.current(), "Restarting");
                self.board.clear();
                self.score.reset();
                self.notifier.on_score_changed(0);
                self.has_won = false;
                self.round = 0;
                self.open_board();
                Ok(())
            }
        }
    }

    fn open_board(&mut self) {
        let count = *self.config.initial_tiles();
        let spawned = self.spawner.spawn(&mut self.board, count);
        self.announce_spawn(&spawned);
        contracts::assert_invariants(&self.board);
        self.settle();
    }

    fn announce_spawn(&mut self, spawned: &[TileId]) {
        if spawned.is_empty() {
            return;
        }
        let tiles: Vec<Tile> = spawned
            .iter()
            .filter_map(|id| self.board.tile(*id))
            .cloned()
            .collect();
        self.notifier.on_spawn(&tiles);
    }

    /// Picks the phase after the board changed: a first win, a stuck
    /// board, or more input.
    fn settle(&mut self) {
        if !self.has_won && reached_win(&self.board, *self.config.win_value()) {
            self.has_won = true;
            self.enter(GamePhase::Won);
        } else if !can_move(&self.board) {
            self.enter(GamePhase::GameOver);
        } else {
            self.enter(GamePhase::WaitingInput);
        }
    }

    fn enter(&mut self, phase: GamePhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "Phase change");
        }
        self.phase = phase;
        match phase {
            GamePhase::WaitingInput => self.input.enable(),
            GamePhase::Idle | GamePhase::Resolving => self.input.disable(),
            GamePhase::Won => {
                self.input.disable();
                info!(win_value = self.config.win_value(), "Win value reached");
                self.notifier.on_win();
            }
            GamePhase::GameOver => {
                self.input.disable();
                info!(score = self.score.current(), "Game over");
                self.notifier.on_game_over();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{GameEvent, InputFlag, RecordingNotifier};

    fn quiet_config() -> GameConfig {
        GameConfig::default().with_initial_tiles(0).with_seed(Some(7))
    }

    #[test]
    fn test_start_spawns_initial_tiles() {
        let mut game = GameStateMachine::new(GameConfig::default().with_seed(Some(1))).unwrap();
        assert_eq!(game.phase(), GamePhase::Idle);
        game.start().unwrap();
        assert_eq!(game.phase(), GamePhase::WaitingInput);
        assert_eq!(game.board().tile_count(), 2);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut game = GameStateMachine::new(quiet_config()).unwrap();
        game.start().unwrap();
        assert!(matches!(
            game.start(),
            Err(GameError::WrongPhase { action: "start", .. })
        ));
    }

    #[test]
    fn test_submit_before_start_is_rejected() {
        let mut game = GameStateMachine::new(quiet_config()).unwrap();
        assert_eq!(
            game.submit(Direction::Left),
            Err(GameError::InputDisabled(GamePhase::Idle))
        );
    }

    #[test]
    fn test_input_gate_follows_phase() {
        let flag = InputFlag::new();
        let board = Board::with_tiles(4, 4, &[(3, 0, 2)]).unwrap();
        let mut game = GameStateMachine::new(quiet_config())
            .unwrap()
            .with_input(flag.clone())
            .with_board(board)
            .unwrap();

        game.start().unwrap();
        assert!(flag.is_enabled());

        let plan = game.submit(Direction::Left).unwrap().unwrap();
        assert_eq!(game.phase(), GamePhase::Resolving);
        assert!(!flag.is_enabled());

        game.complete_turn(plan.ticket()).unwrap();
        assert!(flag.is_enabled());
    }

    #[test]
    fn test_complete_turn_scores_merges() {
        let recorder = RecordingNotifier::new();
        let board = Board::with_tiles(4, 4, &[(0, 0, 2), (1, 0, 2)]).unwrap();
        let mut game = GameStateMachine::new(quiet_config())
            .unwrap()
            .with_notifier(recorder.clone())
            .with_board(board)
            .unwrap();
        game.start().unwrap();

        let plan = game.submit(Direction::Left).unwrap().unwrap();
        assert_eq!(game.score(), 0);
        let report = game.complete_turn(plan.ticket()).unwrap();

        assert_eq!(report.score_gained(), 4);
        assert_eq!(game.score(), 4);
        assert_eq!(game.best_score(), 4);
        assert_eq!(report.round(), 1);
        assert_eq!(report.spawned().len(), 1);
        let events = recorder.events();
        assert!(events.contains(&GameEvent::MoveStart(Direction::Left)));
        assert!(events.contains(&GameEvent::Merge(4)));
        assert!(events.contains(&GameEvent::ScoreChanged(4)));
        assert!(events.contains(&GameEvent::BestScoreChanged(4)));
    }

    #[test]
    fn test_unknown_ticket_keeps_turn_in_flight() {
        let board = Board::with_tiles(4, 4, &[(3, 3, 2)]).unwrap();
        let mut game = GameStateMachine::new(quiet_config())
            .unwrap()
            .with_board(board)
            .unwrap();
        game.start().unwrap();

        assert_eq!(
            game.complete_turn(TurnTicket(0)),
            Err(GameError::NoTurnInFlight)
        );

        let plan = game.submit(Direction::Down).unwrap().unwrap();
        let stale = TurnTicket(plan.ticket().get() + 1);
        assert!(matches!(
            game.complete_turn(stale),
            Err(GameError::StaleTicket { .. })
        ));
        assert_eq!(game.phase(), GamePhase::Resolving);
        assert_eq!(game.in_flight(), Some(plan.ticket()));
        assert!(game.complete_turn(plan.ticket()).is_ok());
    }

    #[test]
    fn test_restart_during_resolution_is_rejected() {
        let board = Board::with_tiles(4, 4, &[(3, 3, 2)]).unwrap();
        let mut game = GameStateMachine::new(quiet_config())
            .unwrap()
            .with_board(board)
            .unwrap();
        game.start().unwrap();
        game.submit(Direction::Left).unwrap().unwrap();
        assert!(matches!(
            game.restart(),
            Err(GameError::WrongPhase { action: "restart", .. })
        ));
    }

    #[test]
    fn test_mismatched_board_is_rejected() {
        let board = Board::new(3, 3).unwrap();
        let result = GameStateMachine::new(quiet_config())
            .unwrap()
            .with_board(board);
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }
}
