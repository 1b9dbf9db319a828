//! Narrow interfaces to presentation and persistence.
//!
//! The state machine reaches input, animation, notification and storage only
//! through these traits. The concrete types here are headless stand-ins
//! for tests, simulations and front ends that do not need a given concern.

use crate::board::Board;
use crate::direction::Direction;
use crate::resolver::Turn;
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Key under which the best score is persisted.
pub const BEST_SCORE_KEY: &str = "BestScore";

/// Error returned by a [`BestScoreStore`].
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Accepts or rejects player input.
pub trait InputGate: Send {
    /// Start accepting moves.
    fn enable(&mut self);

    /// Stop accepting moves.
    fn disable(&mut self);
}

/// Plays a resolved turn and returns once every tile has arrived.
#[async_trait::async_trait]
pub trait AnimationPlayer: Send {
    /// Animates `turn`. `board` already holds the resolved positions.
    async fn play(&mut self, board: &Board, turn: &Turn);
}

/// Receives game events. Every method defaults to doing nothing.
pub trait GameNotifier: Send {
    /// A move was accepted and is about to animate.
    fn on_move_start(&mut self, _direction: Direction) {}

    /// Two tiles merged into one of `value`.
    fn on_merge(&mut self, _value: u32) {}

    /// The current score changed.
    fn on_score_changed(&mut self, _score: u64) {}

    /// The best score was beaten.
    fn on_best_score_changed(&mut self, _best: u64) {}

    /// A tile reached the win value for the first time this game.
    fn on_win(&mut self) {}

    /// No move can change the board.
    fn on_game_over(&mut self) {}

    /// New tiles were spawned.
    fn on_spawn(&mut self, _tiles: &[Tile]) {}
}

/// Persists a single best-score integer.
pub trait BestScoreStore: Send {
    /// Reads the stored best score, `0` when none was saved.
    fn load(&self) -> Result<u64, StoreError>;

    /// Overwrites the stored best score.
    fn save(&mut self, best: u64) -> Result<(), StoreError>;
}

/// A notification, as recorded or forwarded by event-based notifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// See [`GameNotifier::on_move_start`].
    MoveStart(Direction),
    /// See [`GameNotifier::on_merge`].
    Merge(u32),
    /// See [`GameNotifier::on_score_changed`].
    ScoreChanged(u64),
    /// See [`GameNotifier::on_best_score_changed`].
    BestScoreChanged(u64),
    /// See [`GameNotifier::on_win`].
    Win,
    /// See [`GameNotifier::on_game_over`].
    GameOver,
    /// See [`GameNotifier::on_spawn`]. Holds the spawned values.
    Spawn(Vec<u32>),
}

/// Input gate that ignores enable/disable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInput;

impl InputGate for NoopInput {
    fn enable(&mut self) {}
    fn disable(&mut self) {}
}

/// Input gate backed by a shared flag.
///
/// Clones observe the same flag, so a front end can keep one clone and
/// hand the other to the state machine.
#[derive(Debug, Clone, Default)]
pub struct InputFlag {
    enabled: Arc<AtomicBool>,
}

impl InputFlag {
    /// Creates a disabled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the machine accepts moves.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl InputGate for InputFlag {
    fn enable(&mut self) {
        self.enabled.store(true, Ordering::Release);
    }

    fn disable(&mut self) {
        self.enabled.store(false, Ordering::Release);
    }
}

/// Notifier that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl GameNotifier for NoopNotifier {}

/// Notifier that appends every event to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Counts recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// Drops every recorded event.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn record(&self, event: GameEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

impl GameNotifier for RecordingNotifier {
    fn on_move_start(&mut self, direction: Direction) {
        self.record(GameEvent::MoveStart(direction));
    }

    fn on_merge(&mut self, value: u32) {
        self.record(GameEvent::Merge(value));
    }

    fn on_score_changed(&mut self, score: u64) {
        self.record(GameEvent::ScoreChanged(score));
    }

    fn on_best_score_changed(&mut self, best: u64) {
        self.record(GameEvent::BestScoreChanged(best));
    }

    fn on_win(&mut self) {
        self.record(GameEvent::Win);
    }

    fn on_game_over(&mut self) {
        self.record(GameEvent::GameOver);
    }

    fn on_spawn(&mut self, tiles: &[Tile]) {
        self.record(GameEvent::Spawn(tiles.iter().map(Tile::value).collect()));
    }
}

/// Animation player that completes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnimation;

#[async_trait::async_trait]
impl AnimationPlayer for InstantAnimation {
    async fn play(&mut self, _board: &Board, _turn: &Turn) {}
}

/// Best-score store held in memory.
///
/// Clones share the stored value.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Arc<AtomicU64>,
}

impl MemoryScoreStore {
    /// Creates a store that already holds `best`.
    pub fn with_best(best: u64) -> Self {
        Self {
            best: Arc::new(AtomicU64::new(best)),
        }
    }

    /// The value last saved.
    pub fn saved(&self) -> u64 {
        self.best.load(Ordering::Acquire)
    }
}

impl BestScoreStore for MemoryScoreStore {
    fn load(&self) -> Result<u64, StoreError> {
        Ok(self.saved())
    }

    fn save(&mut self, best: u64) -> Result<(), StoreError> {
        self.best.store(best, Ordering::Release);
        Ok(())
    }
}
