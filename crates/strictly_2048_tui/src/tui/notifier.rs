//! Forwards game notifications to the UI over a channel.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strictly_2048::{Direction, GameEvent, GameNotifier, Tile};
use tokio::sync::mpsc;
use tracing::debug;

/// Shared sound switch, toggled from the keyboard.
#[derive(Debug, Clone)]
pub struct SoundSwitch {
    on: Arc<AtomicBool>,
}

impl SoundSwitch {
    /// Creates a switch in the given state.
    pub fn new(on: bool) -> Self {
        Self {
            on: Arc::new(AtomicBool::new(on)),
        }
    }

    /// True while sound is on.
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }

    /// Flips the switch and returns the new state.
    pub fn toggle(&self) -> bool {
        !self.on.fetch_xor(true, Ordering::Relaxed)
    }
}

/// Sends every notification as a [`GameEvent`] and rings the terminal
/// bell for merges, wins and game over while sound is on.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<GameEvent>,
    sound: SoundSwitch,
}

impl ChannelNotifier {
    /// Creates a notifier sending to `tx`.
    pub fn new(tx: mpsc::UnboundedSender<GameEvent>, sound: SoundSwitch) -> Self {
        Self { tx, sound }
    }

    fn send(&self, event: GameEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!(event = ?e.0, "UI channel closed, dropping event");
        }
    }

    fn chime(&self) {
        if !self.sound.is_on() {
            return;
        }
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
            debug!(error = %e, "Bell failed");
        }
    }
}

impl GameNotifier for ChannelNotifier {
    fn on_move_start(&mut self, direction: Direction) {
        self.send(GameEvent::MoveStart(direction));
    }

    fn on_merge(&mut self, value: u32) {
        self.send(GameEvent::Merge(value));
        self.chime();
    }

    fn on_score_changed(&mut self, score: u64) {
        self.send(GameEvent::ScoreChanged(score));
    }

    fn on_best_score_changed(&mut self, best: u64) {
        self.send(GameEvent::BestScoreChanged(best));
    }

    fn on_win(&mut self) {
        self.send(GameEvent::Win);
        self.chime();
    }

    fn on_game_over(&mut self) {
        self.send(GameEvent::GameOver);
        self.chime();
    }

    fn on_spawn(&mut self, tiles: &[Tile]) {
        self.send(GameEvent::Spawn(tiles.iter().map(Tile::value).collect()));
    }
}
