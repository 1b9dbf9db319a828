//! Application state and logic.

use super::input::{Action, KeyboardGate};
use super::notifier::{ChannelNotifier, SoundSwitch};
use super::ui::{self, StatusView, TileSprite};
use crate::settings::Settings;
use crate::store::JsonScoreStore;
use anyhow::Result;
use strictly_2048::{AnimationPlayer, Direction, GameEvent, GamePhase, GameStateMachine};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Main application state.
pub struct App {
    machine: GameStateMachine,
    events: mpsc::UnboundedReceiver<GameEvent>,
    gate: KeyboardGate,
    sound: SoundSwitch,
    prefs: JsonScoreStore,
    status_message: String,
    quit: bool,
}

impl App {
    /// Builds the game from `settings` and starts it.
    #[instrument(skip(settings))]
    pub fn new(settings: &Settings) -> Result<Self> {
        let gate = KeyboardGate::new();
        let prefs = JsonScoreStore::new(settings.best_score_path());
        let saved_sound = prefs.load_sound().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read sound preference");
            None
        });
        let sound = SoundSwitch::new(saved_sound.unwrap_or(*settings.sound()));
        let (tx, events) = mpsc::unbounded_channel();

        let mut machine = GameStateMachine::new(settings.game().clone())?
            .with_input(gate.flag())
            .with_notifier(ChannelNotifier::new(tx, sound.clone()))
            .with_score_store(prefs.clone());
        machine.start()?;

        let mut app = Self {
            machine,
            events,
            gate,
            sound,
            prefs,
            status_message: String::new(),
            quit: false,
        };
        app.refresh_status();
        app.drain_events();
        info!(best = app.machine.best_score(), "Game ready");
        Ok(app)
    }

    /// The running game.
    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    /// Gets the current status message.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// True once the player asked to leave.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Header and footer contents for the current state.
    pub fn status_view(&self) -> StatusView {
        StatusView {
            score: self.machine.score(),
            best: self.machine.best_score(),
            round: self.machine.round(),
            sound: self.sound.is_on(),
            message: self.status_message.clone(),
        }
    }

    /// Tiles as they rest on the board.
    pub fn sprites(&self) -> Vec<TileSprite> {
        ui::sprites_at_rest(self.machine.board())
    }

    /// Filters an action through the input gate.
    pub fn admit(&self, action: Action) -> Option<Action> {
        self.gate.admit(action)
    }

    /// Plays one move with `animation`.
    #[instrument(skip(self, animation))]
    pub async fn slide(
        &mut self,
        direction: Direction,
        animation: &mut dyn AnimationPlayer,
    ) -> Result<()> {
        match self.machine.play(direction, animation).await? {
            Some(report) => {
                debug!(round = report.round(), gained = report.score_gained(), "Move played");
                self.refresh_status();
            }
            None => {
                self.status_message =
                    format!("Nothing moves {}", direction.to_string().to_lowercase());
            }
        }
        self.drain_events();
        Ok(())
    }

    /// Handles every action except moves.
    #[instrument(skip(self))]
    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Move(_) => {}
            Action::Continue => match self.machine.continue_game() {
                Ok(_) => self.refresh_status(),
                Err(e) => debug!(error = %e, "Continue ignored"),
            },
            Action::Restart => match self.machine.restart() {
                Ok(()) => {
                    self.refresh_status();
                    self.status_message = "New game. Slide the tiles!".to_string();
                }
                Err(e) => warn!(error = %e, "Restart refused"),
            },
            Action::ToggleSound => {
                let on = self.sound.toggle();
                if let Err(e) = self.prefs.save_sound(on) {
                    warn!(error = %e, "Failed to save sound preference");
                }
                self.status_message = format!("Sound {}", if on { "on" } else { "off" });
            }
            Action::Quit => {
                info!("User quit");
                self.quit = true;
            }
        }
        self.drain_events();
    }

    /// Applies pending game events to the status line.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    /// Handles a game event from the state machine.
    pub fn handle_event(&mut self, event: GameEvent) {
        debug!(?event, "Handling game event");

        match event {
            GameEvent::BestScoreChanged(best) => {
                if self.machine.phase() == GamePhase::WaitingInput {
                    self.status_message = format!("New best score: {}", best);
                }
            }
            GameEvent::Win => {
                self.status_message = format!(
                    "You made {}! Press 'c' to keep going or 'r' to restart.",
                    self.machine.config().win_value()
                );
            }
            GameEvent::GameOver => {
                self.status_message = format!(
                    "No moves left. Final score {}. Press 'r' to restart or 'q' to quit.",
                    self.machine.score()
                );
            }
            GameEvent::MoveStart(_)
            | GameEvent::Merge(_)
            | GameEvent::ScoreChanged(_)
            | GameEvent::Spawn(_) => {}
        }
    }

    fn refresh_status(&mut self) {
        self.status_message = match self.machine.phase() {
            GamePhase::WaitingInput => "Slide the tiles!".to_string(),
            GamePhase::Idle | GamePhase::Resolving => String::new(),
            GamePhase::Won | GamePhase::GameOver => return,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_2048::{GameConfig, InstantAnimation};

    fn settings(dir: &tempfile::TempDir) -> Settings {
        let path = dir.path().join("settings.toml");
        let toml = format!(
            "sound = false\nbest_score_path = {:?}\n\n[game]\nseed = 5\n",
            dir.path().join("best.json")
        );
        std::fs::write(&path, toml).unwrap();
        Settings::from_file(&path).unwrap()
    }

    #[test]
    fn test_new_app_is_ready_for_input() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(&settings(&dir)).unwrap();
        assert_eq!(app.machine().phase(), GamePhase::WaitingInput);
        assert_eq!(app.sprites().len(), 2);
        assert_eq!(
            app.admit(Action::Move(Direction::Up)),
            Some(Action::Move(Direction::Up))
        );
    }

    #[tokio::test]
    async fn test_slide_advances_rounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings(&dir)).unwrap();
        let mut animation = InstantAnimation;

        for direction in Direction::ALL {
            app.slide(direction, &mut animation).await.unwrap();
        }
        assert!(app.machine().round() >= 1);
        assert!(!app.status_message().is_empty());
    }

    #[test]
    fn test_toggle_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings(&dir)).unwrap();

        app.perform(Action::ToggleSound);
        assert_eq!(app.status_message(), "Sound on");
        assert!(app.status_view().sound);

        assert!(!app.should_quit());
        app.perform(Action::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_sound_toggle_survives_restart_of_app() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir);

        let mut app = App::new(&settings).unwrap();
        assert!(!app.status_view().sound);
        app.perform(Action::ToggleSound);
        drop(app);

        let reopened = App::new(&settings).unwrap();
        assert!(reopened.status_view().sound);
    }

    #[test]
    fn test_restart_clears_score() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings(&dir)).unwrap();
        app.perform(Action::Restart);
        assert_eq!(app.machine().score(), 0);
        assert_eq!(app.machine().round(), 0);
        assert_eq!(app.status_message(), "New game. Slide the tiles!");
        assert_eq!(*app.machine().config(), GameConfig::default().with_seed(Some(5)));
    }
}
