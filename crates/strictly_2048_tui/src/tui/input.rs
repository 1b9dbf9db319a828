//! Keyboard and mouse input mapping.

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use strictly_2048::{Direction, InputFlag};
use tracing::debug;

/// Minimum drag length, in rows, that counts as a swipe.
pub const MIN_SWIPE_DISTANCE: f32 = 2.0;

/// Terminal cells are roughly twice as tall as they are wide.
const COLUMN_ASPECT: f32 = 0.5;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Slide the tiles.
    Move(Direction),
    /// Keep playing after a win.
    Continue,
    /// Start a new game.
    Restart,
    /// Turn the bell on or off.
    ToggleSound,
    /// Leave the game.
    Quit,
}

/// Maps a key to an action.
///
/// Arrows, WASD and HJKL move; `c` continues, `r` restarts, `m` toggles
/// sound, `q` or Esc quits.
pub fn action_for(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Action::Move(Direction::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Action::Move(Direction::Down),
        KeyCode::Char('c') => Action::Continue,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Char('m') => Action::ToggleSound,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Drops moves while the game is not accepting them.
///
/// The state machine holds a clone of the flag and flips it as it changes
/// phase; the event loop asks the gate before acting on a key.
#[derive(Debug, Clone, Default)]
pub struct KeyboardGate {
    flag: InputFlag,
}

impl KeyboardGate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// The flag to hand to the state machine.
    pub fn flag(&self) -> InputFlag {
        self.flag.clone()
    }

    /// True while moves are accepted.
    pub fn is_open(&self) -> bool {
        self.flag.is_enabled()
    }

    /// Passes `action` through unless it is a move arriving while closed.
    pub fn admit(&self, action: Action) -> Option<Action> {
        match action {
            Action::Move(direction) if !self.is_open() => {
                debug!(%direction, "Move dropped, input disabled");
                None
            }
            other => Some(other),
        }
    }
}

/// Turns a left-button drag into a swipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    start: Option<(u16, u16)>,
}

impl DragTracker {
    /// Feeds a mouse event; returns a direction when a drag ends as a swipe.
    pub fn track(&mut self, event: MouseEvent) -> Option<Direction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = Some((event.column, event.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (column, row) = self.start.take()?;
                let dx = (f32::from(event.column) - f32::from(column)) * COLUMN_ASPECT;
                // Terminal rows grow downward, the board grows upward.
                let dy = f32::from(row) - f32::from(event.row);
                Direction::from_swipe(dx, dy, MIN_SWIPE_DISTANCE)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use strictly_2048::InputGate;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for(KeyCode::Left), Some(Action::Move(Direction::Left)));
        assert_eq!(action_for(KeyCode::Char('w')), Some(Action::Move(Direction::Up)));
        assert_eq!(action_for(KeyCode::Char('j')), Some(Action::Move(Direction::Down)));
        assert_eq!(action_for(KeyCode::Char('l')), Some(Action::Move(Direction::Right)));
        assert_eq!(action_for(KeyCode::Char('s')), Some(Action::Move(Direction::Down)));
        assert_eq!(action_for(KeyCode::Char('m')), Some(Action::ToggleSound));
        assert_eq!(action_for(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action_for(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_gate_drops_moves_only() {
        let gate = KeyboardGate::new();
        let mut flag = gate.flag();

        assert_eq!(gate.admit(Action::Move(Direction::Up)), None);
        assert_eq!(gate.admit(Action::Restart), Some(Action::Restart));

        flag.enable();
        assert_eq!(
            gate.admit(Action::Move(Direction::Up)),
            Some(Action::Move(Direction::Up))
        );
    }

    #[test]
    fn test_drag_up_is_swipe_up() {
        let mut drag = DragTracker::default();
        assert_eq!(drag.track(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10)), None);
        assert_eq!(
            drag.track(mouse(MouseEventKind::Up(MouseButton::Left), 11, 5)),
            Some(Direction::Up)
        );
    }

    #[test]
    fn test_short_drag_is_ignored() {
        let mut drag = DragTracker::default();
        drag.track(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        assert_eq!(drag.track(mouse(MouseEventKind::Up(MouseButton::Left), 12, 10)), None);
    }

    #[test]
    fn test_wide_drag_is_horizontal() {
        let mut drag = DragTracker::default();
        drag.track(mouse(MouseEventKind::Down(MouseButton::Left), 20, 10));
        assert_eq!(
            drag.track(mouse(MouseEventKind::Up(MouseButton::Left), 8, 12)),
            Some(Direction::Left)
        );
    }
}
