//! Slide animation drawn straight to the terminal.

use super::ui::{self, StatusView};
use ratatui::{Terminal, backend::Backend};
use std::time::Duration;
use strictly_2048::{AnimationPlayer, Board, Turn};
use tracing::{instrument, warn};

/// Draws interpolated frames of a turn, then returns.
///
/// The status line is captured when the animator is built so the header
/// stays steady while tiles are moving.
pub struct TerminalAnimator<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    status: StatusView,
    frames: u32,
    frame_delay: Duration,
}

impl<'a, B: Backend> TerminalAnimator<'a, B> {
    /// Creates an animator drawing `frames` frames, `frame_delay` apart.
    pub fn new(
        terminal: &'a mut Terminal<B>,
        status: StatusView,
        frames: u32,
        frame_delay: Duration,
    ) -> Self {
        Self {
            terminal,
            status,
            frames: frames.max(1),
            frame_delay,
        }
    }
}

#[async_trait::async_trait]
impl<'a, B> AnimationPlayer for TerminalAnimator<'a, B>
where
    B: Backend + Send,
{
    #[instrument(skip_all, fields(direction = %turn.direction(), frames = self.frames))]
    async fn play(&mut self, board: &Board, turn: &Turn) {
        for frame in 1..=self.frames {
            let progress = frame as f32 / self.frames as f32;
            let sprites = ui::sprites_in_motion(turn, progress);
            let status = &self.status;
            let drawn = self
                .terminal
                .draw(|f| ui::draw(f, board.width(), board.height(), &sprites, status))
                .is_ok();
            if !drawn {
                // The turn still completes; only the remaining frames are skipped.
                warn!(frame, "Failed to draw animation frame");
                return;
            }
            tokio::time::sleep(self.frame_delay).await;
        }
    }
}
