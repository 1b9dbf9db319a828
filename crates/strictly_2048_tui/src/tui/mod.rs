//! Terminal UI for Strictly 2048

mod animator;
mod app;
mod input;
mod notifier;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::settings::Settings;
use animator::TerminalAnimator;
use app::App;
use input::{Action, DragTracker, action_for};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const LOG_FILE: &str = "strictly_2048.log";

/// Runs the game in the terminal until the player quits.
pub async fn run(settings: Settings) -> Result<()> {
    // Log to a file so the board is not overwritten
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,strictly_2048=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!("Starting Strictly 2048 TUI");

    let app = App::new(&settings)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, &settings).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_app(terminal: &mut Tui, mut app: App, settings: &Settings) -> Result<()> {
    let mut drag = DragTracker::default();

    loop {
        let (width, height) = (app.machine().board().width(), app.machine().board().height());
        let sprites = app.sprites();
        terminal.draw(|f| ui::draw(f, width, height, &sprites, &app.status_view()))?;

        if app.should_quit() {
            return Ok(());
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => action_for(key.code),
            Event::Mouse(mouse) => drag.track(mouse).map(Action::Move),
            _ => None,
        };
        let Some(action) = action.and_then(|a| app.admit(a)) else {
            continue;
        };

        match action {
            Action::Move(direction) => {
                let mut animator = TerminalAnimator::new(
                    terminal,
                    app.status_view(),
                    *settings.frames(),
                    settings.frame_delay(),
                );
                app.slide(direction, &mut animator).await?;
            }
            other => app.perform(other),
        }
    }
}
