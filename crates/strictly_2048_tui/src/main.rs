//! Strictly 2048 - terminal front end
//!
//! Plays the game in the terminal, runs headless simulations, and manages
//! the stored best score.

#![warn(missing_docs)]

mod cli;
mod settings;
mod simulate;
mod store;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use settings::Settings;
use store::JsonScoreStore;
use strictly_2048::BestScoreStore;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())
        .context("Failed to load settings")?
        .with_overrides(&cli.overrides);
    settings.validate().context("Invalid settings")?;

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => tui::run(settings).await,
        Command::Simulate {
            games,
            seed,
            max_rounds,
        } => run_simulation(&settings, games, seed, max_rounds).await,
        Command::Best => print_best(&settings),
        Command::ResetBest => reset_best(&settings),
    }
}

/// Plain stderr logging for the non-interactive commands.
fn initialize_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[instrument(skip(settings))]
async fn run_simulation(settings: &Settings, games: u32, seed: u64, max_rounds: u64) -> Result<()> {
    initialize_tracing();
    info!("Starting simulation");

    let summary = simulate::run(settings.game(), games, seed, max_rounds).await?;
    println!("{}", summary);
    Ok(())
}

fn print_best(settings: &Settings) -> Result<()> {
    initialize_tracing();
    let store = JsonScoreStore::new(settings.best_score_path());
    let best = store
        .load()
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    println!("Best score: {}", best);
    Ok(())
}

fn reset_best(settings: &Settings) -> Result<()> {
    initialize_tracing();
    let mut store = JsonScoreStore::new(settings.best_score_path());
    store
        .save(0)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to write {}", store.path().display()))?;
    info!("Best score reset");
    println!("Best score reset in {}", store.path().display());
    Ok(())
}
