//! Command-line interface for strictly_2048.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Strictly 2048 - Slide, merge, and reach the win tile
#[derive(Parser, Debug)]
#[command(name = "strictly_2048")]
#[command(about = "Tile-merging puzzle in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML). Defaults to strictly_2048.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Rule overrides applied on top of the settings file
    #[command(flatten)]
    pub overrides: RuleOverrides,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Board rule overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct RuleOverrides {
    /// Board width in cells
    #[arg(long, global = true)]
    pub width: Option<usize>,

    /// Board height in cells
    #[arg(long, global = true)]
    pub height: Option<usize>,

    /// Tile value that wins the game
    #[arg(long, global = true)]
    pub win_value: Option<u32>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play in the terminal (default)
    Play,

    /// Play headless games with a greedy player and print a summary
    Simulate {
        /// Number of games to play
        #[arg(short, long, default_value = "10")]
        games: u32,

        /// Base RNG seed; game `n` uses `seed + n`
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Give up a game after this many turns
        #[arg(long, default_value = "10000")]
        max_rounds: u64,
    },

    /// Print the stored best score
    Best,

    /// Reset the stored best score to zero
    ResetBest,
}
