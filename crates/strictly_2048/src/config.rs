//! Game configuration.

use crate::error::GameError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Largest board accepted by [`GameConfig::validate`], in cells.
pub const MAX_BOARD_CELLS: usize = 4096;

/// Tunable rules for one game.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board width in cells.
    width: usize,

    /// Board height in cells.
    height: usize,

    /// Tile value that triggers the win state.
    win_value: u32,

    /// Probability that a spawned tile is a `4` rather than a `2`.
    four_probability: f64,

    /// Tiles spawned when a game starts.
    initial_tiles: usize,

    /// RNG seed for reproducible games.
    seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            win_value: 2048,
            four_probability: 0.1,
            initial_tiles: 2,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Sets the board dimensions.
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the win value.
    pub fn with_win_value(mut self, win_value: u32) -> Self {
        self.win_value = win_value;
        self
    }

    /// Sets the probability of spawning a `4`.
    pub fn with_four_probability(mut self, probability: f64) -> Self {
        self.four_probability = probability;
        self
    }

    /// Sets the number of tiles spawned at start.
    pub fn with_initial_tiles(mut self, count: usize) -> Self {
        self.initial_tiles = count;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` describing the first bad field.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "board must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        let cells = match self.width.checked_mul(self.height) {
            Some(cells) if cells <= MAX_BOARD_CELLS => cells,
            _ => {
                return Err(GameError::InvalidConfig(format!(
                    "board {}x{} exceeds {} cells",
                    self.width, self.height, MAX_BOARD_CELLS
                )));
            }
        };
        if self.win_value < 4 || !self.win_value.is_power_of_two() {
            return Err(GameError::InvalidConfig(format!(
                "win_value must be a power of two >= 4, got {}",
                self.win_value
            )));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::InvalidConfig(format!(
                "four_probability must be within [0, 1], got {}",
                self.four_probability
            )));
        }
        if self.initial_tiles > cells {
            return Err(GameError::InvalidConfig(format!(
                "initial_tiles {} exceeds {} cells",
                self.initial_tiles, cells
            )));
        }
        Ok(())
    }
}
