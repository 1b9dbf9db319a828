//! Random tile spawning.

use crate::board::Board;
use crate::config::GameConfig;
use crate::tile::TileId;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

/// Value of an ordinary spawned tile.
pub const BASE_VALUE: u32 = 2;

/// Value of the rarer spawned tile.
pub const RARE_VALUE: u32 = 4;

/// Places new tiles on uniformly random empty cells.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
    four_probability: f64,
}

impl Spawner {
    /// Creates a spawner from an explicit RNG.
    ///
    /// `four_probability` is clamped to `[0, 1]`.
    pub fn new(rng: StdRng, four_probability: f64) -> Self {
        let four_probability = if four_probability.is_nan() {
            0.0
        } else {
            four_probability.clamp(0.0, 1.0)
        };
        Self {
            rng,
            four_probability,
        }
    }

    /// Creates a deterministic spawner.
    pub fn seeded(seed: u64, four_probability: f64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), four_probability)
    }

    /// Creates a spawner from game configuration.
    ///
    /// Uses the configured seed when present, OS entropy otherwise.
    #[instrument(skip(config))]
    pub fn from_config(config: &GameConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng, *config.four_probability())
    }

    /// Returns the probability of spawning a `4`.
    pub fn four_probability(&self) -> f64 {
        self.four_probability
    }

    /// Spawns up to `count` tiles and returns their ids.
    ///
    /// Stops early without error when the board runs out of empty cells,
    /// so the result may be shorter than `count`.
    #[instrument(skip(self, board))]
    pub fn spawn(&mut self, board: &mut Board, count: usize) -> Vec<TileId> {
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let empty = board.empty_cells();
            let Some(&cell) = empty.choose(&mut self.rng) else {
                debug!(requested = count, spawned = spawned.len(), "Board full, spawn cut short");
                break;
            };
            let value = self.roll_value();
            match board.create_tile(value, cell) {
                Ok(id) => {
                    debug!(%id, value, %cell, "Spawned tile");
                    spawned.push(id);
                }
                Err(e) => {
                    // Unreachable: the cell was just reported empty.
                    tracing::error!(error = %e, "Spawn into empty cell failed");
                    break;
                }
            }
        }
        spawned
    }

    fn roll_value(&mut self) -> u32 {
        if self.rng.random_bool(self.four_probability) {
            RARE_VALUE
        } else {
            BASE_VALUE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_spawn_requested_count() {
        let mut board = Board::new(4, 4).unwrap();
        let mut spawner = Spawner::seeded(7, 0.1);
        let ids = spawner.spawn(&mut board, 2);
        assert_eq!(ids.len(), 2);
        assert_eq!(board.tile_count(), 2);
    }

    #[test]
    fn test_spawn_stops_when_full() {
        let mut board = Board::with_tiles(2, 2, &[(0, 0, 2), (1, 0, 4)]).unwrap();
        let mut spawner = Spawner::seeded(1, 0.1);
        let ids = spawner.spawn(&mut board, 5);
        assert_eq!(ids.len(), 2);
        assert!(board.is_full());
        assert!(spawner.spawn(&mut board, 1).is_empty());
    }

    #[test]
    fn test_values_are_two_or_four() {
        let mut board = Board::new(8, 8).unwrap();
        let mut spawner = Spawner::seeded(42, 0.5);
        spawner.spawn(&mut board, 64);
        assert!(board.tiles().all(|t| t.value() == BASE_VALUE || t.value() == RARE_VALUE));
    }

    #[test]
    fn test_probability_extremes() {
        let mut board = Board::new(4, 4).unwrap();
        Spawner::seeded(3, 0.0).spawn(&mut board, 8);
        assert!(board.tiles().all(|t| t.value() == BASE_VALUE));

        let mut board = Board::new(4, 4).unwrap();
        Spawner::seeded(3, 1.0).spawn(&mut board, 8);
        assert!(board.tiles().all(|t| t.value() == RARE_VALUE));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = Board::new(4, 4).unwrap();
        let mut b = Board::new(4, 4).unwrap();
        Spawner::seeded(99, 0.1).spawn(&mut a, 3);
        Spawner::seeded(99, 0.1).spawn(&mut b, 3);
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_spawn_only_into_empty_cells() {
        let mut board = Board::with_tiles(3, 1, &[(1, 0, 8)]).unwrap();
        Spawner::seeded(5, 0.1).spawn(&mut board, 2);
        assert_eq!(board.tile_at(Cell::new(1, 0)).map(|t| t.value()), Some(8));
    }
}
