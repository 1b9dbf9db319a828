//! Movement directions.
//!
//! The board uses a y-up coordinate system: `Up` is `(0, 1)` and row
//! `height - 1` is the top edge.

use crate::error::GameError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the four directions tiles can slide in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Direction {
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    Right,
    /// Toward increasing y.
    Up,
    /// Toward decreasing y.
    Down,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Returns the unit vector `(dx, dy)`.
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }

    /// Parses a raw vector, accepting only the four unit vectors.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidDirection` for anything else, including
    /// the zero vector and diagonals.
    #[instrument]
    pub fn from_vector(dx: i32, dy: i32) -> Result<Self, GameError> {
        match (dx, dy) {
            (-1, 0) => Ok(Direction::Left),
            (1, 0) => Ok(Direction::Right),
            (0, 1) => Ok(Direction::Up),
            (0, -1) => Ok(Direction::Down),
            _ => Err(GameError::InvalidDirection { dx, dy }),
        }
    }

    /// Classifies a pointer drag into a direction.
    ///
    /// The dominant axis wins; ties go to the vertical axis. Drags shorter
    /// than `min_distance` are ignored. `dy` is positive upward.
    #[instrument]
    pub fn from_swipe(dx: f32, dy: f32, min_distance: f32) -> Option<Self> {
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        if dx.hypot(dy) < min_distance {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
        } else if dy > 0.0 {
            Some(Direction::Up)
        } else {
            Some(Direction::Down)
        }
    }

    /// True when the direction moves toward increasing coordinates.
    pub fn is_increasing(self) -> bool {
        matches!(self, Direction::Right | Direction::Up)
    }

    /// True for `Left` and `Right`.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}
