//! Error types for board manipulation and turn sequencing.

use crate::board::Cell;
use crate::machine::GamePhase;
use crate::tile::TileId;

/// Error that can occur when validating input or mutating the board.
///
/// Only `InvalidDirection` and `InputDisabled` are expected during normal
/// play. The board variants signal a programming defect.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The input vector is not one of the four unit vectors.
    #[display("Invalid direction vector ({}, {})", dx, dy)]
    InvalidDirection {
        /// Horizontal component.
        dx: i32,
        /// Vertical component.
        dy: i32,
    },

    /// A tile was placed onto a cell held by a tile that is not being merged away.
    #[display("Cell {} is already occupied by tile {}", cell, occupant)]
    OccupiedCell {
        /// The contested cell.
        cell: Cell,
        /// The tile currently holding the cell.
        occupant: TileId,
    },

    /// A cell lies outside the board.
    #[display("Cell {} is out of bounds", _0)]
    OutOfBounds(Cell),

    /// A tile id is not present in the arena.
    #[display("Unknown tile {}", _0)]
    UnknownTile(TileId),

    /// Board dimensions must be positive and their product must fit in `usize`.
    #[display("Invalid board dimensions {}x{}", width, height)]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Input arrived while the machine was not accepting it.
    #[display("Input is disabled while {:?}", _0)]
    InputDisabled(GamePhase),

    /// An operation required a different phase.
    #[display("Cannot {} while {:?}", action, phase)]
    WrongPhase {
        /// What was attempted.
        action: &'static str,
        /// The phase the machine was in.
        phase: GamePhase,
    },

    /// Completion was signalled with no turn in flight.
    #[display("No turn is in flight")]
    NoTurnInFlight,

    /// Completion was signalled for a turn other than the one in flight.
    #[display("Stale turn ticket {}, expected {}", got, expected)]
    StaleTicket {
        /// Ticket of the in-flight turn.
        expected: u64,
        /// Ticket that was presented.
        got: u64,
    },

    /// Configuration values are out of range.
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),

    /// Tile values are powers of two, at least 2.
    #[display("Invalid tile value {}", _0)]
    InvalidValue(u32),

    /// A board invariant failed after a turn.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for GameError {}
