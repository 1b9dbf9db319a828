//! Strictly 2048 - tile-merging puzzle logic
//!
//! A fixed W×H grid of numbered tiles that slide in one of four directions,
//! merge pairwise when equal, and spawn a new tile after every move.
//!
//! # Architecture
//!
//! - **Board**: tile arena plus a cell-to-tile mapping
//! - **MoveResolver**: the shift and merge algorithm
//! - **GameStateMachine**: turn sequencing and terminal detection
//! - **Collaborators**: traits for input, animation, notification and storage
//!
//! # Example
//!
//! ```
//! use strictly_2048::{Board, Direction, MoveResolver};
//!
//! let mut board = Board::with_tiles(4, 1, &[(0, 0, 2), (1, 0, 2), (2, 0, 2)])?;
//! let turn = MoveResolver::resolve(&mut board, Direction::Left)?;
//! assert_eq!(turn.score_gain(), 4);
//! assert_eq!(board.values(), vec![vec![4, 2, 0, 0]]);
//! # Ok::<(), strictly_2048::GameError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod collaborators;
mod config;
mod contracts;
mod direction;
mod error;
mod invariants;
mod machine;
mod resolver;
mod rules;
mod score;
mod spawner;
mod tile;

// Crate-level exports - Board model
pub use board::{Board, Cell};
pub use direction::Direction;
pub use tile::{Tile, TileId};

// Crate-level exports - Move resolution and spawning
pub use resolver::{MergeEvent, MoveResolver, TileMotion, Turn};
pub use spawner::{BASE_VALUE, RARE_VALUE, Spawner};

// Crate-level exports - Rules
pub use rules::{can_move, has_adjacent_pair, reached_win};

// Crate-level exports - State machine
pub use machine::{GamePhase, GameStateMachine, TurnPlan, TurnReport, TurnTicket};
pub use score::{ScoreChange, ScoreTracker};

// Crate-level exports - Collaborators
pub use collaborators::{
    AnimationPlayer, BEST_SCORE_KEY, BestScoreStore, GameEvent, GameNotifier, InputFlag,
    InputGate, InstantAnimation, MemoryScoreStore, NoopInput, NoopNotifier, RecordingNotifier,
    StoreError,
};

// Crate-level exports - Verification
pub use contracts::{Contract, NoTileGained, ResolveContract, ValueConserved, assert_invariants};
pub use invariants::{
    BoardInvariants, CleanAnnotationsInvariant, ConsistentSlotsInvariant, Invariant,
    InvariantSet, InvariantViolation, PowerOfTwoInvariant,
};

// Crate-level exports - Configuration and errors
pub use config::GameConfig;
pub use error::GameError;
