//! Contract-based validation for move resolution.
//!
//! Contracts define correctness through preconditions and postconditions:
//! `{P(board)} resolve(direction) {Q(before, after)}`.

use crate::board::Board;
use crate::direction::Direction;
use crate::error::GameError;
use crate::invariants::{BoardInvariants, InvariantSet, InvariantViolation};
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), GameError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), GameError>;
}

/// Postcondition: resolving a move never creates or destroys value.
///
/// Each merge replaces `v + v` with `2v`, so the sum of tile values is
/// unchanged; only spawning adds value.
pub struct ValueConserved;

impl ValueConserved {
    /// Checks that `after` carries the same total value as `before`.
    #[instrument(skip_all)]
    pub fn check(before: &Board, after: &Board) -> Result<(), GameError> {
        let (was, now) = (before.total_value(), after.total_value());
        if was != now {
            warn!(was, now, "Tile value not conserved");
            return Err(GameError::InvariantViolation(format!(
                "total tile value changed from {} to {}",
                was, now
            )));
        }
        Ok(())
    }
}

/// Postcondition: tiles only disappear through merges.
pub struct NoTileGained;

impl NoTileGained {
    /// Checks that `after` has no more tiles than `before`.
    #[instrument(skip_all)]
    pub fn check(before: &Board, after: &Board) -> Result<(), GameError> {
        if after.tile_count() > before.tile_count() {
            return Err(GameError::InvariantViolation(format!(
                "tile count grew from {} to {} during resolution",
                before.tile_count(),
                after.tile_count()
            )));
        }
        Ok(())
    }
}

/// Contract for resolving a move on a board.
///
/// Preconditions:
/// - Board invariants hold
///
/// Postconditions:
/// - Board invariants still hold
/// - Total tile value is conserved
/// - No tile was gained
pub struct ResolveContract;

impl Contract<Board, Direction> for ResolveContract {
    fn pre(board: &Board, _direction: &Direction) -> Result<(), GameError> {
        BoardInvariants::check_all(board).map_err(|v| describe("Precondition failed", &v))
    }

    fn post(before: &Board, after: &Board) -> Result<(), GameError> {
        BoardInvariants::check_all(after).map_err(|v| describe("Postcondition failed", &v))?;
        ValueConserved::check(before, after)?;
        NoTileGained::check(before, after)
    }
}

fn describe(prefix: &str, violations: &[InvariantViolation]) -> GameError {
    let descriptions = violations
        .iter()
        .map(|v| v.description.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    GameError::InvariantViolation(format!("{}: {}", prefix, descriptions))
}

/// Asserts that all board invariants hold (panics on violation in debug builds).
#[instrument(skip(board))]
pub fn assert_invariants(board: &Board) {
    debug_assert!(
        BoardInvariants::check_all(board).is_ok(),
        "Board invariants violated:\n{}",
        board
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, MoveResolver};

    #[test]
    fn test_precondition_holds_on_valid_board() {
        let board = Board::with_tiles(4, 4, &[(0, 0, 2)]).unwrap();
        assert!(ResolveContract::pre(&board, &Direction::Left).is_ok());
    }

    #[test]
    fn test_precondition_rejects_bad_values() {
        let mut board = Board::with_tiles(4, 4, &[(0, 0, 4)]).unwrap();
        let id = board.tile_id_at(Cell::new(0, 0)).unwrap();
        board.tile_mut(id).unwrap().set_value(5);
        assert!(matches!(
            ResolveContract::pre(&board, &Direction::Left),
            Err(GameError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_postcondition_holds_after_merge() {
        let before = Board::with_tiles(4, 1, &[(0, 0, 4), (2, 0, 4), (3, 0, 2)]).unwrap();
        let mut after = before.clone();
        MoveResolver::resolve(&mut after, Direction::Left).unwrap();
        assert!(ResolveContract::post(&before, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_value_change() {
        let before = Board::with_tiles(4, 1, &[(0, 0, 4)]).unwrap();
        let after = Board::with_tiles(4, 1, &[(0, 0, 8)]).unwrap();
        assert!(ResolveContract::post(&before, &after).is_err());
    }

    #[test]
    fn test_postcondition_detects_gained_tile() {
        let before = Board::with_tiles(4, 1, &[(0, 0, 4)]).unwrap();
        let after = Board::with_tiles(4, 1, &[(0, 0, 2), (1, 0, 2)]).unwrap();
        assert!(matches!(
            NoTileGained::check(&before, &after),
            Err(GameError::InvariantViolation(_))
        ));
    }
}
