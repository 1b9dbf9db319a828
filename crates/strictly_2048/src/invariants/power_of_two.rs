//! Tile values are powers of two.

use super::Invariant;
use crate::board::Board;

/// Invariant: every tile value is a power of two, at least 2.
pub struct PowerOfTwoInvariant;

impl Invariant<Board> for PowerOfTwoInvariant {
    fn holds(board: &Board) -> bool {
        board
            .tiles()
            .all(|tile| tile.value() >= 2 && tile.value().is_power_of_two())
    }

    fn description() -> &'static str {
        "Tile values are powers of two"
    }
}
