//! Merge annotations never survive a turn.

use super::Invariant;
use crate::board::Board;

/// Invariant: no tile carries merge annotations between turns.
pub struct CleanAnnotationsInvariant;

impl Invariant<Board> for CleanAnnotationsInvariant {
    fn holds(board: &Board) -> bool {
        board.tiles().all(|tile| !tile.has_annotations())
    }

    fn description() -> &'static str {
        "Merge annotations are cleared between turns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_stale_annotation_violates() {
        let mut board = Board::with_tiles(2, 1, &[(0, 0, 2)]).unwrap();
        assert!(CleanAnnotationsInvariant::holds(&board));

        let id = board.tile_id_at(Cell::new(0, 0)).unwrap();
        board.tile_mut(id).unwrap().mark_merge_target();
        assert!(!CleanAnnotationsInvariant::holds(&board));
    }
}
