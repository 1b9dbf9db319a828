//! Slot consistency: every tile sits in exactly the slot that names it.

use super::Invariant;
use crate::board::Board;
use std::collections::BTreeSet;

/// Invariant: slots and tile cells agree, and no two tiles share a cell.
///
/// Every live tile's cell is on the board and its slot names it; every
/// occupied slot names a live tile; no tile id appears in two slots.
pub struct ConsistentSlotsInvariant;

impl Invariant<Board> for ConsistentSlotsInvariant {
    fn holds(board: &Board) -> bool {
        let tiles_agree = board.tiles().all(|tile| {
            board.contains(tile.cell()) && board.tile_id_at(tile.cell()) == Some(tile.id())
        });

        let mut seen = BTreeSet::new();
        let slots_agree = board
            .slots()
            .iter()
            .flatten()
            .all(|id| board.tile(*id).is_some() && seen.insert(*id));

        tiles_agree && slots_agree && seen.len() == board.tile_count()
    }

    fn description() -> &'static str {
        "Each tile occupies exactly the slot that refers to it"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_fresh_board_holds() {
        let board = Board::with_tiles(3, 3, &[(0, 0, 2), (2, 2, 4)]).unwrap();
        assert!(ConsistentSlotsInvariant::holds(&board));
    }

    #[test]
    fn test_detached_merge_target_violates() {
        let mut board = Board::with_tiles(2, 1, &[(0, 0, 2), (1, 0, 2)]).unwrap();
        let target = board.tile_id_at(Cell::new(0, 0)).unwrap();
        let source = board.tile_id_at(Cell::new(1, 0)).unwrap();
        board.tile_mut(source).unwrap().set_merge_target(target);
        board.place_tile(source, Cell::new(0, 0)).unwrap();

        // Mid-turn state: the target no longer owns its slot.
        assert!(!ConsistentSlotsInvariant::holds(&board));
    }
}
