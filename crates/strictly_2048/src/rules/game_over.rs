//! Stuck-board detection.

use crate::board::{Board, Cell};
use tracing::instrument;

/// Returns true if two orthogonally adjacent tiles share a value.
#[instrument(skip(board))]
pub fn has_adjacent_pair(board: &Board) -> bool {
    board.cells().any(|cell| {
        let Some(tile) = board.tile_at(cell) else {
            return false;
        };
        let right = Cell::new(cell.x + 1, cell.y);
        let above = Cell::new(cell.x, cell.y + 1);
        [right, above]
            .into_iter()
            .filter_map(|next| board.tile_at(next))
            .any(|other| other.value() == tile.value())
    })
}

/// Returns true while some move can still change the board.
///
/// False only when every cell is filled and no adjacent pair can merge.
#[instrument(skip(board))]
pub fn can_move(board: &Board) -> bool {
    !board.is_full() || has_adjacent_pair(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: usize, height: usize) -> Board {
        let tiles: Vec<(usize, usize, u32)> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y, if (x + y) % 2 == 0 { 2 } else { 4 })))
            .collect();
        Board::with_tiles(width, height, &tiles).unwrap()
    }

    #[test]
    fn test_empty_cell_allows_move() {
        let board = Board::with_tiles(2, 1, &[(0, 0, 2)]).unwrap();
        assert!(can_move(&board));
    }

    #[test]
    fn test_full_checkerboard_is_stuck() {
        let board = checkerboard(4, 4);
        assert!(board.is_full());
        assert!(!has_adjacent_pair(&board));
        assert!(!can_move(&board));
    }

    #[test]
    fn test_horizontal_pair_allows_move() {
        let board = Board::with_tiles(2, 2, &[(0, 0, 2), (1, 0, 2), (0, 1, 4), (1, 1, 8)]).unwrap();
        assert!(can_move(&board));
    }

    #[test]
    fn test_vertical_pair_allows_move() {
        let board = Board::with_tiles(2, 2, &[(0, 0, 2), (1, 0, 4), (0, 1, 2), (1, 1, 8)]).unwrap();
        assert!(can_move(&board));
    }
}
