//! Win detection.

use crate::board::Board;
use tracing::instrument;

/// Returns true if any tile has reached `win_value`.
#[instrument(skip(board))]
pub fn reached_win(board: &Board, win_value: u32) -> bool {
    board.max_value() >= win_value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_has_not_won() {
        let board = Board::new(4, 4).unwrap();
        assert!(!reached_win(&board, 2048));
    }

    #[test]
    fn test_exact_value_wins() {
        let board = Board::with_tiles(4, 4, &[(2, 2, 2048)]).unwrap();
        assert!(reached_win(&board, 2048));
    }

    #[test]
    fn test_higher_value_wins() {
        let board = Board::with_tiles(4, 4, &[(0, 0, 4096)]).unwrap();
        assert!(reached_win(&board, 2048));
        assert!(!reached_win(&board, 8192));
    }
}
