//! Shift and merge resolution for a single move.
//!
//! Tiles are swept starting from the wall they slide toward, so every tile
//! a moving tile can meet has already reached its final cell. Each tile
//! takes part in at most one merge per turn, which yields the classic chain
//! rule: `[2, 2, 2]` slid left becomes `[4, 2]`.

use crate::board::{Board, Cell};
use crate::direction::Direction;
use crate::error::GameError;
use crate::tile::TileId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

/// Where one tile went during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMotion {
    /// The moving tile (removed from the board if it merged).
    pub tile: TileId,
    /// Value before any merge.
    pub value: u32,
    /// Cell at the start of the turn.
    pub from: Cell,
    /// Resolved destination cell.
    pub to: Cell,
    /// Tile this one slid into, if it merged as the source.
    pub merged_into: Option<TileId>,
}

impl TileMotion {
    /// True when the tile changed cell or merged.
    pub fn is_change(&self) -> bool {
        self.from != self.to || self.merged_into.is_some()
    }
}

/// A pair of tiles collapsed into a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEvent {
    /// Newly created tile holding the doubled value.
    pub survivor: TileId,
    /// Tile that slid into the target.
    pub source: TileId,
    /// Tile that was slid into.
    pub target: TileId,
    /// Cell of the merge.
    pub cell: Cell,
    /// Value of the new tile.
    pub value: u32,
}

/// Everything that happened to the board in one move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    direction: Direction,
    motions: Vec<TileMotion>,
    merges: Vec<MergeEvent>,
}

impl Turn {
    /// Returns the move direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns per-tile motions in processing order.
    pub fn motions(&self) -> &[TileMotion] {
        &self.motions
    }

    /// Returns merges in the order they were resolved.
    pub fn merges(&self) -> &[MergeEvent] {
        &self.merges
    }

    /// True when no tile moved and nothing merged.
    pub fn is_noop(&self) -> bool {
        self.merges.is_empty() && !self.motions.iter().any(TileMotion::is_change)
    }

    /// Score earned by this turn's merges.
    pub fn score_gain(&self) -> u64 {
        self.merges.iter().map(|m| u64::from(m.value)).sum()
    }
}

/// Stateless move resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveResolver;

impl MoveResolver {
    /// Orders tiles so the ones nearest the destination wall come first.
    ///
    /// Sorted along the movement axis, descending for right/up and
    /// ascending for left/down.
    pub fn sweep_order(board: &Board, direction: Direction) -> Vec<TileId> {
        let mut keyed: Vec<((usize, usize), TileId)> = board
            .tiles()
            .map(|tile| {
                let cell = tile.cell();
                let key = if direction.is_horizontal() {
                    (cell.x, cell.y)
                } else {
                    (cell.y, cell.x)
                };
                (key, tile.id())
            })
            .collect();
        keyed.sort_unstable();
        if direction.is_increasing() {
            keyed.reverse();
        }
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    /// Slides and merges every tile on `board` toward `direction`.
    ///
    /// The board is updated in place. A no-op turn leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Only on internal invariant violations (`OccupiedCell`,
    /// `UnknownTile`); correct boards never produce them.
    #[instrument(skip(board), fields(tiles = board.tile_count()))]
    pub fn resolve(board: &mut Board, direction: Direction) -> Result<Turn, GameError> {
        board.reset_annotations();

        let order = Self::sweep_order(board, direction);
        let mut motions = Vec::with_capacity(order.len());

        for id in order {
            let (value, from, already_merging) = {
                let tile = board.tile(id).ok_or(GameError::UnknownTile(id))?;
                (tile.value(), tile.cell(), tile.merge_target().is_some())
            };

            let mut dest = from;
            let mut target = None;
            while let Some(next) = board.neighbor(dest, direction) {
                match board.tile_at(next) {
                    None => dest = next,
                    Some(other) => {
                        if !already_merging && other.accepts_merge(value) {
                            target = Some(other.id());
                            dest = next;
                        }
                        break;
                    }
                }
            }

            if let Some(target) = target {
                board.tile_mut(id)?.set_merge_target(target);
                board.tile_mut(target)?.mark_merge_target();
            }
            if dest != from {
                board.place_tile(id, dest)?;
            }

            motions.push(TileMotion {
                tile: id,
                value,
                from,
                to: dest,
                merged_into: target,
            });
        }

        let merges = Self::collapse_merges(board, &motions)?;
        board.reset_annotations();

        let turn = Turn {
            direction,
            motions,
            merges,
        };
        debug!(
            %direction,
            merges = turn.merges.len(),
            noop = turn.is_noop(),
            "Move resolved"
        );
        Ok(turn)
    }

    /// Resolves a move on a scratch copy, leaving `board` untouched.
    pub fn preview(board: &Board, direction: Direction) -> Result<Turn, GameError> {
        let mut scratch = board.clone();
        Self::resolve(&mut scratch, direction)
    }

    /// Replaces each (source, target) pair with a doubled tile.
    fn collapse_merges(
        board: &mut Board,
        motions: &[TileMotion],
    ) -> Result<Vec<MergeEvent>, GameError> {
        let mut processed = BTreeSet::new();
        let mut merges = Vec::new();

        for motion in motions {
            let Some(target) = motion.merged_into else {
                continue;
            };
            if !processed.insert(target) {
                warn!(%target, source = %motion.tile, "Second merge into one target skipped");
                continue;
            }

            let target_tile = board.remove_tile(target)?;
            board.remove_tile(motion.tile)?;

            let value = target_tile.value().saturating_mul(2);
            let cell = target_tile.cell();
            let survivor = board.create_tile(value, cell)?;
            debug!(%survivor, value, %cell, "Tiles merged");

            merges.push(MergeEvent {
                survivor,
                source: motion.tile,
                target,
                cell,
                value,
            });
        }
        Ok(merges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(board: &Board, y: usize) -> Vec<u32> {
        board.values()[y].clone()
    }

    #[test]
    fn test_slide_into_empty_space() {
        let mut board = Board::with_tiles(4, 1, &[(3, 0, 2)]).unwrap();
        let turn = MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert_eq!(row(&board, 0), vec![2, 0, 0, 0]);
        assert!(!turn.is_noop());
        assert!(turn.merges().is_empty());
    }

    #[test]
    fn test_pair_merges() {
        let mut board = Board::with_tiles(4, 4, &[(0, 0, 2), (1, 0, 2)]).unwrap();
        let turn = MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert_eq!(row(&board, 0), vec![4, 0, 0, 0]);
        assert_eq!(turn.merges().len(), 1);
        assert_eq!(turn.merges()[0].value, 4);
        assert_eq!(turn.score_gain(), 4);
        assert_eq!(board.tile_count(), 1);
    }

    #[test]
    fn test_chain_of_three_merges_nearest_wall() {
        let mut board = Board::with_tiles(4, 1, &[(0, 0, 2), (1, 0, 2), (2, 0, 2)]).unwrap();
        MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert_eq!(row(&board, 0), vec![4, 2, 0, 0]);
    }

    #[test]
    fn test_chain_of_three_toward_right_wall() {
        let mut board = Board::with_tiles(4, 1, &[(0, 0, 2), (1, 0, 2), (2, 0, 2)]).unwrap();
        MoveResolver::resolve(&mut board, Direction::Right).unwrap();
        assert_eq!(row(&board, 0), vec![0, 0, 2, 4]);
    }

    #[test]
    fn test_four_equal_make_two_pairs() {
        let mut board =
            Board::with_tiles(4, 1, &[(0, 0, 2), (1, 0, 2), (2, 0, 2), (3, 0, 2)]).unwrap();
        let turn = MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert_eq!(row(&board, 0), vec![4, 4, 0, 0]);
        assert_eq!(turn.merges().len(), 2);
    }

    #[test]
    fn test_merge_product_does_not_merge_again() {
        let mut board = Board::with_tiles(4, 1, &[(0, 0, 4), (1, 0, 2), (2, 0, 2)]).unwrap();
        MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert_eq!(row(&board, 0), vec![4, 4, 0, 0]);
    }

    #[test]
    fn test_vertical_moves_use_y_up() {
        let mut board = Board::with_tiles(1, 4, &[(0, 0, 2), (0, 3, 2)]).unwrap();
        MoveResolver::resolve(&mut board, Direction::Up).unwrap();
        assert_eq!(board.tile_at(Cell::new(0, 3)).map(|t| t.value()), Some(4));
        assert_eq!(board.tile_count(), 1);
    }

    #[test]
    fn test_blocked_row_is_noop() {
        let mut board = Board::with_tiles(2, 1, &[(0, 0, 2), (1, 0, 4)]).unwrap();
        let before = board.values();
        let turn = MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert!(turn.is_noop());
        assert_eq!(board.values(), before);
    }

    #[test]
    fn test_merge_creates_new_identity() {
        let mut board = Board::with_tiles(2, 1, &[(0, 0, 8), (1, 0, 8)]).unwrap();
        let ids = board.tile_ids();
        let turn = MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        let merge = turn.merges()[0];
        assert!(!ids.contains(&merge.survivor));
        assert!(board.tile(merge.source).is_none());
        assert!(board.tile(merge.target).is_none());
    }

    #[test]
    fn test_annotations_cleared_after_turn() {
        let mut board = Board::with_tiles(3, 1, &[(0, 0, 2), (1, 0, 2), (2, 0, 2)]).unwrap();
        MoveResolver::resolve(&mut board, Direction::Left).unwrap();
        assert!(board.tiles().all(|t| !t.has_annotations()));
    }

    #[test]
    fn test_preview_leaves_board_untouched() {
        let board = Board::with_tiles(4, 1, &[(3, 0, 2)]).unwrap();
        let turn = MoveResolver::preview(&board, Direction::Left).unwrap();
        assert!(!turn.is_noop());
        assert_eq!(board.values(), vec![vec![0, 0, 0, 2]]);
    }

    #[test]
    fn test_sweep_order_starts_at_wall() {
        let board = Board::with_tiles(4, 1, &[(1, 0, 2), (3, 0, 4), (0, 0, 8)]).unwrap();
        let order = MoveResolver::sweep_order(&board, Direction::Right);
        let xs: Vec<usize> = order
            .iter()
            .map(|id| board.tile(*id).unwrap().cell().x)
            .collect();
        assert_eq!(xs, vec![3, 1, 0]);
    }
}
