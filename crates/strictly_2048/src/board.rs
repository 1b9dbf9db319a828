//! Fixed-size board: cell slots plus an arena of tiles indexed by id.
//!
//! Tiles never hold pointers to each other or to cells. The board owns a
//! `Cell -> TileId` slot vector and the `TileId -> Tile` arena, and
//! `place_tile` is the only operation that moves a tile between slots.

use crate::direction::Direction;
use crate::error::GameError;
use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, instrument, trace};

/// A cell coordinate on the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({}, {})", x, y)]
pub struct Cell {
    /// Column, `0` is the left edge.
    pub x: usize,
    /// Row, `0` is the bottom edge.
    pub y: usize,
}

impl Cell {
    /// Creates a cell coordinate (not bounds-checked).
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Grid of cells holding at most one tile each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major slots, index `y * width + x`.
    slots: Vec<Option<TileId>>,
    tiles: BTreeMap<TileId, Tile>,
    next_id: u64,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidDimensions` if either dimension is zero
    /// or the cell count overflows `usize`.
    #[instrument]
    pub fn new(width: usize, height: usize) -> Result<Self, GameError> {
        let cells = width
            .checked_mul(height)
            .filter(|cells| *cells > 0)
            .ok_or(GameError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            slots: vec![None; cells],
            tiles: BTreeMap::new(),
            next_id: 1,
        })
    }

    /// Creates a board pre-populated with `(x, y, value)` tiles.
    ///
    /// Used for replays, fixtures, and tests.
    #[instrument(skip(tiles), fields(count = tiles.len()))]
    pub fn with_tiles(
        width: usize,
        height: usize,
        tiles: &[(usize, usize, u32)],
    ) -> Result<Self, GameError> {
        let mut board = Self::new(width, height)?;
        for &(x, y, value) in tiles {
            board.create_tile(value, Cell::new(x, y))?;
        }
        Ok(board)
    }

    /// Returns the board width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the board height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounds-checked cell lookup from signed coordinates.
    pub fn cell_at(&self, x: i64, y: i64) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some(Cell::new(x, y))
    }

    /// True when `cell` lies on the board.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Returns the adjacent cell in `direction`, or `None` at the edge.
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.vector();
        self.cell_at(cell.x as i64 + dx as i64, cell.y as i64 + dy as i64)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell).then_some(cell.y * self.width + cell.x)
    }

    /// Returns the id of the tile in `cell`, if any.
    pub fn tile_id_at(&self, cell: Cell) -> Option<TileId> {
        self.index(cell).and_then(|i| self.slots[i])
    }

    /// Returns the tile in `cell`, if any.
    pub fn tile_at(&self, cell: Cell) -> Option<&Tile> {
        self.tile_id_at(cell).and_then(|id| self.tiles.get(&id))
    }

    /// Looks up a tile by id.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> Result<&mut Tile, GameError> {
        self.tiles.get_mut(&id).ok_or(GameError::UnknownTile(id))
    }

    /// Iterates all live tiles in id order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Returns the ids of all live tiles.
    pub fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.keys().copied().collect()
    }

    /// Returns the number of live tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterates every cell in row-major order (bottom row first).
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    /// Returns all cells without a tile, in row-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        self.cells()
            .filter(|cell| self.tile_id_at(*cell).is_none())
            .collect()
    }

    /// True when every cell holds a tile.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Sum of all live tile values.
    pub fn total_value(&self) -> u64 {
        self.tiles.values().map(|t| u64::from(t.value())).sum()
    }

    /// Largest live tile value, `0` on an empty board.
    pub fn max_value(&self) -> u32 {
        self.tiles.values().map(Tile::value).max().unwrap_or(0)
    }

    /// Snapshot of values per cell, `values()[y][x]`, `0` for empty.
    pub fn values(&self) -> Vec<Vec<u32>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.tile_at(Cell::new(x, y)).map_or(0, Tile::value))
                    .collect()
            })
            .collect()
    }

    /// Creates a tile in the arena and places it in `cell`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` unless `value` is a power of two of at least 2,
    /// and `OutOfBounds` or `OccupiedCell` if the cell cannot take a tile.
    #[instrument(skip(self))]
    pub fn create_tile(&mut self, value: u32, cell: Cell) -> Result<TileId, GameError> {
        if value < 2 || !value.is_power_of_two() {
            return Err(GameError::InvalidValue(value));
        }
        let index = self.index(cell).ok_or(GameError::OutOfBounds(cell))?;
        if let Some(occupant) = self.slots[index] {
            return Err(GameError::OccupiedCell { cell, occupant });
        }
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.insert(id, Tile::new(id, value, cell));
        self.slots[index] = Some(id);
        trace!(%id, value, %cell, "Tile created");
        Ok(id)
    }

    /// Moves a tile into `cell`, keeping slots and tile cells in sync.
    ///
    /// The tile's previous slot is cleared first. If `cell` holds another
    /// tile, the move is legal only when that occupant is this tile's merge
    /// target: the occupant is being merged away and gives up the slot.
    ///
    /// # Errors
    ///
    /// Returns `OccupiedCell` when the slot holds any other tile. This is a
    /// defect signal and trips a debug assertion.
    #[instrument(skip(self))]
    pub fn place_tile(&mut self, id: TileId, cell: Cell) -> Result<(), GameError> {
        let target_index = self.index(cell).ok_or(GameError::OutOfBounds(cell))?;
        let tile = self.tiles.get(&id).ok_or(GameError::UnknownTile(id))?;
        let merge_target = tile.merge_target();
        let old_cell = tile.cell();

        if let Some(occupant) = self.slots[target_index] {
            if occupant != id && merge_target != Some(occupant) {
                error!(%id, %cell, %occupant, "Attempted to place tile on occupied cell");
                debug_assert!(false, "tile {id} placed on cell {cell} held by {occupant}");
                return Err(GameError::OccupiedCell { cell, occupant });
            }
        }

        if let Some(old_index) = self.index(old_cell) {
            if self.slots[old_index] == Some(id) {
                self.slots[old_index] = None;
            }
        }
        self.slots[target_index] = Some(id);
        self.tile_mut(id)?.set_cell(cell);
        Ok(())
    }

    /// Removes a tile from the arena.
    ///
    /// Its slot is cleared only if the slot still refers to it; a merge
    /// target whose slot was claimed by the incoming source leaves the slot
    /// untouched.
    #[instrument(skip(self))]
    pub fn remove_tile(&mut self, id: TileId) -> Result<Tile, GameError> {
        let tile = self.tiles.remove(&id).ok_or(GameError::UnknownTile(id))?;
        if let Some(index) = self.index(tile.cell()) {
            if self.slots[index] == Some(id) {
                self.slots[index] = None;
            }
        }
        Ok(tile)
    }

    /// Removes every tile. Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Returns the tile id held in each slot, row-major.
    pub(crate) fn slots(&self) -> &[Option<TileId>] {
        &self.slots
    }

    pub(crate) fn reset_annotations(&mut self) {
        self.tiles.values_mut().for_each(Tile::reset_merge_state);
    }
}

impl std::fmt::Display for Board {
    /// Renders rows top (highest y) to bottom, `.` for empty cells.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell_width = self.max_value().max(1).to_string().len().max(1);
        for y in (0..self.height).rev() {
            let row: Vec<String> = (0..self.width)
                .map(|x| match self.tile_at(Cell::new(x, y)) {
                    Some(tile) => format!("{:>cell_width$}", tile.value()),
                    None => format!("{:>cell_width$}", "."),
                })
                .collect();
            write!(f, "{}", row.join(" "))?;
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            Board::new(0, 4),
            Err(GameError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_cell_at_bounds() {
        let board = Board::new(4, 3).unwrap();
        assert_eq!(board.cell_at(3, 2), Some(Cell::new(3, 2)));
        assert_eq!(board.cell_at(4, 0), None);
        assert_eq!(board.cell_at(0, 3), None);
        assert_eq!(board.cell_at(-1, 0), None);
    }

    #[test]
    fn test_neighbor_stops_at_edge() {
        let board = Board::new(4, 4).unwrap();
        assert_eq!(board.neighbor(Cell::new(0, 0), Direction::Left), None);
        assert_eq!(board.neighbor(Cell::new(0, 0), Direction::Up), Some(Cell::new(0, 1)));
        assert_eq!(board.neighbor(Cell::new(3, 3), Direction::Right), None);
    }

    #[test]
    fn test_place_moves_tile_and_clears_old_slot() {
        let mut board = Board::new(4, 4).unwrap();
        let id = board.create_tile(2, Cell::new(1, 1)).unwrap();

        board.place_tile(id, Cell::new(3, 1)).unwrap();

        assert!(board.tile_at(Cell::new(1, 1)).is_none());
        assert_eq!(board.tile_id_at(Cell::new(3, 1)), Some(id));
        assert_eq!(board.tile(id).unwrap().cell(), Cell::new(3, 1));
        assert_eq!(board.empty_cells().len(), 15);
    }

    #[test]
    fn test_create_on_occupied_cell_fails() {
        let mut board = Board::new(2, 2).unwrap();
        let first = board.create_tile(2, Cell::new(0, 0)).unwrap();
        assert_eq!(
            board.create_tile(4, Cell::new(0, 0)),
            Err(GameError::OccupiedCell { cell: Cell::new(0, 0), occupant: first })
        );
    }

    #[test]
    fn test_place_onto_merge_target_is_allowed() {
        let mut board = Board::with_tiles(4, 1, &[(0, 0, 2), (2, 0, 2)]).unwrap();
        let target = board.tile_id_at(Cell::new(0, 0)).unwrap();
        let source = board.tile_id_at(Cell::new(2, 0)).unwrap();

        board.tile_mut(source).unwrap().set_merge_target(target);
        board.tile_mut(target).unwrap().mark_merge_target();
        board.place_tile(source, Cell::new(0, 0)).unwrap();

        assert_eq!(board.tile_id_at(Cell::new(0, 0)), Some(source));
        assert!(board.tile_at(Cell::new(2, 0)).is_none());

        // Removing the detached target must not clear the source's slot.
        board.remove_tile(target).unwrap();
        assert_eq!(board.tile_id_at(Cell::new(0, 0)), Some(source));
    }

    #[test]
    fn test_huge_dimensions_rejected() {
        assert!(matches!(
            Board::new(usize::MAX, 2),
            Err(GameError::InvalidDimensions { height: 2, .. })
        ));
    }

    #[test]
    fn test_create_rejects_non_power_of_two() {
        let mut board = Board::new(4, 1).unwrap();
        for value in [0, 1, 3, 6] {
            assert_eq!(
                board.create_tile(value, Cell::new(0, 0)),
                Err(GameError::InvalidValue(value))
            );
        }
        assert!(board.tile_at(Cell::new(0, 0)).is_none());
        assert_eq!(
            Board::with_tiles(4, 1, &[(0, 0, 3), (1, 0, 3)]),
            Err(GameError::InvalidValue(3))
        );
    }

    #[test]
    fn test_remove_clears_slot() {
        let mut board = Board::with_tiles(2, 2, &[(1, 1, 8)]).unwrap();
        let id = board.tile_id_at(Cell::new(1, 1)).unwrap();
        let removed = board.remove_tile(id).unwrap();
        assert_eq!(removed.value(), 8);
        assert!(board.tile_at(Cell::new(1, 1)).is_none());
        assert_eq!(board.remove_tile(id), Err(GameError::UnknownTile(id)));
    }

    #[test]
    fn test_display_puts_top_row_first() {
        let board = Board::with_tiles(2, 2, &[(0, 1, 4), (1, 0, 2)]).unwrap();
        assert_eq!(board.to_string(), "4 .\n. 2");
    }

    #[test]
    fn test_totals() {
        let board = Board::with_tiles(3, 1, &[(0, 0, 2), (1, 0, 16), (2, 0, 4)]).unwrap();
        assert_eq!(board.total_value(), 22);
        assert_eq!(board.max_value(), 16);
        assert!(board.is_full());
        assert_eq!(board.values(), vec![vec![2, 16, 4]]);
    }
}
