//! Numbered tiles and their per-turn merge annotations.

use crate::board::Cell;
use serde::{Deserialize, Serialize};

/// Stable identity of a tile within one board's arena.
///
/// Ids increase monotonically and are never reused, so a merge product
/// always has an id distinct from both of its sources.
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
#[display("#{}", _0)]
pub struct TileId(pub(crate) u64);

impl TileId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A single numbered tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    value: u32,
    cell: Cell,
    /// Tile this one is sliding into during the current turn.
    merge_target: Option<TileId>,
    /// True when another tile is sliding into this one during the current turn.
    is_merge_target: bool,
}

impl Tile {
    pub(crate) fn new(id: TileId, value: u32, cell: Cell) -> Self {
        Self {
            id,
            value,
            cell,
            merge_target: None,
            is_merge_target: false,
        }
    }

    /// Returns the tile id.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Returns the tile value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Returns the cell this tile occupies.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// Returns the tile this one is merging into this turn, if any.
    pub fn merge_target(&self) -> Option<TileId> {
        self.merge_target
    }

    /// Returns true if another tile is merging into this one this turn.
    pub fn is_merge_target(&self) -> bool {
        self.is_merge_target
    }

    /// True when this tile can absorb a moving tile of `value` this turn.
    ///
    /// A tile takes part in at most one merge per turn, as source or target.
    pub fn accepts_merge(&self, value: u32) -> bool {
        self.value == value && !self.is_merge_target && self.merge_target.is_none()
    }

    /// True when the tile carries any merge annotation.
    pub fn has_annotations(&self) -> bool {
        self.is_merge_target || self.merge_target.is_some()
    }

    pub(crate) fn set_cell(&mut self, cell: Cell) {
        self.cell = cell;
    }

    pub(crate) fn set_merge_target(&mut self, target: TileId) {
        self.merge_target = Some(target);
    }

    pub(crate) fn mark_merge_target(&mut self) {
        self.is_merge_target = true;
    }

    #[cfg(test)]
    pub(crate) fn set_value(&mut self, value: u32) {
        self.value = value;
    }

    pub(crate) fn reset_merge_state(&mut self) {
        self.merge_target = None;
        self.is_merge_target = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(value: u32) -> Tile {
        Tile::new(TileId(1), value, Cell::new(0, 0))
    }

    #[test]
    fn test_accepts_equal_value() {
        assert!(tile(4).accepts_merge(4));
        assert!(!tile(4).accepts_merge(2));
    }

    #[test]
    fn test_merge_target_refuses_second_merge() {
        let mut t = tile(2);
        t.mark_merge_target();
        assert!(!t.accepts_merge(2));
    }

    #[test]
    fn test_merging_source_refuses_incoming() {
        let mut t = tile(2);
        t.set_merge_target(TileId(7));
        assert!(!t.accepts_merge(2));
    }

    #[test]
    fn test_reset_clears_annotations() {
        let mut t = tile(8);
        t.set_merge_target(TileId(3));
        t.mark_merge_target();
        assert!(t.has_annotations());

        t.reset_merge_state();
        assert!(!t.has_annotations());
        assert_eq!(t.merge_target(), None);
    }
}
