//! Contents of a single grid slot.

use cascade_core::TileType;

/// A tile occupying one cell of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    tile_type: TileType,
    selected: bool,
}

impl Tile {
    /// Creates an unselected tile of the provided type.
    #[must_use]
    pub const fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            selected: false,
        }
    }

    /// Type label carried by the tile.
    #[must_use]
    pub const fn tile_type(&self) -> TileType {
        self.tile_type
    }

    pub(crate) fn set_tile_type(&mut self, tile_type: TileType) {
        self.tile_type = tile_type;
    }

    /// Reports whether the tile is currently selected.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Reports whether both tiles match for run detection, ignoring selection.
    #[must_use]
    pub fn equivalent_to(&self, other: &Tile) -> bool {
        self.tile_type == other.tile_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_does_not_affect_equivalence() {
        let mut selected = Tile::new(TileType::new(3));
        selected.set_selected(true);
        let plain = Tile::new(TileType::new(3));

        assert!(selected.equivalent_to(&plain));
        assert_ne!(selected, plain);
        assert!(!Tile::new(TileType::new(4)).equivalent_to(&plain));
    }
}
