//! Connected groups of same-typed cells and the span rule that picks their
//! representative cell.

use std::collections::BTreeMap;

use cascade_core::{CellCoord, ClearedRun, Direction, TileType};

use crate::geometry::cast;

/// Distances reachable from a pivot cell in each compass direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    north: usize,
    south: usize,
    east: usize,
    west: usize,
}

impl Span {
    /// Creates a span from its four directional distances.
    #[must_use]
    pub const fn new(north: usize, south: usize, east: usize, west: usize) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Combined `(vertical, horizontal)` extents of the span.
    #[must_use]
    pub const fn extents(&self) -> (usize, usize) {
        (self.north + self.south, self.east + self.west)
    }

    /// Directional `(vertical, horizontal)` skews of the span.
    #[must_use]
    pub const fn skews(&self) -> (usize, usize) {
        (
            self.north.abs_diff(self.south),
            self.east.abs_diff(self.west),
        )
    }

    /// Reports whether this span dominates `other`.
    ///
    /// A span dominates when it reaches at least as far along both axes.
    /// On an exact tie of both extents it must also be at least as skewed on
    /// both axes.
    #[must_use]
    pub fn dominates(&self, other: &Span) -> bool {
        let (vertical, horizontal) = self.extents();
        let (other_vertical, other_horizontal) = other.extents();

        if vertical < other_vertical || horizontal < other_horizontal {
            return false;
        }

        if vertical == other_vertical && horizontal == other_horizontal {
            let (vertical_skew, horizontal_skew) = self.skews();
            let (other_vertical_skew, other_horizontal_skew) = other.skews();
            return vertical_skew >= other_vertical_skew
                && horizontal_skew >= other_horizontal_skew;
        }

        true
    }
}

/// A 4-connected set of cells that shared one tile type during a detection pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    cells: BTreeMap<CellCoord, TileType>,
    horizontal: usize,
    vertical: usize,
}

impl Run {
    /// Builds a run from cells and the tile types observed at them.
    #[must_use]
    pub fn new<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (CellCoord, TileType)>,
    {
        let mut run = Self {
            cells: cells.into_iter().collect(),
            horizontal: 0,
            vertical: 0,
        };
        run.measure();
        run
    }

    /// Builds a run in which every cell carries `tile_type`.
    #[must_use]
    pub fn from_set<I>(cells: I, tile_type: TileType) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        Self::new(cells.into_iter().map(|cell| (cell, tile_type)))
    }

    /// Longest contiguous `(horizontal, vertical)` lines within the run.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.horizontal, self.vertical)
    }

    /// Longest straight line within the run along either axis.
    #[must_use]
    pub fn max_dimension(&self) -> usize {
        self.horizontal.max(self.vertical)
    }

    /// Number of cells in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the run holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether `cell` belongs to the run.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Tile type recorded for `cell`.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<TileType> {
        self.cells.get(&cell).copied()
    }

    /// Tile type of the run, taken from its first cell in row-major order.
    #[must_use]
    pub fn tile_type(&self) -> Option<TileType> {
        self.cells.values().next().copied()
    }

    /// Cells of the run in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.keys().copied()
    }

    /// `(cell, tile type)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileType)> + '_ {
        self.cells.iter().map(|(cell, tile_type)| (*cell, *tile_type))
    }

    /// Removes `cell` from the run and recomputes its dimensions.
    pub fn remove(&mut self, cell: CellCoord) -> Option<TileType> {
        let removed = self.cells.remove(&cell);
        if removed.is_some() {
            self.measure();
        }
        removed
    }

    /// Picks the cell at the centre of the longest combined lines.
    ///
    /// Cells are visited in row-major order; a cell replaces the current pick
    /// whenever its span dominates the best span seen so far.
    #[must_use]
    pub fn find_dominant_cell(&self) -> Option<CellCoord> {
        let mut dominant_span = Span::default();
        let mut dominant_cell = None;

        for cell in self.cells() {
            let span = self.span_at(cell);
            if span.dominates(&dominant_span) {
                dominant_span = span;
                dominant_cell = Some(cell);
            }
        }

        dominant_cell
    }

    /// Event-facing snapshot of the run, or `None` when it is empty.
    #[must_use]
    pub fn to_cleared(&self) -> Option<ClearedRun> {
        let tile_type = self.tile_type()?;
        Some(ClearedRun::new(
            tile_type,
            self.cells().collect(),
            u32::try_from(self.horizontal).unwrap_or(u32::MAX),
            u32::try_from(self.vertical).unwrap_or(u32::MAX),
        ))
    }

    fn reach(&self, cell: CellCoord, direction: Direction) -> usize {
        cast(cell, direction, |position| self.cells.contains_key(&position)).count()
    }

    fn span_at(&self, cell: CellCoord) -> Span {
        Span::new(
            self.reach(cell, Direction::North),
            self.reach(cell, Direction::South),
            self.reach(cell, Direction::East),
            self.reach(cell, Direction::West),
        )
    }

    fn measure(&mut self) {
        let mut horizontal = 0;
        let mut vertical = 0;

        for cell in self.cells.keys() {
            let across =
                1 + self.reach(*cell, Direction::East) + self.reach(*cell, Direction::West);
            let down =
                1 + self.reach(*cell, Direction::North) + self.reach(*cell, Direction::South);
            horizontal = horizontal.max(across);
            vertical = vertical.max(down);
        }

        self.horizontal = horizontal;
        self.vertical = vertical;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(i32, i32)]) -> Vec<CellCoord> {
        coords
            .iter()
            .map(|(row, column)| CellCoord::new(*row, *column))
            .collect()
    }

    fn run_of(coords: &[(i32, i32)]) -> Run {
        Run::from_set(cells(coords), TileType::new(1))
    }

    #[test]
    fn dimensions_measure_longest_lines() {
        let run = run_of(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (2, 3)]);
        assert_eq!(run.dimensions(), (4, 3));
        assert_eq!(run.max_dimension(), 4);
    }

    #[test]
    fn square_blob_has_short_dimensions() {
        let run = run_of(&[(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(run.len(), 4);
        assert_eq!(run.dimensions(), (2, 2));
    }

    #[test]
    fn removing_a_cell_recomputes_dimensions() {
        let mut run = run_of(&[(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(run.remove(CellCoord::new(0, 1)), Some(TileType::new(1)));
        assert_eq!(run.dimensions(), (2, 1));
        assert_eq!(run.remove(CellCoord::new(5, 5)), None);
    }

    #[test]
    fn plus_shape_is_dominated_by_its_centre() {
        let run = run_of(&[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)]);
        assert_eq!(run.find_dominant_cell(), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn exact_ties_favour_the_more_skewed_span() {
        let run = run_of(&[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(run.find_dominant_cell(), Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn dominant_cell_is_stable_across_calls() {
        let run = run_of(&[(3, 1), (3, 2), (3, 3), (2, 2), (4, 2), (4, 3)]);
        let first = run.find_dominant_cell();
        assert!(first.is_some());
        for _ in 0..5 {
            assert_eq!(run.find_dominant_cell(), first);
        }
    }

    #[test]
    fn empty_run_has_no_dominant_cell() {
        let run = run_of(&[]);
        assert!(run.is_empty());
        assert_eq!(run.find_dominant_cell(), None);
        assert_eq!(run.to_cleared(), None);
    }

    #[test]
    fn strictly_longer_span_dominates_regardless_of_skew() {
        let centred = Span::new(1, 1, 0, 0);
        let longer = Span::new(3, 0, 0, 0);
        assert!(longer.dominates(&centred));
        assert!(!centred.dominates(&longer));
    }

    #[test]
    fn spans_longer_on_different_axes_do_not_dominate_each_other() {
        let tall = Span::new(2, 0, 0, 0);
        let wide = Span::new(0, 0, 1, 1);
        assert!(!tall.dominates(&wide));
        assert!(!wide.dominates(&tall));
    }

    #[test]
    fn cleared_snapshot_carries_type_and_dimensions() {
        let run = run_of(&[(0, 2), (0, 0), (0, 1)]);
        let cleared = run.to_cleared().expect("non-empty run");
        assert_eq!(cleared.tile_type(), TileType::new(1));
        assert_eq!(cleared.cells(), cells(&[(0, 0), (0, 1), (0, 2)]).as_slice());
        assert_eq!((cleared.horizontal(), cleared.vertical()), (3, 1));
    }
}
