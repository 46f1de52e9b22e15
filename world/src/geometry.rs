//! Coordinate-space utilities shared by the grid and its runs.

use cascade_core::{CellCoord, Direction};

use crate::GridError;

/// Bounds-aware navigation over a fixed `rows x columns` grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridManager {
    rows: u32,
    columns: u32,
}

impl GridManager {
    /// Creates a manager for the provided dimensions.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.rows) * u64::from(self.columns);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn is_valid(&self, cell: CellCoord) -> bool {
        u32::try_from(cell.row()).map_or(false, |row| row < self.rows)
            && u32::try_from(cell.column()).map_or(false, |column| column < self.columns)
    }

    /// Moves one step in `direction`. The result is not bounds-checked.
    #[must_use]
    pub fn step(&self, cell: CellCoord, direction: Direction) -> CellCoord {
        cell.step(direction)
    }

    /// All four neighbours of `cell`, including those outside the grid.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        Direction::ALL.into_iter().map(move |direction| cell.step(direction))
    }

    /// Neighbours of `cell` that lie inside the grid.
    pub fn valid_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let manager = *self;
        self.neighbors(cell)
            .filter(move |neighbor| manager.is_valid(*neighbor))
    }

    /// Walks from `cell` in `direction` while `include` holds.
    ///
    /// The walk is not limited to the grid; `include` must eventually reject a
    /// position for the iterator to terminate.
    pub fn cast<P>(&self, cell: CellCoord, direction: Direction, include: P) -> Cast<P>
    where
        P: FnMut(CellCoord) -> bool,
    {
        cast(cell, direction, include)
    }

    /// Every valid cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = CellCoord> {
        let columns = i32::try_from(self.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        (0..rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(row, column)))
    }

    /// Row-major slot index of `cell`, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.is_valid(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Slot index of `cell`, or an error naming the offending coordinate.
    pub fn ensure_valid(&self, cell: CellCoord) -> Result<usize, GridError> {
        self.index(cell).ok_or(GridError::OutOfBounds {
            cell,
            rows: self.rows,
            columns: self.columns,
        })
    }
}

/// Lazy ray cast produced by [`cast`].
#[derive(Clone, Debug)]
pub struct Cast<P> {
    position: CellCoord,
    direction: Direction,
    include: P,
    finished: bool,
}

impl<P> Iterator for Cast<P>
where
    P: FnMut(CellCoord) -> bool,
{
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let next = self.position.step(self.direction);
        if (self.include)(next) {
            self.position = next;
            Some(next)
        } else {
            self.finished = true;
            None
        }
    }
}

/// Walks from `origin` in `direction`, yielding positions while `include` holds.
///
/// The origin itself is never yielded, and the first rejected position ends
/// the walk without being yielded.
pub fn cast<P>(origin: CellCoord, direction: Direction, include: P) -> Cast<P>
where
    P: FnMut(CellCoord) -> bool,
{
    Cast {
        position: origin,
        direction,
        include,
        finished: false,
    }
}
