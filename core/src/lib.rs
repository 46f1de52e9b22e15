#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cascade tile-matching engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative tile grid, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the grid executes those
//! commands via its `apply` entry point, and then pushes [`Event`] values into
//! a caller-supplied sink. Systems consume event streams, query read-only
//! tile lookups, and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of rows and columns used when no grid size is configured.
pub const DEFAULT_GRID_SIZE: u32 = 6;

/// Minimum straight-line length a group of tiles needs before it is removed.
pub const DEFAULT_MIN_RUN: usize = 3;

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exchanges the tiles at two cells and starts a cascade.
    Swap {
        /// Cell the swap originates from.
        from: CellCoord,
        /// Cell the swap targets.
        to: CellCoord,
    },
    /// Advances the pending cascade by a single resolution phase.
    AdvanceCascade,
    /// Drops the pending cascade, leaving the grid as the last phase left it.
    AbandonCascade,
    /// Discards every tile and generates a fresh, run-free grid.
    Regenerate,
    /// Toggles the transient selection flag of a tile.
    SetSelected {
        /// Cell holding the tile.
        cell: CellCoord,
        /// Selection state to apply.
        selected: bool,
    },
}

/// Events pushed by the grid after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that every slot was filled with a freshly generated tile.
    GridGenerated {
        /// Number of rows in the grid.
        rows: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// Fired the instant a swap is applied, before any resolution.
    SwapInitiated {
        /// Cell the swap originated from.
        from: CellCoord,
        /// Cell the swap targeted.
        to: CellCoord,
    },
    /// Fired once per cascade phase that removed at least one run.
    RunsResolved {
        /// Runs removed and tiles moved during the phase.
        report: PhaseReport,
    },
    /// Fired once when a cascade terminates without further qualifying runs.
    SwapSettled {
        /// Cell the settled swap originated from.
        from: CellCoord,
        /// Cell the settled swap targeted.
        to: CellCoord,
    },
    /// Reports that a pending cascade was dropped before it settled.
    CascadeAbandoned {
        /// Cell the abandoned swap originated from.
        from: CellCoord,
        /// Cell the abandoned swap targeted.
        to: CellCoord,
    },
    /// Confirms that a tile's selection flag changed.
    SelectionChanged {
        /// Cell holding the tile.
        cell: CellCoord,
        /// Selection state after the change.
        selected: bool,
    },
}

/// Categorical label carried by every tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileType(u16);

impl TileType {
    /// Creates a new tile type from its numeric label.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tile type.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Cardinal directions used for movement and ray casting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction, in the order neighbours are enumerated.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit `(row, column)` delta applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
///
/// Coordinates are signed: stepping off the grid is representable, and
/// tiles spawned during a cascade report synthetic origin rows above the
/// top edge (`row <= -1`). Ordering is row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: i32,
    column: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Coordinate one step away in the provided direction. Never bounds-checked.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (row_delta, column_delta) = direction.delta();
        Self {
            row: self.row.saturating_add(row_delta),
            column: self.column.saturating_add(column_delta),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Snapshot of a run removed during a cascade phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedRun {
    tile_type: TileType,
    cells: Vec<CellCoord>,
    horizontal: u32,
    vertical: u32,
}

impl ClearedRun {
    /// Creates a new snapshot. Cells are stored in row-major order.
    #[must_use]
    pub fn new(tile_type: TileType, mut cells: Vec<CellCoord>, horizontal: u32, vertical: u32) -> Self {
        cells.sort_unstable();
        Self {
            tile_type,
            cells,
            horizontal,
            vertical,
        }
    }

    /// Type shared by every tile in the run.
    #[must_use]
    pub const fn tile_type(&self) -> TileType {
        self.tile_type
    }

    /// Cells the run occupied, in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of tiles removed with the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the snapshot holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Longest contiguous horizontal line within the run.
    #[must_use]
    pub const fn horizontal(&self) -> u32 {
        self.horizontal
    }

    /// Longest contiguous vertical line within the run.
    #[must_use]
    pub const fn vertical(&self) -> u32 {
        self.vertical
    }

    /// Longest straight line within the run along either axis.
    #[must_use]
    pub fn max_dimension(&self) -> u32 {
        self.horizontal.max(self.vertical)
    }
}

/// Single entry of a column's gravity mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileDrop {
    column: i32,
    from_row: i32,
    to_row: i32,
    tile_type: TileType,
}

impl TileDrop {
    /// Creates a drop descriptor for a tile falling within a column.
    #[must_use]
    pub const fn new(column: i32, from_row: i32, to_row: i32, tile_type: TileType) -> Self {
        Self {
            column,
            from_row,
            to_row,
            tile_type,
        }
    }

    /// Column the tile falls through.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row the tile starts from; negative for tiles entering from above the grid.
    #[must_use]
    pub const fn from_row(&self) -> i32 {
        self.from_row
    }

    /// Row the tile comes to rest in.
    #[must_use]
    pub const fn to_row(&self) -> i32 {
        self.to_row
    }

    /// Type of the falling tile.
    #[must_use]
    pub const fn tile_type(&self) -> TileType {
        self.tile_type
    }

    /// Reports whether the tile was generated during the phase.
    #[must_use]
    pub const fn is_spawned(&self) -> bool {
        self.from_row < 0
    }

    /// Number of rows the tile falls.
    #[must_use]
    pub fn distance(&self) -> u32 {
        self.to_row.abs_diff(self.from_row)
    }

    /// Cell the tile starts from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        CellCoord::new(self.from_row, self.column)
    }

    /// Cell the tile comes to rest in.
    #[must_use]
    pub const fn destination(&self) -> CellCoord {
        CellCoord::new(self.to_row, self.column)
    }
}

/// Outcome of a single cascade phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    phase: u32,
    runs: Vec<ClearedRun>,
    drops: Vec<TileDrop>,
}

impl PhaseReport {
    /// Creates a new phase report.
    #[must_use]
    pub fn new(phase: u32, runs: Vec<ClearedRun>, drops: Vec<TileDrop>) -> Self {
        Self { phase, runs, drops }
    }

    /// Zero-based index of the phase within its cascade.
    #[must_use]
    pub const fn phase(&self) -> u32 {
        self.phase
    }

    /// Runs removed during the phase.
    #[must_use]
    pub fn runs(&self) -> &[ClearedRun] {
        &self.runs
    }

    /// Gravity mapping for carried-over and newly spawned tiles.
    #[must_use]
    pub fn drops(&self) -> &[TileDrop] {
        &self.drops
    }

    /// Total number of tiles removed during the phase.
    #[must_use]
    pub fn cleared_tiles(&self) -> usize {
        self.runs.iter().map(ClearedRun::len).sum()
    }

    /// Number of tiles generated to refill the grid.
    #[must_use]
    pub fn spawned_tiles(&self) -> usize {
        self.drops.iter().filter(|drop| drop.is_spawned()).count()
    }
}
