use cascade_core::CellCoord;
use thiserror::Error;

use crate::WeightedTableError;

/// Errors surfaced by grid construction and grid operations.
///
/// Every variant describes a violated caller contract; none are transient.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The grid was configured with zero rows or zero columns.
    #[error("grid dimensions must be non-zero, got {rows}x{columns}")]
    InvalidDimensions {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
    },
    /// The minimum run length cannot be satisfied without removing single tiles.
    #[error("minimum run length must be at least 2, got {min_run}")]
    InvalidMinRun {
        /// Requested minimum run length.
        min_run: usize,
    },
    /// A predefined layout does not match the configured dimensions.
    #[error("layout must be {rows}x{columns} to match the configuration")]
    LayoutMismatch {
        /// Configured number of rows.
        rows: u32,
        /// Configured number of columns.
        columns: u32,
    },
    /// The palette, or a palette derived during generation, has nothing to draw.
    #[error("palette cannot produce a tile: {0}")]
    Palette(#[from] WeightedTableError),
    /// A coordinate lies outside the configured grid.
    #[error("cell {cell} lies outside the {rows}x{columns} grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
        /// Number of rows in the grid.
        rows: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// A slot that should hold a tile is empty.
    ///
    /// Slots are only vacated inside a single cascade phase, so settled and
    /// between-phase grids never report this.
    #[error("cell {cell} holds no tile")]
    EmptySlot {
        /// Coordinate of the empty slot.
        cell: CellCoord,
    },
    /// A swap or regeneration was requested before the pending cascade finished.
    #[error("a cascade is still resolving; advance or abandon it first")]
    CascadeInProgress,
    /// The cascade was advanced while no swap was pending.
    #[error("no cascade is pending")]
    NoCascade,
}
