#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile grid state for the cascade puzzle engine.
//!
//! The grid is mutated exclusively through [`apply`] or the equivalent
//! methods on [`TileGrid`]; every observable change is reported as an
//! [`Event`] pushed into a caller-provided buffer. Cascades are resolved one
//! phase per [`Command::AdvanceCascade`], so callers can animate or inspect
//! every intermediate grid.

mod cascade;
mod config;
mod error;
pub mod geometry;
mod grid;
pub mod run;
pub mod tile;
pub mod weighted;

pub use cascade::{CascadeState, CascadeStep, Resolution};
pub use config::Config;
pub use error::GridError;
pub use geometry::{cast, Cast, GridManager};
pub use grid::TileGrid;
pub use run::{Run, Span};
pub use tile::Tile;
pub use weighted::{WeightedTable, WeightedTableError};

use cascade_core::{Command, Event};
use rand::Rng;

/// Applies the provided command to the grid, mutating state deterministically.
///
/// Rejected commands leave the grid untouched and push no events.
pub fn apply<R>(
    grid: &mut TileGrid<R>,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), GridError>
where
    R: Rng,
{
    match command {
        Command::Swap { from, to } => grid.swap(from, to, out_events),
        Command::AdvanceCascade => grid.advance(out_events).map(|_| ()),
        Command::AbandonCascade => {
            grid.abandon(out_events);
            Ok(())
        }
        Command::Regenerate => grid.regenerate(out_events),
        Command::SetSelected { cell, selected } => grid.set_selected(cell, selected, out_events),
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use cascade_core::{CellCoord, TileType};

    use super::{CascadeState, GridError, GridManager, Run, Tile, TileGrid, WeightedTable};
    use rand::Rng;

    /// Tile stored at `cell`, or `None` for an empty slot.
    pub fn tile<R>(grid: &TileGrid<R>, cell: CellCoord) -> Result<Option<Tile>, GridError>
    where
        R: Rng,
    {
        grid.tile(cell)
    }

    /// Type of the tile stored at `cell`, or `None` for an empty slot.
    pub fn tile_type<R>(grid: &TileGrid<R>, cell: CellCoord) -> Result<Option<TileType>, GridError>
    where
        R: Rng,
    {
        grid.tile_type(cell)
    }

    /// Captures every slot of the grid in row-major order.
    #[must_use]
    pub fn tiles<R>(grid: &TileGrid<R>) -> Vec<(CellCoord, Option<Tile>)>
    where
        R: Rng,
    {
        grid.tiles().collect()
    }

    /// Number of slots currently holding a tile.
    #[must_use]
    pub fn occupied_count<R>(grid: &TileGrid<R>) -> usize
    where
        R: Rng,
    {
        grid.occupied_count()
    }

    /// Qualifying runs present in the grid right now.
    #[must_use]
    pub fn runs<R>(grid: &TileGrid<R>) -> Vec<Run>
    where
        R: Rng,
    {
        grid.find_runs()
    }

    /// Current position in the swap/cascade state machine.
    #[must_use]
    pub fn cascade_state<R>(grid: &TileGrid<R>) -> CascadeState
    where
        R: Rng,
    {
        grid.cascade_state()
    }

    /// Coordinate utilities bound to the grid's dimensions.
    #[must_use]
    pub fn grid_manager<R>(grid: &TileGrid<R>) -> &GridManager
    where
        R: Rng,
    {
        grid.grid_manager()
    }

    /// Minimum straight-line length for a group to be removed.
    #[must_use]
    pub fn min_run<R>(grid: &TileGrid<R>) -> usize
    where
        R: Rng,
    {
        grid.min_run()
    }

    /// Weighted palette new tiles are drawn from.
    #[must_use]
    pub fn palette<R>(grid: &TileGrid<R>) -> &WeightedTable<TileType>
    where
        R: Rng,
    {
        grid.palette()
    }

    /// Tile types row by row, with `None` for empty slots.
    #[must_use]
    pub fn layout<R>(grid: &TileGrid<R>) -> Vec<Vec<Option<TileType>>>
    where
        R: Rng,
    {
        let columns = usize::try_from(grid.columns()).unwrap_or(usize::MAX).max(1);
        let types: Vec<Option<TileType>> = grid
            .tiles()
            .map(|(_, tile)| tile.map(|tile| tile.tile_type()))
            .collect();
        types.chunks(columns).map(<[_]>::to_vec).collect()
    }
}
