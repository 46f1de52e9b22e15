//! The authoritative tile grid: storage, generation, run detection and swaps.

use cascade_core::{CellCoord, Event, TileType};
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{CascadeState, Config, GridError, GridManager, Run, Tile, WeightedTable};

/// Owns a `rows x columns` array of tiles and every rule that mutates it.
///
/// The grid is generic over its random source so callers can supply a seeded
/// or scripted generator; [`TileGrid::new`] seeds a `ChaCha8Rng` from the
/// configuration.
#[derive(Clone, Debug)]
pub struct TileGrid<R = ChaCha8Rng> {
    pub(crate) manager: GridManager,
    pub(crate) min_run: usize,
    pub(crate) slots: Vec<Option<Tile>>,
    pub(crate) palette: WeightedTable<TileType>,
    pub(crate) rng: R,
    pub(crate) cascade: CascadeState,
}

impl TileGrid<ChaCha8Rng> {
    /// Creates and generates a grid whose random source is seeded from `config`.
    pub fn new(config: Config, palette: WeightedTable<TileType>) -> Result<Self, GridError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed());
        Self::with_rng(config, palette, rng)
    }
}

impl<R> TileGrid<R>
where
    R: Rng,
{
    /// Creates and generates a grid drawing from the provided random source.
    pub fn with_rng(
        config: Config,
        palette: WeightedTable<TileType>,
        rng: R,
    ) -> Result<Self, GridError> {
        config.validate()?;
        let mut grid = Self::unfilled(config, palette, rng);
        grid.generate()?;
        Ok(grid)
    }

    /// Creates a grid holding exactly `layout`, listed row by row.
    ///
    /// The layout is taken as-is: it may contain qualifying runs, which the
    /// first cascade will resolve. The palette is only used for refills.
    pub fn from_layout(
        config: Config,
        palette: WeightedTable<TileType>,
        rng: R,
        layout: &[Vec<TileType>],
    ) -> Result<Self, GridError> {
        config.validate()?;
        let rows_match = u32::try_from(layout.len()) == Ok(config.rows());
        let columns_match = layout
            .iter()
            .all(|row| u32::try_from(row.len()) == Ok(config.columns()));
        if !rows_match || !columns_match {
            return Err(GridError::LayoutMismatch {
                rows: config.rows(),
                columns: config.columns(),
            });
        }

        let mut grid = Self::unfilled(config, palette, rng);
        grid.slots = layout
            .iter()
            .flatten()
            .map(|tile_type| Some(Tile::new(*tile_type)))
            .collect();
        Ok(grid)
    }

    fn unfilled(config: Config, palette: WeightedTable<TileType>, rng: R) -> Self {
        let manager = GridManager::new(config.rows(), config.columns());
        Self {
            slots: vec![None; manager.cell_count()],
            manager,
            min_run: config.min_run(),
            palette,
            rng,
            cascade: CascadeState::Idle,
        }
    }

    /// Discards every tile and generates a fresh, run-free grid.
    pub fn regenerate(&mut self, out_events: &mut Vec<Event>) -> Result<(), GridError> {
        if !self.cascade.is_idle() {
            return Err(GridError::CascadeInProgress);
        }

        self.generate()?;
        out_events.push(Event::GridGenerated {
            rows: self.manager.rows(),
            columns: self.manager.columns(),
        });
        Ok(())
    }

    /// Exchanges the tiles at `from` and `to` and starts a cascade.
    ///
    /// Adjacency is not checked. The cascade is driven with
    /// [`TileGrid::advance`] until it settles or is abandoned.
    pub fn swap(
        &mut self,
        from: CellCoord,
        to: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        if !self.cascade.is_idle() {
            return Err(GridError::CascadeInProgress);
        }

        let from_index = self.manager.ensure_valid(from)?;
        let to_index = self.manager.ensure_valid(to)?;
        self.slots.swap(from_index, to_index);
        self.cascade = CascadeState::Swapped { from, to };

        debug!("swapped {from} with {to}");
        out_events.push(Event::SwapInitiated { from, to });
        Ok(())
    }

    /// Sets the selection flag of the tile at `cell`.
    pub fn set_selected(
        &mut self,
        cell: CellCoord,
        selected: bool,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let index = self.manager.ensure_valid(cell)?;
        let tile = self
            .slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(GridError::EmptySlot { cell })?;
        tile.set_selected(selected);
        out_events.push(Event::SelectionChanged { cell, selected });
        Ok(())
    }

    /// Finds every qualifying run in the grid.
    #[must_use]
    pub fn find_runs(&self) -> Vec<Run> {
        self.collect_runs(self.manager.positions())
    }

    /// Finds qualifying runs whose flood fill starts at one of `positions`.
    ///
    /// Components still extend across the whole grid. Every cell reached by a
    /// fill is spent for the rest of the pass, whether or not its component
    /// qualified. Empty slots start nothing. Any position outside the grid
    /// fails the whole search.
    pub fn find_runs_in<I>(&self, positions: I) -> Result<Vec<Run>, GridError>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let starts = positions
            .into_iter()
            .map(|cell| self.manager.ensure_valid(cell).map(|_| cell))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.collect_runs(starts))
    }

    fn collect_runs<I>(&self, starts: I) -> Vec<Run>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut visited = vec![false; self.slots.len()];
        let mut runs = Vec::new();

        for start in starts {
            let Some(start_index) = self.manager.index(start) else {
                continue;
            };
            if visited[start_index] {
                continue;
            }
            let Some(root) = self.slots[start_index] else {
                visited[start_index] = true;
                continue;
            };

            let mut component = Vec::new();
            let mut stack = vec![start];
            while let Some(cell) = stack.pop() {
                let Some(index) = self.manager.index(cell) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                visited[index] = true;
                component.push((cell, root.tile_type()));

                for neighbor in self.manager.valid_neighbors(cell) {
                    let matches = self
                        .manager
                        .index(neighbor)
                        .and_then(|neighbor_index| self.slots[neighbor_index])
                        .map_or(false, |tile| tile.equivalent_to(&root));
                    if matches {
                        stack.push(neighbor);
                    }
                }
            }

            if component.len() < self.min_run {
                continue;
            }
            let run = Run::new(component);
            if run.max_dimension() >= self.min_run {
                runs.push(run);
            }
        }

        runs
    }

    /// Tile at `cell`, or `None` for an empty slot.
    pub fn tile(&self, cell: CellCoord) -> Result<Option<Tile>, GridError> {
        let index = self.manager.ensure_valid(cell)?;
        Ok(self.slots[index])
    }

    /// Type of the tile at `cell`, or `None` for an empty slot.
    pub fn tile_type(&self, cell: CellCoord) -> Result<Option<TileType>, GridError> {
        Ok(self.tile(cell)?.map(|tile| tile.tile_type()))
    }

    /// Every slot in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (CellCoord, Option<Tile>)> + '_ {
        self.manager.positions().zip(self.slots.iter().copied())
    }

    /// Number of slots currently holding a tile.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Coordinate utilities bound to the grid's dimensions.
    #[must_use]
    pub const fn grid_manager(&self) -> &GridManager {
        &self.manager
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.manager.rows()
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.manager.columns()
    }

    /// Minimum straight-line length for a group to be removed.
    #[must_use]
    pub const fn min_run(&self) -> usize {
        self.min_run
    }

    /// Weighted palette every new tile is drawn from.
    #[must_use]
    pub const fn palette(&self) -> &WeightedTable<TileType> {
        &self.palette
    }

    /// Current position in the swap/cascade state machine.
    #[must_use]
    pub const fn cascade_state(&self) -> CascadeState {
        self.cascade
    }

    pub(crate) fn draw_tile(&mut self) -> Tile {
        Tile::new(self.palette.choose(&mut self.rng))
    }

    pub(crate) fn take(&mut self, cell: CellCoord) -> Option<Tile> {
        let index = self.manager.index(cell)?;
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub(crate) fn put(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(slot) = self
            .manager
            .index(cell)
            .and_then(|index| self.slots.get_mut(index))
        {
            *slot = Some(tile);
        }
    }

    /// Refills every slot; on failure the previous tiles are restored.
    fn generate(&mut self) -> Result<(), GridError> {
        let previous = self.slots.clone();
        let generated = self.fill_without_runs();
        if generated.is_err() {
            self.slots = previous;
        }
        generated
    }

    fn fill_without_runs(&mut self) -> Result<(), GridError> {
        for index in 0..self.slots.len() {
            let tile = self.draw_tile();
            self.slots[index] = Some(tile);
        }

        loop {
            let runs = self.find_runs();
            if runs.is_empty() {
                return Ok(());
            }
            for mut run in runs {
                self.break_up(&mut run)?;
            }
        }
    }

    /// Retypes dominant cells until `run` no longer holds a qualifying line.
    fn break_up(&mut self, run: &mut Run) -> Result<(), GridError> {
        while run.max_dimension() >= self.min_run {
            let Some(dominant) = run.find_dominant_cell() else {
                break;
            };

            let mut excluded: Vec<TileType> = Vec::with_capacity(5);
            excluded.extend(self.type_at(dominant));
            for neighbor in self.manager.valid_neighbors(dominant) {
                excluded.extend(self.type_at(neighbor));
            }

            let table = self.palette.clone_with(&excluded, std::iter::empty())?;
            let replacement = table.choose(&mut self.rng);
            if let Some(tile) = self
                .manager
                .index(dominant)
                .and_then(|index| self.slots.get_mut(index))
                .and_then(Option::as_mut)
            {
                trace!(
                    "retyping {dominant} from {} to {}",
                    tile.tile_type().get(),
                    replacement.get()
                );
                tile.set_tile_type(replacement);
            }

            let _ = run.remove(dominant);
        }
        Ok(())
    }

    fn type_at(&self, cell: CellCoord) -> Option<TileType> {
        let index = self.manager.index(cell)?;
        self.slots[index].map(|tile| tile.tile_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeightedTableError;

    fn palette(types: u16) -> WeightedTable<TileType> {
        WeightedTable::new((0..types).map(|value| (TileType::new(value), 1))).expect("palette")
    }

    fn layout(rows: &[&[u16]]) -> Vec<Vec<TileType>> {
        rows.iter()
            .map(|row| row.iter().map(|value| TileType::new(*value)).collect())
            .collect()
    }

    fn grid_from(rows: &[&[u16]], min_run: usize) -> TileGrid {
        let config = Config::new(rows.len() as u32, rows[0].len() as u32, min_run);
        TileGrid::from_layout(
            config,
            palette(6),
            ChaCha8Rng::seed_from_u64(1),
            &layout(rows),
        )
        .expect("layout grid")
    }

    #[test]
    fn generated_grids_are_full_and_free_of_runs() {
        for seed in 0..25 {
            let config = Config::new(8, 7, 3).with_seed(seed);
            let grid = TileGrid::new(config, palette(6)).expect("grid");
            assert_eq!(grid.occupied_count(), 56);
            assert!(grid.find_runs().is_empty(), "seed {seed} left a run behind");
        }
    }

    #[test]
    fn identical_seeds_generate_identical_grids() {
        let config = Config::default().with_seed(99);
        let first = TileGrid::new(config, palette(6)).expect("grid");
        let second = TileGrid::new(config, palette(6)).expect("grid");
        assert!(first.tiles().eq(second.tiles()));
    }

    #[test]
    fn generation_fails_when_exclusions_cover_the_palette() {
        let single = WeightedTable::new([(TileType::new(0), 1)]).expect("palette");
        let error = TileGrid::new(Config::new(3, 3, 3), single).unwrap_err();
        assert_eq!(error, GridError::Palette(WeightedTableError::Empty));
    }

    #[test]
    fn horizontal_line_is_detected() {
        let grid = grid_from(&[&[7, 7, 7, 8, 8]], 3);
        let runs = grid.find_runs();

        assert_eq!(runs.len(), 1);
        let cells: Vec<_> = runs[0].cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
            ]
        );
    }

    #[test]
    fn blob_without_straight_line_does_not_qualify() {
        let grid = grid_from(&[&[7, 7, 1], &[7, 7, 2], &[3, 4, 5]], 3);
        assert!(grid.find_runs().is_empty());
    }

    #[test]
    fn connected_shapes_form_a_single_run() {
        let grid = grid_from(&[&[7, 1, 2], &[7, 3, 4], &[7, 7, 7]], 3);
        let runs = grid.find_runs();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 5);
        assert_eq!(runs[0].dimensions(), (3, 3));
    }

    #[test]
    fn subset_search_still_floods_the_whole_component() {
        let grid = grid_from(&[&[7, 7, 7, 7], &[1, 2, 3, 4]], 3);
        let runs = grid.find_runs_in([CellCoord::new(0, 3)]).expect("valid starts");

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 4);
        assert!(grid
            .find_runs_in([CellCoord::new(1, 0)])
            .expect("valid starts")
            .is_empty());
    }

    #[test]
    fn subset_search_rejects_positions_outside_the_grid() {
        let grid = grid_from(&[&[7, 7, 7]], 3);
        let error = grid
            .find_runs_in([CellCoord::new(0, 0), CellCoord::new(7, 7)])
            .unwrap_err();
        assert_eq!(
            error,
            GridError::OutOfBounds {
                cell: CellCoord::new(7, 7),
                rows: 1,
                columns: 3,
            }
        );
        assert!(grid.find_runs_in([CellCoord::new(-1, 0)]).is_err());
    }

    #[test]
    fn layout_must_match_configuration() {
        let error = TileGrid::from_layout(
            Config::new(2, 2, 3),
            palette(4),
            ChaCha8Rng::seed_from_u64(0),
            &layout(&[&[1, 2], &[3]]),
        )
        .unwrap_err();
        assert_eq!(error, GridError::LayoutMismatch { rows: 2, columns: 2 });
    }

    #[test]
    fn swap_rejects_out_of_bounds_cells() {
        let mut grid = grid_from(&[&[1, 2], &[3, 4]], 3);
        let mut events = Vec::new();
        let error = grid
            .swap(CellCoord::new(0, 0), CellCoord::new(0, 2), &mut events)
            .unwrap_err();

        assert!(matches!(error, GridError::OutOfBounds { .. }));
        assert!(events.is_empty());
        assert!(grid.cascade_state().is_idle());
        assert_eq!(grid.tile_type(CellCoord::new(0, 0)), Ok(Some(TileType::new(1))));
    }

    #[test]
    fn selection_toggles_and_notifies() {
        let mut grid = grid_from(&[&[1, 2], &[3, 4]], 3);
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 0);

        grid.set_selected(cell, true, &mut events).expect("select");

        assert!(grid.tile(cell).expect("tile").expect("occupied").is_selected());
        assert_eq!(events, vec![Event::SelectionChanged { cell, selected: true }]);
    }

    #[test]
    fn failed_regeneration_leaves_the_grid_untouched() {
        let single = WeightedTable::new([(TileType::new(0), 1)]).expect("palette");
        let rows: &[&[u16]] = &[&[5, 6, 5], &[6, 5, 6], &[5, 6, 5]];
        let mut grid = TileGrid::from_layout(
            Config::new(3, 3, 3),
            single,
            ChaCha8Rng::seed_from_u64(1),
            &layout(rows),
        )
        .expect("layout grid");
        let before: Vec<_> = grid.tiles().collect();
        let mut events = Vec::new();

        let error = grid.regenerate(&mut events).unwrap_err();

        assert_eq!(error, GridError::Palette(WeightedTableError::Empty));
        assert!(events.is_empty(), "rejected regeneration must not notify");
        assert!(grid.tiles().eq(before.into_iter()), "grid must be restored");
        assert!(grid.find_runs().is_empty());
        assert!(grid.cascade_state().is_idle());
    }

    #[test]
    fn selecting_an_empty_slot_is_rejected() {
        let mut grid = grid_from(&[&[1, 2], &[3, 4]], 3);
        let cell = CellCoord::new(0, 1);
        let _ = grid.take(cell);
        let mut events = Vec::new();

        assert_eq!(
            grid.set_selected(cell, true, &mut events),
            Err(GridError::EmptySlot { cell })
        );
        assert!(events.is_empty());
    }

    #[test]
    fn regenerate_replaces_layout_with_stable_grid() {
        let mut grid = grid_from(&[&[1, 1, 1], &[2, 2, 2], &[3, 3, 3]], 3);
        let mut events = Vec::new();

        grid.regenerate(&mut events).expect("regenerate");

        assert!(grid.find_runs().is_empty());
        assert_eq!(events, vec![Event::GridGenerated { rows: 3, columns: 3 }]);
    }
}
