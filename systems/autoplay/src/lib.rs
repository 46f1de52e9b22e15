#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic autoplay system that drives the grid with swap and advance commands.

use cascade_core::{CellCoord, Command, Direction, Event, TileType};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the autoplay system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rows: u32,
    columns: u32,
    min_run: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration for a grid of the provided shape.
    #[must_use]
    pub const fn new(rows: u32, columns: u32, min_run: usize, rng_seed: u64) -> Self {
        Self {
            rows,
            columns,
            min_run,
            rng_seed,
        }
    }
}

/// Pure system that picks swaps while the grid is idle and advances cascades
/// while one is pending.
#[derive(Debug)]
pub struct Autoplay {
    rows: i32,
    columns: i32,
    min_run: usize,
    rng: ChaCha8Rng,
    resolving: bool,
}

impl Autoplay {
    /// Creates a new autoplay system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rows: i32::try_from(config.rows).unwrap_or(i32::MAX),
            columns: i32::try_from(config.columns).unwrap_or(i32::MAX),
            min_run: config.min_run,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            resolving: false,
        }
    }

    /// Reports whether the last observed events left a cascade pending.
    #[must_use]
    pub const fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Consumes grid events and a tile lookup to emit the next command.
    ///
    /// `type_at` must return `None` for cells outside the grid. Nothing is
    /// emitted unless the events move the cascade state machine.
    pub fn handle<F>(&mut self, events: &[Event], mut type_at: F, out: &mut Vec<Command>)
    where
        F: FnMut(CellCoord) -> Option<TileType>,
    {
        let mut transitioned = false;
        for event in events {
            match event {
                Event::GridGenerated { .. }
                | Event::SwapSettled { .. }
                | Event::CascadeAbandoned { .. } => {
                    self.resolving = false;
                    transitioned = true;
                }
                Event::SwapInitiated { .. } | Event::RunsResolved { .. } => {
                    self.resolving = true;
                    transitioned = true;
                }
                Event::SelectionChanged { .. } => {}
            }
        }

        if !transitioned {
            return;
        }

        if self.resolving {
            out.push(Command::AdvanceCascade);
        } else if let Some((from, to)) = self.select_swap(&mut type_at) {
            out.push(Command::Swap { from, to });
        }
    }

    fn select_swap<F>(&mut self, type_at: &mut F) -> Option<(CellCoord, CellCoord)>
    where
        F: FnMut(CellCoord) -> Option<TileType>,
    {
        let pairs = self.adjacent_pairs();
        let mut productive = Vec::new();
        let mut differing = Vec::new();

        for &(from, to) in &pairs {
            let (Some(from_type), Some(to_type)) = (type_at(from), type_at(to)) else {
                continue;
            };
            if from_type == to_type {
                continue;
            }
            differing.push((from, to));

            let mut swapped = |cell: CellCoord| {
                if cell == from {
                    Some(to_type)
                } else if cell == to {
                    Some(from_type)
                } else {
                    type_at(cell)
                }
            };
            if self.forms_line(&mut swapped, from, to_type)
                || self.forms_line(&mut swapped, to, from_type)
            {
                productive.push((from, to));
            }
        }

        [productive, differing, pairs]
            .into_iter()
            .find(|candidates| !candidates.is_empty())
            .and_then(|candidates| candidates.choose(&mut self.rng).copied())
    }

    /// East and south neighbour pairs in row-major order.
    fn adjacent_pairs(&self) -> Vec<(CellCoord, CellCoord)> {
        let mut pairs = Vec::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(row, column);
                if column + 1 < self.columns {
                    pairs.push((cell, cell.step(Direction::East)));
                }
                if row + 1 < self.rows {
                    pairs.push((cell, cell.step(Direction::South)));
                }
            }
        }
        pairs
    }

    fn forms_line<F>(&self, view: &mut F, cell: CellCoord, tile_type: TileType) -> bool
    where
        F: FnMut(CellCoord) -> Option<TileType>,
    {
        let across = 1
            + reach(view, cell, Direction::East, tile_type)
            + reach(view, cell, Direction::West, tile_type);
        let down = 1
            + reach(view, cell, Direction::North, tile_type)
            + reach(view, cell, Direction::South, tile_type);
        across.max(down) >= self.min_run
    }
}

fn reach<F>(view: &mut F, origin: CellCoord, direction: Direction, tile_type: TileType) -> usize
where
    F: FnMut(CellCoord) -> Option<TileType>,
{
    let mut count = 0;
    let mut position = origin.step(direction);
    while view(position) == Some(tile_type) {
        count += 1;
        position = position.step(direction);
    }
    count
}
