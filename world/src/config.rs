use cascade_core::{DEFAULT_GRID_SIZE, DEFAULT_MIN_RUN};

use crate::GridError;

const DEFAULT_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Construction parameters for a [`crate::TileGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    rows: u32,
    columns: u32,
    min_run: usize,
    seed: u64,
}

impl Config {
    /// Creates a configuration with the default seed.
    #[must_use]
    pub const fn new(rows: u32, columns: u32, min_run: usize) -> Self {
        Self {
            rows,
            columns,
            min_run,
            seed: DEFAULT_SEED,
        }
    }

    /// Replaces the seed used for the grid's own random source.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Minimum straight-line length for a group to be removed.
    #[must_use]
    pub const fn min_run(&self) -> usize {
        self.min_run
    }

    /// Seed for the grid's random source.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Checks the configuration against the grid's construction contract.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(GridError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.min_run < 2 {
            return Err(GridError::InvalidMinRun {
                min_run: self.min_run,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE, DEFAULT_MIN_RUN)
    }
}
