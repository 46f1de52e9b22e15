//! Layered configuration: defaults, then an optional TOML file, then flags.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use cascade_core::{TileType, DEFAULT_GRID_SIZE, DEFAULT_MIN_RUN};
use cascade_world::{Config, WeightedTable};
use serde::Deserialize;

const DEFAULT_TILES: [(&str, u32); 6] = [
    ("fire", 20),
    ("poison", 20),
    ("water", 20),
    ("coin", 10),
    ("psychic", 20),
    ("ice", 20),
];

/// Contents of a configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    rows: Option<u32>,
    columns: Option<u32>,
    min_run: Option<usize>,
    seed: Option<u64>,
    #[serde(default)]
    tiles: Vec<TileEntry>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct TileEntry {
    pub(crate) name: String,
    pub(crate) weight: u32,
}

/// Values supplied on the command line, which win over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) rows: Option<u32>,
    pub(crate) columns: Option<u32>,
    pub(crate) min_run: Option<usize>,
    pub(crate) seed: Option<u64>,
}

/// Fully resolved settings for one session.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) grid: Config,
    pub(crate) tiles: Vec<TileEntry>,
}

impl Settings {
    pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let rows = overrides.rows.or(file.rows).unwrap_or(DEFAULT_GRID_SIZE);
        let columns = overrides.columns.or(file.columns).unwrap_or(DEFAULT_GRID_SIZE);
        let min_run = overrides.min_run.or(file.min_run).unwrap_or(DEFAULT_MIN_RUN);

        let mut grid = Config::new(rows, columns, min_run);
        if let Some(seed) = overrides.seed.or(file.seed) {
            grid = grid.with_seed(seed);
        }
        grid.validate().context("invalid grid configuration")?;

        let tiles = if file.tiles.is_empty() {
            DEFAULT_TILES
                .iter()
                .map(|(name, weight)| TileEntry {
                    name: (*name).to_owned(),
                    weight: *weight,
                })
                .collect()
        } else {
            file.tiles
        };

        let mut seen = HashSet::new();
        for tile in &tiles {
            if tile.name.trim().is_empty() {
                bail!("tile names must not be blank");
            }
            if !seen.insert(tile.name.as_str()) {
                bail!("tile `{}` is listed more than once", tile.name);
            }
        }

        Ok(Self { grid, tiles })
    }

    /// Palette in declaration order; the n-th tile becomes `TileType(n)`.
    pub(crate) fn palette(&self) -> Result<WeightedTable<TileType>> {
        let mut items = Vec::with_capacity(self.tiles.len());
        for (index, tile) in self.tiles.iter().enumerate() {
            let value = u16::try_from(index).context("too many tile types")?;
            items.push((TileType::new(value), tile.weight));
        }
        WeightedTable::new(items).context("invalid tile palette")
    }
}

pub(crate) fn load(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

pub(crate) fn parse(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("failed to parse configuration toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings =
            Settings::resolve(FileConfig::default(), Overrides::default()).expect("settings");

        assert_eq!(settings.grid, Config::default());
        assert_eq!(settings.tiles.len(), 6);
        assert_eq!(settings.tiles[3].name, "coin");
        assert_eq!(settings.tiles[3].weight, 10);
    }

    #[test]
    fn flags_override_file_values() {
        let file = parse(
            r#"
                rows = 4
                columns = 5
                min_run = 4
                seed = 9
            "#,
        )
        .expect("file");
        let overrides = Overrides {
            columns: Some(8),
            seed: Some(12),
            ..Overrides::default()
        };

        let settings = Settings::resolve(file, overrides).expect("settings");

        assert_eq!(settings.grid.rows(), 4);
        assert_eq!(settings.grid.columns(), 8);
        assert_eq!(settings.grid.min_run(), 4);
        assert_eq!(settings.grid.seed(), 12);
    }

    #[test]
    fn file_tiles_replace_the_default_palette() {
        let file = parse(
            r#"
                [[tiles]]
                name = "ruby"
                weight = 1

                [[tiles]]
                name = "jade"
                weight = 3
            "#,
        )
        .expect("file");

        let settings = Settings::resolve(file, Overrides::default()).expect("settings");
        let palette = settings.palette().expect("palette");

        assert_eq!(palette.len(), 2);
        assert_eq!(palette.weight_of(&TileType::new(1)), Some(3));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = parse("rows = 3\nsparkle = true\n").unwrap_err();
        assert!(format!("{error:#}").contains("sparkle"));
    }

    #[test]
    fn duplicate_tile_names_are_rejected() {
        let file = parse(
            r#"
                [[tiles]]
                name = "ruby"
                weight = 1

                [[tiles]]
                name = "ruby"
                weight = 2
            "#,
        )
        .expect("file");

        assert!(Settings::resolve(file, Overrides::default()).is_err());
    }

    #[test]
    fn invalid_grid_values_are_reported() {
        let overrides = Overrides {
            min_run: Some(1),
            ..Overrides::default()
        };
        let error = Settings::resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(format!("{error:#}").contains("minimum run length"));
    }

    #[test]
    fn all_zero_weights_fail_palette_construction() {
        let file = parse(
            r#"
                [[tiles]]
                name = "ruby"
                weight = 0
            "#,
        )
        .expect("file");
        let settings = Settings::resolve(file, Overrides::default()).expect("settings");

        assert!(settings.palette().is_err());
    }
}
