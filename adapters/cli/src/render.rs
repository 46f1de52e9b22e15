//! Text presentation of the grid, one letter per tile.

use std::fmt::Write as _;

use cascade_core::TileType;

const EMPTY_SLOT: char = '.';
const UNKNOWN_TYPE: char = '?';

/// Letter assignment for every tile type in the palette.
#[derive(Clone, Debug)]
pub(crate) struct Legend {
    entries: Vec<(char, String)>,
}

impl Legend {
    /// Assigns each name the first of its letters not already taken.
    ///
    /// Names whose letters are all taken fall back to a digit.
    pub(crate) fn new<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(char, String)> = Vec::new();
        for (index, name) in names.into_iter().enumerate() {
            let letter = name
                .chars()
                .filter(|candidate| candidate.is_alphanumeric())
                .map(|candidate| candidate.to_ascii_uppercase())
                .find(|candidate| entries.iter().all(|(taken, _)| taken != candidate))
                .or_else(|| {
                    u32::try_from(index % 10)
                        .ok()
                        .and_then(|digit| char::from_digit(digit, 10))
                })
                .unwrap_or(UNKNOWN_TYPE);
            entries.push((letter, name.to_owned()));
        }
        Self { entries }
    }

    pub(crate) fn letter(&self, tile_type: Option<TileType>) -> char {
        let Some(tile_type) = tile_type else {
            return EMPTY_SLOT;
        };
        self.entries
            .get(usize::from(tile_type.get()))
            .map_or(UNKNOWN_TYPE, |(letter, _)| *letter)
    }

    pub(crate) fn name(&self, tile_type: TileType) -> &str {
        self.entries
            .get(usize::from(tile_type.get()))
            .map_or("unknown", |(_, name)| name.as_str())
    }

    /// `F=fire W=water ...` in palette order.
    pub(crate) fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|(letter, name)| format!("{letter}={name}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders rows of tile types as space-separated letters.
    pub(crate) fn render(&self, layout: &[Vec<Option<TileType>>]) -> String {
        let mut output = String::new();
        for row in layout {
            let line = row
                .iter()
                .map(|tile_type| self.letter(*tile_type).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(output, "  {line}");
        }
        output
    }
}
