use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use super::config::TILE_SIZE;

/// Liquid terrain; always walkable, drawn animated.
pub(crate) const LIQUID_CHAR: char = 'W';
/// Decorative terrain drawn from the collage texture; always walkable.
pub(crate) const COLLAGE_CHAR: char = 'C';
pub(crate) const GRASS_CHAR: char = 'G';

pub(crate) type TileCoord = (i32, i32);

/// Tile containing a continuous world coordinate.
pub(crate) fn tile_of(world_units: f32) -> i32 {
    (world_units / TILE_SIZE).floor() as i32
}

pub(crate) fn is_reserved(ch: char) -> bool {
    ch == LIQUID_CHAR || ch == COLLAGE_CHAR
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WorldMapDocument {
    #[serde(default)]
    pub(crate) legend: BTreeMap<String, String>,
    #[serde(default)]
    pub(crate) rows: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum WorldMapError {
    #[error("world map has no rows")]
    NoRows,
    #[error("world map has an empty first row")]
    EmptyFirstRow,
    #[error("world map row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("world map legend key `{key}` is not a single character")]
    InvalidLegendKey { key: String },
}

/// Immutable character grid; row 0 is the northmost row.
#[derive(Debug, Clone)]
pub(crate) struct WorldMap {
    legend: BTreeMap<char, String>,
    cells: Vec<char>,
    width: usize,
    height: usize,
}

impl WorldMap {
    pub(crate) fn from_document(document: WorldMapDocument) -> Result<Self, WorldMapError> {
        let WorldMapDocument { legend, rows } = document;

        let mut parsed_legend = BTreeMap::new();
        for (key, name) in legend {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => {
                    parsed_legend.insert(ch, name);
                }
                _ => return Err(WorldMapError::InvalidLegendKey { key }),
            }
        }

        let Some(first) = rows.first() else {
            return Err(WorldMapError::NoRows);
        };
        let width = first.chars().count();
        if width == 0 {
            return Err(WorldMapError::EmptyFirstRow);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(WorldMapError::RaggedRows {
                    row: row_index,
                    expected: width,
                    actual,
                });
            }
            cells.extend(row.chars());
        }

        Ok(Self {
            legend: parsed_legend,
            cells,
            width,
            height: rows.len(),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Result<Self, WorldMapError> {
        Self::from_document(WorldMapDocument {
            legend: BTreeMap::new(),
            rows: rows.iter().map(|row| row.to_string()).collect(),
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    /// `None` outside the grid.
    pub(crate) fn char_at(&self, tx: i32, ty: i32) -> Option<char> {
        if tx < 0 || ty < 0 {
            return None;
        }
        let (x, y) = (tx as usize, ty as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    pub(crate) fn legend_name(&self, ch: char) -> Option<&str> {
        self.legend.get(&ch).map(String::as_str)
    }
}
