//! Level definitions
//!
//! Levels are row-major grids of cell codes, stored on disk as
//! `level{n}.json` (`[[1, 1, ...], ...]`). Level ids start at 1.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::CELL_SIZE;
use crate::error::LevelError;
use crate::sim::TileMap;

/// Raw level grid, one `Vec<i32>` per row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelGrid {
    pub rows: Vec<Vec<i32>>,
}

impl LevelGrid {
    pub fn from_rows(rows: &[&[i32]]) -> Self {
        Self {
            rows: rows.iter().map(|r| r.to_vec()).collect(),
        }
    }

    /// Parse a level from its JSON text
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a level file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}

/// Ordered list of levels played in sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    levels: Vec<LevelGrid>,
}

impl Campaign {
    /// Build a campaign, rejecting any level that would not load
    pub fn new(levels: Vec<LevelGrid>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for grid in &levels {
            TileMap::from_grid(grid, CELL_SIZE)?;
        }
        Ok(Self { levels })
    }

    /// Load `level1.json` through `level{count}.json` from a directory
    pub fn load_dir(dir: impl AsRef<Path>, count: usize) -> Result<Self, LevelError> {
        let dir = dir.as_ref();
        let levels = (1..=count)
            .map(|id| LevelGrid::load(dir.join(format!("level{id}.json"))))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Loaded {} levels from {}", levels.len(), dir.display());
        Self::new(levels)
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level by 1-based id
    pub fn level(&self, id: usize) -> Result<&LevelGrid, LevelError> {
        id.checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .ok_or(LevelError::UnknownLevel(id))
    }

    /// Whether `id` is the final level
    pub fn is_last(&self, id: usize) -> bool {
        id >= self.levels.len()
    }
}

impl Default for Campaign {
    /// The three built-in levels
    fn default() -> Self {
        Self {
            levels: vec![
                LevelGrid::from_rows(LEVEL_1),
                LevelGrid::from_rows(LEVEL_2),
                LevelGrid::from_rows(LEVEL_3),
            ],
        }
    }
}

/// Warehouse: handgun only, one breakable shortcut
#[rustfmt::skip]
const LEVEL_1: &[&[i32]] = &[
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1, 5, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 4, 1],
    &[1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1],
    &[1, 0, 0, 3, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1],
    &[1, 0, 0, 0, 0, 0, 0, 0, 1, 2, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1],
    &[1, 1, 1, 6, 1, 1, 0, 0, 1, 0, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 12, 0, 1],
    &[1, 2, 0, 4, 0, 1, 0, 0, 0, 0, 0, 0, 4, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Offices: rifle behind breakable walls
#[rustfmt::skip]
const LEVEL_2: &[&[i32]] = &[
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1, 5, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 4, 1],
    &[1, 0, 0, 0, 1, 0, 4, 0, 0, 0, 1, 0, 0, 0, 0, 1],
    &[1, 0, 2, 0, 6, 0, 0, 0, 11, 0, 6, 0, 0, 10, 0, 1],
    &[1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 1, 1, 6, 1, 1],
    &[1, 1, 6, 1, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 3, 0, 0, 1],
    &[1, 0, 7, 0, 0, 0, 1, 0, 1, 0, 12, 0, 0, 0, 0, 1],
    &[1, 0, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 1],
    &[1, 4, 0, 0, 0, 0, 1, 0, 4, 0, 0, 0, 0, 0, 0, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Hospital: shotgun, dense horde
#[rustfmt::skip]
const LEVEL_3: &[&[i32]] = &[
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1, 5, 0, 0, 0, 1, 0, 0, 4, 0, 0, 1, 0, 0, 0, 0, 4, 1],
    &[1, 0, 8, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 9, 0, 0, 1],
    &[1, 0, 0, 9, 0, 6, 0, 0, 11, 0, 0, 6, 0, 0, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 1, 1, 6, 1, 1, 1],
    &[1, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    &[1, 1, 1, 6, 1, 1, 0, 0, 12, 0, 0, 1, 1, 6, 1, 1, 1, 1],
    &[1, 0, 0, 0, 0, 1, 0, 4, 0, 4, 0, 1, 0, 0, 0, 0, 0, 1],
    &[1, 0, 10, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 4, 0, 3, 0, 1],
    &[1, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    &[1, 2, 0, 0, 0, 1, 0, 4, 0, 0, 0, 1, 0, 0, 0, 0, 4, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];
