//! Static tile map for one level
//!
//! Built once per level load from a pre-parsed grid of cell codes. Grid
//! coordinates scale to world space by the configured cell size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::weapon::WeaponKind;
use crate::error::LevelError;
use crate::levels::LevelGrid;

/// Meaning of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellCode {
    Empty,
    Wall,
    BreakableWall,
    AmmoPickup(WeaponKind),
    HealthPickup,
    WeaponPickup(WeaponKind),
    EnemySpawn,
    PlayerSpawn,
    Corpse,
    Blood,
}

impl TryFrom<i32> for CellCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => CellCode::Empty,
            1 => CellCode::Wall,
            2 => CellCode::AmmoPickup(WeaponKind::Handgun),
            3 => CellCode::HealthPickup,
            4 => CellCode::EnemySpawn,
            5 => CellCode::PlayerSpawn,
            6 => CellCode::BreakableWall,
            7 => CellCode::WeaponPickup(WeaponKind::Rifle),
            8 => CellCode::WeaponPickup(WeaponKind::Shotgun),
            9 => CellCode::AmmoPickup(WeaponKind::Shotgun),
            10 => CellCode::AmmoPickup(WeaponKind::Rifle),
            11 => CellCode::Corpse,
            12 => CellCode::Blood,
            other => return Err(other),
        })
    }
}

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

/// One decoded tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub cell: Cell,
    pub code: CellCode,
}

/// Validated, rectangular tile map
#[derive(Debug, Clone)]
pub struct TileMap {
    cols: usize,
    rows: usize,
    cell_size: f32,
    cells: Vec<CellCode>,
    player_spawn: Cell,
}

impl TileMap {
    /// Decode a raw grid, failing on ragged rows, unknown codes or a missing
    /// player spawn
    pub fn from_grid(grid: &LevelGrid, cell_size: f32) -> Result<Self, LevelError> {
        let rows = grid.rows.len();
        let cols = grid.rows.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(LevelError::Empty);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        let mut player_spawn = None;
        for (row, line) in grid.rows.iter().enumerate() {
            if line.len() != cols {
                return Err(LevelError::Ragged {
                    row,
                    expected: cols,
                    found: line.len(),
                });
            }
            for (col, &code) in line.iter().enumerate() {
                let decoded = CellCode::try_from(code)
                    .map_err(|code| LevelError::UnknownCell { row, col, code })?;
                if decoded == CellCode::PlayerSpawn {
                    if player_spawn.is_some() {
                        log::debug!("duplicate player spawn at ({col}, {row}), using the later one");
                    }
                    player_spawn = Some(Cell { col, row });
                }
                cells.push(decoded);
            }
        }

        let player_spawn = player_spawn.ok_or(LevelError::MissingPlayerSpawn)?;
        Ok(Self {
            cols,
            rows,
            cell_size,
            cells,
            player_spawn,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Code at a grid coordinate, `None` outside the map
    pub fn code_at(&self, cell: Cell) -> Option<CellCode> {
        if cell.col >= self.cols || cell.row >= self.rows {
            return None;
        }
        self.cells.get(cell.row * self.cols + cell.col).copied()
    }

    /// World position of a cell's top-left corner
    #[inline]
    pub fn cell_origin(&self, cell: Cell) -> Vec2 {
        Vec2::new(cell.col as f32, cell.row as f32) * self.cell_size
    }

    /// World rectangle covered by a cell
    #[inline]
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        Rect::from_pos_size(self.cell_origin(cell), Vec2::splat(self.cell_size))
    }

    /// Extent of the whole map in world units
    pub fn world_bounds(&self) -> Rect {
        Rect::new(
            Vec2::ZERO,
            Vec2::new(self.cols as f32, self.rows as f32) * self.cell_size,
        )
    }

    pub fn player_spawn(&self) -> Cell {
        self.player_spawn
    }

    /// Every tile in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().enumerate().map(|(i, &code)| Tile {
            cell: Cell {
                col: i % self.cols,
                row: i / self.cols,
            },
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<i32>>) -> LevelGrid {
        LevelGrid { rows }
    }

    #[test]
    fn test_decodes_every_known_code() {
        for code in 0..=12 {
            assert!(CellCode::try_from(code).is_ok(), "code {code}");
        }
        assert_eq!(CellCode::try_from(13), Err(13));
        assert_eq!(CellCode::try_from(-1), Err(-1));
    }

    #[test]
    fn test_builds_map_and_world_geometry() {
        let map = TileMap::from_grid(&grid(vec![vec![1, 1, 1], vec![1, 5, 6]]), 45.0).unwrap();
        assert_eq!(map.cols(), 3);
        assert_eq!(map.rows(), 2);
        assert_eq!(map.player_spawn(), Cell { col: 1, row: 1 });
        assert_eq!(map.cell_origin(map.player_spawn()), Vec2::new(45.0, 45.0));
        assert_eq!(map.world_bounds().max, Vec2::new(135.0, 90.0));
        assert_eq!(map.code_at(Cell { col: 2, row: 1 }), Some(CellCode::BreakableWall));
        assert_eq!(map.code_at(Cell { col: 3, row: 0 }), None);
        assert_eq!(map.tiles().count(), 6);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = TileMap::from_grid(&grid(vec![vec![5, 0, 0], vec![0, 0]]), 45.0).unwrap_err();
        assert!(matches!(
            err,
            LevelError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_codes() {
        let err = TileMap::from_grid(&grid(vec![vec![5, 42]]), 45.0).unwrap_err();
        assert!(matches!(
            err,
            LevelError::UnknownCell {
                row: 0,
                col: 1,
                code: 42
            }
        ));
    }

    #[test]
    fn test_rejects_empty_and_spawnless_grids() {
        assert!(matches!(
            TileMap::from_grid(&grid(vec![]), 45.0),
            Err(LevelError::Empty)
        ));
        assert!(matches!(
            TileMap::from_grid(&grid(vec![vec![0, 1]]), 45.0),
            Err(LevelError::MissingPlayerSpawn)
        ));
    }
}
