//! Error taxonomy
//!
//! Only configuration and loading can fail. Running out of ammo or reloading a
//! full magazine are normal outcomes and never surface here.

use thiserror::Error;

use crate::sim::WeaponKind;

/// A level definition that cannot be turned into a playable map
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell code {code} at row {row}, column {col}")]
    UnknownCell { row: usize, col: usize, code: i32 },
    #[error("level has no player spawn")]
    MissingPlayerSpawn,
    #[error("no level with id {0}")]
    UnknownLevel(usize),
    #[error("malformed level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings that could not be loaded or make no sense
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Misuse of the simulation API
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("weapon {0:?} is not owned")]
    WeaponNotOwned(WeaponKind),
}
