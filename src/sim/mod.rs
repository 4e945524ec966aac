//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities kept in spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod grid;
pub mod projectile;
pub mod pursuit;
pub mod state;
pub mod stepper;
pub mod tick;
pub mod vision;
pub mod weapon;

pub use collision::{MoveTier, Rect, Resolution, resolve_move, resolve_move_detailed, resolve_move_within};
pub use grid::{Cell, CellCode, Tile, TileMap};
pub use projectile::{Faction, FlightLimits, Outcome, Projectile, advance, spawn_volley};
pub use pursuit::{Facing, Pursuit, pursue};
pub use state::{
    ActionState, Decal, DecalKind, Enemy, EnemyView, GameEvent, GamePhase, GameState, Pickup,
    PickupKind, Player, PlayerView, ProjectileView, Snapshot, Wall, WallKind,
};
pub use stepper::FixedStepper;
pub use tick::{MoveIntent, TickInput, tick};
pub use vision::{SeenLatch, can_see};
pub use weapon::{
    Arsenal, FireOutcome, ReloadOutcome, Weapon, WeaponKind, WeaponState, WeaponStats,
    WeaponTemplates,
};
