//! Maze Escape - A top-down zombie maze shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, vision, weapons, game state)
//! - `levels`: Built-in campaign and level grid loading
//! - `settings`: Data-driven tuning
//! - `error`: Error taxonomy for configuration and API misuse
//!
//! World space is y-down (screen convention): a bearing of 0° points right,
//! 90° points down.

pub mod error;
pub mod levels;
pub mod settings;
pub mod sim;

pub use error::{LevelError, SettingsError, SimError};
pub use levels::{Campaign, LevelGrid};
pub use settings::{Settings, VisionMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Edge length of one grid cell in world units
    pub const CELL_SIZE: f32 = 45.0;
    /// Number of levels in the default campaign
    pub const MAX_LEVEL: usize = 3;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 140.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    /// Shot animation; the player cannot fire again until it finishes
    pub const SHOT_ANIMATION_MS: f64 = 150.0;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 35.0;
    pub const ENEMY_SPEED: f32 = 70.0;
    pub const ENEMY_HEALTH: i32 = 100;
    /// Enemies only pursue targets closer than this
    pub const DETECTION_RADIUS: f32 = 200.0;
    /// Enemies stop approaching once this close
    pub const ENEMY_STOP_DISTANCE: f32 = 10.0;
    pub const VISION_ANGLE_DEGREES: f32 = 160.0;
    /// Fixed vision reference bearing (screen-down)
    pub const VISION_REFERENCE_DEGREES: f32 = 90.0;
    pub const ENEMY_CONTACT_DAMAGE: i32 = 20;
    pub const ENEMY_ATTACK_INTERVAL_MS: f64 = 1000.0;

    /// Walls
    pub const BREAKABLE_WALL_HEALTH: i32 = 100;

    /// Pickups
    pub const PICKUP_SIZE: f32 = 20.0;
    pub const HEALTH_PICKUP_AMOUNT: i32 = 20;
    pub const AMMO_PICKUP_AMOUNT: u32 = 10;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 490.0;
    /// Longest distance a projectile moves between collision checks
    pub const PROJECTILE_SUBSTEP: f32 = 8.0;
    pub const PROJECTILE_MAX_RANGE: f32 = 1200.0;
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Absolute angular distance between two bearings, in [0, 180]
#[inline]
pub fn angular_deviation(a: f32, b: f32) -> f32 {
    normalize_degrees(a - b).abs()
}

/// Bearing in degrees from `from` to `to`
#[inline]
pub fn bearing_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Unit vector pointing along a bearing in degrees
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let r = degrees.to_radians();
    Vec2::new(r.cos(), r.sin())
}
