//! Gameplay tuning
//!
//! Every tunable lives here so levels can be rebalanced without touching the
//! simulation. Missing fields in a settings file fall back to the defaults in
//! `consts`.

use std::env;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::{Facing, FlightLimits, WeaponTemplates};

/// Environment variable naming a settings file
pub const SETTINGS_ENV: &str = "MAZE_ESCAPE_SETTINGS";

/// Where an enemy's vision cone points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VisionMode {
    /// Constant bearing regardless of facing
    Fixed { degrees: f32 },
    /// Follow the enemy's current facing
    TrackFacing,
}

impl Default for VisionMode {
    fn default() -> Self {
        VisionMode::Fixed {
            degrees: VISION_REFERENCE_DEGREES,
        }
    }
}

impl VisionMode {
    /// Centre of the cone for an observer with the given facing
    pub fn reference_degrees(&self, facing: Facing) -> f32 {
        match self {
            VisionMode::Fixed { degrees } => *degrees,
            VisionMode::TrackFacing => facing.degrees(),
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed
    pub seed: u64,
    /// Simulation ticks per second
    pub tick_rate_hz: f32,

    // === World ===
    pub cell_size: f32,

    // === Player ===
    pub player_size: f32,
    /// Units per second
    pub player_speed: f32,
    pub player_max_health: i32,
    pub shot_animation_ms: f64,

    // === Enemies ===
    pub enemy_size: f32,
    /// Units per second
    pub enemy_speed: f32,
    pub enemy_health: i32,
    pub detection_radius: f32,
    pub enemy_stop_distance: f32,
    pub vision_angle_degrees: f32,
    pub vision: VisionMode,
    pub enemy_contact_damage: i32,
    pub enemy_attack_interval_ms: f64,

    // === Walls and pickups ===
    pub breakable_wall_health: i32,
    pub pickup_size: f32,
    pub health_pickup_amount: i32,
    pub ammo_pickup_amount: u32,

    // === Projectiles ===
    /// Units per second
    pub projectile_speed: f32,
    pub projectile_substep: f32,
    pub projectile_max_range: f32,

    // === Weapons ===
    pub weapons: WeaponTemplates,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 1,
            tick_rate_hz: 1.0 / SIM_DT,

            cell_size: CELL_SIZE,

            player_size: PLAYER_SIZE,
            player_speed: PLAYER_SPEED,
            player_max_health: PLAYER_MAX_HEALTH,
            shot_animation_ms: SHOT_ANIMATION_MS,

            enemy_size: ENEMY_SIZE,
            enemy_speed: ENEMY_SPEED,
            enemy_health: ENEMY_HEALTH,
            detection_radius: DETECTION_RADIUS,
            enemy_stop_distance: ENEMY_STOP_DISTANCE,
            vision_angle_degrees: VISION_ANGLE_DEGREES,
            vision: VisionMode::default(),
            enemy_contact_damage: ENEMY_CONTACT_DAMAGE,
            enemy_attack_interval_ms: ENEMY_ATTACK_INTERVAL_MS,

            breakable_wall_health: BREAKABLE_WALL_HEALTH,
            pickup_size: PICKUP_SIZE,
            health_pickup_amount: HEALTH_PICKUP_AMOUNT,
            ammo_pickup_amount: AMMO_PICKUP_AMOUNT,

            projectile_speed: PROJECTILE_SPEED,
            projectile_substep: PROJECTILE_SUBSTEP,
            projectile_max_range: PROJECTILE_MAX_RANGE,

            weapons: WeaponTemplates::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the file named by `MAZE_ESCAPE_SETTINGS`, or use defaults
    pub fn load_from_env() -> Result<Self, SettingsError> {
        match env::var(SETTINGS_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("tick_rate_hz", self.tick_rate_hz),
            ("cell_size", self.cell_size),
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("pickup_size", self.pickup_size),
            ("projectile_speed", self.projectile_speed),
            ("projectile_substep", self.projectile_substep),
            ("projectile_max_range", self.projectile_max_range),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if self.player_speed < 0.0 || self.enemy_speed < 0.0 {
            return Err(SettingsError::Invalid("speeds must not be negative".into()));
        }
        if !(0.0..=360.0).contains(&self.vision_angle_degrees) {
            return Err(SettingsError::Invalid(format!(
                "vision_angle_degrees must be within 0..=360, got {}",
                self.vision_angle_degrees
            )));
        }
        if self.player_max_health <= 0 || self.enemy_health <= 0 {
            return Err(SettingsError::Invalid("health must be positive".into()));
        }

        for kind in crate::sim::WeaponKind::ALL {
            let stats = self.weapons.get(kind);
            if stats.magazine_capacity == 0 || stats.bullets_per_shot == 0 {
                return Err(SettingsError::Invalid(format!(
                    "{} needs a non-empty magazine and at least one bullet per shot",
                    kind.as_str()
                )));
            }
            if stats.cooldown_ms < 0.0 || stats.reload_ms < 0.0 || stats.spread_degrees < 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "{} timings and spread must not be negative",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Fixed tick length in seconds
    pub fn sim_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    pub fn player_box(&self) -> Vec2 {
        Vec2::splat(self.player_size)
    }

    pub fn enemy_box(&self) -> Vec2 {
        Vec2::splat(self.enemy_size)
    }

    pub fn flight_limits(&self) -> FlightLimits {
        FlightLimits {
            substep: self.projectile_substep,
            max_range: self.projectile_max_range,
        }
    }
}
