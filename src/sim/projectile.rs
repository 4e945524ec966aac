//! Projectile motion and hit detection
//!
//! Projectiles are points. Each tick's motion is split into substeps no longer
//! than `substep` so a fast bullet cannot jump over a wall cell. At every
//! substep the checks run in a fixed order: world bounds, walls, enemies. The
//! first hit ends the projectile, which is what lets cover protect enemies.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::weapon::WeaponStats;
use crate::direction_from_degrees;

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Copied from the weapon at spawn
    pub damage: i32,
    pub faction: Faction,
    /// Distance flown so far
    pub traveled: f32,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, damage: i32, faction: Faction) -> Self {
        Self {
            pos,
            vel,
            damage,
            faction,
            traveled: 0.0,
        }
    }
}

/// Flight limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightLimits {
    /// Longest move between two collision checks
    pub substep: f32,
    /// Distance after which a projectile expires
    pub max_range: f32,
}

/// What happened to a projectile during one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Index into the wall slice
    HitWall(usize),
    /// Index into the enemy slice
    HitEnemy(usize),
    OutOfBounds,
    Expired,
}

impl Outcome {
    /// Whether the projectile should be removed
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

/// Advance one projectile by `dt` seconds
///
/// Hit tests use strict point-in-rectangle containment, so a projectile
/// sliding exactly along a wall edge keeps flying.
pub fn advance(
    projectile: &mut Projectile,
    dt: f32,
    walls: &[Rect],
    enemies: &[Rect],
    bounds: &Rect,
    limits: &FlightLimits,
) -> Outcome {
    let motion = projectile.vel * dt;
    let distance = motion.length();
    let steps = if limits.substep > 0.0 {
        ((distance / limits.substep).ceil() as u32).max(1)
    } else {
        1
    };
    let step = motion / steps as f32;
    let step_len = distance / steps as f32;

    for _ in 0..steps {
        projectile.pos += step;
        projectile.traveled += step_len;

        let p = projectile.pos;
        if !bounds.contains_point(p) {
            return Outcome::OutOfBounds;
        }
        if let Some(i) = walls.iter().position(|w| w.contains_point(p)) {
            return Outcome::HitWall(i);
        }
        if let Some(i) = enemies.iter().position(|e| e.contains_point(p)) {
            return Outcome::HitEnemy(i);
        }
        if projectile.traveled >= limits.max_range {
            return Outcome::Expired;
        }
    }

    Outcome::Continue
}

/// Spawn one shot's worth of projectiles
///
/// Each of `bullets_per_shot` projectiles deviates from `aim_degrees` by an
/// independent uniform draw in `[-spread/2, +spread/2]`.
pub fn spawn_volley<R: Rng>(
    origin: Vec2,
    aim_degrees: f32,
    speed: f32,
    stats: &WeaponStats,
    faction: Faction,
    rng: &mut R,
) -> Vec<Projectile> {
    let half = stats.spread_degrees.max(0.0) * 0.5;
    (0..stats.bullets_per_shot)
        .map(|_| {
            let deviation = if half > 0.0 {
                rng.random_range(-half..=half)
            } else {
                0.0
            };
            let dir = direction_from_degrees(aim_degrees + deviation);
            Projectile::new(origin, dir * speed, stats.damage, faction)
        })
        .collect()
}
