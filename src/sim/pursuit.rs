//! Enemy pursuit
//!
//! Straight-line chase toward the target, resolved through the shared
//! collision fallback. No global path planning: an enemy whose every tier is
//! blocked simply waits.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{MoveTier, Rect, resolve_move_detailed};

/// Cardinal facing used for sprite selection and vision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Bearing in degrees (y-down: down is 90°)
    pub fn degrees(self) -> f32 {
        match self {
            Facing::Right => 0.0,
            Facing::Down => 90.0,
            Facing::Left => 180.0,
            Facing::Up => -90.0,
        }
    }

    /// Unit vector of the facing
    pub fn vector(self) -> Vec2 {
        match self {
            Facing::Right => Vec2::X,
            Facing::Down => Vec2::Y,
            Facing::Left => Vec2::NEG_X,
            Facing::Up => Vec2::NEG_Y,
        }
    }

    fn horizontal(dx: f32) -> Self {
        if dx > 0.0 { Facing::Right } else { Facing::Left }
    }

    fn vertical(dy: f32) -> Self {
        if dy > 0.0 { Facing::Down } else { Facing::Up }
    }

    /// Facing for a displacement: the dominant axis wins, ties go vertical
    pub fn from_delta(delta: Vec2) -> Option<Self> {
        if delta == Vec2::ZERO {
            None
        } else if delta.x.abs() > delta.y.abs() {
            Some(Self::horizontal(delta.x))
        } else {
            Some(Self::vertical(delta.y))
        }
    }

    /// Facing after a resolved move
    pub fn after_move(self, delta: Vec2, tier: MoveTier) -> Self {
        match tier {
            MoveTier::Direct => Self::from_delta(delta).unwrap_or(self),
            MoveTier::Horizontal => Self::horizontal(delta.x),
            MoveTier::Vertical => Self::vertical(delta.y),
            MoveTier::Blocked => self,
        }
    }
}

/// Result of one pursuit step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pursuit {
    pub pos: Vec2,
    pub facing: Facing,
    /// False when the enemy stayed put (too close or fully blocked)
    pub moved: bool,
}

/// Take one step of `step` units from `from` toward `target`
///
/// Within `stop_distance` of the target (including exactly on top of it) the
/// enemy holds position and keeps its facing.
#[allow(clippy::too_many_arguments)]
pub fn pursue(
    from: Vec2,
    facing: Facing,
    target: Vec2,
    size: Vec2,
    step: f32,
    stop_distance: f32,
    obstacles: &[Rect],
    bounds: Option<&Rect>,
) -> Pursuit {
    let to_target = target - from;
    let distance = to_target.length();
    if distance <= stop_distance.max(0.0) {
        return Pursuit {
            pos: from,
            facing,
            moved: false,
        };
    }

    let delta = to_target / distance * step;
    let res = resolve_move_detailed(from, delta, size, obstacles, bounds);
    Pursuit {
        pos: res.pos,
        facing: facing.after_move(res.executed(from), res.tier),
        moved: res.tier != MoveTier::Blocked,
    }
}
