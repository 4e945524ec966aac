//! Enemy line of sight
//!
//! A target is visible when its bearing lies inside the observer's vision cone
//! and the straight segment between them crosses no wall. Once an enemy has
//! seen the player it keeps chasing for good; that memory is the `SeenLatch`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, segment_intersects_rect};
use crate::{angular_deviation, bearing_degrees};

/// Cone and occlusion test
///
/// `reference_degrees` is the centre of the cone; the target is rejected when
/// its bearing deviates by more than half of `vision_angle_degrees`.
pub fn can_see(
    observer: Vec2,
    target: Vec2,
    obstacles: &[Rect],
    vision_angle_degrees: f32,
    reference_degrees: f32,
) -> bool {
    let bearing = bearing_degrees(observer, target);
    if angular_deviation(bearing, reference_degrees) > vision_angle_degrees * 0.5 {
        return false;
    }
    !obstacles
        .iter()
        .any(|wall| segment_intersects_rect(observer, target, wall))
}

/// One-way "has seen the player" flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenLatch(bool);

impl SeenLatch {
    pub fn is_set(&self) -> bool {
        self.0
    }

    /// Set the latch; returns true only on the transition
    pub fn set(&mut self) -> bool {
        let newly = !self.0;
        self.0 = true;
        newly
    }
}
