//! Axis-aligned collision detection and movement resolution
//!
//! Every moving entity (player and enemies alike) goes through the same
//! three-tier rule: try the full displacement, then horizontal only, then
//! vertical only. Horizontal is always tried before vertical; that order is
//! what makes entities slide along walls the way they do.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle with top-left corner `pos` and extent `size`
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half-open overlap test: touching edges do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Strict interior test (points on the border are outside)
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Whether `inner` lies entirely within this rectangle (borders included)
    #[inline]
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        inner.min.x >= self.min.x
            && inner.min.y >= self.min.y
            && inner.max.x <= self.max.x
            && inner.max.y <= self.max.y
    }
}

/// Which resolution tier produced the final position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTier {
    /// Full 2D displacement applied
    Direct,
    /// Only the horizontal component applied
    Horizontal,
    /// Only the vertical component applied
    Vertical,
    /// Every tier blocked, position unchanged
    Blocked,
}

/// Outcome of a resolved move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub pos: Vec2,
    pub tier: MoveTier,
}

impl Resolution {
    /// Displacement that was actually executed
    pub fn executed(&self, from: Vec2) -> Vec2 {
        self.pos - from
    }
}

/// Whether a box at `pos` would overlap an obstacle or leave the bounds
fn is_blocked(pos: Vec2, size: Vec2, obstacles: &[Rect], bounds: Option<&Rect>) -> bool {
    let candidate = Rect::from_pos_size(pos, size);
    if let Some(bounds) = bounds {
        if !bounds.contains_rect(&candidate) {
            return true;
        }
    }
    obstacles.iter().any(|o| candidate.overlaps(o))
}

/// Resolve a move with the full -> horizontal -> vertical fallback
///
/// A single-axis tier whose component is zero would not move the entity, so
/// it counts as blocked.
pub fn resolve_move_detailed(
    current: Vec2,
    delta: Vec2,
    size: Vec2,
    obstacles: &[Rect],
    bounds: Option<&Rect>,
) -> Resolution {
    if delta == Vec2::ZERO {
        return Resolution {
            pos: current,
            tier: MoveTier::Blocked,
        };
    }

    let full = current + delta;
    if !is_blocked(full, size, obstacles, bounds) {
        return Resolution {
            pos: full,
            tier: MoveTier::Direct,
        };
    }

    if delta.x != 0.0 {
        let horizontal = Vec2::new(current.x + delta.x, current.y);
        if !is_blocked(horizontal, size, obstacles, bounds) {
            return Resolution {
                pos: horizontal,
                tier: MoveTier::Horizontal,
            };
        }
    }

    if delta.y != 0.0 {
        let vertical = Vec2::new(current.x, current.y + delta.y);
        if !is_blocked(vertical, size, obstacles, bounds) {
            return Resolution {
                pos: vertical,
                tier: MoveTier::Vertical,
            };
        }
    }

    Resolution {
        pos: current,
        tier: MoveTier::Blocked,
    }
}

/// Resolve a move against obstacles only
pub fn resolve_move(current: Vec2, delta: Vec2, size: Vec2, obstacles: &[Rect]) -> Vec2 {
    resolve_move_detailed(current, delta, size, obstacles, None).pos
}

/// Resolve a move against obstacles, treating the world edge as a wall
pub fn resolve_move_within(
    current: Vec2,
    delta: Vec2,
    size: Vec2,
    obstacles: &[Rect],
    bounds: &Rect,
) -> Vec2 {
    resolve_move_detailed(current, delta, size, obstacles, Some(bounds)).pos
}

/// Segment vs rectangle test (Liang-Barsky clipping)
///
/// The rectangle is half-open like `overlaps`: it owns its min edges but not
/// its max edges, so a segment touching only the right or bottom edge misses.
pub fn segment_intersects_rect(a: Vec2, b: Vec2, rect: &Rect) -> bool {
    let d = b - a;
    let p = [-d.x, d.x, -d.y, d.y];
    let q = [
        a.x - rect.min.x,
        rect.max.x - a.x,
        a.y - rect.min.y,
        rect.max.y - a.y,
    ];

    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    for (pi, qi) in p.into_iter().zip(q) {
        if pi == 0.0 {
            // Parallel to this edge and outside of it
            if qi < 0.0 {
                return false;
            }
        } else {
            let t = qi / pi;
            if pi < 0.0 {
                if t > t1 {
                    return false;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return false;
                }
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return false;
    }

    // Clipped against the closed box; x and y are linear along the segment,
    // so the midpoint sits on a max edge only if the whole clip does
    let mid = a + d * ((t0 + t1) * 0.5);
    mid.x < rect.max.x && mid.y < rect.max.y
}
