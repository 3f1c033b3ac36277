//! Geometry helpers shared by collision, raycasts and spawning
//!
//! Everything here is pure: no world access, no allocation.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Parameter `t` in [0, 1] of the point on segment `a..b` closest to `p`
#[inline]
pub fn segment_projection(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-8 {
        return 0.0; // Degenerate segment
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

/// Closest point to `p` on segment `a..b`
#[inline]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    a + (b - a) * segment_projection(p, a, b)
}

/// Distance from `p` to segment `a..b`
#[inline]
pub fn point_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Box from a center point and half extents
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Box sitting on the ground: footprint centered at (x, z), from y=base up to base+height
    pub fn on_ground(center: Vec2, half: Vec2, base: f32, height: f32) -> Self {
        Self::new(
            Vec3::new(center.x - half.x, base, center.y - half.y),
            Vec3::new(center.x + half.x, base + height, center.y + half.y),
        )
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box by `r` on every side
    pub fn expanded(&self, r: f32) -> Self {
        Self::new(self.min - Vec3::splat(r), self.max + Vec3::splat(r))
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Footprint test ignoring height
    pub fn contains_ground(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.z && p.y <= self.max.z
    }

    /// True if [y0, y1] overlaps the box's vertical extent
    #[inline]
    pub fn overlaps_vertical(&self, y0: f32, y1: f32) -> bool {
        y0 <= self.max.y && y1 >= self.min.y
    }

    /// Closest point of the footprint rectangle to `p`
    #[inline]
    pub fn closest_ground_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.z, self.max.z),
        )
    }

    /// Footprints of the two boxes overlap once each is grown by `margin`
    pub fn intersects_ground(&self, other: &Aabb, margin: f32) -> bool {
        self.min.x - margin <= other.max.x
            && self.max.x + margin >= other.min.x
            && self.min.z - margin <= other.max.z
            && self.max.z + margin >= other.min.z
    }
}

/// Slab test of the segment `origin + dir * t`, t in [0, max_t], against a box.
///
/// Returns the entry parameter. A segment starting inside the box hits at t = 0.
pub fn ray_aabb(origin: Vec3, dir: Vec3, max_t: f32, aabb: &Aabb) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = max_t;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let lo = aabb.min[axis];
        let hi = aabb.max[axis];

        if d.abs() < 1e-8 {
            // Parallel to this slab: must already be inside it
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_distance_interior_and_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);

        assert!((point_segment_distance(Vec3::new(5.0, 3.0, 0.0), a, b) - 3.0).abs() < 1e-5);
        // Beyond the end clamps to b
        assert!((point_segment_distance(Vec3::new(13.0, 4.0, 0.0), a, b) - 5.0).abs() < 1e-5);
        // Degenerate segment is a point
        assert!((point_segment_distance(Vec3::new(0.0, 2.0, 0.0), a, a) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_projection_clamped() {
        let a = Vec3::ZERO;
        let b = Vec3::new(0.0, 0.0, 4.0);
        assert_eq!(segment_projection(Vec3::new(0.0, 0.0, -3.0), a, b), 0.0);
        assert_eq!(segment_projection(Vec3::new(0.0, 0.0, 9.0), a, b), 1.0);
        assert!((segment_projection(Vec3::new(1.0, 0.0, 1.0), a, b) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb::from_center(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(1.0));

        let t = ray_aabb(Vec3::ZERO, Vec3::X, 20.0, &aabb).unwrap();
        assert!((t - 9.0).abs() < 1e-5);

        // Too short to reach
        assert!(ray_aabb(Vec3::ZERO, Vec3::X, 5.0, &aabb).is_none());
        // Passes above
        assert!(ray_aabb(Vec3::new(0.0, 3.0, 0.0), Vec3::X, 20.0, &aabb).is_none());
        // Starting inside hits immediately
        assert_eq!(ray_aabb(Vec3::new(10.0, 0.0, 0.0), Vec3::X, 1.0, &aabb), Some(0.0));
    }

    #[test]
    fn test_aabb_ground_helpers() {
        let aabb = Aabb::on_ground(Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0), 0.0, 3.0);
        assert!(aabb.contains_ground(Vec2::new(1.5, -0.5)));
        assert!(!aabb.contains_ground(Vec2::new(2.5, 0.0)));
        assert_eq!(aabb.closest_ground_point(Vec2::new(5.0, 5.0)), Vec2::new(2.0, 1.0));
        assert!(aabb.overlaps_vertical(2.0, 4.0));
        assert!(!aabb.overlaps_vertical(3.5, 4.0));
    }
}
