//! Collision detection and response for moving bodies
//!
//! Bodies are upright cylinders (horizontal radius + height). Obstacles are
//! boxes. Resolution pushes the body out of each overlapping box in registry
//! order, one independent push per obstacle. There is no iterative relaxation,
//! so a body wedged between two boxes may end up slightly inside one of them.

use glam::{Vec2, Vec3};

use super::geometry::Aabb;
use super::obstacles::ObstacleRegistry;
use crate::consts::COLLISION_EPSILON;
use crate::ground;

/// Result of a body-vs-box check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the box footprint (if hit)
    pub point: Vec2,
    /// Horizontal push direction (away from the box)
    pub normal: Vec2,
    /// Distance to push along `normal`
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle footprint against a box footprint.
///
/// A hit means the center is closer than `radius + COLLISION_EPSILON` to the
/// box. Pushing by `penetration` along `normal` leaves the body exactly that
/// far from the boundary.
pub fn circle_box_collision(center: Vec2, radius: f32, aabb: &Aabb) -> CollisionResult {
    let clearance = radius + COLLISION_EPSILON;
    let closest = aabb.closest_ground_point(center);
    let delta = center - closest;
    let dist = delta.length();

    if dist >= clearance {
        return CollisionResult::miss();
    }

    if dist > 1e-5 {
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: clearance - dist,
        };
    }

    // Center on or inside the footprint: leave through the nearest face
    let faces = [
        (center.x - aabb.min.x, Vec2::NEG_X),
        (aabb.max.x - center.x, Vec2::X),
        (center.y - aabb.min.z, Vec2::NEG_Y),
        (aabb.max.z - center.y, Vec2::Y),
    ];
    let (depth, normal) = faces
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, Vec2::X));

    CollisionResult {
        hit: true,
        point: center + normal * depth,
        normal,
        penetration: depth + clearance,
    }
}

/// Push a body at `candidate` out of every overlapping movement-blocking obstacle.
///
/// `candidate` is the body's feet position; the body spans `height` upward.
pub fn resolve_push_out(
    obstacles: &ObstacleRegistry,
    candidate: Vec3,
    radius: f32,
    height: f32,
) -> Vec3 {
    let span = (candidate.y, candidate.y + height);
    let mut pos = ground(candidate);

    for obstacle in obstacles.query_blocking(candidate, radius, span) {
        let result = circle_box_collision(pos, radius, &obstacle.aabb);
        if result.hit {
            pos += result.normal * result.penetration;
        }
    }

    Vec3::new(pos.x, candidate.y, pos.y)
}
