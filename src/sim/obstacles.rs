//! Obstacle registry
//!
//! A flat, ordered list of axis-aligned blocking volumes. Movement push-out and
//! projectile raycasts both query it. Gates are the only dynamic obstacles:
//! they slide down into their doorway after being added, so their boxes are
//! recomputed by `refresh_dynamic` before the tick's queries run.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, ray_aabb};
use crate::consts::COLLISION_EPSILON;
use crate::ground;

/// Stable obstacle handle
pub type ObstacleId = u32;

/// Obstacle categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Invisible arena boundary
    Boundary,
    Rock,
    HouseWall,
    CastleWall,
    /// Room gate, present only while its room is locked
    Gate,
}

/// Vertical slide of a gate from raised to closed
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GateMotion {
    /// Box when fully closed
    pub closed: Aabb,
    /// Current lift above the closed position
    pub lift: f32,
    /// Lowering speed (units per second)
    pub speed: f32,
}

/// A blocking volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub aabb: Aabb,
    pub blocks_movement: bool,
    pub blocks_projectiles: bool,
    /// Present for dynamic obstacles
    pub motion: Option<GateMotion>,
}

impl Obstacle {
    /// Static obstacle blocking both movement and projectiles
    pub fn solid(kind: ObstacleKind, aabb: Aabb) -> Self {
        Self {
            id: 0,
            kind,
            aabb,
            blocks_movement: true,
            blocks_projectiles: true,
            motion: None,
        }
    }

    /// Gate that starts raised by its own height and lowers into `closed`
    pub fn gate(closed: Aabb, speed: f32) -> Self {
        let lift = closed.max.y - closed.min.y;
        let mut gate = Self::solid(ObstacleKind::Gate, closed);
        gate.motion = Some(GateMotion {
            closed,
            lift,
            speed,
        });
        gate.recompute();
        gate
    }

    /// Obstacle that stops movement but lets shots through
    pub fn movement_only(mut self) -> Self {
        self.blocks_projectiles = false;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.motion.is_some()
    }

    /// Rebuild the box from the motion state
    fn recompute(&mut self) {
        if let Some(motion) = self.motion {
            let offset = Vec3::new(0.0, motion.lift, 0.0);
            self.aabb = Aabb::new(motion.closed.min + offset, motion.closed.max + offset);
        }
    }
}

/// Result of a segment cast against the registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub obstacle: ObstacleId,
    /// Fraction of the cast displacement where the hit occurs (0..=1)
    pub t: f32,
    pub point: Vec3,
}

/// Ordered obstacle collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
    next_id: ObstacleId,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            next_id: 1,
        }
    }

    /// Register an obstacle, assigning its id
    pub fn add(&mut self, mut obstacle: Obstacle) -> ObstacleId {
        // Default-constructed registries start at 0; keep ids non-zero
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        obstacle.id = id;
        obstacle.recompute();
        self.obstacles.push(obstacle);
        id
    }

    /// Remove an obstacle, preserving the order of the rest
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let index = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(index))
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObstacleId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Advance gate motion and recompute dynamic boxes
    pub fn refresh_dynamic(&mut self, dt: f32) {
        for obstacle in self.obstacles.iter_mut().filter(|o| o.is_dynamic()) {
            if let Some(motion) = obstacle.motion.as_mut() {
                motion.lift = (motion.lift - motion.speed * dt).max(0.0);
            }
            obstacle.recompute();
        }
    }

    /// Movement-blocking obstacles near a body.
    ///
    /// `vertical_span` is the (bottom, top) of the body. Obstacles are yielded
    /// in registry order.
    pub fn query_blocking(
        &self,
        position: Vec3,
        radius: f32,
        vertical_span: (f32, f32),
    ) -> impl Iterator<Item = &Obstacle> {
        let p = ground(position);
        let reach = radius + COLLISION_EPSILON;
        self.obstacles.iter().filter(move |o| {
            o.blocks_movement
                && o.aabb.overlaps_vertical(vertical_span.0, vertical_span.1)
                && o.aabb.closest_ground_point(p).distance_squared(p) <= reach * reach
        })
    }

    /// True if a circle footprint at `p` overlaps any movement-blocking box
    pub fn footprint_blocked(&self, p: Vec2, radius: f32) -> bool {
        self.obstacles.iter().any(|o| {
            o.blocks_movement && o.aabb.closest_ground_point(p).distance_squared(p) < radius * radius
        })
    }

    /// Nearest projectile-blocking obstacle along `origin..origin + displacement`
    pub fn raycast(&self, origin: Vec3, displacement: Vec3) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for obstacle in self.obstacles.iter().filter(|o| o.blocks_projectiles) {
            if let Some(t) = ray_aabb(origin, displacement, 1.0, &obstacle.aabb) {
                if best.is_none_or(|b| t < b.t) {
                    best = Some(RayHit {
                        obstacle: obstacle.id,
                        t,
                        point: origin + displacement * t,
                    });
                }
            }
        }
        best
    }
}
