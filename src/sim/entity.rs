//! Simulated actors: enemies, the boss, targets and powerups

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::player::RewardKind;
use super::rooms::RoomId;
use crate::consts::*;
use crate::ground;

/// Stable entity handle (also the render handle)
pub type EntityId = u32;

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Melee,
    Ranged,
    Boss,
    Target,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Melee => "melee",
            EntityKind::Ranged => "ranged",
            EntityKind::Boss => "boss",
            EntityKind::Target => "target",
        }
    }

    /// Score awarded for destroying one
    pub fn score(&self) -> u32 {
        match self {
            EntityKind::Target => SCORE_TARGET,
            EntityKind::Melee | EntityKind::Ranged => SCORE_ENEMY,
            EntityKind::Boss => SCORE_BOSS,
        }
    }

    pub fn is_enemy(&self) -> bool {
        !matches!(self, EntityKind::Target)
    }

    /// Base stats before floor scaling
    pub fn stats(&self) -> KindStats {
        match self {
            EntityKind::Melee => KindStats {
                health: 60,
                radius: 0.6,
                height: 1.8,
                speed: 4.5,
            },
            EntityKind::Ranged => KindStats {
                health: 40,
                radius: 0.55,
                height: 1.8,
                speed: 3.5,
            },
            EntityKind::Boss => KindStats {
                health: 800,
                radius: 1.6,
                height: 4.0,
                speed: 3.0,
            },
            EntityKind::Target => KindStats {
                health: 60,
                radius: 0.5,
                height: 1.6,
                speed: 0.0,
            },
        }
    }
}

/// Per-kind physical stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    pub health: i32,
    pub radius: f32,
    pub height: f32,
    pub speed: f32,
}

impl KindStats {
    /// Enemies gain 15% health per floor past the first; targets never scale
    pub fn for_floor(kind: EntityKind, floor: u32) -> Self {
        let mut stats = kind.stats();
        if kind.is_enemy() {
            let factor = 1.0 + 0.15 * floor.saturating_sub(1) as f32;
            stats.health = (stats.health as f32 * factor).round() as i32;
        }
        stats
    }
}

/// Which population an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Free-roaming; replaced when killed
    Overworld,
    /// Spawned by a room wave; counted for the room's clear check
    Room(RoomId),
}

/// Kind-specific behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Melee {
        attack_cooldown: f32,
    },
    Ranged {
        shoot_cooldown: f32,
        /// Seeds the strafe oscillation so ranged enemies don't move in lockstep
        strafe_phase: f32,
    },
    Boss {
        aimed_cooldown: f32,
        burst_cooldown: f32,
    },
    Target {
        base_y: f32,
        bob_phase: f32,
    },
}

impl Behavior {
    /// Fresh behaviour state with randomized timers
    pub fn new(kind: EntityKind, base_y: f32, rng: &mut impl Rng) -> Self {
        match kind {
            EntityKind::Melee => Behavior::Melee {
                attack_cooldown: 0.0,
            },
            EntityKind::Ranged => Behavior::Ranged {
                shoot_cooldown: rng.random_range(RANGED_COOLDOWN.0..RANGED_COOLDOWN.1),
                strafe_phase: rng.random_range(0.0..std::f32::consts::TAU),
            },
            EntityKind::Boss => Behavior::Boss {
                aimed_cooldown: rng.random_range(BOSS_AIMED_COOLDOWN.0..BOSS_AIMED_COOLDOWN.1),
                burst_cooldown: rng.random_range(BOSS_BURST_COOLDOWN.0..BOSS_BURST_COOLDOWN.1),
            },
            EntityKind::Target => Behavior::Target {
                base_y,
                bob_phase: rng.random_range(0.0..std::f32::consts::TAU),
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Behavior::Melee { .. } => EntityKind::Melee,
            Behavior::Ranged { .. } => EntityKind::Ranged,
            Behavior::Boss { .. } => EntityKind::Boss,
            Behavior::Target { .. } => EntityKind::Target,
        }
    }
}

/// An enemy, the boss, or a destructible target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub behavior: Behavior,
    /// Feet position
    pub pos: Vec3,
    /// Facing (radians around +Y)
    pub yaw: f32,
    pub health: i32,
    pub max_health: i32,
    pub radius: f32,
    pub height: f32,
    pub speed: f32,
    pub scope: Scope,
    /// Remaining damage-flash time (seconds)
    pub flash: f32,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        pos: Vec3,
        scope: Scope,
        floor: u32,
        rng: &mut impl Rng,
    ) -> Self {
        let stats = KindStats::for_floor(kind, floor);
        Self {
            id,
            behavior: Behavior::new(kind, pos.y, rng),
            pos,
            yaw: rng.random_range(-std::f32::consts::PI..std::f32::consts::PI),
            health: stats.health,
            max_health: stats.health,
            radius: stats.radius,
            height: stats.height,
            speed: stats.speed,
            scope,
            flash: 0.0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.behavior.kind()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Box used for projectile hits
    pub fn hit_box(&self) -> Aabb {
        Aabb::on_ground(ground(self.pos), Vec2::splat(self.radius), self.pos.y, self.height)
    }

    /// Body center
    pub fn center(&self) -> Vec3 {
        self.pos + Vec3::Y * (self.height * 0.5)
    }

    /// Where this entity's shots originate
    pub fn muzzle(&self) -> Vec3 {
        self.pos + Vec3::Y * (self.height * 0.75)
    }

    pub fn in_room(&self, room: RoomId) -> bool {
        self.scope == Scope::Room(room)
    }
}

/// Stable powerup handle
pub type PowerupId = u32;

/// A collectible reward lying in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: PowerupId,
    pub kind: RewardKind,
    pub pos: Vec3,
    pub base_y: f32,
    pub yaw: f32,
    pub bob_phase: f32,
    pub pickup_radius: f32,
}

impl Powerup {
    pub fn new(id: PowerupId, kind: RewardKind, ground_pos: Vec3, bob_phase: f32) -> Self {
        let base_y = ground_pos.y + POWERUP_HOVER_HEIGHT;
        Self {
            id,
            kind,
            pos: Vec3::new(ground_pos.x, base_y, ground_pos.z),
            base_y,
            yaw: 0.0,
            bob_phase,
            pickup_radius: POWERUP_PICKUP_RADIUS,
        }
    }
}
