//! Render-facing view of the world
//!
//! The renderer never holds references into the simulation. Each frame it asks
//! for a `RenderSnapshot` and keys its scene objects by the stable ids inside.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::obstacles::ObstacleKind;
use super::player::{RewardKind, Weapon};
use super::rooms::{RoomKind, RoomState};
use super::state::{Owner, RewardOffer, World};
use crate::consts::HIT_FLASH_DURATION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec3,
    pub health: i32,
    pub max_health: i32,
    pub shield: i32,
    pub weapon: Weapon,
    pub rifle_ammo: u32,
    pub shotgun_ammo: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub yaw: f32,
    pub radius: f32,
    pub height: f32,
    /// Remaining health (0..=1)
    pub health: f32,
    /// Damage flash intensity (0..=1)
    pub flash: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec3,
    pub radius: f32,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerView {
    pub id: u32,
    pub from: Vec3,
    pub to: Vec3,
    pub owner: Owner,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupView {
    pub id: u32,
    pub kind: RewardKind,
    pub pos: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    pub id: u32,
    pub kind: RoomKind,
    pub state: RoomState,
    pub entry: Vec3,
    pub wave: u32,
    pub total_waves: u32,
}

/// Everything the renderer and HUD need for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub time: f32,
    pub floor: u32,
    pub score: u64,
    pub boss_alive: bool,
    pub player: PlayerView,
    pub entities: Vec<EntityView>,
    pub projectiles: Vec<ProjectileView>,
    pub tracers: Vec<TracerView>,
    pub powerups: Vec<PowerupView>,
    pub obstacles: Vec<ObstacleView>,
    pub rooms: Vec<RoomView>,
    pub pending_reward: Option<RewardOffer>,
}

/// Per-instance GPU data for one drawable box
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceData {
    pub position: [f32; 3],
    pub yaw: f32,
    pub scale: [f32; 3],
    /// Instance category (see `instance_kinds`), stored as a float so the
    /// whole buffer reads back as one `Float32Array`
    pub kind: f32,
    pub color: [f32; 4],
}

/// Category ids written into `InstanceData::kind`
pub mod instance_kinds {
    pub const OBSTACLE: f32 = 0.0;
    pub const MELEE: f32 = 1.0;
    pub const RANGED: f32 = 2.0;
    pub const BOSS: f32 = 3.0;
    pub const TARGET: f32 = 4.0;
    pub const POWERUP: f32 = 5.0;
    pub const PLAYER_SHOT: f32 = 6.0;
    pub const ENEMY_SHOT: f32 = 7.0;
}

/// Colors for instance kinds
pub mod colors {
    pub const ROCK: [f32; 4] = [0.45, 0.42, 0.38, 1.0];
    pub const WALL: [f32; 4] = [0.6, 0.55, 0.5, 1.0];
    pub const GATE: [f32; 4] = [0.35, 0.25, 0.15, 1.0];
    pub const MELEE: [f32; 4] = [0.85, 0.2, 0.2, 1.0];
    pub const RANGED: [f32; 4] = [0.9, 0.6, 0.1, 1.0];
    pub const BOSS: [f32; 4] = [0.5, 0.1, 0.6, 1.0];
    pub const TARGET: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
    pub const POWERUP: [f32; 4] = [0.2, 0.9, 0.5, 1.0];
    pub const PLAYER_SHOT: [f32; 4] = [1.0, 0.95, 0.6, 1.0];
    pub const ENEMY_SHOT: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
    pub const FLASH: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

impl World {
    /// Capture the current frame for rendering
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            time: self.time,
            floor: self.floor,
            score: self.score,
            boss_alive: self.boss_alive,
            player: PlayerView {
                pos: self.player.pos,
                health: self.player.health,
                max_health: self.player.max_health,
                shield: self.player.shield,
                weapon: self.player.ready_weapon(),
                rifle_ammo: self.player.rifle_ammo,
                shotgun_ammo: self.player.shotgun_ammo,
            },
            entities: self
                .entities
                .iter()
                .map(|e| EntityView {
                    id: e.id,
                    kind: e.kind(),
                    pos: e.pos,
                    yaw: e.yaw,
                    radius: e.radius,
                    height: e.height,
                    health: e.health as f32 / e.max_health.max(1) as f32,
                    flash: (e.flash / HIT_FLASH_DURATION).clamp(0.0, 1.0),
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    pos: p.pos,
                    radius: p.radius,
                    owner: p.owner,
                })
                .collect(),
            tracers: self
                .tracers
                .iter()
                .map(|t| TracerView {
                    id: t.id,
                    from: t.from,
                    to: t.to,
                    owner: t.owner,
                    opacity: t.opacity(),
                })
                .collect(),
            powerups: self
                .powerups
                .iter()
                .map(|p| PowerupView {
                    id: p.id,
                    kind: p.kind,
                    pos: p.pos,
                    yaw: p.yaw,
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .filter(|o| o.kind != ObstacleKind::Boundary)
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: o.kind,
                    min: o.aabb.min,
                    max: o.aabb.max,
                })
                .collect(),
            rooms: self
                .rooms
                .iter()
                .map(|r| RoomView {
                    id: r.id,
                    kind: r.kind,
                    state: r.state,
                    entry: r.entry,
                    wave: r.wave_index,
                    total_waves: r.total_waves,
                })
                .collect(),
            pending_reward: self.pending_reward.clone(),
        }
    }
}

impl RenderSnapshot {
    /// Flatten drawable boxes into GPU instances
    pub fn instances(&self) -> Vec<InstanceData> {
        let mut out = Vec::with_capacity(
            self.obstacles.len() + self.entities.len() + self.powerups.len() + self.projectiles.len(),
        );

        for o in &self.obstacles {
            let color = match o.kind {
                ObstacleKind::Rock => colors::ROCK,
                ObstacleKind::Gate => colors::GATE,
                _ => colors::WALL,
            };
            let center = (o.min + o.max) * 0.5;
            out.push(InstanceData {
                position: center.to_array(),
                yaw: 0.0,
                scale: (o.max - o.min).to_array(),
                kind: instance_kinds::OBSTACLE,
                color,
            });
        }

        for e in &self.entities {
            let (kind, base) = match e.kind {
                EntityKind::Melee => (instance_kinds::MELEE, colors::MELEE),
                EntityKind::Ranged => (instance_kinds::RANGED, colors::RANGED),
                EntityKind::Boss => (instance_kinds::BOSS, colors::BOSS),
                EntityKind::Target => (instance_kinds::TARGET, colors::TARGET),
            };
            out.push(InstanceData {
                position: (e.pos + Vec3::Y * (e.height * 0.5)).to_array(),
                yaw: e.yaw,
                scale: [e.radius * 2.0, e.height, e.radius * 2.0],
                kind,
                color: mix(base, colors::FLASH, e.flash),
            });
        }

        for p in &self.powerups {
            out.push(InstanceData {
                position: p.pos.to_array(),
                yaw: p.yaw,
                scale: [0.6; 3],
                kind: instance_kinds::POWERUP,
                color: colors::POWERUP,
            });
        }

        for p in &self.projectiles {
            let (kind, color) = match p.owner {
                Owner::Player => (instance_kinds::PLAYER_SHOT, colors::PLAYER_SHOT),
                Owner::Enemy => (instance_kinds::ENEMY_SHOT, colors::ENEMY_SHOT),
            };
            out.push(InstanceData {
                position: p.pos.to_array(),
                yaw: 0.0,
                scale: [p.radius * 2.0; 3],
                kind,
                color,
            });
        }

        out
    }
}
