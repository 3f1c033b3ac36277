//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta, clamped
//! - Seeded RNG only
//! - Stable iteration order (collection order, registry order for obstacles)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod damage;
pub mod entity;
pub mod geometry;
pub mod obstacles;
pub mod player;
pub mod projectile;
pub mod rooms;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, circle_box_collision, resolve_push_out};
pub use damage::{HitOutcome, apply_hit};
pub use entity::{Entity, EntityId, EntityKind, Powerup, Scope};
pub use geometry::Aabb;
pub use obstacles::{Obstacle, ObstacleId, ObstacleKind, ObstacleRegistry};
pub use player::{Player, RewardKind, UnknownName, Weapon};
pub use projectile::fire_player_shot;
pub use rooms::{Room, RoomId, RoomKind, RoomState, choose_reward, skip_reward};
pub use snapshot::{InstanceData, RenderSnapshot};
pub use state::{GameEvent, Owner, Projectile, RewardOffer, Tracer, World};
pub use tick::{TickInput, reset_run, start_floor, tick};
