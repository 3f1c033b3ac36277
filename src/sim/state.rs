//! World state and core simulation types
//!
//! A single `World` owns every mutable collection. Components receive it
//! explicitly; there are no ambient singletons.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind, Powerup, Scope};
use super::geometry::Aabb;
use super::obstacles::ObstacleRegistry;
use super::player::{Player, RewardKind};
use super::rooms::{OverworldSpawner, Room, RoomId};
use crate::consts::*;
use crate::settings::Settings;

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A live projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Stable id, doubles as the render handle
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Seconds left before expiry
    pub ttl: f32,
    pub radius: f32,
    pub owner: Owner,
    pub damage: i32,
}

/// Short-lived line drawn where a projectile ended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracer {
    pub id: u32,
    pub from: Vec3,
    pub to: Vec3,
    pub owner: Owner,
    pub age: f32,
    pub lifetime: f32,
}

impl Tracer {
    /// Linear fade: 1 when spawned, 0 when the budget is spent
    pub fn opacity(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// A pending reward choice presented when a normal room clears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardOffer {
    pub room: RoomId,
    pub options: Vec<RewardKind>,
}

/// Fire-and-forget notifications for audio/HUD collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    EnemyShot { entity: EntityId, kind: EntityKind },
    PlayerHit { damage: i32 },
    PlayerKilled,
    EntityKilled { entity: EntityId, kind: EntityKind, pos: Vec3 },
    BossDefeated { pos: Vec3 },
    PowerupCollected { kind: RewardKind },
    RoomLocked { room: RoomId },
    WaveStarted { room: RoomId, wave: u32, total: u32 },
    RoomCleared { room: RoomId },
    RewardOffered { room: RoomId, options: Vec<RewardKind> },
    RewardChosen { reward: Option<RewardKind> },
    FloorStarted { floor: u32 },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    /// Current floor (1-based), drives wave scaling
    pub floor: u32,
    pub score: u64,
    /// Simulation clock (seconds)
    pub time: f32,
    pub player: Player,
    /// Whether enemy hits currently damage the player
    pub player_vulnerable: bool,
    pub obstacles: ObstacleRegistry,
    pub entities: Vec<Entity>,
    pub projectiles: Vec<Projectile>,
    pub tracers: Vec<Tracer>,
    pub powerups: Vec<Powerup>,
    pub rooms: Vec<Room>,
    /// Regions random placement must avoid
    pub no_spawn: Vec<Aabb>,
    pub boss_alive: bool,
    pub pending_reward: Option<RewardOffer>,
    pub spawner: OverworldSpawner,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Create a world and build floor 1
    pub fn new(settings: Settings) -> Self {
        let mut world = Self::empty(settings);
        super::tick::start_floor(&mut world, 1, 0);
        world
    }

    /// A world with nothing in it (tests and custom layouts)
    pub fn empty(settings: Settings) -> Self {
        let seed = settings.seed;
        let spawner = OverworldSpawner::new(settings.overworld_spawn_interval);
        Self {
            settings,
            floor: 1,
            score: 0,
            time: 0.0,
            player: Player::default(),
            player_vulnerable: true,
            obstacles: ObstacleRegistry::new(),
            entities: Vec::new(),
            projectiles: Vec::new(),
            tracers: Vec::new(),
            powerups: Vec::new(),
            rooms: Vec::new(),
            no_spawn: Vec::new(),
            boss_alive: false,
            pending_reward: None,
            spawner,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new id (shared by entities, projectiles, tracers, powerups)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_reward(&self) -> Option<&RewardOffer> {
        self.pending_reward.as_ref()
    }

    /// Spawn an entity at a feet position
    pub fn spawn_entity(&mut self, kind: EntityKind, pos: Vec3, scope: Scope) -> EntityId {
        let id = self.next_entity_id();
        let entity = Entity::new(id, kind, pos, scope, self.floor, &mut self.rng);
        if kind == EntityKind::Boss {
            self.boss_alive = true;
        }
        self.entities.push(entity);
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Swap-remove an entity by id; `None` if it is already gone
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.swap_remove(index))
    }

    /// Live entities scoped to a room
    pub fn room_population(&self, room: RoomId) -> usize {
        self.entities.iter().filter(|e| e.in_room(room)).count()
    }

    /// Live overworld enemies (targets excluded)
    pub fn overworld_enemies(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.scope == Scope::Overworld && e.kind().is_enemy())
            .count()
    }

    pub fn spawn_projectile(
        &mut self,
        pos: Vec3,
        vel: Vec3,
        ttl: f32,
        radius: f32,
        owner: Owner,
        damage: i32,
    ) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos,
            vel,
            ttl,
            radius,
            owner,
            damage,
        });
        id
    }

    pub fn spawn_tracer(&mut self, from: Vec3, to: Vec3, owner: Owner) {
        let id = self.next_entity_id();
        self.tracers.push(Tracer {
            id,
            from,
            to,
            owner,
            age: 0.0,
            lifetime: TRACER_LIFETIME,
        });
    }

    pub fn spawn_powerup(&mut self, kind: RewardKind, ground_pos: Vec3) -> u32 {
        use rand::Rng;
        let id = self.next_entity_id();
        let phase = self.rng.random_range(0.0..std::f32::consts::TAU);
        self.powerups.push(Powerup::new(id, kind, ground_pos, phase));
        id
    }

    /// Release every dynamic object. Nothing from the previous run survives.
    pub fn teardown(&mut self) {
        self.projectiles.clear();
        self.tracers.clear();
        self.entities.clear();
        self.powerups.clear();
        self.rooms.clear();
        self.obstacles.clear();
        self.no_spawn.clear();
        self.boss_alive = false;
        self.pending_reward = None;
        self.spawner = OverworldSpawner::new(self.settings.overworld_spawn_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_entity_once() {
        let mut world = World::empty(Settings::default());
        let a = world.spawn_entity(EntityKind::Melee, Vec3::ZERO, Scope::Overworld);
        let b = world.spawn_entity(EntityKind::Ranged, Vec3::X, Scope::Overworld);

        assert!(world.remove_entity(a).is_some());
        assert!(world.remove_entity(a).is_none());
        assert_eq!(world.entities.len(), 1);
        assert!(world.entity(b).is_some());
    }

    #[test]
    fn test_tracer_fades_linearly() {
        let mut t = Tracer {
            id: 1,
            from: Vec3::ZERO,
            to: Vec3::X,
            owner: Owner::Player,
            age: 0.0,
            lifetime: 0.2,
        };
        assert_eq!(t.opacity(), 1.0);
        t.age = 0.05;
        assert!((t.opacity() - 0.75).abs() < 1e-5);
        t.age = 0.2;
        assert!(t.expired());
        assert_eq!(t.opacity(), 0.0);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut world = World::new(Settings::default());
        world.spawn_projectile(Vec3::ZERO, Vec3::X, 1.0, 0.1, Owner::Enemy, 1);
        world.spawn_tracer(Vec3::ZERO, Vec3::X, Owner::Enemy);
        assert!(!world.entities.is_empty());

        world.teardown();
        assert!(world.entities.is_empty());
        assert!(world.projectiles.is_empty());
        assert!(world.tracers.is_empty());
        assert!(world.powerups.is_empty());
        assert!(world.obstacles.is_empty());
        assert!(world.rooms.is_empty());
    }
}
