//! Fixed-order simulation step, floor start and run reset
//!
//! One call to `tick` advances the world by one rendered frame. Components
//! run in a fixed order and each sees the completed output of the previous
//! one.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ai::update_entities;
use super::player::Player;
use super::projectile::{update_projectiles, update_tracers};
use super::rooms::{update_overworld_spawner, update_rooms};
use super::spawn::{PLAYER_START, build_world};
use super::state::{GameEvent, World};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Player body position, owned by the input collaborator
    pub player_position: Vec3,
    /// Interact key pressed this frame
    pub interact: bool,
    /// Whether enemy hits should damage the player this frame
    pub player_vulnerable: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            player_position: PLAYER_START,
            interact: false,
            player_vulnerable: true,
        }
    }
}

/// Advance the world by `dt` seconds
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    world.player.pos = input.player_position;
    world.player_vulnerable = input.player_vulnerable;

    // Suspended while a reward is being chosen, frozen once the player is dead
    if world.pending_reward.is_some() || !world.player.is_alive() {
        return;
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    world.player.cool_down(dt);

    world.obstacles.refresh_dynamic(dt);
    update_entities(world, dt);
    update_projectiles(world, dt);
    update_tracers(world, dt);
    update_rooms(world, input.interact);
    update_overworld_spawner(world, dt);

    world.time += dt;
}

/// Tear everything down and build `floor` carrying `score` over
pub fn start_floor(world: &mut World, floor: u32, score: u64) {
    world.teardown();
    world.floor = floor.max(1);
    world.score = score;
    build_world(world);
    log::info!("Floor {} started (score {})", world.floor, world.score);
    world.push_event(GameEvent::FloorStarted { floor: world.floor });
}

/// Start a fresh run: floor 1, score 0, new player, reseeded RNG
pub fn reset_run(world: &mut World) {
    world.teardown();
    world.player = Player::default();
    world.time = 0.0;
    world.rng = Pcg32::seed_from_u64(world.settings.seed);
    world.drain_events();
    start_floor(world, 1, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::damage::apply_hit;
    use crate::sim::entity::{EntityKind, Scope};
    use crate::sim::geometry::Aabb;
    use crate::sim::obstacles::ObstacleKind;
    use crate::sim::projectile::fire_player_shot;
    use crate::sim::rooms::{Room, RoomKind, RoomState, base_melee, base_ranged, choose_reward};
    use glam::Vec2;

    const PLAYER: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    fn input(vulnerable: bool) -> TickInput {
        TickInput {
            player_position: PLAYER,
            interact: false,
            player_vulnerable: vulnerable,
        }
    }

    #[test]
    fn test_melee_closes_distance_in_expected_time() {
        let mut world = World::empty(Settings::default());
        let id = world.spawn_entity(EntityKind::Melee, Vec3::new(50.0, 0.0, 0.0), Scope::Overworld);
        let speed = EntityKind::Melee.stats().speed;
        let ticks = (50.0 / speed / FRAME_DT).ceil() as usize;

        for _ in 0..ticks {
            tick(&mut world, &input(false), FRAME_DT);
        }
        let e = world.entity(id).unwrap();
        let touching = e.radius + PLAYER_HIT_RADIUS;
        assert!((e.pos.x - touching).abs() < 1e-3, "melee at {}", e.pos.x);
    }

    #[test]
    fn test_player_shot_hits_target_in_time() {
        let mut world = World::empty(Settings::default());
        let id = world.spawn_entity(EntityKind::Target, Vec3::new(0.0, 0.0, 10.0), Scope::Overworld);
        let health = world.entity(id).unwrap().health;

        assert!(fire_player_shot(&mut world, PLAYER, Vec3::Z));
        let ticks = ((10.0 / PLAYER_SHOT_SPEED) / FRAME_DT).ceil() as usize;
        for _ in 0..ticks {
            tick(&mut world, &input(true), FRAME_DT);
        }
        assert!(world.projectiles.is_empty());
        let damage = world.player.shot_damage(world.player.weapon);
        assert_eq!(world.entity(id).unwrap().health, health - damage);
    }

    #[test]
    fn test_room_waves_then_clear() {
        let mut world = World::empty(Settings::default());
        let room_id = 500;
        let center = Vec2::new(30.0, 30.0);
        let doorway = Aabb::on_ground(Vec2::new(30.0, 36.0), Vec2::new(1.2, 0.25), 0.0, 4.0);
        world.rooms.push(Room {
            id: room_id,
            kind: RoomKind::Normal,
            center: Vec3::new(center.x, 0.0, center.y),
            interior: Aabb::on_ground(center, Vec2::splat(5.0), 0.0, 4.0),
            entry: Vec3::new(30.0, 0.0, 33.0),
            trigger_radius: ROOM_TRIGGER_RADIUS,
            doorways: vec![doorway],
            state: RoomState::Idle,
            wave_index: 0,
            total_waves: 2,
            gates: Vec::new(),
        });

        let at_door = TickInput {
            player_position: Vec3::new(30.0, 1.0, 33.5),
            interact: true,
            player_vulnerable: false,
        };
        tick(&mut world, &at_door, FRAME_DT);
        assert_eq!(world.rooms[0].state, RoomState::Locked);
        let first = (base_melee(1) + base_ranged(1)) as usize;
        assert_eq!(world.room_population(room_id), first);
        assert_eq!(world.obstacles.len(), 1, "gate closed");

        let kill_room = |world: &mut World| {
            let ids: Vec<_> = world
                .entities
                .iter()
                .filter(|e| e.in_room(room_id))
                .map(|e| e.id)
                .collect();
            for id in ids {
                apply_hit(world, id, 10_000, Vec3::ZERO);
            }
        };

        let idle = TickInput {
            interact: false,
            ..at_door
        };
        kill_room(&mut world);
        tick(&mut world, &idle, FRAME_DT);
        assert_eq!(world.rooms[0].state, RoomState::Locked);
        assert_eq!(world.room_population(room_id), first + 2);

        kill_room(&mut world);
        tick(&mut world, &idle, FRAME_DT);
        assert_eq!(world.rooms[0].state, RoomState::Cleared);
        assert!(world.obstacles.is_empty(), "gate removed");
        assert!(world.pending_reward().is_some());

        // Suspended until the offer is resolved
        let time = world.time;
        tick(&mut world, &idle, FRAME_DT);
        assert_eq!(world.time, time);
        assert!(choose_reward(&mut world, 0).is_some());
        tick(&mut world, &idle, FRAME_DT);
        assert!(world.time > time);
    }

    #[test]
    fn test_built_room_locks_behind_player_and_clears() {
        let mut world = World::new(Settings::default());
        let index = world
            .rooms
            .iter()
            .position(|r| r.kind == RoomKind::Normal)
            .unwrap();
        let room_id = world.rooms[index].id;
        let interior = world.rooms[index].interior;
        let player = world.rooms[index].entry + Vec3::Y;

        let mut input = TickInput {
            player_position: player,
            interact: true,
            player_vulnerable: false,
        };
        tick(&mut world, &input, FRAME_DT);
        assert_eq!(world.rooms[index].state, RoomState::Locked);
        assert!(interior.contains_ground(crate::ground(player)));

        // Let the gate come down, then every room enemy must be in the open
        input.interact = false;
        for _ in 0..60 {
            tick(&mut world, &input, FRAME_DT);
        }
        let gate = world.rooms[index].gates[0];
        let gate = world.obstacles.get(gate).unwrap();
        assert!(gate.motion.is_none_or(|m| m.lift <= 0.0), "gate lowered");
        for e in world.entities.iter().filter(|e| e.in_room(room_id)) {
            let blocked = world.obstacles.raycast(player, e.center() - player);
            assert!(blocked.is_none_or(|hit| hit.t >= 1.0), "enemy {} behind a wall", e.id);
        }

        for _ in 0..7200 {
            if world.rooms[index].state == RoomState::Cleared {
                break;
            }
            let nearest = world
                .entities
                .iter()
                .filter(|e| e.in_room(room_id))
                .map(|e| e.center())
                .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)));
            if let Some(aim) = nearest {
                fire_player_shot(&mut world, player, aim - player);
            }
            tick(&mut world, &input, FRAME_DT);
        }
        assert_eq!(world.rooms[index].state, RoomState::Cleared);
        assert!(world.obstacles.iter().all(|o| o.kind != ObstacleKind::Gate));
        assert!(world.pending_reward().is_some());
    }

    #[test]
    fn test_dead_player_freezes_world() {
        let mut world = World::empty(Settings::default());
        world.player.health = 0;
        tick(&mut world, &input(true), FRAME_DT);
        assert_eq!(world.time, 0.0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut world = World::empty(Settings::default());
        tick(&mut world, &input(true), 5.0);
        assert!((world.time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_start_floor_rebuilds_and_keeps_score() {
        let mut world = World::new(Settings::default());
        world.spawn_projectile(Vec3::ZERO, Vec3::X, 1.0, 0.1, crate::sim::state::Owner::Enemy, 1);
        start_floor(&mut world, 3, 42);
        assert_eq!(world.floor, 3);
        assert_eq!(world.score, 42);
        assert!(world.projectiles.is_empty());
        assert!(!world.rooms.is_empty());
        assert!(world
            .drain_events()
            .contains(&GameEvent::FloorStarted { floor: 3 }));
    }

    #[test]
    fn test_reset_run_matches_new_world() {
        let settings = Settings::default();
        let fresh = World::new(settings.clone());
        let mut world = World::new(settings);
        for _ in 0..120 {
            tick(&mut world, &TickInput::default(), FRAME_DT);
        }
        world.score = 99;
        reset_run(&mut world);

        assert_eq!(world.score, 0);
        assert_eq!(world.floor, 1);
        assert_eq!(world.player.health, fresh.player.health);
        let a: Vec<_> = world.entities.iter().map(|e| (e.kind(), e.pos)).collect();
        let b: Vec<_> = fresh.entities.iter().map(|e| (e.kind(), e.pos)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut world = World::new(Settings::default().with_seed(77));
            let mut input = TickInput::default();
            for step in 0..600 {
                input.player_position.x = (step as f32 * 0.01).sin() * 10.0;
                tick(&mut world, &input, FRAME_DT);
            }
            serde_json::to_string(&world.snapshot()).unwrap()
        };
        assert_eq!(run(), run());
    }
}
