//! World layout and random placement
//!
//! Every random position comes from bounded rejection sampling: after
//! `SPAWN_PLACEMENT_ATTEMPTS` rejected tries the last candidate is accepted
//! as-is, so placement is best effort and never fails.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{EntityKind, Scope};
use super::geometry::Aabb;
use super::obstacles::{Obstacle, ObstacleKind};
use super::player::RewardKind;
use super::rooms::{Room, RoomKind, RoomState};
use super::state::World;
use crate::consts::*;
use crate::ground;

/// Where the player starts each floor
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 1.0, 40.0);

/// Castle footprint
pub const CASTLE_CENTER: Vec2 = Vec2::new(0.0, -80.0);
pub const CASTLE_HALF: Vec2 = Vec2::new(20.0, 16.0);
const CASTLE_WALL_THICKNESS: f32 = 1.5;
const CASTLE_WALL_HEIGHT: f32 = 7.0;
const CASTLE_GATE_WIDTH: f32 = 4.0;

/// House footprint
pub const HOUSE_HALF: Vec2 = Vec2::new(6.0, 5.0);
const HOUSE_WALL_THICKNESS: f32 = 0.5;
const HOUSE_WALL_HEIGHT: f32 = 4.0;
const HOUSE_DOOR_WIDTH: f32 = 2.4;
/// Clear ground kept between houses and other structures
const HOUSE_SPACING: f32 = 6.0;

const BOUNDARY_THICKNESS: f32 = 2.0;
const BOUNDARY_HEIGHT: f32 = 8.0;

/// Room spawns keep at least this far from the player
const ROOM_SPAWN_PLAYER_DISTANCE: f32 = 3.0;
/// Entry point distance from the interior's doorway edge
const ROOM_ENTRY_INSET: f32 = 0.75;

/// Uniform sample in [lo, hi], collapsing to the midpoint for empty ranges
fn sample_axis(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) * 0.5
    }
}

/// Random ground position inside `area` for a body of `radius`.
///
/// Rejects points inside no-spawn volumes (when `avoid_no_spawn`), overlapping
/// movement-blocking obstacles, or nearer than `min_player_distance` to the player.
pub fn find_spawn_point(
    world: &mut World,
    area: &Aabb,
    radius: f32,
    min_player_distance: f32,
    avoid_no_spawn: bool,
) -> Vec3 {
    let player = ground(world.player.pos);
    let mut candidate = ground(area.center());

    for _ in 0..SPAWN_PLACEMENT_ATTEMPTS {
        candidate = Vec2::new(
            sample_axis(&mut world.rng, area.min.x + radius, area.max.x - radius),
            sample_axis(&mut world.rng, area.min.z + radius, area.max.z - radius),
        );
        if avoid_no_spawn && world.no_spawn.iter().any(|z| z.contains_ground(candidate)) {
            continue;
        }
        if world.obstacles.footprint_blocked(candidate, radius) {
            continue;
        }
        if candidate.distance(player) < min_player_distance {
            continue;
        }
        return Vec3::new(candidate.x, 0.0, candidate.y);
    }

    log::debug!("Spawn placement exhausted, keeping last candidate {:?}", candidate);
    Vec3::new(candidate.x, 0.0, candidate.y)
}

/// Playable ground, inset from the boundary walls
pub fn arena_bounds() -> Aabb {
    let inner = ARENA_HALF_EXTENT - 4.0;
    Aabb::new(Vec3::new(-inner, 0.0, -inner), Vec3::new(inner, 0.0, inner))
}

/// Random overworld position away from the player and off-limits interiors
pub fn find_overworld_spawn_point(world: &mut World, radius: f32) -> Vec3 {
    find_spawn_point(
        world,
        &arena_bounds(),
        radius,
        MIN_SPAWN_DISTANCE_FROM_PLAYER,
        true,
    )
}

/// Random position inside a room's interior
pub fn find_room_spawn_point(world: &mut World, interior: &Aabb, radius: f32) -> Vec3 {
    find_spawn_point(world, interior, radius, ROOM_SPAWN_PLAYER_DISTANCE, false)
}

/// Footprint center for a structure of `half` size that clears other structures
fn find_structure_spot(world: &mut World, half: Vec2, margin: f32) -> Vec2 {
    let bounds = arena_bounds();
    let mut candidate = Vec2::ZERO;
    let player = ground(PLAYER_START);

    for _ in 0..SPAWN_PLACEMENT_ATTEMPTS {
        candidate = Vec2::new(
            sample_axis(&mut world.rng, bounds.min.x + half.x, bounds.max.x - half.x),
            sample_axis(&mut world.rng, bounds.min.z + half.y, bounds.max.z - half.y),
        );
        let footprint = Aabb::on_ground(candidate, half, 0.0, 1.0);
        let clashes_zone = world
            .no_spawn
            .iter()
            .any(|z| z.intersects_ground(&footprint, margin));
        let clashes_obstacle = world
            .obstacles
            .iter()
            .filter(|o| o.kind != ObstacleKind::Boundary)
            .any(|o| o.aabb.intersects_ground(&footprint, margin));
        let near_player = footprint.closest_ground_point(player).distance(player) < margin * 2.0;
        if !clashes_zone && !clashes_obstacle && !near_player {
            return candidate;
        }
    }
    candidate
}

/// Add four walls around `center` with a door gap centered on the +Z side.
///
/// Returns the doorway box (the gap, full wall height).
fn build_enclosure(
    world: &mut World,
    center: Vec2,
    half: Vec2,
    thickness: f32,
    height: f32,
    door_width: f32,
    kind: ObstacleKind,
) -> Aabb {
    let t = thickness * 0.5;
    let mut wall = |c: Vec2, h: Vec2| {
        world
            .obstacles
            .add(Obstacle::solid(kind, Aabb::on_ground(c, h, 0.0, height)));
    };

    // Back and sides
    wall(Vec2::new(center.x, center.y - half.y), Vec2::new(half.x, t));
    wall(Vec2::new(center.x - half.x, center.y), Vec2::new(t, half.y));
    wall(Vec2::new(center.x + half.x, center.y), Vec2::new(t, half.y));

    // Front, split around the door
    let front_z = center.y + half.y;
    let segment = (half.x - door_width * 0.5) * 0.5;
    wall(
        Vec2::new(center.x - door_width * 0.5 - segment, front_z),
        Vec2::new(segment, t),
    );
    wall(
        Vec2::new(center.x + door_width * 0.5 + segment, front_z),
        Vec2::new(segment, t),
    );

    Aabb::on_ground(
        Vec2::new(center.x, front_z),
        Vec2::new(door_width * 0.5, t),
        0.0,
        height,
    )
}

/// Gated room inside an enclosure
fn make_room(
    world: &mut World,
    kind: RoomKind,
    center: Vec2,
    half: Vec2,
    wall: f32,
    doorway: Aabb,
    total_waves: u32,
) -> Room {
    let inset = wall + 0.5;
    let interior = Aabb::on_ground(center, half - Vec2::splat(inset), 0.0, 1.0);
    Room {
        id: world.next_entity_id(),
        kind,
        center: Vec3::new(center.x, 0.0, center.y),
        interior,
        // Just inside the doorway, so the gate closes behind the player
        entry: Vec3::new(center.x, 0.0, interior.max.z - ROOM_ENTRY_INSET),
        trigger_radius: ROOM_TRIGGER_RADIUS,
        doorways: vec![doorway],
        state: RoomState::Idle,
        wave_index: 0,
        total_waves,
        gates: Vec::new(),
    }
}

fn build_boundary(world: &mut World) {
    let h = ARENA_HALF_EXTENT;
    let t = BOUNDARY_THICKNESS;
    let sides = [
        (Vec2::new(0.0, -h - t), Vec2::new(h + 2.0 * t, t)),
        (Vec2::new(0.0, h + t), Vec2::new(h + 2.0 * t, t)),
        (Vec2::new(-h - t, 0.0), Vec2::new(t, h + 2.0 * t)),
        (Vec2::new(h + t, 0.0), Vec2::new(t, h + 2.0 * t)),
    ];
    for (center, half) in sides {
        world.obstacles.add(
            Obstacle::solid(
                ObstacleKind::Boundary,
                Aabb::on_ground(center, half, 0.0, BOUNDARY_HEIGHT),
            )
            .movement_only(),
        );
    }
}

fn build_castle(world: &mut World) {
    let doorway = build_enclosure(
        world,
        CASTLE_CENTER,
        CASTLE_HALF,
        CASTLE_WALL_THICKNESS,
        CASTLE_WALL_HEIGHT,
        CASTLE_GATE_WIDTH,
        ObstacleKind::CastleWall,
    );
    // Courtyard is off-limits to random placement
    world.no_spawn.push(Aabb::on_ground(
        CASTLE_CENTER,
        CASTLE_HALF + Vec2::splat(3.0),
        0.0,
        CASTLE_WALL_HEIGHT,
    ));
    let waves = world.settings.boss_room_waves;
    let room = make_room(
        world,
        RoomKind::Boss,
        CASTLE_CENTER,
        CASTLE_HALF,
        CASTLE_WALL_THICKNESS,
        doorway,
        waves,
    );
    world.rooms.push(room);
}

fn build_houses(world: &mut World) {
    for _ in 0..world.settings.houses {
        let center = find_structure_spot(world, HOUSE_HALF, HOUSE_SPACING);
        let doorway = build_enclosure(
            world,
            center,
            HOUSE_HALF,
            HOUSE_WALL_THICKNESS,
            HOUSE_WALL_HEIGHT,
            HOUSE_DOOR_WIDTH,
            ObstacleKind::HouseWall,
        );
        world.no_spawn.push(Aabb::on_ground(
            center,
            HOUSE_HALF + Vec2::splat(2.0),
            0.0,
            HOUSE_WALL_HEIGHT,
        ));
        let waves = world.settings.normal_room_waves;
        let room = make_room(
            world,
            RoomKind::Normal,
            center,
            HOUSE_HALF,
            HOUSE_WALL_THICKNESS,
            doorway,
            waves,
        );
        world.rooms.push(room);
    }
}

fn build_rocks(world: &mut World) {
    for _ in 0..world.settings.rocks {
        let half = Vec2::new(
            world.rng.random_range(0.8..2.2),
            world.rng.random_range(0.8..2.2),
        );
        let height = world.rng.random_range(1.0..2.5);
        let spot = find_spawn_point(
            world,
            &arena_bounds(),
            half.max_element() + 1.0,
            MIN_SPAWN_DISTANCE_FROM_PLAYER * 0.5,
            true,
        );
        world.obstacles.add(Obstacle::solid(
            ObstacleKind::Rock,
            Aabb::on_ground(ground(spot), half, 0.0, height),
        ));
    }
}

/// Spawn a target at a random overworld position
pub fn spawn_target(world: &mut World) -> u32 {
    let pos = find_overworld_spawn_point(world, EntityKind::Target.stats().radius);
    world.spawn_entity(EntityKind::Target, pos, Scope::Overworld)
}

/// Spawn an enemy of `kind` at a random overworld position
pub fn spawn_overworld_enemy(world: &mut World, kind: EntityKind) -> u32 {
    let pos = find_overworld_spawn_point(world, kind.stats().radius);
    world.spawn_entity(kind, pos, Scope::Overworld)
}

fn scatter_powerups(world: &mut World) {
    for _ in 0..world.settings.scatter_powerups {
        let index = world.rng.random_range(0..RewardKind::ALL.len());
        let kind = RewardKind::ALL[index];
        let pos = find_overworld_spawn_point(world, POWERUP_PICKUP_RADIUS);
        world.spawn_powerup(kind, pos);
    }
}

/// Build the static layout and initial population for the current floor.
///
/// Expects an empty world (see `World::teardown`).
pub fn build_world(world: &mut World) {
    world.player.pos = PLAYER_START;

    build_boundary(world);
    build_castle(world);
    build_houses(world);
    build_rocks(world);

    for _ in 0..world.settings.targets {
        spawn_target(world);
    }
    for _ in 0..world.settings.overworld_melee {
        spawn_overworld_enemy(world, EntityKind::Melee);
    }
    for _ in 0..world.settings.overworld_ranged {
        spawn_overworld_enemy(world, EntityKind::Ranged);
    }
    scatter_powerups(world);

    log::info!(
        "Floor {} built: {} obstacles, {} rooms, {} entities, {} powerups",
        world.floor,
        world.obstacles.len(),
        world.rooms.len(),
        world.entities.len(),
        world.powerups.len()
    );
}
