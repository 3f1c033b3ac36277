//! Room lock/wave/clear flow and the overworld spawn scheduler
//!
//! Rooms move `Idle -> Locked -> Cleared` and never leave `Cleared`. Only one
//! room can be locked at a time. While a reward offer is pending nothing here
//! advances.

use glam::Vec3;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, Scope};
use super::geometry::Aabb;
use super::obstacles::{Obstacle, ObstacleId};
use super::player::RewardKind;
use super::spawn::{find_overworld_spawn_point, find_room_spawn_point};
use super::state::{GameEvent, RewardOffer, World};
use crate::consts::REWARD_CHOICES;

/// Stable room handle
pub type RoomId = u32;

/// Gate lowering speed (units per second)
pub const GATE_DROP_SPEED: f32 = 8.0;

/// Pickups granted when the boss room clears
pub const BOSS_ROOM_REWARDS: [RewardKind; 3] =
    [RewardKind::Health, RewardKind::Shield, RewardKind::Damage];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    /// House room: clearing it offers a reward choice
    Normal,
    /// Castle room: holds the boss, clearing it drops pickups
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Idle,
    Locked,
    Cleared,
}

/// A gated sub-arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub kind: RoomKind,
    pub center: Vec3,
    /// Where wave enemies may spawn
    pub interior: Aabb,
    /// Interaction point just inside the doorway
    pub entry: Vec3,
    pub trigger_radius: f32,
    /// Gate boxes added while locked
    pub doorways: Vec<Aabb>,
    pub state: RoomState,
    /// Waves spawned so far
    pub wave_index: u32,
    pub total_waves: u32,
    /// Gate obstacles currently in the registry
    pub gates: Vec<ObstacleId>,
}

impl Room {
    /// Player is inside the room and close enough to the entry point to interact
    pub fn in_trigger(&self, player: Vec3) -> bool {
        let p = crate::ground(player);
        self.interior.contains_ground(p)
            && p.distance(crate::ground(self.entry)) <= self.trigger_radius
    }
}

/// Enemy counts for one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveComposition {
    pub melee: u32,
    pub ranged: u32,
    pub boss: bool,
}

/// Base melee count for a floor (1-based)
pub fn base_melee(floor: u32) -> u32 {
    2 + floor.saturating_sub(1)
}

/// Base ranged count for a floor (1-based)
pub fn base_ranged(floor: u32) -> u32 {
    1 + floor.saturating_sub(1) / 2
}

/// Wave `wave` (0-based) adds one of each type on top of the floor's base
pub fn wave_composition(kind: RoomKind, floor: u32, wave: u32) -> WaveComposition {
    WaveComposition {
        melee: base_melee(floor) + wave,
        ranged: base_ranged(floor) + wave,
        boss: kind == RoomKind::Boss && wave == 0,
    }
}

/// Index of the locked room, if any
pub fn locked_room(world: &World) -> Option<usize> {
    world.rooms.iter().position(|r| r.state == RoomState::Locked)
}

/// Per-tick room manager
pub fn update_rooms(world: &mut World, interact: bool) {
    if world.pending_reward.is_some() {
        return;
    }

    if let Some(index) = locked_room(world) {
        let room = &world.rooms[index];
        if world.room_population(room.id) > 0 {
            return;
        }
        if room.wave_index < room.total_waves {
            spawn_wave(world, index);
        } else {
            clear_room(world, index);
        }
        return;
    }

    if !interact {
        return;
    }
    let player = world.player.pos;
    let entered = world
        .rooms
        .iter()
        .position(|r| r.state == RoomState::Idle && r.in_trigger(player));
    if let Some(index) = entered {
        lock_room(world, index);
    }
}

/// Close the gates and start the first wave
pub fn lock_room(world: &mut World, index: usize) {
    let Some(room) = world.rooms.get(index) else {
        return;
    };
    if room.state != RoomState::Idle || locked_room(world).is_some() {
        return;
    }
    let doorways = room.doorways.clone();
    let room_id = room.id;

    let gates: Vec<ObstacleId> = doorways
        .into_iter()
        .map(|d| world.obstacles.add(Obstacle::gate(d, GATE_DROP_SPEED)))
        .collect();

    let room = &mut world.rooms[index];
    room.gates = gates;
    room.state = RoomState::Locked;
    log::info!("Room {} locked ({:?}, {} waves)", room_id, room.kind, room.total_waves);
    world.push_event(GameEvent::RoomLocked { room: room_id });

    spawn_wave(world, index);
}

/// Spawn the room's next wave
pub fn spawn_wave(world: &mut World, index: usize) {
    let Some(room) = world.rooms.get(index) else {
        return;
    };
    let room_id = room.id;
    let interior = room.interior;
    let center = room.center;
    let wave = room.wave_index;
    let total = room.total_waves;
    let comp = wave_composition(room.kind, world.floor, wave);

    if comp.boss {
        world.spawn_entity(EntityKind::Boss, center, Scope::Room(room_id));
        log::info!("Boss spawned in room {}", room_id);
    }
    let kinds = std::iter::repeat_n(EntityKind::Melee, comp.melee as usize)
        .chain(std::iter::repeat_n(EntityKind::Ranged, comp.ranged as usize));
    for kind in kinds {
        let pos = find_room_spawn_point(world, &interior, kind.stats().radius);
        world.spawn_entity(kind, pos, Scope::Room(room_id));
    }

    world.rooms[index].wave_index = wave + 1;
    log::debug!(
        "Room {} wave {}/{}: {} melee, {} ranged",
        room_id,
        wave + 1,
        total,
        comp.melee,
        comp.ranged
    );
    world.push_event(GameEvent::WaveStarted {
        room: room_id,
        wave: wave + 1,
        total,
    });
}

/// Open the gates and hand out the room's reward
fn clear_room(world: &mut World, index: usize) {
    let room = &mut world.rooms[index];
    room.state = RoomState::Cleared;
    let gates = std::mem::take(&mut room.gates);
    let room_id = room.id;
    let kind = room.kind;
    let center = room.center;

    for gate in gates {
        if world.obstacles.remove(gate).is_none() {
            log::warn!("Gate {} of room {} was already gone", gate, room_id);
        }
    }
    log::info!("Room {} cleared", room_id);
    world.push_event(GameEvent::RoomCleared { room: room_id });

    match kind {
        RoomKind::Normal => {
            let options: Vec<RewardKind> = RewardKind::ALL
                .choose_multiple(&mut world.rng, REWARD_CHOICES)
                .copied()
                .collect();
            world.push_event(GameEvent::RewardOffered {
                room: room_id,
                options: options.clone(),
            });
            world.pending_reward = Some(RewardOffer {
                room: room_id,
                options,
            });
        }
        RoomKind::Boss => scatter_rewards(world, center, &BOSS_ROOM_REWARDS),
    }
}

/// Drop pickups in a small ring around `center`
pub fn scatter_rewards(world: &mut World, center: Vec3, rewards: &[RewardKind]) {
    let count = rewards.len().max(1) as f32;
    for (i, &kind) in rewards.iter().enumerate() {
        let angle = std::f32::consts::TAU * i as f32 / count;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * 2.0;
        world.spawn_powerup(kind, Vec3::new(center.x, 0.0, center.z) + offset);
    }
}

/// Resolve the pending offer with option `index`.
///
/// Returns the applied reward. An out-of-range index leaves the offer pending.
pub fn choose_reward(world: &mut World, index: usize) -> Option<RewardKind> {
    let reward = *world.pending_reward.as_ref()?.options.get(index)?;
    world.pending_reward = None;
    world.player.apply_reward(reward);
    log::info!("Reward chosen: {}", reward.as_str());
    world.push_event(GameEvent::RewardChosen {
        reward: Some(reward),
    });
    Some(reward)
}

/// Dismiss the pending offer without a reward. Returns false if none was pending.
pub fn skip_reward(world: &mut World) -> bool {
    if world.pending_reward.take().is_none() {
        return false;
    }
    world.push_event(GameEvent::RewardChosen { reward: None });
    true
}

/// Keeps the overworld enemy population topped up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverworldSpawner {
    /// Seconds until the next spawn check
    pub timer: f32,
    pub interval: f32,
    /// Alternates melee and ranged spawns
    pub next_ranged: bool,
}

impl OverworldSpawner {
    pub fn new(interval: f32) -> Self {
        Self {
            timer: interval,
            interval,
            next_ranged: false,
        }
    }
}

/// Per-tick overworld scheduler
pub fn update_overworld_spawner(world: &mut World, dt: f32) {
    if world.pending_reward.is_some() {
        return;
    }
    world.spawner.timer -= dt;
    if world.spawner.timer > 0.0 {
        return;
    }
    world.spawner.timer = world.spawner.interval;

    if world.overworld_enemies() >= world.settings.overworld_enemy_cap as usize {
        return;
    }
    let kind = if world.spawner.next_ranged {
        EntityKind::Ranged
    } else {
        EntityKind::Melee
    };
    world.spawner.next_ranged = !world.spawner.next_ranged;

    let pos = find_overworld_spawn_point(world, kind.stats().radius);
    let id = world.spawn_entity(kind, pos, Scope::Overworld);
    log::debug!("Overworld spawn {} ({})", id, kind.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use glam::Vec2;

    fn world_with_room(kind: RoomKind, waves: u32) -> World {
        let mut world = World::empty(Settings::default());
        let center = Vec3::new(30.0, 0.0, 30.0);
        world.rooms.push(Room {
            id: 1,
            kind,
            center,
            interior: Aabb::on_ground(Vec2::new(30.0, 30.0), Vec2::splat(5.0), 0.0, 4.0),
            entry: Vec3::new(30.0, 0.0, 33.0),
            trigger_radius: 3.0,
            doorways: vec![Aabb::on_ground(Vec2::new(30.0, 36.0), Vec2::new(1.5, 0.2), 0.0, 3.0)],
            state: RoomState::Idle,
            wave_index: 0,
            total_waves: waves,
            gates: Vec::new(),
        });
        world.player.pos = Vec3::new(30.0, 1.0, 33.5);
        world
    }

    fn kill_room(world: &mut World, room: RoomId) {
        world.entities.retain(|e| !e.in_room(room));
    }

    #[test]
    fn test_wave_composition_scales() {
        assert_eq!(
            wave_composition(RoomKind::Normal, 1, 0),
            WaveComposition { melee: 2, ranged: 1, boss: false }
        );
        let second = wave_composition(RoomKind::Normal, 1, 1);
        assert_eq!((second.melee, second.ranged), (3, 2));
        let deep = wave_composition(RoomKind::Normal, 5, 0);
        assert_eq!((deep.melee, deep.ranged), (6, 3));
        assert!(wave_composition(RoomKind::Boss, 1, 0).boss);
        assert!(!wave_composition(RoomKind::Boss, 1, 1).boss);
    }

    #[test]
    fn test_entry_requires_interact_and_proximity() {
        let mut world = world_with_room(RoomKind::Normal, 2);
        update_rooms(&mut world, false);
        assert_eq!(world.rooms[0].state, RoomState::Idle);

        world.player.pos = Vec3::new(0.0, 1.0, 0.0);
        update_rooms(&mut world, true);
        assert_eq!(world.rooms[0].state, RoomState::Idle);

        // Near the entry but still outside the doorway
        world.player.pos = Vec3::new(30.0, 1.0, 35.8);
        update_rooms(&mut world, true);
        assert_eq!(world.rooms[0].state, RoomState::Idle);

        world.player.pos = Vec3::new(30.0, 1.0, 33.5);
        update_rooms(&mut world, true);
        assert_eq!(world.rooms[0].state, RoomState::Locked);
        assert_eq!(world.rooms[0].gates.len(), 1);
    }

    #[test]
    fn test_next_wave_spawns_before_clear() {
        let mut world = world_with_room(RoomKind::Normal, 2);
        update_rooms(&mut world, true);
        assert_eq!(world.rooms[0].wave_index, 1);

        kill_room(&mut world, 1);
        update_rooms(&mut world, false);
        assert_eq!(world.rooms[0].state, RoomState::Locked);
        assert_eq!(world.rooms[0].wave_index, 2);
        assert_eq!(world.room_population(1), 5);

        kill_room(&mut world, 1);
        update_rooms(&mut world, false);
        assert_eq!(world.rooms[0].state, RoomState::Cleared);
        assert!(world.obstacles.is_empty());
    }

    #[test]
    fn test_cleared_room_offers_distinct_rewards() {
        let mut world = world_with_room(RoomKind::Normal, 1);
        update_rooms(&mut world, true);
        kill_room(&mut world, 1);
        update_rooms(&mut world, false);

        let offer = world.pending_reward().unwrap().clone();
        assert_eq!(offer.options.len(), REWARD_CHOICES);
        for (i, a) in offer.options.iter().enumerate() {
            assert!(!offer.options[i + 1..].contains(a));
        }

        assert_eq!(choose_reward(&mut world, 7), None);
        assert!(world.pending_reward().is_some());
        assert_eq!(choose_reward(&mut world, 0), Some(offer.options[0]));
        assert!(world.pending_reward().is_none());
        assert!(!skip_reward(&mut world));
    }

    #[test]
    fn test_cleared_room_never_relocks() {
        let mut world = world_with_room(RoomKind::Normal, 1);
        update_rooms(&mut world, true);
        kill_room(&mut world, 1);
        update_rooms(&mut world, false);
        assert!(skip_reward(&mut world));

        update_rooms(&mut world, true);
        assert_eq!(world.rooms[0].state, RoomState::Cleared);
        assert_eq!(world.room_population(1), 0);
    }

    #[test]
    fn test_boss_room_drops_pickups() {
        let mut world = world_with_room(RoomKind::Boss, 1);
        update_rooms(&mut world, true);
        assert!(world.boss_alive);
        assert_eq!(world.room_population(1), 4);

        kill_room(&mut world, 1);
        update_rooms(&mut world, false);
        assert_eq!(world.rooms[0].state, RoomState::Cleared);
        assert!(world.pending_reward().is_none());
        assert_eq!(world.powerups.len(), BOSS_ROOM_REWARDS.len());
    }

    #[test]
    fn test_only_one_room_locks() {
        let mut world = world_with_room(RoomKind::Normal, 1);
        let mut second = world.rooms[0].clone();
        second.id = 2;
        world.rooms.push(second);

        update_rooms(&mut world, true);
        update_rooms(&mut world, true);
        let locked = world.rooms.iter().filter(|r| r.state == RoomState::Locked).count();
        assert_eq!(locked, 1);
    }

    #[test]
    fn test_overworld_spawner_respects_cap() {
        let mut world = World::empty(Settings {
            overworld_enemy_cap: 2,
            overworld_spawn_interval: 1.0,
            ..Settings::default()
        });
        for _ in 0..5 {
            update_overworld_spawner(&mut world, 1.0);
        }
        assert_eq!(world.overworld_enemies(), 2);
        let kinds: Vec<_> = world.entities.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EntityKind::Melee, EntityKind::Ranged]);
    }
}
