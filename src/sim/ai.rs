//! Per-kind entity behaviour, idle motion and powerup pickup
//!
//! Entities are updated in collection order. Each one computes a tentative
//! position, which is pushed out of obstacles before being committed. Shots
//! are queued during the scan and spawned afterwards so the projectile list
//! is never touched while entities are borrowed.

use glam::Vec3;
use rand::Rng;

use super::collision::resolve_push_out;
use super::damage::damage_player;
use super::entity::{Behavior, Entity, EntityId, EntityKind};
use super::obstacles::ObstacleRegistry;
use super::state::{GameEvent, Owner, World};
use crate::consts::*;
use crate::{flatten, normalize_angle, yaw_to_dir, yaw_toward};

/// A shot requested during the entity scan
#[derive(Debug, Clone, Copy)]
struct QueuedShot {
    shooter: EntityId,
    kind: EntityKind,
    from: Vec3,
    vel: Vec3,
    ttl: f32,
    damage: i32,
    /// First projectile of a volley (one `EnemyShot` per volley)
    announce: bool,
}

/// Horizontal unit vector from `from` toward `to` and its length
fn heading(from: Vec3, to: Vec3) -> (Vec3, f32) {
    let delta = flatten(to - from);
    let dist = delta.length();
    if dist > 1e-4 {
        (delta / dist, dist)
    } else {
        (Vec3::Z, 0.0)
    }
}

/// Retreat inside `min`, advance beyond `max`, otherwise hold
fn band_direction(dir: Vec3, dist: f32, min: f32, max: f32) -> Option<Vec3> {
    if dist < min {
        Some(-dir)
    } else if dist > max {
        Some(dir)
    } else {
        None
    }
}

/// Current height of a bobbing object
#[inline]
pub fn bob_height(base_y: f32, phase: f32, time: f32) -> f32 {
    base_y + BOB_AMPLITUDE * (time * BOB_FREQUENCY + phase).sin()
}

/// Advance every entity by `dt`
pub fn update_entities(world: &mut World, dt: f32) {
    let player = world.player.pos;
    let time = world.time;
    let mut shots: Vec<QueuedShot> = Vec::new();
    let mut contact_hits = 0u32;

    for index in 0..world.entities.len() {
        let entity = &mut world.entities[index];
        let obstacles = &world.obstacles;
        let rng = &mut world.rng;

        entity.flash = (entity.flash - dt).max(0.0);
        if !entity.is_alive() {
            continue;
        }

        let mut behavior = entity.behavior;
        let tentative = match &mut behavior {
            Behavior::Melee { attack_cooldown } => {
                let (dir, dist) = heading(entity.pos, player);
                let reach = entity.radius + PLAYER_HIT_RADIUS;
                entity.yaw = yaw_toward(dir);
                *attack_cooldown = (*attack_cooldown - dt).max(0.0);
                if dist <= reach + MELEE_REACH && *attack_cooldown <= 0.0 {
                    contact_hits += 1;
                    *attack_cooldown = MELEE_ATTACK_COOLDOWN;
                }
                let step = (entity.speed * dt).min((dist - reach).max(0.0));
                entity.pos + dir * step
            }
            Behavior::Ranged {
                shoot_cooldown,
                strafe_phase,
            } => {
                let (dir, dist) = heading(entity.pos, player);
                entity.yaw = yaw_toward(dir);
                let motion = band_direction(dir, dist, RANGED_MIN_DISTANCE, RANGED_MAX_DISTANCE)
                    .unwrap_or_else(|| {
                        let side = Vec3::new(dir.z, 0.0, -dir.x);
                        side * (time * RANGED_STRAFE_FREQUENCY + *strafe_phase).sin()
                    });

                *shoot_cooldown -= dt;
                if *shoot_cooldown <= 0.0 {
                    match ranged_shot(entity, player, obstacles) {
                        Some(shot) => {
                            shots.push(shot);
                            *shoot_cooldown = rng.random_range(RANGED_COOLDOWN.0..RANGED_COOLDOWN.1);
                        }
                        None => {
                            *shoot_cooldown = rng.random_range(RANGED_RETRY.0..RANGED_RETRY.1);
                        }
                    }
                }
                entity.pos + motion * entity.speed * dt
            }
            Behavior::Boss {
                aimed_cooldown,
                burst_cooldown,
            } => {
                let (dir, dist) = heading(entity.pos, player);
                entity.yaw = yaw_toward(dir);
                let muzzle = entity.muzzle();

                *aimed_cooldown -= dt;
                if *aimed_cooldown <= 0.0 {
                    shots.push(QueuedShot {
                        shooter: entity.id,
                        kind: EntityKind::Boss,
                        from: muzzle,
                        vel: (player - muzzle).normalize_or(dir) * BOSS_AIMED_SPEED,
                        ttl: BOSS_SHOT_TTL,
                        damage: BOSS_AIMED_DAMAGE,
                        announce: true,
                    });
                    *aimed_cooldown = rng.random_range(BOSS_AIMED_COOLDOWN.0..BOSS_AIMED_COOLDOWN.1);
                }

                *burst_cooldown -= dt;
                if *burst_cooldown <= 0.0 {
                    for i in 0..BOSS_BURST_COUNT {
                        let angle = std::f32::consts::TAU * i as f32 / BOSS_BURST_COUNT as f32;
                        shots.push(QueuedShot {
                            shooter: entity.id,
                            kind: EntityKind::Boss,
                            from: muzzle,
                            vel: yaw_to_dir(angle) * BOSS_BURST_SPEED,
                            ttl: BOSS_SHOT_TTL,
                            damage: BOSS_BURST_DAMAGE,
                            announce: i == 0,
                        });
                    }
                    *burst_cooldown = rng.random_range(BOSS_BURST_COOLDOWN.0..BOSS_BURST_COOLDOWN.1);
                }

                let motion = band_direction(dir, dist, BOSS_MIN_DISTANCE, BOSS_MAX_DISTANCE)
                    .unwrap_or(Vec3::ZERO);
                entity.pos + motion * entity.speed * dt
            }
            Behavior::Target { base_y, bob_phase } => {
                entity.yaw = normalize_angle(entity.yaw + IDLE_SPIN_SPEED * dt);
                let mut p = entity.pos;
                p.y = bob_height(*base_y, *bob_phase, time);
                p
            }
        };

        entity.behavior = behavior;
        entity.pos = resolve_push_out(obstacles, tentative, entity.radius, entity.height);
    }

    for shot in shots {
        world.spawn_projectile(
            shot.from,
            shot.vel,
            shot.ttl,
            ENEMY_SHOT_RADIUS,
            Owner::Enemy,
            shot.damage,
        );
        if shot.announce {
            world.push_event(GameEvent::EnemyShot {
                entity: shot.shooter,
                kind: shot.kind,
            });
        }
    }

    for _ in 0..contact_hits {
        damage_player(world, MELEE_CONTACT_DAMAGE);
    }

    update_powerups(world, dt);
}

/// Aim from the muzzle; `None` if an obstacle sits between shooter and player
fn ranged_shot(entity: &Entity, player: Vec3, obstacles: &ObstacleRegistry) -> Option<QueuedShot> {
    let muzzle = entity.muzzle();
    let aim = player - muzzle;
    if obstacles.raycast(muzzle, aim).is_some_and(|hit| hit.t < 1.0) {
        return None;
    }
    Some(QueuedShot {
        shooter: entity.id,
        kind: EntityKind::Ranged,
        from: muzzle,
        vel: aim.normalize_or_zero() * RANGED_SHOT_SPEED,
        ttl: RANGED_SHOT_TTL,
        damage: RANGED_SHOT_DAMAGE,
        announce: true,
    })
}

/// Bob and spin powerups, then collect any the player touches
fn update_powerups(world: &mut World, dt: f32) {
    let time = world.time;
    for p in world.powerups.iter_mut() {
        p.pos.y = bob_height(p.base_y, p.bob_phase, time);
        p.yaw = normalize_angle(p.yaw + IDLE_SPIN_SPEED * dt);
    }

    if !world.player.is_alive() {
        return;
    }
    let player = world.player.pos;
    let mut i = world.powerups.len();
    while i > 0 {
        i -= 1;
        let p = &world.powerups[i];
        if crate::ground(p.pos).distance(crate::ground(player)) > p.pickup_radius {
            continue;
        }
        let collected = world.powerups.swap_remove(i);
        world.player.apply_reward(collected.kind);
        log::debug!("Picked up {}", collected.kind.as_str());
        world.push_event(GameEvent::PowerupCollected {
            kind: collected.kind,
        });
    }
}
