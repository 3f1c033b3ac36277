//! Projectile flight, hit tests and tracers
//!
//! Projectiles are swept as segments each tick, so fast shots cannot tunnel
//! through thin walls. The list is walked back to front and finished shots are
//! swap-removed in place.

use glam::Vec3;
use rand::Rng;

use super::damage::{apply_hit, damage_player};
use super::entity::{Entity, EntityId};
use super::geometry::{point_segment_distance, ray_aabb, segment_projection};
use super::state::{Owner, Projectile, World};
use crate::consts::*;

/// Nearest entity whose hit box (grown by `radius`) the segment enters
fn first_entity_hit(
    entities: &[Entity],
    origin: Vec3,
    displacement: Vec3,
    radius: f32,
) -> Option<(EntityId, f32)> {
    entities
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            ray_aabb(origin, displacement, 1.0, &e.hit_box().expanded(radius)).map(|t| (e.id, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// How a projectile's sweep ended this tick
enum Impact {
    Entity { id: EntityId, point: Vec3 },
    Player { point: Vec3 },
    Obstacle { point: Vec3 },
}

fn sweep(world: &World, p: &Projectile, displacement: Vec3) -> Option<Impact> {
    let wall = world.obstacles.raycast(p.pos, displacement);

    match p.owner {
        Owner::Player => {
            let target = first_entity_hit(&world.entities, p.pos, displacement, p.radius);
            match (target, wall) {
                (Some((id, t)), wall) if wall.is_none_or(|w| t <= w.t) => Some(Impact::Entity {
                    id,
                    point: p.pos + displacement * t,
                }),
                (_, Some(w)) => Some(Impact::Obstacle { point: w.point }),
                _ => None,
            }
        }
        Owner::Enemy => {
            let end = p.pos + displacement;
            let player = world.player.pos;
            if point_segment_distance(player, p.pos, end) <= PLAYER_HIT_RADIUS {
                let t = segment_projection(player, p.pos, end);
                // A wall strictly in front of the contact point absorbs the shot
                if !wall.is_some_and(|w| w.t < t) {
                    return Some(Impact::Player {
                        point: p.pos + displacement * t,
                    });
                }
            }
            wall.map(|w| Impact::Obstacle { point: w.point })
        }
    }
}

/// Advance every projectile by `dt`
pub fn update_projectiles(world: &mut World, dt: f32) {
    let mut i = world.projectiles.len();
    while i > 0 {
        i -= 1;
        let p = world.projectiles[i].clone();
        let displacement = p.vel * dt;

        if let Some(impact) = sweep(world, &p, displacement) {
            world.projectiles.swap_remove(i);
            match impact {
                Impact::Entity { id, point } => {
                    world.spawn_tracer(p.pos, point, p.owner);
                    apply_hit(world, id, p.damage, point);
                }
                Impact::Player { point } => {
                    world.spawn_tracer(p.pos, point, p.owner);
                    damage_player(world, p.damage);
                }
                Impact::Obstacle { point } => {
                    world.spawn_tracer(p.pos, point, p.owner);
                }
            }
            continue;
        }

        let proj = &mut world.projectiles[i];
        proj.pos += displacement;
        proj.ttl -= dt;
        if proj.ttl <= 0.0 {
            world.projectiles.swap_remove(i);
        }
    }
}

/// Age tracers and drop the ones past their lifetime
pub fn update_tracers(world: &mut World, dt: f32) {
    for tracer in world.tracers.iter_mut() {
        tracer.age += dt;
    }
    world.tracers.retain(|t| !t.expired());
}

/// Random direction inside a cone of half-angle `spread` around `dir`
fn jitter(dir: Vec3, spread: f32, rng: &mut impl Rng) -> Vec3 {
    let (u, v) = dir.any_orthonormal_pair();
    let a = rng.random_range(-spread..spread);
    let b = rng.random_range(-spread..spread);
    (dir + u * a.tan() + v * b.tan()).normalize_or(dir)
}

/// Fire the player's ready weapon from `origin` along `direction`.
///
/// Returns false when nothing was fired (cooldown, dead player, paused world
/// or a zero direction).
pub fn fire_player_shot(world: &mut World, origin: Vec3, direction: Vec3) -> bool {
    if world.pending_reward.is_some() {
        return false;
    }
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return false;
    }
    let Some(weapon) = world.player.trigger() else {
        return false;
    };

    let damage = world.player.shot_damage(weapon);
    let spread = weapon.spread();
    for _ in 0..weapon.pellets() {
        let d = if spread > 0.0 {
            jitter(dir, spread, &mut world.rng)
        } else {
            dir
        };
        world.spawn_projectile(
            origin,
            d * PLAYER_SHOT_SPEED,
            PLAYER_SHOT_TTL,
            PLAYER_SHOT_RADIUS,
            Owner::Player,
            damage,
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entity::{EntityKind, Scope};
    use crate::sim::geometry::Aabb;
    use crate::sim::obstacles::{Obstacle, ObstacleKind};
    use crate::sim::player::RewardKind;
    use crate::sim::state::GameEvent;
    use glam::Vec2;
    use proptest::prelude::*;

    fn world() -> World {
        let mut w = World::empty(Settings::default());
        w.player.pos = Vec3::new(0.0, 1.0, 0.0);
        w
    }

    fn wall(w: &mut World, x: f32) {
        w.obstacles.add(Obstacle::solid(
            ObstacleKind::HouseWall,
            Aabb::on_ground(Vec2::new(x, 0.0), Vec2::new(0.25, 5.0), 0.0, 4.0),
        ));
    }

    #[test]
    fn test_player_shot_hits_nearest_entity() {
        let mut w = world();
        let near = w.spawn_entity(EntityKind::Target, Vec3::new(3.0, 0.0, 0.0), Scope::Overworld);
        let far = w.spawn_entity(EntityKind::Target, Vec3::new(4.5, 0.0, 0.0), Scope::Overworld);
        w.spawn_projectile(Vec3::new(0.0, 1.0, 0.0), Vec3::X * 70.0, 1.0, 0.08, Owner::Player, 20);

        update_projectiles(&mut w, 0.1);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.entity(near).unwrap().health, 40);
        assert_eq!(w.entity(far).unwrap().health, 60);
        assert_eq!(w.tracers.len(), 1);
        assert_eq!(w.tracers[0].owner, Owner::Player);
    }

    #[test]
    fn test_wall_shields_entity() {
        let mut w = world();
        wall(&mut w, 2.0);
        let id = w.spawn_entity(EntityKind::Target, Vec3::new(3.0, 0.0, 0.0), Scope::Overworld);
        w.spawn_projectile(Vec3::new(0.0, 1.0, 0.0), Vec3::X * 70.0, 1.0, 0.08, Owner::Player, 20);

        update_projectiles(&mut w, 0.1);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.entity(id).unwrap().health, 60);
        assert!((w.tracers[0].to.x - 1.75).abs() < 1e-4);
    }

    #[test]
    fn test_enemy_shot_hits_player() {
        let mut w = world();
        w.spawn_projectile(Vec3::new(5.0, 1.0, 0.0), Vec3::NEG_X * 42.0, 2.0, 0.15, Owner::Enemy, 6);
        update_projectiles(&mut w, 0.2);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.player.health, 94);
        assert_eq!(w.tracers[0].owner, Owner::Enemy);
        assert_eq!(w.drain_events(), vec![GameEvent::PlayerHit { damage: 6 }]);
    }

    #[test]
    fn test_enemy_shot_blocked_by_wall() {
        let mut w = world();
        wall(&mut w, 2.0);
        w.spawn_projectile(Vec3::new(5.0, 1.0, 0.0), Vec3::NEG_X * 42.0, 2.0, 0.15, Owner::Enemy, 6);
        update_projectiles(&mut w, 0.2);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.player.health, 100);
        assert_eq!(w.tracers.len(), 1);
        assert!(w.drain_events().is_empty());
    }

    #[test]
    fn test_invulnerable_player_still_absorbs_shot() {
        let mut w = world();
        w.player_vulnerable = false;
        w.spawn_projectile(Vec3::new(2.0, 1.0, 0.0), Vec3::NEG_X * 42.0, 2.0, 0.15, Owner::Enemy, 6);
        update_projectiles(&mut w, 0.1);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.player.health, 100);
    }

    #[test]
    fn test_miss_expires_without_tracer() {
        let mut w = world();
        w.spawn_projectile(Vec3::new(0.0, 1.0, 50.0), Vec3::Z * 10.0, 0.25, 0.1, Owner::Enemy, 6);
        update_projectiles(&mut w, 0.1);
        update_projectiles(&mut w, 0.1);
        assert_eq!(w.projectiles.len(), 1);
        update_projectiles(&mut w, 0.1);
        assert!(w.projectiles.is_empty());
        assert!(w.tracers.is_empty());
    }

    #[test]
    fn test_tracers_fade_out() {
        let mut w = world();
        w.spawn_tracer(Vec3::ZERO, Vec3::X, Owner::Player);
        update_tracers(&mut w, TRACER_LIFETIME * 0.5);
        assert!((w.tracers[0].opacity() - 0.5).abs() < 1e-4);
        update_tracers(&mut w, TRACER_LIFETIME);
        assert!(w.tracers.is_empty());
    }

    #[test]
    fn test_shotgun_fires_pellets_in_cone() {
        let mut w = world();
        w.player.apply_reward(RewardKind::WeaponShotgun);
        assert!(fire_player_shot(&mut w, Vec3::Y, Vec3::Z));
        assert_eq!(w.projectiles.len(), 8);
        for p in &w.projectiles {
            let cos = p.vel.normalize().dot(Vec3::Z);
            assert!(cos > (0.08f32 * 1.5).cos());
            assert_eq!(p.damage, 10);
        }
        assert!(!fire_player_shot(&mut w, Vec3::Y, Vec3::Z), "cooldown");
    }

    #[test]
    fn test_no_fire_while_reward_pending() {
        let mut w = world();
        w.pending_reward = Some(crate::sim::state::RewardOffer {
            room: 1,
            options: vec![RewardKind::Health],
        });
        assert!(!fire_player_shot(&mut w, Vec3::Y, Vec3::Z));
        assert!(w.projectiles.is_empty());
    }

    proptest! {
        #[test]
        fn prop_ttl_decreases_until_expiry(ttl in 0.05f32..2.0, dt in 0.005f32..0.1) {
            let mut w = world();
            // Flying away from the player through empty space
            w.spawn_projectile(Vec3::new(0.0, 1.0, 30.0), Vec3::Z * 5.0, ttl, 0.1, Owner::Enemy, 1);
            let mut last = ttl;
            let mut ticks = 0;
            loop {
                update_projectiles(&mut w, dt);
                ticks += 1;
                match w.projectiles.first() {
                    Some(p) => {
                        prop_assert!(p.ttl < last);
                        prop_assert!(p.ttl > 0.0);
                        last = p.ttl;
                    }
                    None => {
                        prop_assert!(last - dt <= 0.0);
                        break;
                    }
                }
                prop_assert!(ticks < 10_000);
            }
        }
    }
}
