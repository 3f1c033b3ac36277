//! Hit resolution: damage, death, respawn and boss drops

use glam::Vec3;

use super::entity::{EntityId, EntityKind, Scope};
use super::player::RewardKind;
use super::rooms::scatter_rewards;
use super::spawn::{spawn_overworld_enemy, spawn_target};
use super::state::{GameEvent, World};
use crate::consts::HIT_FLASH_DURATION;

/// Pickups dropped where the boss dies
pub const BOSS_DROPS: [RewardKind; 3] = [
    RewardKind::Health,
    RewardKind::Damage,
    RewardKind::WeaponRifle,
];

/// What a hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    /// The entity died and left the world
    pub removed: bool,
    pub kind: EntityKind,
    /// Score awarded (0 unless removed)
    pub score: u32,
}

/// Apply `damage` to an entity at `point`.
///
/// Returns `None` if the id is unknown, e.g. the entity was already killed
/// earlier in the same frame.
pub fn apply_hit(
    world: &mut World,
    id: EntityId,
    damage: i32,
    point: Vec3,
) -> Option<HitOutcome> {
    let entity = world.entity_mut(id)?;
    let kind = entity.kind();
    entity.health -= damage;
    entity.flash = HIT_FLASH_DURATION;

    if entity.health > 0 {
        return Some(HitOutcome {
            removed: false,
            kind,
            score: 0,
        });
    }
    entity.health = 0;

    let dead = world.remove_entity(id)?;
    let score = kind.score();
    world.score += u64::from(score);
    world.push_event(GameEvent::EntityKilled {
        entity: id,
        kind,
        pos: dead.pos,
    });
    log::debug!("{} {} destroyed at {:?}", kind.as_str(), id, point);

    match (kind, dead.scope) {
        (EntityKind::Boss, _) => {
            world.boss_alive = false;
            world.push_event(GameEvent::BossDefeated { pos: dead.pos });
            log::info!("Boss defeated on floor {}", world.floor);
            scatter_rewards(world, dead.pos, &BOSS_DROPS);
        }
        (EntityKind::Target, _) => {
            spawn_target(world);
        }
        (_, Scope::Overworld) => {
            spawn_overworld_enemy(world, kind);
        }
        (_, Scope::Room(_)) => {}
    }

    Some(HitOutcome {
        removed: true,
        kind,
        score,
    })
}

/// Register an enemy hit on the player.
///
/// `PlayerHit` is always emitted; health only drops while the player is
/// vulnerable.
pub fn damage_player(world: &mut World, amount: i32) {
    world.push_event(GameEvent::PlayerHit { damage: amount });
    if !world.player_vulnerable {
        return;
    }
    if world.player.take_damage(amount) {
        log::info!("Player killed on floor {} (score {})", world.floor, world.score);
        world.push_event(GameEvent::PlayerKilled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_invulnerable_player_keeps_health() {
        let mut w = World::empty(Settings::default());
        w.player_vulnerable = false;
        damage_player(&mut w, 50);
        assert_eq!(w.player.health, 100);
        assert_eq!(w.drain_events(), vec![GameEvent::PlayerHit { damage: 50 }]);

        w.player_vulnerable = true;
        damage_player(&mut w, 150);
        damage_player(&mut w, 10);
        let killed = w
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::PlayerKilled)
            .count();
        assert_eq!(killed, 1);
    }

    fn world() -> World {
        World::empty(Settings::default())
    }

    #[test]
    fn test_non_lethal_hit_flashes() {
        let mut w = world();
        let id = w.spawn_entity(EntityKind::Melee, Vec3::ZERO, Scope::Overworld);
        let out = apply_hit(&mut w, id, 20, Vec3::ZERO).unwrap();
        assert!(!out.removed);
        assert_eq!(out.score, 0);
        let e = w.entity(id).unwrap();
        assert_eq!(e.health, 40);
        assert_eq!(e.flash, HIT_FLASH_DURATION);
    }

    #[test]
    fn test_lethal_hit_removes_exactly_once() {
        let mut w = world();
        let id = w.spawn_entity(EntityKind::Ranged, Vec3::ZERO, Scope::Room(99));
        let out = apply_hit(&mut w, id, 1000, Vec3::ZERO).unwrap();
        assert!(out.removed);
        assert_eq!(out.score, 3);
        assert_eq!(w.score, 3);
        // Room enemies do not come back
        assert!(w.entities.is_empty());

        assert!(apply_hit(&mut w, id, 1000, Vec3::ZERO).is_none());
        assert_eq!(w.score, 3);
        let kills = w
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::EntityKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_target_is_replaced() {
        let mut w = world();
        let id = w.spawn_entity(EntityKind::Target, Vec3::new(30.0, 0.0, 0.0), Scope::Overworld);
        let out = apply_hit(&mut w, id, 100, Vec3::ZERO).unwrap();
        assert_eq!(out.score, 1);
        assert_eq!(w.entities.len(), 1);
        assert_eq!(w.entities[0].kind(), EntityKind::Target);
        assert_ne!(w.entities[0].id, id);
    }

    #[test]
    fn test_overworld_enemy_respawns_same_kind() {
        let mut w = world();
        let id = w.spawn_entity(EntityKind::Melee, Vec3::new(30.0, 0.0, 0.0), Scope::Overworld);
        apply_hit(&mut w, id, 100, Vec3::ZERO);
        assert_eq!(w.overworld_enemies(), 1);
        assert_eq!(w.entities[0].kind(), EntityKind::Melee);
    }

    #[test]
    fn test_boss_death_drops_pickups() {
        let mut w = world();
        let id = w.spawn_entity(EntityKind::Boss, Vec3::new(0.0, 0.0, -80.0), Scope::Room(5));
        assert!(w.boss_alive);
        let out = apply_hit(&mut w, id, 10_000, Vec3::ZERO).unwrap();
        assert_eq!(out.score, 20);
        assert!(!w.boss_alive);
        let drops: Vec<_> = w.powerups.iter().map(|p| p.kind).collect();
        assert_eq!(drops, BOSS_DROPS.to_vec());
        assert!(w
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::BossDefeated { .. })));
    }
}
