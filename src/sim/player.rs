//! Player loadout and reward effects
//!
//! The player's position is owned by the input collaborator and copied in each
//! tick. Everything else the simulation needs to know about the player
//! (health, shield, weapons, multipliers) lives here.

use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reward or weapon name that matches nothing in the table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} '{name}'")]
pub struct UnknownName {
    pub what: &'static str,
    pub name: String,
}

/// Reward pool shared by room-clear offers and powerup pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Health,
    Shield,
    Damage,
    Firerate,
    AmmoRifle,
    AmmoShotgun,
    WeaponRifle,
    WeaponShotgun,
}

impl RewardKind {
    /// Every reward, in pool order
    pub const ALL: [RewardKind; 8] = [
        RewardKind::Health,
        RewardKind::Shield,
        RewardKind::Damage,
        RewardKind::Firerate,
        RewardKind::AmmoRifle,
        RewardKind::AmmoShotgun,
        RewardKind::WeaponRifle,
        RewardKind::WeaponShotgun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::Health => "health",
            RewardKind::Shield => "shield",
            RewardKind::Damage => "damage",
            RewardKind::Firerate => "firerate",
            RewardKind::AmmoRifle => "ammo_rifle",
            RewardKind::AmmoShotgun => "ammo_shotgun",
            RewardKind::WeaponRifle => "weapon_rifle",
            RewardKind::WeaponShotgun => "weapon_shotgun",
        }
    }
}

impl FromStr for RewardKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownName {
                what: "reward",
                name: s.to_string(),
            })
    }
}

/// Player weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weapon {
    Pistol,
    Rifle,
    Shotgun,
}

impl Weapon {
    pub const ALL: [Weapon; 3] = [Weapon::Pistol, Weapon::Rifle, Weapon::Shotgun];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weapon::Pistol => "pistol",
            Weapon::Rifle => "rifle",
            Weapon::Shotgun => "shotgun",
        }
    }

    /// Damage per projectile
    pub fn damage(&self) -> i32 {
        match self {
            Weapon::Pistol => 20,
            Weapon::Rifle => 12,
            Weapon::Shotgun => 10,
        }
    }

    /// Seconds between shots
    pub fn interval(&self) -> f32 {
        match self {
            Weapon::Pistol => 0.35,
            Weapon::Rifle => 0.1,
            Weapon::Shotgun => 0.9,
        }
    }

    /// Projectiles per trigger pull
    pub fn pellets(&self) -> u32 {
        match self {
            Weapon::Shotgun => 8,
            _ => 1,
        }
    }

    /// Cone half-angle for pellet spread (radians)
    pub fn spread(&self) -> f32 {
        match self {
            Weapon::Shotgun => 0.08,
            _ => 0.0,
        }
    }
}

impl FromStr for Weapon {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| UnknownName {
                what: "weapon",
                name: s.to_string(),
            })
    }
}

pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const HEALTH_REWARD: i32 = 25;
pub const SHIELD_REWARD: i32 = 25;
pub const MAX_SHIELD: i32 = 100;
pub const DAMAGE_REWARD_FACTOR: f32 = 1.15;
pub const FIRERATE_REWARD_FACTOR: f32 = 1.12;
pub const RIFLE_AMMO_REWARD: u32 = 60;
pub const SHOTGUN_AMMO_REWARD: u32 = 16;

/// Player state tracked by the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Body center, supplied by the input collaborator each tick
    pub pos: Vec3,
    pub health: i32,
    pub max_health: i32,
    pub shield: i32,
    pub damage_multiplier: f32,
    pub firerate_multiplier: f32,
    pub rifle_ammo: u32,
    pub shotgun_ammo: u32,
    pub has_rifle: bool,
    pub has_shotgun: bool,
    pub weapon: Weapon,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, 1.0, 0.0),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            shield: 0,
            damage_multiplier: 1.0,
            firerate_multiplier: 1.0,
            rifle_ammo: 0,
            shotgun_ammo: 0,
            has_rifle: false,
            has_shotgun: false,
            weapon: Weapon::Pistol,
            fire_cooldown: 0.0,
        }
    }
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply incoming damage, draining the shield first.
    ///
    /// Returns true if this hit killed the player.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.is_alive() || amount <= 0 {
            return false;
        }
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        self.health = (self.health - (amount - absorbed)).max(0);
        self.health == 0
    }

    pub fn apply_reward(&mut self, reward: RewardKind) {
        match reward {
            RewardKind::Health => {
                self.health = (self.health + HEALTH_REWARD).min(self.max_health);
            }
            RewardKind::Shield => {
                self.shield = (self.shield + SHIELD_REWARD).min(MAX_SHIELD);
            }
            RewardKind::Damage => self.damage_multiplier *= DAMAGE_REWARD_FACTOR,
            RewardKind::Firerate => self.firerate_multiplier *= FIRERATE_REWARD_FACTOR,
            RewardKind::AmmoRifle => self.rifle_ammo += RIFLE_AMMO_REWARD,
            RewardKind::AmmoShotgun => self.shotgun_ammo += SHOTGUN_AMMO_REWARD,
            RewardKind::WeaponRifle => {
                self.has_rifle = true;
                self.rifle_ammo += RIFLE_AMMO_REWARD;
                self.weapon = Weapon::Rifle;
            }
            RewardKind::WeaponShotgun => {
                self.has_shotgun = true;
                self.shotgun_ammo += SHOTGUN_AMMO_REWARD;
                self.weapon = Weapon::Shotgun;
            }
        }
    }

    /// Switch weapons if owned; the pistol is always available
    pub fn select_weapon(&mut self, weapon: Weapon) -> bool {
        let owned = match weapon {
            Weapon::Pistol => true,
            Weapon::Rifle => self.has_rifle,
            Weapon::Shotgun => self.has_shotgun,
        };
        if owned {
            self.weapon = weapon;
        }
        owned
    }

    /// Weapon that will actually fire: empty weapons fall back to the pistol
    pub fn ready_weapon(&self) -> Weapon {
        match self.weapon {
            Weapon::Rifle if self.rifle_ammo == 0 => Weapon::Pistol,
            Weapon::Shotgun if self.shotgun_ammo == 0 => Weapon::Pistol,
            w => w,
        }
    }

    /// Consume one round and start the cooldown. Returns the weapon fired.
    pub fn trigger(&mut self) -> Option<Weapon> {
        if !self.is_alive() || self.fire_cooldown > 0.0 {
            return None;
        }
        let weapon = self.ready_weapon();
        match weapon {
            Weapon::Rifle => self.rifle_ammo -= 1,
            Weapon::Shotgun => self.shotgun_ammo -= 1,
            Weapon::Pistol => {}
        }
        self.fire_cooldown = weapon.interval() / self.firerate_multiplier;
        Some(weapon)
    }

    /// Per-shot damage after multipliers
    pub fn shot_damage(&self, weapon: Weapon) -> i32 {
        ((weapon.damage() as f32) * self.damage_multiplier).round() as i32
    }

    pub fn cool_down(&mut self, dt: f32) {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
    }
}
