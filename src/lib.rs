//! Arena Siege - simulation core for a browser first-person arena shooter
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (collision, projectiles, AI, rooms, spawning)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `platform`: Browser host bindings (wasm only)

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation will integrate in one tick
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta used by the native runner and tests
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Half extent of the square arena (world units)
    pub const ARENA_HALF_EXTENT: f32 = 120.0;

    /// Player capsule radius used by enemy projectile tests
    pub const PLAYER_HIT_RADIUS: f32 = 0.45;
    /// Extra clearance left after push-out
    pub const COLLISION_EPSILON: f32 = 0.01;

    /// Ranged enemies keep the player inside this band
    pub const RANGED_MIN_DISTANCE: f32 = 12.0;
    pub const RANGED_MAX_DISTANCE: f32 = 24.0;
    pub const RANGED_SHOT_SPEED: f32 = 42.0;
    pub const RANGED_SHOT_DAMAGE: i32 = 6;
    pub const RANGED_SHOT_TTL: f32 = 2.0;
    /// Cooldown after a successful shot (seconds, min/max)
    pub const RANGED_COOLDOWN: (f32, f32) = (1.1, 1.7);
    /// Cooldown after a blocked line of sight (seconds, min/max)
    pub const RANGED_RETRY: (f32, f32) = (0.3, 0.7);
    /// Strafe oscillation frequency (radians per second)
    pub const RANGED_STRAFE_FREQUENCY: f32 = 1.3;

    /// Boss distance band
    pub const BOSS_MIN_DISTANCE: f32 = 18.0;
    pub const BOSS_MAX_DISTANCE: f32 = 32.0;
    pub const BOSS_AIMED_SPEED: f32 = 55.0;
    pub const BOSS_AIMED_DAMAGE: i32 = 10;
    pub const BOSS_AIMED_COOLDOWN: (f32, f32) = (0.9, 1.4);
    pub const BOSS_BURST_COUNT: u32 = 14;
    pub const BOSS_BURST_SPEED: f32 = 35.0;
    pub const BOSS_BURST_DAMAGE: i32 = 7;
    pub const BOSS_BURST_COOLDOWN: (f32, f32) = (5.0, 7.0);
    pub const BOSS_SHOT_TTL: f32 = 3.0;

    /// Melee contact attack
    pub const MELEE_CONTACT_DAMAGE: i32 = 8;
    pub const MELEE_ATTACK_COOLDOWN: f32 = 0.8;
    /// Extra reach beyond touching distance for contact attacks
    pub const MELEE_REACH: f32 = 0.2;

    /// Player projectiles
    pub const PLAYER_SHOT_SPEED: f32 = 70.0;
    pub const PLAYER_SHOT_TTL: f32 = 1.5;
    pub const PLAYER_SHOT_RADIUS: f32 = 0.08;
    pub const ENEMY_SHOT_RADIUS: f32 = 0.15;

    /// Tracer lifetime budget (seconds)
    pub const TRACER_LIFETIME: f32 = 0.12;
    /// Damage flash duration (seconds)
    pub const HIT_FLASH_DURATION: f32 = 0.12;

    /// Idle motion for targets and powerups
    pub const BOB_AMPLITUDE: f32 = 0.25;
    pub const BOB_FREQUENCY: f32 = 2.0;
    pub const IDLE_SPIN_SPEED: f32 = 1.2;

    /// Powerup pickup radius
    pub const POWERUP_PICKUP_RADIUS: f32 = 1.2;
    /// Height powerups hover at
    pub const POWERUP_HOVER_HEIGHT: f32 = 0.8;

    /// Score per kill
    pub const SCORE_TARGET: u32 = 1;
    pub const SCORE_ENEMY: u32 = 3;
    pub const SCORE_BOSS: u32 = 20;

    /// Random placement gives up after this many tries and keeps the last one
    pub const SPAWN_PLACEMENT_ATTEMPTS: u32 = 24;
    /// Random spawns keep at least this far from the player
    pub const MIN_SPAWN_DISTANCE_FROM_PLAYER: f32 = 15.0;

    /// Rooms
    pub const ROOM_TRIGGER_RADIUS: f32 = 3.0;
    pub const REWARD_CHOICES: usize = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Drop the vertical component of a world vector
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn ground(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Yaw (radians around +Y) that faces along a horizontal direction
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    normalize_angle(dir.x.atan2(dir.z))
}

/// Horizontal unit direction for a yaw angle
#[inline]
pub fn yaw_to_dir(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}
