//! Simulation settings
//!
//! Tuning knobs for world generation and spawning. The host passes these in
//! as JSON; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for world layout and AI timers
    pub seed: u64,

    // === World layout ===
    /// Houses, each holding one gated room
    pub houses: u32,
    /// Scattered rocks
    pub rocks: u32,
    /// Destructible targets
    pub targets: u32,
    /// Powerups scattered at floor start
    pub scatter_powerups: u32,

    // === Overworld population ===
    /// Melee enemies at floor start
    pub overworld_melee: u32,
    /// Ranged enemies at floor start
    pub overworld_ranged: u32,
    /// Scheduler tops the overworld back up to this many enemies
    pub overworld_enemy_cap: u32,
    /// Seconds between scheduler spawns
    pub overworld_spawn_interval: f32,

    // === Rooms ===
    /// Waves in each house room
    pub normal_room_waves: u32,
    /// Waves in the castle (boss) room
    pub boss_room_waves: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,

            houses: 4,
            rocks: 40,
            targets: 12,
            scatter_powerups: 5,

            overworld_melee: 6,
            overworld_ranged: 4,
            overworld_enemy_cap: 12,
            overworld_spawn_interval: 6.0,

            normal_room_waves: 2,
            boss_room_waves: 1,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings (seed {})", settings.seed);
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Same settings with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.overworld_spawn_interval <= 0.0 || !self.overworld_spawn_interval.is_finite() {
            return Err(SettingsError::Invalid {
                field: "overworld_spawn_interval",
                reason: "must be a positive number of seconds",
            });
        }
        if self.normal_room_waves == 0 {
            return Err(SettingsError::Invalid {
                field: "normal_room_waves",
                reason: "rooms need at least one wave",
            });
        }
        if self.boss_room_waves == 0 {
            return Err(SettingsError::Invalid {
                field: "boss_room_waves",
                reason: "rooms need at least one wave",
            });
        }
        if self.houses > 8 {
            return Err(SettingsError::Invalid {
                field: "houses",
                reason: "the arena fits at most 8 houses",
            });
        }
        Ok(())
    }
}
