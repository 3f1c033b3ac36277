//! Browser host bindings
//!
//! The JS shell owns the camera, input and rendering. It feeds the player
//! position in, calls `tick` once per animation frame, then pulls a snapshot,
//! the instance buffer and the frame's events back out.

use std::sync::Once;

use wasm_bindgen::prelude::*;

use crate::settings::Settings;
use crate::sim::{self, TickInput, Weapon, World};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        // Another module may have installed a logger already
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::warn!("Logger already initialized");
        }
    });
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Simulation handle exported to JS
#[wasm_bindgen]
pub struct WebArena {
    world: World,
    input: TickInput,
}

#[wasm_bindgen]
impl WebArena {
    /// Build a world from settings JSON (empty string for defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<WebArena, JsValue> {
        init_logging();
        let settings = if settings_json.trim().is_empty() {
            Settings::default().with_seed(random_seed())
        } else {
            Settings::from_json(settings_json).map_err(to_js)?
        };
        log::info!("Arena Siege starting (seed {})", settings.seed);
        Ok(Self {
            world: World::new(settings),
            input: TickInput::default(),
        })
    }

    /// Player body position and vulnerability for the next tick
    pub fn set_player(&mut self, x: f32, y: f32, z: f32, vulnerable: bool) {
        self.input.player_position = glam::Vec3::new(x, y, z);
        self.input.player_vulnerable = vulnerable;
    }

    pub fn tick(&mut self, dt: f32, interact: bool) {
        self.input.interact = interact;
        sim::tick(&mut self.world, &self.input, dt);
    }

    /// Fire the current weapon; false if nothing was fired
    pub fn fire(&mut self, ox: f32, oy: f32, oz: f32, dx: f32, dy: f32, dz: f32) -> bool {
        sim::fire_player_shot(
            &mut self.world,
            glam::Vec3::new(ox, oy, oz),
            glam::Vec3::new(dx, dy, dz),
        )
    }

    /// Switch weapon by name ("pistol", "rifle", "shotgun")
    pub fn select_weapon(&mut self, name: &str) -> bool {
        name.parse::<Weapon>().is_ok_and(|w| self.world.player.select_weapon(w))
    }

    pub fn start_floor(&mut self, floor: u32, score: f64) {
        sim::start_floor(&mut self.world, floor, score.max(0.0) as u64);
    }

    pub fn reset(&mut self) {
        sim::reset_run(&mut self.world);
    }

    pub fn reward_pending(&self) -> bool {
        self.world.pending_reward().is_some()
    }

    /// Resolve the pending offer; returns the reward name
    pub fn choose_reward(&mut self, index: usize) -> Option<String> {
        sim::choose_reward(&mut self.world, index).map(|r| r.as_str().to_string())
    }

    pub fn skip_reward(&mut self) -> bool {
        sim::skip_reward(&mut self.world)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.world.snapshot()).map_err(to_js)
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.world.drain_events()).map_err(to_js)
    }

    /// Instance buffer, `instance_floats()` floats per instance
    pub fn instances(&self) -> js_sys::Float32Array {
        let instances = self.world.snapshot().instances();
        js_sys::Float32Array::from(bytemuck::cast_slice::<_, f32>(&instances))
    }

    pub fn instance_floats() -> usize {
        std::mem::size_of::<sim::InstanceData>() / std::mem::size_of::<f32>()
    }
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64
}
