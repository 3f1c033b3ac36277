//! Arena Siege entry point
//!
//! On the web the JS shell drives `platform::web::WebArena` and this binary's
//! main does nothing. Natively it runs a headless scripted session: the player
//! walks to the next uncleared room, shoots the nearest enemy and always takes
//! the first reward offered.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use arena_siege::consts::*;
    use arena_siege::sim::{
        GameEvent, RoomState, TickInput, World, choose_reward, fire_player_shot, tick,
    };
    use arena_siege::{Settings, SettingsError};
    use glam::Vec3;

    /// Seconds of simulated play
    const SESSION_SECONDS: f32 = 90.0;
    /// Scripted walking speed
    const WALK_SPEED: f32 = 6.0;

    pub fn load_settings() -> Result<Settings, SettingsError> {
        match std::env::args().nth(1) {
            Some(path) => Settings::load(path),
            None => Ok(Settings::default()),
        }
    }

    /// Where the scripted player wants to go this frame: in front of the next
    /// uncleared room's door, then through it to the entry point
    fn walk_target(world: &World, player: Vec3) -> Vec3 {
        let Some(room) = world.rooms.iter().find(|r| r.state != RoomState::Cleared) else {
            return Vec3::ZERO;
        };
        let Some(door) = room.doorways.first() else {
            return room.entry;
        };
        let porch = Vec3::new(room.entry.x, player.y, door.max.z + 2.0);
        let inside = room.interior.contains_ground(arena_siege::ground(player));
        let lined_up = (player.x - room.entry.x).abs() < 0.5 && player.z > room.entry.z;
        if inside || lined_up {
            room.entry
        } else {
            porch
        }
    }

    pub fn run(settings: Settings) {
        let mut world = World::new(settings);
        let mut input = TickInput::default();
        let mut shots = 0u32;
        let mut kills = 0u32;
        let mut hits_taken = 0u32;
        let steps = (SESSION_SECONDS / FRAME_DT) as u32;

        for _ in 0..steps {
            // Walk toward the next room entry
            let target = walk_target(&world, input.player_position);
            let to = arena_siege::flatten(target - input.player_position);
            if to.length() > 0.5 {
                input.player_position += to.normalize() * WALK_SPEED * FRAME_DT;
            }
            input.interact = true;

            // Shoot the nearest enemy
            let eye = input.player_position;
            let nearest = world
                .entities
                .iter()
                .filter(|e| e.kind().is_enemy())
                .map(|e| e.center())
                .min_by(|a, b| a.distance_squared(eye).total_cmp(&b.distance_squared(eye)));
            if let Some(aim) = nearest {
                if fire_player_shot(&mut world, eye, aim - eye) {
                    shots += 1;
                }
            }

            tick(&mut world, &input, FRAME_DT);

            for event in world.drain_events() {
                match event {
                    GameEvent::EntityKilled { .. } => kills += 1,
                    GameEvent::PlayerHit { .. } => hits_taken += 1,
                    GameEvent::RewardOffered { options, .. } => {
                        log::info!("Offered {:?}", options);
                    }
                    GameEvent::PlayerKilled => log::info!("Player died"),
                    _ => {}
                }
            }
            if world.pending_reward().is_some() {
                choose_reward(&mut world, 0);
            }
            if !world.player.is_alive() {
                break;
            }
        }

        println!("Session over after {:.1}s", world.time);
        println!("  floor {} score {}", world.floor, world.score);
        println!("  shots {} kills {} hits taken {}", shots, kills, hits_taken);
        println!(
            "  player health {} shield {}",
            world.player.health, world.player.shield
        );
        let cleared = world
            .rooms
            .iter()
            .filter(|r| r.state == RoomState::Cleared)
            .count();
        println!("  rooms cleared {}/{}", cleared, world.rooms.len());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arena Siege (native, headless) starting...");

    match headless::load_settings() {
        Ok(settings) => headless::run(settings),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The JS shell constructs `WebArena`; nothing to do here
}
