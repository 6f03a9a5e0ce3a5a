//! Frame-driven simulation tick
//!
//! One call per rendered frame. The tick owns no rules of its own; it reads an
//! input snapshot and runs motion, spawning, combat and progression in a fixed
//! order.

use glam::Vec2;

use super::collision::{fire, resolve_collisions};
use super::motion::{
    Directions, decay_timers, move_bullets, move_enemies, move_player, move_power_ups,
    move_stars, update_particles,
};
use super::progression::{check_level, track_survival};
use super::spawn::try_spawn_enemy;
use super::state::{RunStatus, SimState};

/// Input snapshot for a single tick, captured by the host before the call
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire button held
    pub fire: bool,
    /// Absolute pointer/touch position; centres the player there
    pub pointer: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn directions(&self) -> Directions {
        Directions {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
        }
    }
}

/// Advance the simulation by one frame.
///
/// `timestamp` is the host's monotonic frame clock in milliseconds. It gates the
/// fire cooldown, the spawn interval and the play clock; buff timers tick down
/// by a fixed step regardless of it.
pub fn tick(state: &mut SimState, input: &TickInput, timestamp: f64) {
    if input.pause {
        state.toggle_pause();
    }

    // Only live play advances anything
    if state.status != RunStatus::Playing {
        return;
    }

    track_survival(state, timestamp);

    // Player
    move_player(state, input.directions(), input.pointer);
    if input.fire {
        fire(state, timestamp);
    }
    decay_timers(state);

    // Spawning
    try_spawn_enemy(state, timestamp);

    // Motion
    move_stars(state);
    move_bullets(state);
    move_enemies(state);
    move_power_ups(state);

    // Combat
    let report = resolve_collisions(state);
    if report.game_over {
        return;
    }

    // Progression
    check_level(state);

    update_particles(state);
}
