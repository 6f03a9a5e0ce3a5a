//! Per-tick movement and off-screen culling
//!
//! Nothing here emits events; positions change and dead entities are filtered
//! in place. Enemy escapes are a combat outcome and are resolved later.

use glam::Vec2;
use rand::Rng;

use super::state::SimState;
use crate::consts::BULLET_CULL_MARGIN;

/// Held direction snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directions {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Shift the player along each held axis, apply a pointer override, then clamp.
///
/// Diagonals move at full speed on both axes.
pub fn move_player(state: &mut SimState, dirs: Directions, pointer: Option<Vec2>) {
    let player = &mut state.player;
    let speed = player.speed;
    if dirs.left {
        player.pos.x -= speed;
    }
    if dirs.right {
        player.pos.x += speed;
    }
    if dirs.up {
        player.pos.y -= speed;
    }
    if dirs.down {
        player.pos.y += speed;
    }
    if let Some(target) = pointer {
        player.pos = target - player.size / 2.0;
    }
    player.clamp_to(state.viewport);
}

/// Count down buff timers by the fixed per-tick step
pub fn decay_timers(state: &mut SimState) {
    let step = state.config.timer_step_ms;
    let player = &mut state.player;
    if player.invincible {
        player.invincible_ms -= step;
        if player.invincible_ms <= 0.0 {
            player.invincible = false;
            player.invincible_ms = 0.0;
        }
    }
    if player.triple_shot {
        player.triple_shot_ms -= step;
        if player.triple_shot_ms <= 0.0 {
            player.triple_shot = false;
            player.triple_shot_ms = 0.0;
            log::debug!("Triple-shot expired");
        }
    }
}

/// Scroll the starfield, wrapping stars that leave the bottom
pub fn move_stars(state: &mut SimState) {
    let viewport = state.viewport;
    for star in &mut state.stars {
        star.pos.y += star.speed;
        if star.pos.y > viewport.y {
            star.pos.y = 0.0;
            star.pos.x = state.rng.random::<f32>() * viewport.x;
        }
    }
}

/// Advance bullets and drop those well outside the viewport
pub fn move_bullets(state: &mut SimState) {
    let viewport = state.viewport;
    state.bullets.retain_mut(|b| {
        b.pos += b.velocity();
        b.pos.y > -BULLET_CULL_MARGIN
            && b.pos.y < viewport.y + BULLET_CULL_MARGIN
            && b.pos.x > -BULLET_CULL_MARGIN
            && b.pos.x < viewport.x + BULLET_CULL_MARGIN
    });
}

/// Enemies fall straight down at their own speed
pub fn move_enemies(state: &mut SimState) {
    for enemy in &mut state.enemies {
        enemy.pos.y += enemy.speed;
    }
}

/// Power-ups fall and are dropped once past the bottom edge
pub fn move_power_ups(state: &mut SimState) {
    let bottom = state.viewport.y;
    state.power_ups.retain_mut(|p| {
        p.pos.y += p.speed;
        p.pos.y < bottom
    });
}

/// Drift and fade particles
pub fn update_particles(state: &mut SimState) {
    let decay = state.config.particle_decay;
    state.particles.retain_mut(|p| {
        p.pos += p.vel;
        p.life -= decay;
        p.life > 0.0
    });
}
