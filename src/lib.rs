//! Star Pilot - simulation core for a 2D arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (motion, spawning, combat, progression)
//! - `config`: Data-driven game balance
//! - `highscore`: Best-score tracking and its storage seam
//!
//! Rendering, menus and input-device wiring live in the host. The host feeds a
//! [`sim::TickInput`] snapshot plus a frame timestamp into [`sim::tick`] once per
//! rendered frame and drains [`sim::GameEvent`]s afterwards.

pub mod config;
pub mod highscore;
pub mod sim;

pub use config::{PersistError, SimConfig};
pub use highscore::{HighScore, HighScoreStore, JsonFileStore, MemoryStore};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game tuning defaults (mirrored by `SimConfig::default`)
pub mod consts {
    /// Fixed per-tick decrement applied to buff timers (ms)
    pub const TIMER_STEP_MS: f32 = 16.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Distance of the player's top edge from the viewport bottom at run start
    pub const PLAYER_START_OFFSET: f32 = 100.0;
    pub const STARTING_LIVES: u32 = 3;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 8.0;
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 15.0;
    pub const BULLET_COOLDOWN_MS: f64 = 200.0;
    /// Angular offset of the side bullets while triple-shot is active (radians)
    pub const TRIPLE_SHOT_SPREAD: f32 = 0.2;
    /// How far outside the viewport a bullet may travel before it is culled
    pub const BULLET_CULL_MARGIN: f32 = 20.0;

    /// Enemy spawn pacing (ms)
    pub const ENEMY_SPAWN_BASE_MS: f64 = 1500.0;
    pub const ENEMY_SPAWN_STEP_MS: f64 = 120.0;
    pub const ENEMY_SPAWN_FLOOR_MS: f64 = 300.0;

    /// Power-up defaults
    pub const POWERUP_DROP_CHANCE: f64 = 0.1;
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_SPEED: f32 = 2.0;
    pub const INVINCIBILITY_MS: f32 = 2000.0;
    pub const TRIPLE_SHOT_MS: f32 = 10_000.0;

    /// Progression
    pub const LEVEL_UP_SCORE: u64 = 1000;
    pub const MAX_LEVEL: u32 = 10;
    pub const ESCAPE_PENALTY: u64 = 50;
    pub const SURVIVOR_MS: f64 = 60_000.0;
    pub const ACE_PILOT_KILLS: u32 = 50;

    /// Cosmetics
    pub const STAR_COUNT: usize = 100;
    pub const EXPLOSION_PARTICLES: usize = 15;
    pub const SHIELD_POP_PARTICLES: usize = 20;
    pub const PARTICLE_DECAY: f32 = 0.02;
    pub const MAX_PARTICLES: usize = 512;

    /// Palette (0xRRGGBB)
    pub const NEON_BLUE: u32 = 0x00f2ff;
    pub const NEON_GREEN: u32 = 0x39ff14;
    pub const NEON_PURPLE: u32 = 0xbc13fe;
    pub const NEON_RED: u32 = 0xff3131;
}

/// Axis-aligned rectangle in viewport pixels (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from a top-left position and a size
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Strict AABB overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}
