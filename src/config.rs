//! Simulation tuning
//!
//! Every balance number the simulation reads lives here so a host can ship
//! alternative tunings as JSON without recompiling.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Failure reading or writing one of the small JSON files the host persists
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but does not parse
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Simulation tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Player ===
    /// Base movement per tick before the ship multiplier
    pub player_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub starting_lives: u32,

    // === Weapons ===
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    /// Minimum gap between shots, measured on the frame timestamp
    pub bullet_cooldown_ms: f64,
    /// Side-bullet angle while triple-shot is active (radians)
    pub triple_shot_spread: f32,

    // === Spawning ===
    pub spawn_base_ms: f64,
    pub spawn_step_ms: f64,
    pub spawn_floor_ms: f64,

    // === Power-ups ===
    /// Probability that a kill drops a power-up (0-1)
    pub powerup_drop_chance: f64,
    pub powerup_size: f32,
    pub powerup_speed: f32,
    pub invincibility_ms: f32,
    pub triple_shot_ms: f32,
    /// Fixed amount removed from buff timers each tick
    pub timer_step_ms: f32,

    // === Progression ===
    pub level_up_score: u64,
    pub max_level: u32,
    pub escape_penalty: u64,
    pub survivor_ms: f64,
    pub ace_pilot_kills: u32,

    // === Cosmetics ===
    pub star_count: usize,
    pub explosion_particles: usize,
    pub shield_pop_particles: usize,
    pub particle_decay: f32,
    pub max_particles: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            starting_lives: STARTING_LIVES,

            bullet_speed: BULLET_SPEED,
            bullet_width: BULLET_WIDTH,
            bullet_height: BULLET_HEIGHT,
            bullet_cooldown_ms: BULLET_COOLDOWN_MS,
            triple_shot_spread: TRIPLE_SHOT_SPREAD,

            spawn_base_ms: ENEMY_SPAWN_BASE_MS,
            spawn_step_ms: ENEMY_SPAWN_STEP_MS,
            spawn_floor_ms: ENEMY_SPAWN_FLOOR_MS,

            powerup_drop_chance: POWERUP_DROP_CHANCE,
            powerup_size: POWERUP_SIZE,
            powerup_speed: POWERUP_SPEED,
            invincibility_ms: INVINCIBILITY_MS,
            triple_shot_ms: TRIPLE_SHOT_MS,
            timer_step_ms: TIMER_STEP_MS,

            level_up_score: LEVEL_UP_SCORE,
            max_level: MAX_LEVEL,
            escape_penalty: ESCAPE_PENALTY,
            survivor_ms: SURVIVOR_MS,
            ace_pilot_kills: ACE_PILOT_KILLS,

            star_count: STAR_COUNT,
            explosion_particles: EXPLOSION_PARTICLES,
            shield_pop_particles: SHIELD_POP_PARTICLES,
            particle_decay: PARTICLE_DECAY,
            max_particles: MAX_PARTICLES,
        }
    }
}

impl SimConfig {
    /// Clamp values the simulation cannot work with into a usable range
    pub fn validated(mut self) -> Self {
        self.player_speed = self.player_speed.max(0.0);
        self.player_width = self.player_width.max(1.0);
        self.player_height = self.player_height.max(1.0);
        self.starting_lives = self.starting_lives.max(1);
        self.bullet_speed = self.bullet_speed.max(0.0);
        self.bullet_cooldown_ms = self.bullet_cooldown_ms.max(0.0);
        self.spawn_floor_ms = self.spawn_floor_ms.max(0.0);
        self.spawn_base_ms = self.spawn_base_ms.max(self.spawn_floor_ms);
        self.spawn_step_ms = self.spawn_step_ms.max(0.0);
        self.powerup_drop_chance = self.powerup_drop_chance.clamp(0.0, 1.0);
        self.powerup_speed = self.powerup_speed.max(0.0);
        self.timer_step_ms = self.timer_step_ms.max(0.0);
        self.level_up_score = self.level_up_score.max(1);
        self.max_level = self.max_level.max(1);
        self.particle_decay = self.particle_decay.max(f32::EPSILON);
        self
    }

    /// Read a tuning file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        Ok(config.validated())
    }

    /// Read a tuning file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded tuning from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
