//! Enemy and power-up generation
//!
//! Enemy type and stats scale with the current level. Selection walks a
//! cumulative threshold table built from level-derived chances; the slices are
//! not renormalised, so BASIC simply keeps whatever probability is left over.

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EnemyKind, PowerUp, PowerUpKind, SimState};
use crate::consts::*;

/// Stats an enemy is born with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub hp: u32,
    pub speed: f32,
    pub score_value: u64,
    pub size: Vec2,
    pub color: u32,
}

impl EnemyKind {
    /// Level-scaled stats for this enemy type
    pub fn stats(self, level: u32) -> EnemyStats {
        let lvl = level as f32;
        match self {
            EnemyKind::Basic => EnemyStats {
                hp: 1 + level / 4,
                speed: 2.0 + 0.6 * lvl,
                score_value: 100 * level as u64,
                size: Vec2::new(40.0, 40.0),
                color: NEON_GREEN,
            },
            EnemyKind::Fast => EnemyStats {
                hp: 1 + level / 5,
                speed: 5.0 + 0.7 * lvl,
                score_value: 200 * level as u64,
                size: Vec2::new(30.0, 30.0),
                color: NEON_BLUE,
            },
            EnemyKind::Heavy => EnemyStats {
                hp: 3 + level / 2,
                speed: 1.0 + 0.4 * lvl,
                score_value: 300 * level as u64,
                size: Vec2::new(60.0, 50.0),
                color: NEON_PURPLE,
            },
        }
    }

    /// Pick a type from a uniform roll in [0, 1)
    pub fn from_roll(level: u32, roll: f64) -> EnemyKind {
        SpawnTable::for_level(level).pick(roll)
    }
}

/// Cumulative thresholds: the first entry whose threshold the roll exceeds wins
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTable {
    entries: [(EnemyKind, f64); 3],
}

impl SpawnTable {
    pub fn for_level(level: u32) -> Self {
        let lvl = level as f64;
        let heavy_chance = 0.15 + 0.02 * lvl;
        let fast_chance = 0.20 + 0.02 * lvl;
        Self {
            entries: [
                (EnemyKind::Heavy, 1.0 - heavy_chance),
                (EnemyKind::Fast, 1.0 - heavy_chance - fast_chance),
                (EnemyKind::Basic, f64::NEG_INFINITY),
            ],
        }
    }

    pub fn pick(&self, roll: f64) -> EnemyKind {
        self.entries
            .iter()
            .find(|(_, threshold)| roll > *threshold)
            .map(|(kind, _)| *kind)
            .unwrap_or(EnemyKind::Basic)
    }
}

/// Gap between spawns at `level`, floored
pub fn spawn_interval(base_ms: f64, step_ms: f64, floor_ms: f64, level: u32) -> f64 {
    (base_ms - level as f64 * step_ms).max(floor_ms)
}

/// Spawn one enemy if the interval since the last spawn has elapsed.
///
/// The first call of a run only starts the clock.
pub fn try_spawn_enemy(state: &mut SimState, timestamp: f64) -> Option<u32> {
    let Some(last) = state.last_spawn_ms else {
        state.last_spawn_ms = Some(timestamp);
        return None;
    };

    let interval = spawn_interval(
        state.config.spawn_base_ms,
        state.config.spawn_step_ms,
        state.config.spawn_floor_ms,
        state.level,
    );
    if timestamp - last <= interval {
        return None;
    }

    let level = state.level;
    let roll: f64 = state.rng.random();
    let kind = EnemyKind::from_roll(level, roll);
    let stats = kind.stats(level);

    let max_x = (state.viewport.x - stats.size.x).max(0.0);
    let x = state.rng.random_range(0.0..=max_x);

    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        kind,
        pos: Vec2::new(x, -stats.size.y),
        size: stats.size,
        hp: stats.hp,
        max_hp: stats.hp,
        speed: stats.speed,
        color: stats.color,
        score_value: stats.score_value,
    });
    state.last_spawn_ms = Some(timestamp);

    log::debug!("Spawned {:?} #{} at x={:.0} (level {})", kind, id, x, level);
    Some(id)
}

/// Roll the kill drop at the destroyed enemy's top-left corner
pub fn roll_power_up_drop(state: &mut SimState, pos: Vec2) -> Option<u32> {
    if !state.rng.random_bool(state.config.powerup_drop_chance) {
        return None;
    }
    let kind = if state.rng.random_bool(0.5) {
        PowerUpKind::TripleShot
    } else {
        PowerUpKind::Shield
    };
    Some(spawn_power_up(state, kind, pos))
}

/// Place a power-up of a given kind
pub fn spawn_power_up(state: &mut SimState, kind: PowerUpKind, pos: Vec2) -> u32 {
    let id = state.next_entity_id();
    let size = state.config.powerup_size;
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos,
        size: Vec2::splat(size),
        speed: state.config.powerup_speed,
        color: NEON_RED,
    });
    log::debug!("Dropped {:?} #{}", kind, id);
    id
}
