//! Simulation module
//!
//! All gameplay logic lives here. This module has no rendering or platform
//! dependencies:
//! - One tick per rendered frame, driven by the host's frame timestamp
//! - Input arrives as a snapshot, never mid-tick
//! - Outcomes leave as queued [`GameEvent`]s

pub mod collision;
pub mod motion;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CombatReport, apply_power_up, fire, resolve_collisions};
pub use motion::Directions;
pub use progression::{
    AchievementId, AchievementInfo, Achievements, CATALOG, Progress, check_level, pilot_rank,
};
pub use spawn::{EnemyStats, SpawnTable, spawn_interval, try_spawn_enemy};
pub use state::{
    Bullet, Enemy, EnemyKind, GameEvent, Particle, Player, PowerUp, PowerUpKind, RunStatus,
    ShipType, SimState, Star,
};
pub use tick::{TickInput, tick};
