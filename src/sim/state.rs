//! Simulation state and entity types
//!
//! Everything a tick reads or writes lives in [`SimState`]. The host owns one
//! instance and threads it through every call; nothing here is global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::progression::{AchievementId, Achievements};
use crate::Rect;
use crate::config::SimConfig;
use crate::consts::*;
use crate::highscore::HighScore;

/// Run status
///
/// `Start -> Playing -> {Paused <-> Playing} -> {GameOver | Win}`, and back to
/// `Start` on reset. Only `Playing` advances the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunStatus {
    /// Menu / ship select
    #[default]
    Start,
    /// Active gameplay
    Playing,
    /// Frozen mid-run
    Paused,
    /// Out of lives
    GameOver,
    /// Cleared the final level
    Win,
}

impl RunStatus {
    /// Terminal states that only a reset or a new run can leave
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::GameOver | RunStatus::Win)
    }
}

/// Player ship archetype, fixed for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipType {
    #[default]
    Balanced,
    Speed,
    Tank,
}

impl ShipType {
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            ShipType::Balanced => 1.0,
            ShipType::Speed => 1.5,
            ShipType::Tank => 0.7,
        }
    }

    /// Hull colour used by the fallback ship shape
    pub fn color(&self) -> u32 {
        match self {
            ShipType::Balanced => NEON_BLUE,
            ShipType::Speed => NEON_GREEN,
            ShipType::Tank => NEON_PURPLE,
        }
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Heavy,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Two extra angled bullets per shot for a limited time
    TripleShot,
    /// Absorbs the next enemy contact
    Shield,
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Movement per tick along each held axis
    pub speed: f32,
    pub invincible: bool,
    pub invincible_ms: f32,
    pub triple_shot: bool,
    pub triple_shot_ms: f32,
    /// Held until the next enemy contact
    pub shield: bool,
}

impl Player {
    pub fn new(config: &SimConfig, ship: ShipType) -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::new(config.player_width, config.player_height),
            speed: config.player_speed * ship.speed_multiplier(),
            invincible: false,
            invincible_ms: 0.0,
            triple_shot: false,
            triple_shot_ms: 0.0,
            shield: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Keep the whole craft inside the viewport
    pub fn clamp_to(&mut self, viewport: Vec2) {
        let max = (viewport - self.size).max(Vec2::ZERO);
        self.pos = self.pos.clamp(Vec2::ZERO, max);
    }

    /// Drop every timed and held buff
    pub fn clear_buffs(&mut self) {
        self.invincible = false;
        self.invincible_ms = 0.0;
        self.triple_shot = false;
        self.triple_shot_ms = 0.0;
        self.shield = false;
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Radians from straight up, positive leans right
    pub angle: f32,
    pub color: u32,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Per-tick displacement
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.speed * self.angle.sin(), -self.speed * self.angle.cos())
    }
}

/// An enemy craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: u32,
    pub max_hp: u32,
    pub speed: f32,
    pub color: u32,
    pub score_value: u64,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub color: u32,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// A particle for visual effects (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    /// Centre of the particle
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// 1.0 at birth, removed at 0
    pub life: f32,
    pub max_life: f32,
    pub color: u32,
}

/// Background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

/// Something the host should hear about, queued during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged { delta: i64, score: u64 },
    LivesChanged { delta: i32, lives: u32 },
    LevelChanged { level: u32 },
    StatusChanged { from: RunStatus, to: RunStatus },
    AchievementUnlocked(AchievementId),
    /// Fires once per run, before the status patch
    GameOver { score: u64, level: u32 },
    HighScore { score: u64 },
    EnemyDestroyed { kind: EnemyKind },
    EnemyEscaped { kind: EnemyKind },
    PowerUpCollected { kind: PowerUpKind },
    PlayerHit { shielded: bool },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct SimState {
    pub config: SimConfig,
    /// Viewport size in pixels
    pub viewport: Vec2,
    pub status: RunStatus,
    pub ship: ShipType,

    // === Run-level state ===
    pub score: u64,
    pub lives: u32,
    /// 1..=max_level
    pub level: u32,
    /// Enemies destroyed this run
    pub kills: u32,
    /// Time spent in `Playing` this run (ms)
    pub play_time_ms: f64,

    // === Cross-run state ===
    pub achievements: Achievements,
    pub high_score: HighScore,

    // === Entities ===
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,

    // === Clocks (frame timestamps, ms) ===
    pub(crate) last_shot_ms: Option<f64>,
    pub(crate) last_spawn_ms: Option<f64>,
    pub(crate) last_tick_ms: Option<f64>,

    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
    viewport_sized: bool,
}

impl SimState {
    /// Create a simulation seeded from the thread RNG
    pub fn new(config: SimConfig, viewport: Vec2) -> Self {
        Self::from_rng(config, viewport, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Create a simulation with a fixed seed (tests, replays of a single session)
    pub fn with_seed(config: SimConfig, viewport: Vec2, seed: u64) -> Self {
        Self::from_rng(config, viewport, Pcg32::seed_from_u64(seed))
    }

    fn from_rng(config: SimConfig, viewport: Vec2, rng: Pcg32) -> Self {
        let config = config.validated();
        let ship = ShipType::default();
        let mut state = Self {
            player: Player::new(&config, ship),
            lives: config.starting_lives,
            config,
            viewport: Vec2::ZERO,
            status: RunStatus::Start,
            ship,
            score: 0,
            level: 1,
            kills: 0,
            play_time_ms: 0.0,
            achievements: Achievements::default(),
            high_score: HighScore::default(),
            bullets: Vec::new(),
            enemies: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            last_shot_ms: None,
            last_spawn_ms: None,
            last_tick_ms: None,
            rng,
            events: Vec::new(),
            next_id: 1,
            viewport_sized: false,
        };
        state.resize(viewport.x, viewport.y);
        state.seed_stars();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events queued and not yet drained
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Update the viewport. The first real size centres the player.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(0.0), height.max(0.0));
        if !self.viewport_sized && width > 0.0 && height > 0.0 {
            self.place_player_at_start();
            self.viewport_sized = true;
        }
        self.player.clamp_to(self.viewport);
    }

    fn place_player_at_start(&mut self) {
        self.player.pos = Vec2::new(
            self.viewport.x / 2.0 - self.player.size.x / 2.0,
            self.viewport.y - PLAYER_START_OFFSET,
        );
        self.player.clamp_to(self.viewport);
    }

    /// Scatter the ambient starfield across the viewport
    pub fn seed_stars(&mut self) {
        let count = self.config.star_count;
        let viewport = self.viewport;
        self.stars.clear();
        for _ in 0..count {
            let star = Star {
                pos: Vec2::new(
                    self.rng.random::<f32>() * viewport.x,
                    self.rng.random::<f32>() * viewport.y,
                ),
                size: self.rng.random::<f32>() * 2.0,
                speed: self.rng.random::<f32>() * 2.0 + 0.5,
            };
            self.stars.push(star);
        }
    }

    fn set_status(&mut self, to: RunStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        // Paused wall-clock time never counts toward the play clock
        self.last_tick_ms = None;
        log::debug!("Status {:?} -> {:?}", from, to);
        self.emit(GameEvent::StatusChanged { from, to });
    }

    /// Pick the ship for the next run. Ignored mid-run.
    pub fn select_ship(&mut self, ship: ShipType) -> bool {
        if matches!(self.status, RunStatus::Playing | RunStatus::Paused) {
            return false;
        }
        self.ship = ship;
        self.player.speed = self.config.player_speed * ship.speed_multiplier();
        true
    }

    /// Begin a fresh run from the menu or an end screen
    pub fn start_run(&mut self) -> bool {
        if !matches!(
            self.status,
            RunStatus::Start | RunStatus::GameOver | RunStatus::Win
        ) {
            return false;
        }

        self.score = 0;
        self.lives = self.config.starting_lives;
        self.level = 1;
        self.kills = 0;
        self.play_time_ms = 0.0;
        self.bullets.clear();
        self.enemies.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.last_shot_ms = None;
        self.last_spawn_ms = None;

        self.player = Player::new(&self.config, self.ship);
        self.place_player_at_start();
        self.seed_stars();

        log::info!("Run started with {:?} ship", self.ship);
        self.set_status(RunStatus::Playing);
        true
    }

    /// Playing <-> Paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.status {
            RunStatus::Playing => self.set_status(RunStatus::Paused),
            RunStatus::Paused => self.set_status(RunStatus::Playing),
            _ => return false,
        }
        true
    }

    /// Abandon a paused run or leave an end screen
    pub fn quit_to_menu(&mut self) -> bool {
        if !matches!(
            self.status,
            RunStatus::Paused | RunStatus::GameOver | RunStatus::Win
        ) {
            return false;
        }
        self.set_status(RunStatus::Start);
        true
    }

    /// Back to the menu after a run ends; same guard as [`Self::quit_to_menu`]
    pub fn reset(&mut self) -> bool {
        self.quit_to_menu()
    }

    /// Add points and check the best score
    pub fn award(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.emit(GameEvent::ScoreChanged {
            delta: points as i64,
            score: self.score,
        });
        if self.high_score.record(self.score) {
            self.emit(GameEvent::HighScore { score: self.score });
        }
    }

    /// Remove points, never going below zero
    pub fn penalize(&mut self, points: u64) {
        let before = self.score;
        self.score = self.score.saturating_sub(points);
        if self.score != before {
            self.emit(GameEvent::ScoreChanged {
                delta: -((before - self.score) as i64),
                score: self.score,
            });
        }
    }

    /// Take one life. Returns true if that was the last one.
    pub fn lose_life(&mut self) -> bool {
        if self.lives == 0 {
            return true;
        }
        self.lives -= 1;
        self.emit(GameEvent::LivesChanged {
            delta: -1,
            lives: self.lives,
        });
        if self.lives == 0 {
            log::info!("Game over: score {} at level {}", self.score, self.level);
            self.emit(GameEvent::GameOver {
                score: self.score,
                level: self.level,
            });
            self.set_status(RunStatus::GameOver);
            true
        } else {
            false
        }
    }

    /// Move to a new level
    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
        self.emit(GameEvent::LevelChanged { level });
    }

    pub(crate) fn win(&mut self) {
        log::info!("Run won with score {}", self.score);
        self.set_status(RunStatus::Win);
    }

    /// Unlock an achievement; repeat unlocks are silent
    pub fn unlock(&mut self, id: AchievementId) -> bool {
        if self.achievements.unlock(id) {
            log::info!("Achievement unlocked: {}", id.key());
            self.emit(GameEvent::AchievementUnlocked(id));
            true
        } else {
            false
        }
    }

    /// Burst of particles centred on `center`
    pub fn spawn_explosion(&mut self, center: Vec2, color: u32, count: usize) {
        let room = self.config.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let id = self.next_entity_id();
            let particle = Particle {
                id,
                pos: center,
                vel: Vec2::new(
                    (self.rng.random::<f32>() - 0.5) * 10.0,
                    (self.rng.random::<f32>() - 0.5) * 10.0,
                ),
                size: self.rng.random::<f32>() * 4.0 + 1.0,
                life: 1.0,
                max_life: self.rng.random::<f32>() * 0.5 + 0.5,
                color,
            };
            self.particles.push(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SimState {
        SimState::with_seed(SimConfig::default(), Vec2::new(800.0, 600.0), 7)
    }

    #[test]
    fn test_new_state_defaults() {
        let s = state();
        assert_eq!(s.status, RunStatus::Start);
        assert_eq!(s.lives, 3);
        assert_eq!(s.level, 1);
        assert_eq!(s.stars.len(), STAR_COUNT);
        assert_eq!(s.player.pos, Vec2::new(380.0, 500.0));
    }

    #[test]
    fn test_ship_speed_multipliers() {
        let mut s = state();
        assert!(s.select_ship(ShipType::Speed));
        assert_eq!(s.player.speed, 7.5);
        s.select_ship(ShipType::Tank);
        assert!((s.player.speed - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_ship_locked_during_run() {
        let mut s = state();
        s.start_run();
        assert!(!s.select_ship(ShipType::Speed));
        assert_eq!(s.ship, ShipType::Balanced);
        assert_eq!(s.player.speed, PLAYER_SPEED);
    }

    #[test]
    fn test_status_transitions() {
        let mut s = state();
        assert!(!s.toggle_pause());
        assert!(s.start_run());
        assert_eq!(s.status, RunStatus::Playing);
        assert!(!s.start_run());
        assert!(s.toggle_pause());
        assert_eq!(s.status, RunStatus::Paused);
        assert!(s.toggle_pause());
        assert_eq!(s.status, RunStatus::Playing);
        assert!(!s.quit_to_menu());
        s.toggle_pause();
        assert!(s.quit_to_menu());
        assert_eq!(s.status, RunStatus::Start);

        let events = s.drain_events();
        let changes = events
            .iter()
            .filter(|e| matches!(e, GameEvent::StatusChanged { .. }))
            .count();
        assert_eq!(changes, 5);
    }

    #[test]
    fn test_start_run_resets_run_but_keeps_achievements() {
        let mut s = state();
        s.start_run();
        s.award(700);
        s.kills = 3;
        s.unlock(AchievementId::FirstBlood);
        s.lives = 1;
        s.lose_life();
        assert_eq!(s.status, RunStatus::GameOver);

        assert!(s.start_run());
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 3);
        assert_eq!(s.kills, 0);
        assert!(s.achievements.is_unlocked(AchievementId::FirstBlood));
        assert_eq!(s.high_score.best, 700);
    }

    #[test]
    fn test_penalize_floors_at_zero() {
        let mut s = state();
        s.award(20);
        s.drain_events();
        s.penalize(50);
        assert_eq!(s.score, 0);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::ScoreChanged { delta: -20, score: 0 }]
        );
        s.penalize(50);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut s = state();
        s.start_run();
        s.drain_events();
        assert!(!s.lose_life());
        assert!(!s.lose_life());
        assert!(s.lose_life());
        assert!(s.lose_life());
        assert_eq!(s.lives, 0);
        let overs = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_resize_clamps_player() {
        let mut s = state();
        s.player.pos = Vec2::new(790.0, 590.0);
        s.resize(400.0, 300.0);
        assert_eq!(s.player.pos, Vec2::new(360.0, 260.0));
    }

    #[test]
    fn test_explosion_respects_particle_cap() {
        let mut s = SimState::with_seed(
            SimConfig {
                max_particles: 10,
                ..Default::default()
            },
            Vec2::new(800.0, 600.0),
            1,
        );
        s.spawn_explosion(Vec2::new(10.0, 10.0), NEON_RED, 15);
        assert_eq!(s.particles.len(), 10);
        assert!(s.particles.iter().all(|p| p.life == 1.0 && p.pos == Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_reset_returns_to_menu_from_end_screens() {
        let mut s = state();
        assert!(!s.reset());
        s.start_run();
        assert!(!s.reset());
        assert_eq!(s.status, RunStatus::Playing);

        s.lives = 1;
        s.lose_life();
        assert_eq!(s.status, RunStatus::GameOver);
        assert!(s.reset());
        assert_eq!(s.status, RunStatus::Start);

        s.start_run();
        s.win();
        assert!(s.reset());
        assert_eq!(s.status, RunStatus::Start);
        assert!(s.select_ship(ShipType::Tank));
    }

    #[test]
    fn test_particles_get_unique_ids() {
        let mut s = state();
        let enemy_id = s.next_entity_id();
        s.spawn_explosion(Vec2::new(50.0, 50.0), NEON_GREEN, 15);
        s.spawn_explosion(Vec2::new(80.0, 80.0), NEON_PURPLE, 20);

        let mut ids: Vec<u32> = s.particles.iter().map(|p| p.id).collect();
        ids.push(enemy_id);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 36);
    }
}
