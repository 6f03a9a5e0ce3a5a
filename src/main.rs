//! Star Pilot headless host
//!
//! Drives the simulation at a fixed 60 Hz frame clock with an autopilot
//! standing in for keyboard input, and reports what happened through the log.
//!
//! Usage: `star-pilot [tuning.json]` (set `RUST_LOG=info` to see events)

use glam::Vec2;

use star_pilot::sim::{GameEvent, RunStatus, ShipType, SimState, TickInput, pilot_rank, tick};
use star_pilot::{HighScoreStore, JsonFileStore, SimConfig};

/// Host frame length (ms)
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up after ten simulated minutes
const MAX_FRAMES: u32 = 60 * 60 * 10;
const VIEWPORT: Vec2 = Vec2::new(960.0, 720.0);

/// Game instance holding all host-side state
struct Game {
    state: SimState,
    store: JsonFileStore,
    time: f64,
    frames: u32,
    /// Track status for end-of-run handling
    last_status: RunStatus,
}

impl Game {
    fn new(config: SimConfig, store: JsonFileStore) -> Self {
        let mut state = SimState::new(config, VIEWPORT);
        state.high_score = store.load_or_default();
        Self {
            state,
            store,
            time: 0.0,
            frames: 0,
            last_status: RunStatus::Start,
        }
    }

    /// Steer under the lowest enemy, slide away from anything about to ram us
    fn autopilot(&self) -> TickInput {
        let player = &self.state.player;
        let center = player.center();
        let mut input = TickInput {
            fire: true,
            ..Default::default()
        };

        let threat = self.state.enemies.iter().find(|e| {
            let below_nose = e.pos.y + e.size.y > player.pos.y - 120.0;
            let lined_up = (e.center().x - center.x).abs() < (e.size.x + player.size.x) / 2.0 + 10.0;
            below_nose && lined_up
        });

        if let Some(enemy) = threat {
            if enemy.center().x >= center.x {
                input.left = true;
            } else {
                input.right = true;
            }
            return input;
        }

        let target = self
            .state
            .power_ups
            .first()
            .map(|p| p.pos.x + p.size.x / 2.0)
            .or_else(|| {
                self.state
                    .enemies
                    .iter()
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|e| e.center().x)
            });

        if let Some(x) = target {
            if x < center.x - 4.0 {
                input.left = true;
            } else if x > center.x + 4.0 {
                input.right = true;
            }
        }
        input
    }

    fn update(&mut self) {
        self.time += FRAME_MS;
        self.frames += 1;

        let input = self.autopilot();
        tick(&mut self.state, &input, self.time);

        for event in self.state.drain_events() {
            match event {
                GameEvent::LevelChanged { level } => {
                    log::info!("Level {} - rank {}", level, pilot_rank(level));
                }
                GameEvent::AchievementUnlocked(id) => {
                    log::info!("Achievement: {}", id.info().title);
                }
                GameEvent::HighScore { score } => {
                    log::debug!("New best {}", score);
                    self.save_high_score();
                }
                other => log::trace!("{:?}", other),
            }
        }

        if self.state.status != self.last_status {
            if self.state.status.is_terminal() {
                self.finish_run();
            }
            self.last_status = self.state.status;
        }
    }

    fn finish_run(&mut self) {
        log::info!(
            "Run over ({:?}): score {}, level {}, kills {}, {:.1}s",
            self.state.status,
            self.state.score,
            self.state.level,
            self.state.kills,
            self.state.play_time_ms / 1000.0
        );
        self.save_high_score();
    }

    fn save_high_score(&mut self) {
        if let Err(e) = self.store.save(self.state.high_score) {
            log::warn!("Could not save high score to {}: {}", self.store.path().display(), e);
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Star Pilot (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load_or_default(path),
        None => SimConfig::default(),
    };
    let store = JsonFileStore::new(std::env::temp_dir().join("star_pilot_highscore.json"));

    let mut game = Game::new(config, store);
    game.state.select_ship(ShipType::Speed);
    game.state.start_run();

    while game.frames < MAX_FRAMES && !game.state.status.is_terminal() {
        game.update();
    }
    if !game.state.status.is_terminal() {
        game.finish_run();
    }

    println!(
        "score {} | level {} | best {} | achievements {}/{}",
        game.state.score,
        game.state.level,
        game.state.high_score.best,
        game.state.achievements.len(),
        star_pilot::sim::CATALOG.len()
    );
}
