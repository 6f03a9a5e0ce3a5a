//! High score tracking
//!
//! The simulation only compares against and raises a single best score. Where
//! that integer lives is up to the host, behind [`HighScoreStore`].

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::PersistError;

/// Best score seen across runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Raise the best score if `score` beats it. Returns true on a new best.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }
}

/// Where the host keeps the high score between sessions
pub trait HighScoreStore {
    fn load(&self) -> Result<HighScore, PersistError>;
    fn save(&mut self, high_score: HighScore) -> Result<(), PersistError>;

    /// Load, treating any failure as "no score yet"
    fn load_or_default(&self) -> HighScore {
        match self.load() {
            Ok(high_score) => {
                log::info!("Loaded high score {}", high_score.best);
                high_score
            }
            Err(e) => {
                log::info!("No high score found, starting fresh ({})", e);
                HighScore::default()
            }
        }
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<HighScore, PersistError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, high_score: HighScore) -> Result<(), PersistError> {
        let json = serde_json::to_string(&high_score)?;
        fs::write(&self.path, json)?;
        log::info!("High score saved ({})", high_score.best);
        Ok(())
    }
}

/// In-process store, for tests and hosts without storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub high_score: HighScore,
    /// Number of successful saves
    pub writes: u32,
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<HighScore, PersistError> {
        Ok(self.high_score)
    }

    fn save(&mut self, high_score: HighScore) -> Result<(), PersistError> {
        self.high_score = high_score;
        self.writes += 1;
        Ok(())
    }
}
