//! Leveling, win condition and achievements
//!
//! Achievements are a fixed catalog plus a set of unlocked ids. Unlocking is a
//! set insert, so re-signalling an id is a no-op.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::state::{RunStatus, SimState};

/// Level at which "Star Pioneer" unlocks
pub const STAR_PIONEER_LEVEL: u32 = 5;

/// Achievement identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    #[serde(rename = "first_blood")]
    FirstBlood,
    #[serde(rename = "survivor")]
    Survivor,
    #[serde(rename = "ace_pilot")]
    AcePilot,
    #[serde(rename = "power_up_master")]
    PowerUpMaster,
    #[serde(rename = "level_5")]
    StarPioneer,
    #[serde(rename = "level_10")]
    StarDominator,
}

/// Static catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementInfo {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
}

/// Every achievement, in display order
pub static CATALOG: [AchievementInfo; 6] = [
    AchievementInfo {
        id: AchievementId::FirstBlood,
        title: "First Blood",
        description: "Destroy your first enemy",
    },
    AchievementInfo {
        id: AchievementId::Survivor,
        title: "Survivor",
        description: "Survive for more than 60 seconds in one run",
    },
    AchievementInfo {
        id: AchievementId::AcePilot,
        title: "Ace Pilot",
        description: "Destroy 50 enemies in one run",
    },
    AchievementInfo {
        id: AchievementId::PowerUpMaster,
        title: "Power-Up Master",
        description: "Hold a shield and triple-shot at the same time",
    },
    AchievementInfo {
        id: AchievementId::StarPioneer,
        title: "Star Pioneer",
        description: "Reach level 5",
    },
    AchievementInfo {
        id: AchievementId::StarDominator,
        title: "Star Dominator",
        description: "Reach level 10",
    },
];

impl AchievementId {
    /// Stable string id shared with the host
    pub fn key(&self) -> &'static str {
        match self {
            AchievementId::FirstBlood => "first_blood",
            AchievementId::Survivor => "survivor",
            AchievementId::AcePilot => "ace_pilot",
            AchievementId::PowerUpMaster => "power_up_master",
            AchievementId::StarPioneer => "level_5",
            AchievementId::StarDominator => "level_10",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CATALOG.iter().map(|a| a.id).find(|id| id.key() == key)
    }

    pub fn info(&self) -> &'static AchievementInfo {
        let index = CATALOG.iter().position(|a| a.id == *self).unwrap_or(0);
        &CATALOG[index]
    }
}

/// Unlocked achievements. Monotonic: nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    unlocked: BTreeSet<AchievementId>,
}

impl Achievements {
    /// Returns true only for a first unlock
    pub fn unlock(&mut self, id: AchievementId) -> bool {
        self.unlocked.insert(id)
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AchievementId> + '_ {
        self.unlocked.iter().copied()
    }
}

/// Rank titles shown next to the level
const PILOT_RANKS: [&str; 10] = [
    "Recruit Pilot",
    "Junior Pilot",
    "Intermediate Pilot",
    "Senior Pilot",
    "Ace Pilot",
    "Star Elite",
    "Galaxy Guardian",
    "Fleet Commander",
    "Cosmic Vanguard",
    "Star Dominator",
];

/// Rank title for a level (clamped to the table)
pub fn pilot_rank(level: u32) -> &'static str {
    let index = (level.max(1) as usize - 1).min(PILOT_RANKS.len() - 1);
    PILOT_RANKS[index]
}

/// Result of the per-tick progression check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Unchanged,
    LeveledUp(u32),
    Won,
}

/// Accumulate time spent playing and unlock "survivor" past the threshold
pub fn track_survival(state: &mut SimState, timestamp: f64) {
    if let Some(last) = state.last_tick_ms {
        state.play_time_ms += (timestamp - last).max(0.0);
    }
    state.last_tick_ms = Some(timestamp);

    if state.play_time_ms > state.config.survivor_ms {
        state.unlock(AchievementId::Survivor);
    }
}

/// Advance at most one level, or win at the cap
pub fn check_level(state: &mut SimState) -> Progress {
    if state.status != RunStatus::Playing {
        return Progress::Unchanged;
    }

    let max_level = state.config.max_level;
    let threshold = state.level as u64 * state.config.level_up_score;
    let win_score = max_level as u64 * state.config.level_up_score;

    if state.level < max_level && state.score >= threshold {
        let level = state.level + 1;
        state.set_level(level);
        state.enemies.clear();
        log::info!("Level {} reached ({})", level, pilot_rank(level));

        if level >= STAR_PIONEER_LEVEL {
            state.unlock(AchievementId::StarPioneer);
        }
        if level == max_level {
            state.unlock(AchievementId::StarDominator);
        }
        Progress::LeveledUp(level)
    } else if state.level == max_level && state.score >= win_score {
        state.win();
        Progress::Won
    } else {
        Progress::Unchanged
    }
}
