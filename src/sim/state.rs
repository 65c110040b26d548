//! Game state and scoring rules
//!
//! Score only ever grows during play, and the difficulty tier only ever
//! climbs. Both are owned here so every code path goes through the same
//! promotion logic.

use serde::{Deserialize, Serialize};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation running
    Running,
    /// Run ended, waiting for the restart key
    GameOver,
}

/// Ordered difficulty tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

/// Physics and spawn parameters for one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    /// Added to enemy fall velocity every tick
    pub enemy_gravity: f32,
    /// Enemy fall velocity cap
    pub terminal_velocity: f32,
    /// Uniform window for the next enemy spawn delay
    pub spawn_window_ms: (f64, f64),
    /// Chance a pickup roll yields a weapon upgrade
    pub weapon_pickup_chance: f64,
}

impl Difficulty {
    /// Score at which Hard becomes the minimum tier
    pub const HARD_SCORE: u64 = 200;
    /// Score at which Insane becomes the minimum tier
    pub const INSANE_SCORE: u64 = 500;

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    /// Lowest tier a score entitles the player to (`None` below the first threshold)
    pub fn for_score(score: u64) -> Option<Self> {
        if score >= Self::INSANE_SCORE {
            Some(Difficulty::Insane)
        } else if score >= Self::HARD_SCORE {
            Some(Difficulty::Hard)
        } else {
            None
        }
    }

    pub fn params(&self) -> DifficultyParams {
        match self {
            Difficulty::Easy => DifficultyParams {
                enemy_gravity: 0.30,
                terminal_velocity: 3.0,
                spawn_window_ms: (1400.0, 2200.0),
                weapon_pickup_chance: 0.50,
            },
            Difficulty::Normal => DifficultyParams {
                enemy_gravity: 0.45,
                terminal_velocity: 4.0,
                spawn_window_ms: (1000.0, 1800.0),
                weapon_pickup_chance: 0.35,
            },
            Difficulty::Hard => DifficultyParams {
                enemy_gravity: 0.60,
                terminal_velocity: 5.5,
                spawn_window_ms: (700.0, 1300.0),
                weapon_pickup_chance: 0.25,
            },
            Difficulty::Insane => DifficultyParams {
                enemy_gravity: 0.80,
                terminal_velocity: 7.0,
                spawn_window_ms: (450.0, 900.0),
                weapon_pickup_chance: 0.15,
            },
        }
    }
}

/// Power-up kinds dropped in the shooter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    WeaponUpgrade,
    SpeedUpgrade,
}

/// Player weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weapon {
    /// One bullet per shot
    #[default]
    Blaster,
    /// Two parallel bullets per shot
    TwinBlaster,
}

/// Runner scrolling state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scroll {
    /// Leftward obstacle speed (px/tick)
    pub block_speed: f32,
    /// Background parallax offset, wraps at the background width
    pub background_offset: f32,
    /// Last score threshold that raised the speed
    pub last_speed_up_score: u64,
}

impl Scroll {
    pub fn new(block_speed: f32) -> Self {
        Self {
            block_speed,
            background_offset: 0.0,
            last_speed_up_score: 0,
        }
    }

    /// Raise the speed once per newly crossed threshold
    pub fn check_speed_up(&mut self, score: u64, every: u64, step: f32) -> bool {
        if every == 0 {
            return false;
        }
        let threshold = (score / every) * every;
        if threshold > self.last_speed_up_score && threshold > 0 {
            self.last_speed_up_score = threshold;
            self.block_speed += step;
            return true;
        }
        false
    }
}

/// Score, tier and phase of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub scroll: Scroll,
    /// Simulation ticks processed
    pub ticks: u64,
}

impl GameState {
    pub fn new(difficulty: Difficulty, block_speed: f32) -> Self {
        Self {
            score: 0,
            difficulty,
            phase: GamePhase::Running,
            scroll: Scroll::new(block_speed),
            ticks: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Add points and promote the tier if a threshold was crossed.
    ///
    /// Returns the new tier when a promotion happened.
    pub fn add_score(&mut self, points: u64) -> Option<Difficulty> {
        self.score = self.score.saturating_add(points);
        match Difficulty::for_score(self.score) {
            Some(tier) if tier > self.difficulty => {
                self.difficulty = tier;
                Some(tier)
            }
            _ => None,
        }
    }

    /// Enter GameOver. Returns false if already over.
    pub fn end(&mut self) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::GameOver;
        true
    }
}
