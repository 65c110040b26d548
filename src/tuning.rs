//! Data-driven game balance
//!
//! Every struct deserializes with defaults, so a tuning document only needs
//! the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::consts::TICK_MS;
use crate::error::EngineError;
use crate::sim::Difficulty;

/// Visible playfield in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
        }
    }
}

/// Which obstacle the runner spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObstacleStyle {
    /// Static block with an inset collision box
    Block,
    /// Breathing spikes anchored to the ground
    #[default]
    Spikes,
}

impl ObstacleStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleStyle::Block => "Block",
            ObstacleStyle::Spikes => "Spikes",
        }
    }
}

/// Side-scrolling runner balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    /// Added to vertical velocity every tick (px/tick²)
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative = up)
    pub jump_impulse: f32,
    /// Player top edge when standing
    pub ground_level: f32,
    /// Initial leftward obstacle speed (px/tick)
    pub block_speed: f32,
    /// Added to the block speed at each score threshold
    pub speed_up_step: f32,
    /// Score distance between speed-ups
    pub speed_up_every: u64,
    pub spawn_interval_ms: f64,
    pub score_interval_ms: f64,
    pub score_per_interval: u64,
    /// Background image width the parallax offset wraps at
    pub background_width: f32,
    /// Background speed relative to obstacles
    pub parallax_factor: f32,
    pub obstacle: ObstacleStyle,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            jump_impulse: -16.0,
            ground_level: 230.0,
            block_speed: 5.0,
            speed_up_step: 2.0,
            speed_up_every: 100,
            spawn_interval_ms: 2000.0,
            score_interval_ms: 1000.0,
            score_per_interval: 10,
            background_width: 1600.0,
            parallax_factor: 0.5,
            obstacle: ObstacleStyle::Spikes,
        }
    }
}

/// Vertical shooter balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    /// Steering speed (px/tick)
    pub player_speed: f32,
    /// Steering speed while the speed upgrade is active
    pub boosted_player_speed: f32,
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    /// Horizontal offset of each twin-blaster bullet from center
    pub twin_offset: f32,
    pub fire_cooldown_ms: f64,
    pub enemy_size: f32,
    pub pickup_size: f32,
    /// Constant pickup fall speed (px/tick)
    pub pickup_fall_speed: f32,
    /// Bullets are dropped once their bottom edge is this far above the top
    pub bullet_despawn_margin: f32,
    /// Enemies and pickups are dropped this far below the bottom edge
    pub fall_despawn_margin: f32,
    pub lives: u8,
    pub invulnerability_ms: f64,
    pub blink_interval_ms: f64,
    pub kill_score: u64,
    pub pickup_interval_ms: f64,
    pub speed_pickup_chance: f64,
    pub weapon_duration_ms: f64,
    pub speed_duration_ms: f64,
    pub explosion_ms: f64,
    pub starting_difficulty: Difficulty,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            player_speed: 8.0,
            boosted_player_speed: 12.0,
            bullet_speed: 15.0,
            bullet_width: 6.0,
            bullet_height: 18.0,
            twin_offset: 12.0,
            fire_cooldown_ms: 220.0,
            enemy_size: 64.0,
            pickup_size: 32.0,
            pickup_fall_speed: 3.0,
            bullet_despawn_margin: 10.0,
            fall_despawn_margin: 50.0,
            lives: 3,
            invulnerability_ms: 1200.0,
            blink_interval_ms: 100.0,
            kill_score: 10,
            pickup_interval_ms: 6000.0,
            speed_pickup_chance: 0.2,
            weapon_duration_ms: 30_000.0,
            speed_duration_ms: 25_000.0,
            explosion_ms: 300.0,
            starting_difficulty: Difficulty::Normal,
        }
    }
}

/// Game variant and its balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Variant {
    Runner(RunnerTuning),
    Shooter(ShooterTuning),
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Runner(RunnerTuning::default())
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Simulation tick period
    pub tick_ms: f64,
    pub playfield: Playfield,
    pub variant: Variant,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            playfield: Playfield::default(),
            variant: Variant::default(),
        }
    }
}

impl Tuning {
    /// Shipped runner balance
    pub fn runner() -> Self {
        Self::default()
    }

    /// Shipped shooter balance
    pub fn shooter() -> Self {
        Self {
            playfield: Playfield {
                width: 480.0,
                height: 640.0,
            },
            variant: Variant::Shooter(ShooterTuning::default()),
            ..Self::default()
        }
    }

    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|err| EngineError::InvalidTuning {
                reason: err.to_string(),
            })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject periods and dimensions the scheduler cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |reason: &str| {
            Err(EngineError::InvalidTuning {
                reason: reason.to_string(),
            })
        };
        if !(self.tick_ms > 0.0) {
            return invalid("tick_ms must be positive");
        }
        if !(self.playfield.width > 0.0 && self.playfield.height > 0.0) {
            return invalid("playfield must have a positive size");
        }
        let periods = match &self.variant {
            Variant::Runner(r) => vec![r.spawn_interval_ms, r.score_interval_ms],
            Variant::Shooter(s) => vec![
                s.pickup_interval_ms,
                s.blink_interval_ms,
                s.weapon_duration_ms,
                s.speed_duration_ms,
            ],
        };
        if periods.iter().any(|p| !(*p > 0.0)) {
            return invalid("timer periods must be positive");
        }
        if let Variant::Runner(r) = &self.variant {
            if !(r.background_width > 0.0) {
                return invalid("background_width must be positive");
            }
        }
        Ok(())
    }

    pub fn is_shooter(&self) -> bool {
        matches!(self.variant, Variant::Shooter(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Tuning::runner().validate().is_ok());
        assert!(Tuning::shooter().validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let tuning = Tuning::from_json(
            r#"{"playfield": {"width": 640}, "variant": {"Runner": {"block_speed": 7}}}"#,
        )
        .unwrap();
        assert_eq!(tuning.playfield.width, 640.0);
        assert_eq!(tuning.playfield.height, 400.0);
        assert_eq!(tuning.tick_ms, 30.0);
        match tuning.variant {
            Variant::Runner(r) => {
                assert_eq!(r.block_speed, 7.0);
                assert_eq!(r.jump_impulse, -16.0);
            }
            Variant::Shooter(_) => panic!("expected runner"),
        }
    }

    #[test]
    fn shooter_document_parses_difficulty() {
        let tuning = Tuning::from_json(
            r#"{"variant": {"Shooter": {"starting_difficulty": "Easy", "lives": 5}}}"#,
        )
        .unwrap();
        match tuning.variant {
            Variant::Shooter(s) => {
                assert_eq!(s.starting_difficulty, Difficulty::Easy);
                assert_eq!(s.lives, 5);
                assert_eq!(s.fire_cooldown_ms, 220.0);
            }
            Variant::Runner(_) => panic!("expected shooter"),
        }
    }

    #[test]
    fn rejects_zero_tick() {
        let err = Tuning::from_json(r#"{"tick_ms": 0}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTuning { .. }));
    }

    #[test]
    fn obstacle_style_parses_by_name() {
        let tuning =
            Tuning::from_json(r#"{"variant": {"Runner": {"obstacle": "Block"}}}"#).unwrap();
        match tuning.variant {
            Variant::Runner(r) => assert_eq!(r.obstacle.as_str(), "Block"),
            Variant::Shooter(_) => panic!("expected runner"),
        }
        assert_eq!(ObstacleStyle::default().as_str(), "Spikes");
    }
}
