//! Scene Arcade - scene-described browser arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, kinematics, collisions, game state)
//! - `scene`: External scene description interface and key-binding effects
//! - `tuning`: Data-driven game balance
//! - `error`: Engine error taxonomy

pub mod error;
pub mod scene;
pub mod sim;
pub mod tuning;

pub use error::EngineError;
pub use scene::{Effect, SceneDescription};
pub use sim::{Frame, Session};
pub use tuning::{ObstacleStyle, Playfield, RunnerTuning, ShooterTuning, Tuning, Variant};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds
    pub const TICK_MS: f64 = 30.0;
    /// Largest wall-clock step fed to the simulation in one frame
    pub const MAX_FRAME_MS: f64 = 250.0;

    /// Scene id of the player entity
    pub const PLAYER_ID: &str = "player";
    /// Scene id of the score label
    pub const SCORE_TEXT_ID: &str = "scoreText";

    /// Canonical name of the space bar
    pub const SPACE_KEY: &str = "Space";
    /// Arrow keys never block firing
    pub const ARROW_KEYS: [&str; 4] = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown"];

    /// Player box used when the scene omits one
    pub const DEFAULT_PLAYER_WIDTH: f32 = 24.0;
    pub const DEFAULT_PLAYER_HEIGHT: f32 = 35.0;
}

/// Normalize browser key identifiers (space has several spellings)
pub fn normalize_key(key: &str) -> &str {
    match key {
        " " | "Spacebar" | "Space" => consts::SPACE_KEY,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_aliases_collapse() {
        assert_eq!(normalize_key(" "), "Space");
        assert_eq!(normalize_key("Spacebar"), "Space");
        assert_eq!(normalize_key("ArrowUp"), "ArrowUp");
    }
}
