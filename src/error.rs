//! Engine error taxonomy
//!
//! Scene load failures are fatal to startup. Missing entities and unknown
//! effects are tolerated at runtime: they are built, logged, and dropped.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The scene document could not be read or parsed
    SceneLoad { reason: String },
    /// A referenced entity id is absent from the loaded scene
    MissingEntity { id: String },
    /// A key binding names an effect the engine does not know
    InvalidEffect { name: String },
    /// A tuning document has unusable values
    InvalidTuning { reason: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SceneLoad { reason } => write!(f, "failed to load scene: {reason}"),
            Self::MissingEntity { id } => write!(f, "scene has no entity with id '{id}'"),
            Self::InvalidEffect { name } => write!(f, "unknown effect '{name}'"),
            Self::InvalidTuning { reason } => write!(f, "invalid tuning: {reason}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::SceneLoad {
            reason: err.to_string(),
        }
    }
}
