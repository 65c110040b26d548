//! Scene description interface
//!
//! An external loader turns a markup document into an ordered list of entity
//! descriptors and key bindings. The engine only consumes that shape: it looks
//! entities up by id and maps binding effect names onto a closed [`Effect`]
//! set, ignoring anything it does not recognize.

use serde::{Deserialize, Serialize};

use crate::consts::{ARROW_KEYS, SPACE_KEY};
use crate::error::EngineError;
use crate::normalize_key;

/// Kind of a scene entity descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Rectangle,
    Text,
}

/// One `<component>`-style entry of the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub id: String,
    #[serde(alias = "type")]
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// One `<action>`-style entry of the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    pub trigger: String,
    pub key: String,
    pub effect: String,
}

/// Everything the external loader hands to the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default, alias = "components")]
    pub entities: Vec<EntityDescriptor>,
    #[serde(default, alias = "actions")]
    pub bindings: Vec<KeyBinding>,
}

impl SceneDescription {
    /// Parse a scene from its JSON form
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        Ok(scene)
    }

    /// Look up an entity by id
    pub fn entity(&self, id: &str) -> Result<&EntityDescriptor, EngineError> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| EngineError::MissingEntity { id: id.to_string() })
    }
}

/// Actions a key binding can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Edge-triggered on key down
    Jump,
    /// Held
    MoveLeft,
    /// Held
    MoveRight,
    /// Held, rate limited by the fire cooldown
    Fire,
}

impl Effect {
    const TABLE: [(&'static str, Effect); 7] = [
        ("jump", Effect::Jump),
        ("moveLeft", Effect::MoveLeft),
        ("left", Effect::MoveLeft),
        ("moveRight", Effect::MoveRight),
        ("right", Effect::MoveRight),
        ("fire", Effect::Fire),
        ("shoot", Effect::Fire),
    ];

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, effect)| *effect)
            .ok_or_else(|| EngineError::InvalidEffect {
                name: name.to_string(),
            })
    }

    /// Whether holding this key is treated as steering
    pub fn is_movement(self) -> bool {
        matches!(self, Effect::MoveLeft | Effect::MoveRight)
    }
}

/// Resolved key → effect table
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    entries: Vec<(String, Effect)>,
}

impl KeyBindings {
    /// Resolve the scene's keydown bindings, dropping unknown effects
    pub fn from_scene(scene: &SceneDescription) -> Self {
        let mut bindings = Self::default();
        for binding in &scene.bindings {
            if binding.trigger != "keydown" || binding.key.is_empty() {
                log::warn!(
                    "Ignoring binding '{}' on trigger '{}'",
                    binding.key,
                    binding.trigger
                );
                continue;
            }
            match Effect::from_name(&binding.effect) {
                Ok(effect) => bindings.bind(&binding.key, effect),
                Err(err) => log::debug!("{err}; binding on '{}' ignored", binding.key),
            }
        }
        bindings
    }

    pub fn bind(&mut self, key: &str, effect: Effect) {
        let key = normalize_key(key).to_string();
        if !self.binds(&key, effect) {
            self.entries.push((key, effect));
        }
    }

    /// Fill in arrow steering and space firing when the scene declares none
    pub fn with_shooter_defaults(mut self) -> Self {
        if !self.entries.iter().any(|(_, e)| e.is_movement()) {
            self.bind(ARROW_KEYS[0], Effect::MoveLeft);
            self.bind(ARROW_KEYS[1], Effect::MoveRight);
        }
        if !self.entries.iter().any(|(_, e)| *e == Effect::Fire) {
            self.bind(SPACE_KEY, Effect::Fire);
        }
        self
    }

    pub fn binds(&self, key: &str, effect: Effect) -> bool {
        let key = normalize_key(key);
        self.entries.iter().any(|(k, e)| k == key && *e == effect)
    }

    pub fn effects_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = Effect> + 'a {
        let key = normalize_key(key);
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, e)| *e)
    }

    pub fn keys_for(&self, effect: Effect) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, e)| *e == effect)
            .map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
