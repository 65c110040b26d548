//! Entities and their stores
//!
//! Each entity class lives in its own ordered [`Store`]. Stores are only
//! touched from inside a tick, and pruning is a single `retain` pass, so an
//! entity is either fully present for a tick or gone.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::{PickupKind, Weapon};
use crate::consts::{DEFAULT_PLAYER_HEIGHT, DEFAULT_PLAYER_WIDTH, PLAYER_ID};
use crate::error::EngineError;
use crate::scene::{EntityKind, SceneDescription};

/// Visual size of a block obstacle
pub const BLOCK_SIZE: Vec2 = Vec2::new(64.0, 48.0);
/// Collision box shrink applied to block obstacles on each axis
pub const BLOCK_INSET: f32 = 4.0;
/// Block obstacles rest this far above the ground level
pub const BLOCK_GROUND_OFFSET: f32 = 15.0;

/// Visual width of a spike obstacle
pub const SPIKE_WIDTH: f32 = 66.0;
/// Collision width of a spike obstacle
pub const SPIKE_HIT_WIDTH: f32 = 62.0;
/// Spike baseline sits this far below the ground level
pub const SPIKE_ANCHOR_OFFSET: f32 = 32.0;
/// Time each spike frame is shown
pub const SPIKE_FRAME_MS: f64 = 200.0;
/// Spike heights per animation frame
pub const SPIKE_FRAMES: [f32; 7] = [15.0, 27.0, 39.0, 51.0, 39.0, 27.0, 15.0];

/// Frames in an explosion effect
pub const EXPLOSION_FRAMES: usize = 5;

/// Anything stored per class and tested for collisions
pub trait Entity {
    fn id(&self) -> u32;
    fn hitbox(&self) -> Aabb;
}

/// Result of a damage event against the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Player was invulnerable
    Ignored,
    /// Player survived with this many lives
    Hit { lives: u8 },
    /// Last life lost
    Killed,
}

/// The player (exactly one while the scene has one)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Mid-jump; re-jumping is rejected
    pub airborne: bool,
    pub lives: u8,
    /// Damage is ignored while `now < invulnerable_until`
    pub invulnerable_until: f64,
    /// Blink toggle while invulnerable
    pub blink_visible: bool,
    pub weapon: Weapon,
    pub speed_boost: bool,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2, lives: u8) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            airborne: false,
            lives,
            invulnerable_until: 0.0,
            blink_visible: true,
            weapon: Weapon::Blaster,
            speed_boost: false,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        now_ms < self.invulnerable_until
    }

    /// Take one hit unless still inside the invulnerability window
    pub fn apply_damage(&mut self, now_ms: f64, window_ms: f64) -> DamageOutcome {
        if self.is_invulnerable(now_ms) {
            return DamageOutcome::Ignored;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            return DamageOutcome::Killed;
        }
        self.invulnerable_until = now_ms + window_ms;
        DamageOutcome::Hit { lives: self.lives }
    }
}

/// Obstacle geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Static box with an inset collision box
    Block,
    /// Breathing spikes whose bottom edge stays on `anchor_y`
    Spikes {
        anchor_y: f32,
        /// `None` until the first frame is shown
        frame: Option<usize>,
    },
}

/// Runner obstacle scrolling in from the right
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner of the current box
    pub pos: Vec2,
    pub shape: ObstacleShape,
    pub spawned_at: f64,
}

impl Obstacle {
    pub fn block(id: u32, x: f32, top: f32, spawned_at: f64) -> Self {
        Self {
            id,
            pos: Vec2::new(x, top),
            shape: ObstacleShape::Block,
            spawned_at,
        }
    }

    pub fn spikes(id: u32, x: f32, anchor_y: f32, spawned_at: f64) -> Self {
        Self {
            id,
            pos: Vec2::new(x, anchor_y),
            shape: ObstacleShape::Spikes {
                anchor_y,
                frame: None,
            },
            spawned_at,
        }
    }

    /// Box the renderer draws
    pub fn visual_box(&self) -> Aabb {
        match self.shape {
            ObstacleShape::Block => Aabb::from_pos_size(self.pos, BLOCK_SIZE),
            ObstacleShape::Spikes { .. } => {
                Aabb::new(self.pos.x, self.pos.y, SPIKE_WIDTH, self.frame_height())
            }
        }
    }

    /// Width used for collisions and off-screen pruning
    pub fn collision_width(&self) -> f32 {
        match self.shape {
            ObstacleShape::Block => BLOCK_SIZE.x - BLOCK_INSET,
            ObstacleShape::Spikes { .. } => SPIKE_HIT_WIDTH,
        }
    }

    fn frame_height(&self) -> f32 {
        match self.shape {
            ObstacleShape::Block => BLOCK_SIZE.y,
            ObstacleShape::Spikes { frame, .. } => frame.map_or(0.0, |f| SPIKE_FRAMES[f]),
        }
    }

    pub fn frame(&self) -> Option<usize> {
        match self.shape {
            ObstacleShape::Block => None,
            ObstacleShape::Spikes { frame, .. } => frame,
        }
    }
}

impl Entity for Obstacle {
    fn id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Aabb {
        match self.shape {
            ObstacleShape::Block => Aabb::new(
                self.pos.x,
                self.pos.y,
                self.collision_width(),
                BLOCK_SIZE.y - BLOCK_INSET,
            ),
            ObstacleShape::Spikes { .. } => Aabb::new(
                self.pos.x,
                self.pos.y,
                self.collision_width(),
                self.frame_height(),
            ),
        }
    }
}

/// Player projectile; lives until it leaves the top of the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Entity for Bullet {
    fn id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Falling enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Entity for Enemy {
    fn id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Falling power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Entity for Pickup {
    fn id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Short-lived visual left behind by a kill (never collides)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub spawned_at: f64,
    pub lifetime_ms: f64,
}

impl Explosion {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.spawned_at >= self.lifetime_ms
    }

    /// Animation frame as a function of age
    pub fn frame(&self, now_ms: f64) -> usize {
        let per_frame = self.lifetime_ms / EXPLOSION_FRAMES as f64;
        let elapsed = (now_ms - self.spawned_at).max(0.0);
        ((elapsed / per_frame) as usize).min(EXPLOSION_FRAMES - 1)
    }
}

impl Entity for Explosion {
    fn id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Scene text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub pos: Vec2,
    pub text: String,
}

/// Scene rectangle other than the player; drawn, never simulated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decor {
    pub id: String,
    pub rect: Aabb,
    pub color: Option<String>,
}

/// Ordered collection of one entity class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store<T> {
    items: Vec<T>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keep entities matching `keep`, in one pass. Returns how many were removed.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    /// Drop every entity whose id is listed
    pub fn remove_ids(&mut self, ids: &[u32]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.retain(|e| !ids.contains(&e.id()))
    }

    /// Current collision boxes, in store order
    pub fn hitboxes(&self) -> Vec<Aabb> {
        self.items.iter().map(Entity::hitbox).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Every entity of a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub player: Option<Player>,
    pub obstacles: Store<Obstacle>,
    pub bullets: Store<Bullet>,
    pub enemies: Store<Enemy>,
    pub pickups: Store<Pickup>,
    pub explosions: Store<Explosion>,
    pub labels: Vec<Label>,
    pub decor: Vec<Decor>,
    next_id: u32,
}

impl EntityStore {
    /// Build the static part of a session from its scene
    pub fn from_scene(scene: &SceneDescription, lives: u8) -> Self {
        let mut store = Self {
            next_id: 1,
            ..Self::default()
        };

        for desc in &scene.entities {
            let pos = Vec2::new(desc.x, desc.y);
            match desc.kind {
                EntityKind::Rectangle if desc.id == PLAYER_ID => {
                    if store.player.is_some() {
                        log::warn!("Duplicate player entity ignored");
                        continue;
                    }
                    let size = Vec2::new(
                        desc.width.unwrap_or(DEFAULT_PLAYER_WIDTH),
                        desc.height.unwrap_or(DEFAULT_PLAYER_HEIGHT),
                    );
                    store.player = Some(Player::new(pos, size, lives));
                }
                EntityKind::Rectangle => store.decor.push(Decor {
                    id: desc.id.clone(),
                    rect: Aabb::new(
                        desc.x,
                        desc.y,
                        desc.width.unwrap_or(0.0),
                        desc.height.unwrap_or(0.0),
                    ),
                    color: desc.color.clone(),
                }),
                EntityKind::Text => store.labels.push(Label {
                    id: desc.id.clone(),
                    pos,
                    text: desc.text.clone().unwrap_or_default(),
                }),
            }
        }

        if store.player.is_none() {
            match scene.entity(PLAYER_ID) {
                Ok(desc) => log::warn!(
                    "Player entity is {:?}, not a rectangle; simulation will idle",
                    desc.kind
                ),
                Err(err) => log::warn!("{err}; simulation will idle"),
            }
        }

        store
    }

    /// Allocate a new entity id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn label_mut(&mut self, id: &str) -> Result<&mut Label, EngineError> {
        self.labels
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| EngineError::MissingEntity { id: id.to_string() })
    }

    /// Number of simulated (non-static) entities besides the player
    pub fn dynamic_count(&self) -> usize {
        self.obstacles.len()
            + self.bullets.len()
            + self.enemies.len()
            + self.pickups.len()
            + self.explosions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: u32, y: f32) -> Enemy {
        Enemy {
            id,
            pos: Vec2::new(0.0, y),
            vel: Vec2::ZERO,
            size: Vec2::splat(64.0),
        }
    }

    #[test]
    fn damage_respects_invulnerability_window() {
        let mut player = Player::new(Vec2::ZERO, Vec2::splat(40.0), 3);
        assert_eq!(player.apply_damage(1000.0, 1200.0), DamageOutcome::Hit { lives: 2 });
        assert_eq!(player.apply_damage(1000.0, 1200.0), DamageOutcome::Ignored);
        assert_eq!(player.apply_damage(2199.9, 1200.0), DamageOutcome::Ignored);
        assert_eq!(player.apply_damage(2200.0, 1200.0), DamageOutcome::Hit { lives: 1 });
        assert_eq!(player.apply_damage(3400.0, 1200.0), DamageOutcome::Killed);
        assert_eq!(player.lives, 0);
    }

    #[test]
    fn lives_floor_at_zero() {
        let mut player = Player::new(Vec2::ZERO, Vec2::splat(40.0), 0);
        assert_eq!(player.apply_damage(0.0, 1200.0), DamageOutcome::Killed);
        assert_eq!(player.lives, 0);
    }

    #[test]
    fn block_hitbox_is_inset() {
        let block = Obstacle::block(1, 100.0, 215.0, 0.0);
        assert_eq!(block.visual_box(), Aabb::new(100.0, 215.0, 64.0, 48.0));
        assert_eq!(block.hitbox(), Aabb::new(100.0, 215.0, 60.0, 44.0));
    }

    #[test]
    fn spikes_start_flat_on_the_anchor() {
        let spikes = Obstacle::spikes(1, 800.0, 262.0, 0.0);
        assert_eq!(spikes.frame(), None);
        assert_eq!(spikes.hitbox(), Aabb::new(800.0, 262.0, 62.0, 0.0));
        assert_eq!(spikes.visual_box().width, 66.0);
    }

    #[test]
    fn store_retain_reports_removed() {
        let mut store = Store::new();
        for (id, y) in [(1, 0.0), (2, 500.0), (3, 10.0), (4, 900.0)] {
            store.push(enemy(id, y));
        }
        assert_eq!(store.retain(|e| e.pos.y < 450.0), 2);
        let ids: Vec<u32> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.remove_ids(&[3, 99]), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().map(|e| e.id), Some(1));
    }

    #[test]
    fn explosion_frames_follow_age() {
        let explosion = Explosion {
            id: 1,
            pos: Vec2::ZERO,
            size: Vec2::splat(64.0),
            spawned_at: 100.0,
            lifetime_ms: 300.0,
        };
        assert_eq!(explosion.frame(100.0), 0);
        assert_eq!(explosion.frame(219.0), 1);
        assert_eq!(explosion.frame(399.0), 4);
        assert!(!explosion.is_expired(399.0));
        assert!(explosion.is_expired(400.0));
    }

    #[test]
    fn scene_without_player_still_builds() {
        let scene = SceneDescription::from_json(
            r#"{"entities": [{"id": "scoreText", "kind": "text", "x": 5, "y": 5, "text": "Score: 0"}]}"#,
        )
        .unwrap();
        let mut store = EntityStore::from_scene(&scene, 3);
        assert!(store.player.is_none());
        assert_eq!(store.label_mut("scoreText").unwrap().text, "Score: 0");
        assert!(store.label_mut("missing").is_err());
    }

    #[test]
    fn player_defaults_its_box() {
        let scene = SceneDescription::from_json(
            r#"{"entities": [{"id": "player", "kind": "rectangle", "x": 200, "y": 230}]}"#,
        )
        .unwrap();
        let store = EntityStore::from_scene(&scene, 3);
        let player = store.player.unwrap();
        assert_eq!(player.size, Vec2::new(24.0, 35.0));
        assert_eq!(player.lives, 3);
        assert!(!player.airborne);
    }
}
