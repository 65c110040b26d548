//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated time only (fixed tick, no wall clock)
//! - Seeded RNG only
//! - Stable iteration order (store order)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod entity;
pub mod input;
pub mod kinematics;
pub mod session;
pub mod spawn;
pub mod state;
mod tick;

pub use clock::{Clock, TimerEvent, TimerHandle};
pub use collision::{Aabb, consuming_pairs, first_overlap, overlapping_pairs};
pub use entity::{
    Bullet, DamageOutcome, Decor, Enemy, Entity, EntityStore, Explosion, Label, Obstacle,
    ObstacleShape, Pickup, Player, Store,
};
pub use input::{FireControl, InputState};
pub use session::{Frame, RenderEntity, Session, VisualState};
pub use spawn::SpawnController;
pub use state::{Difficulty, DifficultyParams, GamePhase, GameState, PickupKind, Scroll, Weapon};
