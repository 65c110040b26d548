//! Game session
//!
//! A [`Session`] owns every piece of mutable state of one game: tuning, score,
//! entities, input, schedules and RNG. The host feeds it key events and
//! wall-clock deltas and reads back a [`Frame`] to draw. Restarting means
//! building a fresh session.

use serde::Serialize;

use super::clock::{Clock, TimerEvent, TimerHandle};
use super::collision::Aabb;
use super::entity::{EntityStore, ObstacleShape};
use super::input::{FireControl, InputState};
use super::kinematics::try_jump;
use super::spawn::SpawnController;
use super::state::{Difficulty, GamePhase, GameState, PickupKind, Weapon};
use crate::consts::{SCORE_TEXT_ID, SPACE_KEY};
use crate::error::EngineError;
use crate::normalize_key;
use crate::scene::{Effect, KeyBindings, SceneDescription};
use crate::tuning::{Tuning, Variant};

const RUNNER_INSTRUCTIONS: &str = "Use ARROW UP to jump!";
const SHOOTER_INSTRUCTIONS: &str = "Press \u{2190} \u{2192} to move and SPACE to fire";

/// Handles of the one-shot schedules that get re-armed or cut short
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Timers {
    pub weapon_expiry: Option<TimerHandle>,
    pub speed_expiry: Option<TimerHandle>,
    pub blink: Option<TimerHandle>,
    pub invulnerability_end: Option<TimerHandle>,
}

/// One running game
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) tuning: Tuning,
    pub(super) state: GameState,
    pub(super) clock: Clock,
    pub(super) input: InputState,
    pub(super) bindings: KeyBindings,
    pub(super) entities: EntityStore,
    pub(super) spawner: SpawnController,
    pub(super) fire: FireControl,
    pub(super) timers: Timers,
    pub(super) info: String,
    restart_requested: bool,
}

impl Session {
    /// Build a session from a parsed scene and start its schedules
    pub fn start(
        tuning: Tuning,
        scene: &SceneDescription,
        seed: u64,
    ) -> Result<Self, EngineError> {
        tuning.validate()?;
        let scene_bindings = KeyBindings::from_scene(scene);
        let (lives, difficulty, block_speed, cooldown_ms, bindings, info) = match &tuning.variant {
            Variant::Runner(runner) => (
                1,
                Difficulty::default(),
                runner.block_speed,
                0.0,
                scene_bindings,
                RUNNER_INSTRUCTIONS,
            ),
            Variant::Shooter(shooter) => (
                shooter.lives,
                shooter.starting_difficulty,
                0.0,
                shooter.fire_cooldown_ms,
                scene_bindings.with_shooter_defaults(),
                SHOOTER_INSTRUCTIONS,
            ),
        };

        let mut session = Self {
            entities: EntityStore::from_scene(scene, lives),
            state: GameState::new(difficulty, block_speed),
            clock: Clock::new(),
            input: InputState::new(),
            bindings,
            spawner: SpawnController::new(seed),
            fire: FireControl::new(cooldown_ms),
            timers: Timers::default(),
            info: info.to_string(),
            restart_requested: false,
            tuning,
        };
        session.register_schedules();

        let (field, kind) = (session.tuning.playfield, &session.tuning.variant);
        match kind {
            Variant::Runner(runner) => {
                if session.bindings.is_empty() {
                    log::warn!("Scene binds no keys; the runner cannot jump");
                }
                log::info!(
                    "Session started: runner with {} obstacles ({}x{}), seed {seed}",
                    runner.obstacle.as_str(),
                    field.width,
                    field.height,
                );
            }
            Variant::Shooter(_) => log::info!(
                "Session started: shooter ({}x{}), seed {seed}",
                field.width,
                field.height,
            ),
        }
        Ok(session)
    }

    /// Parse a scene document and start a session on it
    pub fn load(tuning: Tuning, scene_json: &str, seed: u64) -> Result<Self, EngineError> {
        let scene = SceneDescription::from_json(scene_json)?;
        Self::start(tuning, &scene, seed)
    }

    /// Periodic schedules live until game over; creation order breaks ties
    fn register_schedules(&mut self) {
        self.clock
            .schedule(TimerEvent::SimulationTick, self.tuning.tick_ms);
        match &self.tuning.variant {
            Variant::Runner(runner) => {
                self.clock
                    .schedule(TimerEvent::SpawnObstacle, runner.spawn_interval_ms);
                self.clock
                    .schedule(TimerEvent::ScoreTick, runner.score_interval_ms);
            }
            Variant::Shooter(shooter) => {
                let delay = self.spawner.next_enemy_delay(self.state.difficulty);
                self.clock.schedule_once(TimerEvent::SpawnEnemy, delay);
                self.clock
                    .schedule(TimerEvent::PickupRoll, shooter.pickup_interval_ms);
            }
        }
    }

    /// Key pressed. Edge-triggered effects fire once per press.
    pub fn key_down(&mut self, key: &str) {
        self.key_down_as(&[key]);
    }

    /// Key pressed, known under every name in `names` (for example
    /// `KeyboardEvent.code` then `KeyboardEvent.key`). A binding on any of
    /// them applies.
    pub fn key_down_as(&mut self, names: &[&str]) {
        let was_held = names.iter().any(|n| self.input.is_held(n));
        self.input.press(names);
        if was_held {
            return;
        }

        if !self.state.is_running() {
            let space = names.iter().any(|n| normalize_key(n) == SPACE_KEY);
            if space && !self.restart_requested {
                log::info!("Restart requested");
                self.restart_requested = true;
            }
            return;
        }

        let jump = names
            .iter()
            .any(|n| self.bindings.effects_for(n).any(|e| e == Effect::Jump));
        if jump {
            if let Some(player) = self.entities.player.as_mut() {
                if let Variant::Runner(runner) = &self.tuning.variant {
                    if try_jump(player, runner.jump_impulse) {
                        log::debug!("Jump at {:.0} ms", self.clock.now_ms());
                    }
                }
            }
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.key_up_as(&[key]);
    }

    pub fn key_up_as(&mut self, names: &[&str]) {
        self.input.release(names);
    }

    /// Release every held key (window lost focus)
    pub fn release_all(&mut self) {
        self.input.clear();
    }

    /// Run every schedule due within the next `dt_ms` of simulated time
    pub fn advance(&mut self, dt_ms: f64) {
        if !(dt_ms > 0.0) {
            return;
        }
        let until = self.clock.now_ms() + dt_ms;
        while let Some((_, event)) = self.clock.pop_due(until) {
            self.dispatch(event);
        }
        self.clock.settle(until);
    }

    fn dispatch(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::SimulationTick => {
                self.state.ticks += 1;
                match self.tuning.variant.clone() {
                    Variant::Runner(runner) => self.runner_tick(&runner),
                    Variant::Shooter(shooter) => self.shooter_tick(&shooter),
                }
            }
            TimerEvent::SpawnObstacle => self.spawn_obstacle(),
            TimerEvent::SpawnEnemy => self.spawn_enemy(),
            TimerEvent::PickupRoll => self.roll_pickups(),
            TimerEvent::ScoreTick => self.score_tick(),
            TimerEvent::PowerUpExpired(kind) => self.expire_power_up(kind),
            TimerEvent::InvulnerabilityBlink => {
                if let Some(player) = self.entities.player.as_mut() {
                    player.blink_visible = !player.blink_visible;
                }
            }
            TimerEvent::InvulnerabilityEnd => self.end_invulnerability(),
        }
    }

    fn spawn_obstacle(&mut self) {
        let Variant::Runner(runner) = &self.tuning.variant else {
            return;
        };
        if self.entities.player.is_none() {
            return;
        }
        let id = self.entities.next_entity_id();
        let obstacle = self
            .spawner
            .obstacle(id, runner, &self.tuning.playfield, self.clock.now_ms());
        log::debug!("Obstacle {id} spawned at x={}", obstacle.pos.x);
        self.entities.obstacles.push(obstacle);
    }

    /// Spawn one enemy and re-arm for a delay drawn from the current tier
    fn spawn_enemy(&mut self) {
        let Variant::Shooter(shooter) = &self.tuning.variant else {
            return;
        };
        if self.entities.player.is_some() {
            let id = self.entities.next_entity_id();
            let enemy = self.spawner.enemy(id, shooter, &self.tuning.playfield);
            log::debug!("Enemy {id} spawned at x={}", enemy.pos.x);
            self.entities.enemies.push(enemy);
        }
        let delay = self.spawner.next_enemy_delay(self.state.difficulty);
        self.clock.schedule_once(TimerEvent::SpawnEnemy, delay);
    }

    fn roll_pickups(&mut self) {
        let Variant::Shooter(shooter) = &self.tuning.variant else {
            return;
        };
        if self.entities.player.is_none() {
            return;
        }
        for kind in self.spawner.roll_pickups(self.state.difficulty, shooter) {
            let id = self.entities.next_entity_id();
            let pickup = self
                .spawner
                .pickup(id, kind, shooter, &self.tuning.playfield);
            log::debug!("{kind:?} pickup {id} spawned at x={}", pickup.pos.x);
            self.entities.pickups.push(pickup);
        }
    }

    fn score_tick(&mut self) {
        let Variant::Runner(runner) = &self.tuning.variant else {
            return;
        };
        if self.entities.player.is_none() {
            return;
        }
        let (points, every, step) = (
            runner.score_per_interval,
            runner.speed_up_every,
            runner.speed_up_step,
        );
        self.award(points);
        if self.state.scroll.check_speed_up(self.state.score, every, step) {
            log::info!(
                "Speed up at score {}: block speed {}",
                self.state.score,
                self.state.scroll.block_speed
            );
        }
    }

    /// Add points, refresh the score label and log tier promotions
    pub(super) fn award(&mut self, points: u64) {
        if let Some(tier) = self.state.add_score(points) {
            log::info!("Difficulty raised to {} at score {}", tier.as_str(), self.state.score);
        }
        let text = format!("Score: {}", self.state.score);
        if let Ok(label) = self.entities.label_mut(SCORE_TEXT_ID) {
            label.text = text;
        }
    }

    /// Apply a collected pickup, re-arming its expiry window
    pub(super) fn apply_pickup(&mut self, kind: PickupKind) {
        let Variant::Shooter(shooter) = &self.tuning.variant else {
            return;
        };
        let Some(player) = self.entities.player.as_mut() else {
            return;
        };
        let (slot, duration) = match kind {
            PickupKind::WeaponUpgrade => {
                player.weapon = Weapon::TwinBlaster;
                (&mut self.timers.weapon_expiry, shooter.weapon_duration_ms)
            }
            PickupKind::SpeedUpgrade => {
                player.speed_boost = true;
                (&mut self.timers.speed_expiry, shooter.speed_duration_ms)
            }
        };
        if let Some(pending) = slot.take() {
            self.clock.cancel(pending);
        }
        *slot = Some(
            self.clock
                .schedule_once(TimerEvent::PowerUpExpired(kind), duration),
        );
        log::debug!("{kind:?} collected for {duration} ms");
    }

    fn expire_power_up(&mut self, kind: PickupKind) {
        let Some(player) = self.entities.player.as_mut() else {
            return;
        };
        match kind {
            PickupKind::WeaponUpgrade => {
                player.weapon = Weapon::Blaster;
                self.timers.weapon_expiry = None;
            }
            PickupKind::SpeedUpgrade => {
                player.speed_boost = false;
                self.timers.speed_expiry = None;
            }
        }
        log::debug!("{kind:?} expired");
    }

    /// Start blinking and schedule the end of the invulnerability window
    pub(super) fn begin_invulnerability(&mut self, window_ms: f64, blink_ms: f64) {
        for handle in [self.timers.blink.take(), self.timers.invulnerability_end.take()]
            .into_iter()
            .flatten()
        {
            self.clock.cancel(handle);
        }
        self.timers.blink = Some(self.clock.schedule(TimerEvent::InvulnerabilityBlink, blink_ms));
        self.timers.invulnerability_end = Some(
            self.clock
                .schedule_once(TimerEvent::InvulnerabilityEnd, window_ms),
        );
    }

    fn end_invulnerability(&mut self) {
        if let Some(blink) = self.timers.blink.take() {
            self.clock.cancel(blink);
        }
        self.timers.invulnerability_end = None;
        if let Some(player) = self.entities.player.as_mut() {
            player.blink_visible = true;
        }
    }

    /// HUD line shown after the player is hit
    pub(super) fn update_health_info(&mut self) {
        let lives = self.entities.player.as_ref().map_or(0, |p| p.lives);
        self.info = format!("Lives: {lives} | Score: {}", self.state.score);
    }

    /// Stop the run: cancel every schedule and show the final score
    pub(super) fn game_over(&mut self) {
        if !self.state.end() {
            return;
        }
        self.clock.cancel_all();
        self.timers = Timers::default();
        self.info = format!(
            "Game Over! Score: {}. Press SPACE to restart.",
            self.state.score
        );
        log::info!(
            "Game over at {:.0} ms after {} ticks, score {}",
            self.clock.now_ms(),
            self.state.ticks,
            self.state.score
        );
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Direct store access for hosts and tests that stage entities
    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.entities
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Set once Space is pressed after game over; the host rebuilds the session
    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }

    /// Presentation snapshot of the current instant
    pub fn frame(&self) -> Frame {
        let now = self.clock.now_ms();
        let mut entities = Vec::with_capacity(
            self.entities.decor.len() + self.entities.labels.len() + self.entities.dynamic_count() + 1,
        );

        for decor in &self.entities.decor {
            entities.push(RenderEntity {
                id: decor.id.clone(),
                rect: decor.rect,
                visual: VisualState::Decor {
                    color: decor.color.clone(),
                },
            });
        }
        for obstacle in self.entities.obstacles.iter() {
            let visual = match obstacle.shape {
                ObstacleShape::Block => VisualState::Block,
                ObstacleShape::Spikes { frame, .. } => VisualState::Spikes { frame },
            };
            entities.push(RenderEntity {
                id: format!("obstacle-{}", obstacle.id),
                rect: obstacle.visual_box(),
                visual,
            });
        }
        for enemy in self.entities.enemies.iter() {
            entities.push(RenderEntity {
                id: format!("enemy-{}", enemy.id),
                rect: Aabb::from_pos_size(enemy.pos, enemy.size),
                visual: VisualState::Enemy,
            });
        }
        for pickup in self.entities.pickups.iter() {
            entities.push(RenderEntity {
                id: format!("pickup-{}", pickup.id),
                rect: Aabb::from_pos_size(pickup.pos, pickup.size),
                visual: VisualState::Pickup {
                    pickup: pickup.kind,
                },
            });
        }
        for bullet in self.entities.bullets.iter() {
            entities.push(RenderEntity {
                id: format!("bullet-{}", bullet.id),
                rect: Aabb::from_pos_size(bullet.pos, bullet.size),
                visual: VisualState::Bullet,
            });
        }
        for explosion in self.entities.explosions.iter() {
            entities.push(RenderEntity {
                id: format!("explosion-{}", explosion.id),
                rect: Aabb::from_pos_size(explosion.pos, explosion.size),
                visual: VisualState::Explosion {
                    frame: explosion.frame(now),
                },
            });
        }
        if let Some(player) = &self.entities.player {
            entities.push(RenderEntity {
                id: crate::consts::PLAYER_ID.to_string(),
                rect: player.hitbox(),
                visual: VisualState::Player {
                    airborne: player.airborne,
                    visible: player.blink_visible,
                    weapon: player.weapon,
                    speed_boost: player.speed_boost,
                },
            });
        }
        for label in &self.entities.labels {
            entities.push(RenderEntity {
                id: label.id.clone(),
                rect: Aabb::new(label.pos.x, label.pos.y, 0.0, 0.0),
                visual: VisualState::Text {
                    text: label.text.clone(),
                },
            });
        }

        Frame {
            entities,
            info: self.info.clone(),
            score: self.state.score,
            lives: if self.tuning.is_shooter() {
                self.entities.player.as_ref().map(|p| p.lives)
            } else {
                None
            },
            difficulty: self.state.difficulty,
            phase: self.state.phase,
            background_offset: self.state.scroll.background_offset,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Back to front
    pub entities: Vec<RenderEntity>,
    pub info: String,
    pub score: u64,
    /// Remaining lives (shooter only)
    pub lives: Option<u8>,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub background_offset: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderEntity {
    pub id: String,
    pub rect: Aabb,
    pub visual: VisualState,
}

/// Discrete visual tag per entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VisualState {
    Decor { color: Option<String> },
    Text { text: String },
    Player {
        airborne: bool,
        /// Off during invulnerability blink phases
        visible: bool,
        weapon: Weapon,
        speed_boost: bool,
    },
    Block,
    Spikes { frame: Option<usize> },
    Bullet,
    Enemy,
    Pickup { pickup: PickupKind },
    Explosion { frame: usize },
}

impl VisualState {
    /// CSS class for DOM renderers
    pub fn class(&self) -> &'static str {
        match self {
            VisualState::Decor { .. } => "decor",
            VisualState::Text { .. } => "text",
            VisualState::Player { .. } => "player",
            VisualState::Block => "block",
            VisualState::Spikes { .. } => "spikes",
            VisualState::Bullet => "bullet",
            VisualState::Enemy => "enemy",
            VisualState::Pickup { pickup } => match pickup {
                PickupKind::WeaponUpgrade => "pickup-weapon",
                PickupKind::SpeedUpgrade => "pickup-speed",
            },
            VisualState::Explosion { .. } => "explosion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Enemy, Pickup};
    use glam::Vec2;

    const RUNNER_SCENE: &str = r#"{
        "entities": [
            {"id": "player", "kind": "rectangle", "x": 200, "y": 230, "width": 24, "height": 35},
            {"id": "scoreText", "kind": "text", "x": 10, "y": 10, "text": "Score: 0"}
        ],
        "bindings": [{"trigger": "keydown", "key": "ArrowUp", "effect": "jump"}]
    }"#;

    const SHOOTER_SCENE: &str = r#"{
        "entities": [
            {"id": "player", "kind": "rectangle", "x": 220, "y": 560, "width": 40, "height": 40}
        ]
    }"#;

    #[test]
    fn runner_registers_tick_spawn_and_score() {
        let session = Session::load(Tuning::runner(), RUNNER_SCENE, 1).unwrap();
        assert_eq!(session.clock().active_count(), 3);
        assert_eq!(session.info(), RUNNER_INSTRUCTIONS);
        assert!(session.is_running());
    }

    #[test]
    fn shooter_registers_tick_spawn_and_pickups() {
        let session = Session::load(Tuning::shooter(), SHOOTER_SCENE, 1).unwrap();
        assert_eq!(session.clock().active_count(), 3);
        assert!(session.bindings.binds("ArrowLeft", Effect::MoveLeft));
        assert_eq!(session.frame().lives, Some(3));
    }

    #[test]
    fn malformed_scene_fails_to_load() {
        let err = Session::load(Tuning::runner(), "<game/>", 1).unwrap_err();
        assert!(matches!(err, EngineError::SceneLoad { .. }));
    }

    #[test]
    fn score_timer_updates_label() {
        let mut session = Session::load(Tuning::runner(), RUNNER_SCENE, 1).unwrap();
        session.advance(1000.0);
        assert_eq!(session.state().score, 10);
        let frame = session.frame();
        let label = frame.entities.iter().find(|e| e.id == "scoreText").unwrap();
        assert_eq!(
            label.visual,
            VisualState::Text {
                text: "Score: 10".to_string()
            }
        );
    }

    #[test]
    fn missing_player_idles_safely() {
        let scene = r#"{"entities": [{"id": "scoreText", "kind": "text", "x": 0, "y": 0}]}"#;
        let mut session = Session::load(Tuning::runner(), scene, 1).unwrap();
        session.key_down("ArrowUp");
        session.advance(10_000.0);
        assert!(session.is_running());
        assert_eq!(session.state().score, 0);
        assert!(session.entities().obstacles.is_empty());

        let mut shooter = Session::load(Tuning::shooter(), scene, 1).unwrap();
        shooter.key_down("Space");
        shooter.advance(10_000.0);
        assert_eq!(shooter.entities().dynamic_count(), 0);
    }

    #[test]
    fn key_repeat_does_not_rejump() {
        let mut session = Session::load(Tuning::runner(), RUNNER_SCENE, 1).unwrap();
        session.key_down("ArrowUp");
        session.advance(300.0);
        let y = session.entities().player.as_ref().unwrap().pos.y;
        // browser key repeat while still held
        session.key_down("ArrowUp");
        let player = session.entities().player.as_ref().unwrap();
        assert!(player.airborne);
        assert_eq!(player.pos.y, y);
        assert!(player.vel.y > -16.0);
    }

    #[test]
    fn restart_only_after_game_over() {
        let mut session = Session::load(Tuning::runner(), RUNNER_SCENE, 1).unwrap();
        session.key_down(" ");
        assert!(!session.restart_requested());
        session.key_up(" ");

        session.game_over();
        assert_eq!(session.clock().active_count(), 0);
        assert_eq!(session.info(), "Game Over! Score: 0. Press SPACE to restart.");
        session.key_down("Spacebar");
        assert!(session.restart_requested());
    }

    /// Advance tick by tick, dropping anything spawned so it never reaches the player
    fn advance_quiet(session: &mut Session, ms: f64) {
        let steps = (ms / session.tuning.tick_ms).round() as usize;
        for _ in 0..steps {
            session.advance(session.tuning.tick_ms);
            session.entities.enemies.clear();
            session.entities.pickups.clear();
        }
    }

    #[test]
    fn pickup_refresh_rearms_expiry() {
        let mut session = Session::load(Tuning::shooter(), SHOOTER_SCENE, 1).unwrap();
        session.apply_pickup(PickupKind::SpeedUpgrade);
        let first = session.timers.speed_expiry.unwrap();
        advance_quiet(&mut session, 20_010.0);
        session.apply_pickup(PickupKind::SpeedUpgrade);
        assert!(!session.clock.is_active(first));

        // 25 s after the first pickup the boost is still on
        advance_quiet(&mut session, 9_990.0);
        assert!(session.entities().player.as_ref().unwrap().speed_boost);
        advance_quiet(&mut session, 15_030.0);
        assert!(session.is_running());
        assert!(!session.entities().player.as_ref().unwrap().speed_boost);
        assert!(session.timers.speed_expiry.is_none());
    }

    #[test]
    fn invulnerability_blinks_then_settles_visible() {
        let mut session = Session::load(Tuning::shooter(), SHOOTER_SCENE, 1).unwrap();
        session.begin_invulnerability(1200.0, 100.0);
        session.entities.player.as_mut().unwrap().invulnerable_until = 1200.0;
        session.advance(100.0);
        assert!(!session.entities().player.as_ref().unwrap().blink_visible);
        session.advance(1100.0);
        let player = session.entities().player.as_ref().unwrap();
        assert!(player.blink_visible);
        assert!(session.timers.blink.is_none());
    }

    #[test]
    fn frame_serializes_with_visual_tags() {
        let session = Session::load(Tuning::runner(), RUNNER_SCENE, 1).unwrap();
        let json = serde_json::to_string(&session.frame()).unwrap();
        assert!(json.contains(r#""kind":"player""#));
        assert!(json.contains(r#""phase":"Running""#));

        let mut shooter = Session::load(Tuning::shooter(), SHOOTER_SCENE, 1).unwrap();
        let id = shooter.entities.next_entity_id();
        shooter.entities.pickups.push(Pickup {
            id,
            kind: PickupKind::SpeedUpgrade,
            pos: Vec2::new(40.0, 40.0),
            vel: Vec2::new(0.0, 3.0),
            size: Vec2::splat(32.0),
        });
        let json = serde_json::to_string(&shooter.frame()).unwrap();
        assert!(json.contains(r#""kind":"pickup","pickup":"SpeedUpgrade""#));
    }

    #[test]
    fn held_fire_key_does_not_restart_after_death() {
        let mut session = Session::load(Tuning::shooter(), SHOOTER_SCENE, 1).unwrap();
        session.key_down("Space");
        let player = session.entities.player.as_mut().unwrap();
        player.lives = 1;
        let pos = player.pos;
        let id = session.entities.next_entity_id();
        session.entities.enemies.push(Enemy {
            id,
            pos,
            vel: Vec2::ZERO,
            size: Vec2::splat(64.0),
        });
        session.advance(30.0);
        assert_eq!(session.state().phase, GamePhase::GameOver);

        // auto-repeat of the key held through the fatal hit
        session.key_down("Space");
        session.key_down(" ");
        assert!(!session.restart_requested());

        session.key_up("Space");
        session.key_down(" ");
        assert!(session.restart_requested());
    }

    #[test]
    fn bindings_match_the_key_name_as_well_as_the_code() {
        let scene = r#"{
            "entities": [{"id": "player", "kind": "rectangle", "x": 200, "y": 230, "width": 24, "height": 35}],
            "bindings": [{"trigger": "keydown", "key": "w", "effect": "jump"}]
        }"#;
        let mut session = Session::load(Tuning::runner(), scene, 1).unwrap();
        session.key_down("KeyW");
        assert!(!session.entities().player.as_ref().unwrap().airborne);
        session.key_up("KeyW");

        session.key_down_as(&["KeyW", "w"]);
        assert!(session.entities().player.as_ref().unwrap().airborne);
        session.key_up_as(&["KeyW", "W"]);
        assert!(!session.input.is_held("w"));
    }

    #[test]
    fn start_rejects_invalid_tuning() {
        let scene = SceneDescription::from_json(RUNNER_SCENE).unwrap();
        let mut tuning = Tuning::runner();
        tuning.tick_ms = 0.0;
        let err = Session::start(tuning, &scene, 1).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTuning { .. }));
    }
}
