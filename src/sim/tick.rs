//! Fixed timestep simulation tick
//!
//! One pipeline per variant. Each tick runs to completion or ends the game;
//! nothing inside a tick is skipped half way except on game over.

use glam::Vec2;

use super::collision::{consuming_pairs, first_overlap, overlapping_pairs};
use super::entity::{Bullet, DamageOutcome, Explosion};
use super::kinematics::{advance_parallax, animate_obstacle, apply_player_gravity, fall, steer};
use super::session::Session;
use super::state::Weapon;
use crate::scene::Effect;
use crate::tuning::{RunnerTuning, ShooterTuning};

/// Bullets leave the gun this far above the player's top edge
const MUZZLE_OFFSET: f32 = 10.0;

impl Session {
    /// Runner: animate, fall, collide, scroll, parallax
    pub(super) fn runner_tick(&mut self, tuning: &RunnerTuning) {
        let now = self.clock.now_ms();
        let Some(player) = self.entities.player.as_mut() else {
            return;
        };

        for obstacle in self.entities.obstacles.iter_mut() {
            animate_obstacle(obstacle, now);
        }

        if apply_player_gravity(player, tuning.gravity, tuning.ground_level) {
            log::debug!("Landed at {now:.0} ms");
        }

        let hitbox = player.hitbox();
        if let Some(idx) = first_overlap(&hitbox, &self.entities.obstacles.hitboxes()) {
            log::debug!("Player hit obstacle #{idx} at {now:.0} ms");
            self.game_over();
            return;
        }

        let speed = self.state.scroll.block_speed;
        for obstacle in self.entities.obstacles.iter_mut() {
            obstacle.pos.x -= speed;
        }
        self.entities
            .obstacles
            .retain(|o| o.pos.x >= -o.collision_width());

        self.state.scroll.background_offset = advance_parallax(
            self.state.scroll.background_offset,
            speed,
            tuning.parallax_factor,
            tuning.background_width,
        );
    }

    /// Shooter: steer, fire, move everything, then resolve collisions
    pub(super) fn shooter_tick(&mut self, tuning: &ShooterTuning) {
        let now = self.clock.now_ms();
        let field = self.tuning.playfield;
        let Some(player) = self.entities.player.as_mut() else {
            return;
        };

        // Steering
        let held = |effect| self.bindings.keys_for(effect).any(|k| self.input.is_held(k));
        let speed = if player.speed_boost {
            tuning.boosted_player_speed
        } else {
            tuning.player_speed
        };
        let dx = match (held(Effect::MoveLeft), held(Effect::MoveRight)) {
            (true, false) => -speed,
            (false, true) => speed,
            _ => 0.0,
        };
        player.pos.x = steer(player.pos.x, dx, player.size.x, field.width);
        let (player_pos, player_size, weapon) = (player.pos, player.size, player.weapon);

        // Firing
        let fire_keys: Vec<&str> = self.bindings.keys_for(Effect::Fire).collect();
        let steering_keys: Vec<&str> = self
            .bindings
            .keys_for(Effect::MoveLeft)
            .chain(self.bindings.keys_for(Effect::MoveRight))
            .collect();
        if self
            .fire
            .try_fire(&self.input, &fire_keys, &steering_keys, now)
        {
            let center_x =
                player_pos.x + (player_size.x / 2.0).floor() - (tuning.bullet_width / 2.0).floor();
            let offsets = match weapon {
                Weapon::Blaster => vec![0.0],
                Weapon::TwinBlaster => vec![-tuning.twin_offset, tuning.twin_offset],
            };
            for dx in offsets {
                let id = self.entities.next_entity_id();
                self.entities.bullets.push(Bullet {
                    id,
                    pos: Vec2::new(center_x + dx, player_pos.y - MUZZLE_OFFSET),
                    vel: Vec2::new(0.0, -tuning.bullet_speed),
                    size: Vec2::new(tuning.bullet_width, tuning.bullet_height),
                });
            }
        }

        // Motion and pruning
        for bullet in self.entities.bullets.iter_mut() {
            bullet.pos += bullet.vel;
        }
        self.entities
            .bullets
            .retain(|b| b.pos.y + b.size.y >= -tuning.bullet_despawn_margin);

        let params = self.state.difficulty.params();
        let floor = field.height + tuning.fall_despawn_margin;
        for enemy in self.entities.enemies.iter_mut() {
            fall(
                &mut enemy.vel.y,
                &mut enemy.pos.y,
                params.enemy_gravity,
                params.terminal_velocity,
            );
        }
        self.entities.enemies.retain(|e| e.pos.y <= floor);

        for pickup in self.entities.pickups.iter_mut() {
            pickup.pos += pickup.vel;
        }
        self.entities.pickups.retain(|p| p.pos.y <= floor);

        self.entities.explosions.retain(|e| !e.is_expired(now));

        // Bullets against enemies
        let kills = consuming_pairs(
            &self.entities.bullets.hitboxes(),
            &self.entities.enemies.hitboxes(),
        );
        if !kills.is_empty() {
            let bullets: Vec<u32> = self.entities.bullets.iter().map(|b| b.id).collect();
            let enemies: Vec<(u32, Vec2, Vec2)> = self
                .entities
                .enemies
                .iter()
                .map(|e| (e.id, e.pos, e.size))
                .collect();

            let mut spent = Vec::with_capacity(kills.len());
            let mut destroyed = Vec::with_capacity(kills.len());
            for (b, e) in kills {
                let (enemy_id, pos, size) = enemies[e];
                spent.push(bullets[b]);
                destroyed.push(enemy_id);

                let id = self.entities.next_entity_id();
                self.entities.explosions.push(Explosion {
                    id,
                    pos,
                    size,
                    spawned_at: now,
                    lifetime_ms: tuning.explosion_ms,
                });
                self.award(tuning.kill_score);
            }
            self.entities.bullets.remove_ids(&spent);
            self.entities.enemies.remove_ids(&destroyed);
        }

        // Player against enemies
        let player_box = match &self.entities.player {
            Some(player) => player.hitbox(),
            None => return,
        };
        if let Some(idx) = first_overlap(&player_box, &self.entities.enemies.hitboxes()) {
            let enemy_id = self.entities.enemies.iter().nth(idx).map(|e| e.id);
            if let Some(id) = enemy_id {
                self.entities.enemies.remove_ids(&[id]);
            }
            let outcome = match self.entities.player.as_mut() {
                Some(player) => player.apply_damage(now, tuning.invulnerability_ms),
                None => return,
            };
            match outcome {
                DamageOutcome::Ignored => {}
                DamageOutcome::Hit { lives } => {
                    log::info!("Player hit, {lives} lives left");
                    self.begin_invulnerability(tuning.invulnerability_ms, tuning.blink_interval_ms);
                    self.update_health_info();
                }
                DamageOutcome::Killed => {
                    self.update_health_info();
                    self.game_over();
                    return;
                }
            }
        }

        // Player against pickups
        let touched = overlapping_pairs(&[player_box], &self.entities.pickups.hitboxes());
        let collected: Vec<(u32, _)> = touched
            .into_iter()
            .filter_map(|(_, p)| self.entities.pickups.iter().nth(p).map(|p| (p.id, p.kind)))
            .collect();
        for (id, kind) in collected {
            self.entities.pickups.remove_ids(&[id]);
            self.apply_pickup(kind);
        }
    }
}
