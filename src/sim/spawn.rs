//! Procedural spawning
//!
//! All randomness in a session flows through one seeded PCG stream, so a
//! session replays identically for the same seed and inputs.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{
    BLOCK_GROUND_OFFSET, Enemy, Obstacle, Pickup, SPIKE_ANCHOR_OFFSET,
};
use super::state::{Difficulty, PickupKind};
use crate::tuning::{ObstacleStyle, Playfield, RunnerTuning, ShooterTuning};

/// Extra random height enemies may start above the top edge
const ENEMY_SPAWN_JITTER: u32 = 40;

#[derive(Debug, Clone)]
pub struct SpawnController {
    rng: Pcg32,
}

impl SpawnController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Runner obstacle entering at the right edge
    pub fn obstacle(
        &self,
        id: u32,
        tuning: &RunnerTuning,
        playfield: &Playfield,
        now_ms: f64,
    ) -> Obstacle {
        let x = playfield.width;
        match tuning.obstacle {
            ObstacleStyle::Block => {
                Obstacle::block(id, x, tuning.ground_level - BLOCK_GROUND_OFFSET, now_ms)
            }
            ObstacleStyle::Spikes => {
                Obstacle::spikes(id, x, tuning.ground_level + SPIKE_ANCHOR_OFFSET, now_ms)
            }
        }
    }

    /// Delay until the next enemy, uniform in the tier's window
    pub fn next_enemy_delay(&mut self, difficulty: Difficulty) -> f64 {
        let (min, max) = difficulty.params().spawn_window_ms;
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Enemy above the top edge at a random column
    pub fn enemy(&mut self, id: u32, tuning: &ShooterTuning, playfield: &Playfield) -> Enemy {
        let size = tuning.enemy_size;
        let x = self.column(playfield.width, size);
        let jitter = self.rng.random_range(0..ENEMY_SPAWN_JITTER) as f32;
        Enemy {
            id,
            pos: Vec2::new(x, -(size + jitter)),
            vel: Vec2::ZERO,
            size: Vec2::splat(size),
        }
    }

    /// Independent rolls for each pickup kind
    pub fn roll_pickups(&mut self, difficulty: Difficulty, tuning: &ShooterTuning) -> Vec<PickupKind> {
        let mut kinds = Vec::new();
        let weapon_chance = difficulty.params().weapon_pickup_chance.clamp(0.0, 1.0);
        if self.rng.random_bool(weapon_chance) {
            kinds.push(PickupKind::WeaponUpgrade);
        }
        if self.rng.random_bool(tuning.speed_pickup_chance.clamp(0.0, 1.0)) {
            kinds.push(PickupKind::SpeedUpgrade);
        }
        kinds
    }

    /// Pickup above the top edge at a random column
    pub fn pickup(
        &mut self,
        id: u32,
        kind: PickupKind,
        tuning: &ShooterTuning,
        playfield: &Playfield,
    ) -> Pickup {
        let size = tuning.pickup_size;
        let x = self.column(playfield.width, size);
        Pickup {
            id,
            kind,
            pos: Vec2::new(x, -size),
            vel: Vec2::new(0.0, tuning.pickup_fall_speed),
            size: Vec2::splat(size),
        }
    }

    /// Whole-pixel column keeping a body of `width` inside the playfield
    fn column(&mut self, field_width: f32, width: f32) -> f32 {
        let span = (field_width - width).max(1.0) as u32;
        self.rng.random_range(0..span.max(1)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacles_enter_at_right_edge() {
        let spawner = SpawnController::new(1);
        let playfield = Playfield::default();

        let mut tuning = RunnerTuning::default();
        tuning.obstacle = ObstacleStyle::Block;
        let block = spawner.obstacle(7, &tuning, &playfield, 2000.0);
        assert_eq!(block.pos, Vec2::new(800.0, 215.0));
        assert_eq!(block.spawned_at, 2000.0);

        tuning.obstacle = ObstacleStyle::Spikes;
        let spikes = spawner.obstacle(8, &tuning, &playfield, 2000.0);
        assert_eq!(spikes.pos, Vec2::new(800.0, 262.0));
    }

    #[test]
    fn enemy_delay_stays_in_window() {
        let mut spawner = SpawnController::new(42);
        for tier in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard, Difficulty::Insane] {
            let (min, max) = tier.params().spawn_window_ms;
            for _ in 0..200 {
                let delay = spawner.next_enemy_delay(tier);
                assert!(delay >= min && delay < max, "{delay} outside {min}..{max}");
            }
        }
    }

    #[test]
    fn enemies_spawn_above_the_top_inside_columns() {
        let mut spawner = SpawnController::new(7);
        let tuning = ShooterTuning::default();
        let playfield = Playfield {
            width: 480.0,
            height: 640.0,
        };
        for id in 0..200 {
            let enemy = spawner.enemy(id, &tuning, &playfield);
            assert!(enemy.pos.x >= 0.0 && enemy.pos.x + enemy.size.x <= playfield.width);
            assert!(enemy.pos.y <= -64.0 && enemy.pos.y > -104.0);
            assert_eq!(enemy.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = SpawnController::new(99);
        let mut b = SpawnController::new(99);
        let tuning = ShooterTuning::default();
        for _ in 0..50 {
            assert_eq!(a.next_enemy_delay(Difficulty::Normal), b.next_enemy_delay(Difficulty::Normal));
            assert_eq!(
                a.roll_pickups(Difficulty::Hard, &tuning),
                b.roll_pickups(Difficulty::Hard, &tuning)
            );
        }
    }

    #[test]
    fn pickup_rolls_follow_chances() {
        let mut spawner = SpawnController::new(3);
        let mut tuning = ShooterTuning::default();
        tuning.speed_pickup_chance = 0.0;
        let mut weapons = 0;
        for _ in 0..1000 {
            let kinds = spawner.roll_pickups(Difficulty::Easy, &tuning);
            assert!(!kinds.contains(&PickupKind::SpeedUpgrade));
            weapons += kinds.len();
        }
        // Easy weapon chance is one half
        assert!((400..600).contains(&weapons), "{weapons}");
    }

    #[test]
    fn pickups_fall_at_constant_speed() {
        let mut spawner = SpawnController::new(5);
        let tuning = ShooterTuning::default();
        let pickup = spawner.pickup(1, PickupKind::SpeedUpgrade, &tuning, &Playfield::default());
        assert_eq!(pickup.vel, Vec2::new(0.0, 3.0));
        assert_eq!(pickup.pos.y, -32.0);
    }
}
