//! Per-tick motion
//!
//! Velocities are in pixels per tick; gravity is added to velocity before the
//! velocity is added to position (semi-implicit Euler), matching the cadence
//! the jump and landing timings were tuned against.

use super::entity::{Obstacle, ObstacleShape, Player, SPIKE_FRAME_MS, SPIKE_FRAMES};

/// Apply gravity to the player and land on `ground_level`.
///
/// Returns true on the tick the player lands.
pub fn apply_player_gravity(player: &mut Player, gravity: f32, ground_level: f32) -> bool {
    player.vel.y += gravity;
    player.pos.y += player.vel.y;

    if player.pos.y >= ground_level {
        player.pos.y = ground_level;
        player.vel.y = 0.0;
        let landed = player.airborne;
        player.airborne = false;
        return landed;
    }
    false
}

/// Start a jump if standing. Jumping while airborne is rejected, not queued.
pub fn try_jump(player: &mut Player, impulse: f32) -> bool {
    if player.airborne {
        return false;
    }
    player.airborne = true;
    player.vel.y = impulse;
    true
}

/// Accelerate a falling body toward its terminal velocity.
///
/// Never decelerates: a body already above `terminal` keeps its speed.
pub fn fall(vel_y: &mut f32, pos_y: &mut f32, gravity: f32, terminal: f32) {
    if *vel_y < terminal {
        *vel_y = (*vel_y + gravity).min(terminal);
    }
    *pos_y += *vel_y;
}

/// Move horizontally, keeping a body of `width` inside `[0, bound]`
pub fn steer(x: f32, dx: f32, width: f32, bound: f32) -> f32 {
    (x + dx).clamp(0.0, (bound - width).max(0.0))
}

/// Advance the background offset, wrapping at the image width
pub fn advance_parallax(offset: f32, block_speed: f32, factor: f32, width: f32) -> f32 {
    (offset + block_speed * factor).rem_euclid(width)
}

/// Spike frame shown `elapsed_ms` after spawning.
///
/// Nothing is shown for the first frame period; afterwards frames cycle.
pub fn spike_frame_at(elapsed_ms: f64) -> Option<usize> {
    if elapsed_ms < 0.0 {
        return None;
    }
    let steps = (elapsed_ms / SPIKE_FRAME_MS).floor() as usize;
    if steps == 0 {
        None
    } else {
        Some((steps - 1) % SPIKE_FRAMES.len())
    }
}

/// Top edge of a frame whose bottom stays on `anchor_y`
#[inline]
pub fn anchored_top(anchor_y: f32, frame_height: f32) -> f32 {
    anchor_y - frame_height
}

/// Bring an obstacle's frame and vertical position up to `now_ms`
pub fn animate_obstacle(obstacle: &mut Obstacle, now_ms: f64) {
    if let ObstacleShape::Spikes { anchor_y, frame } = &mut obstacle.shape {
        *frame = spike_frame_at(now_ms - obstacle.spawned_at);
        obstacle.pos.y = match *frame {
            Some(f) => anchored_top(*anchor_y, SPIKE_FRAMES[f]),
            None => *anchor_y,
        };
    }
}
