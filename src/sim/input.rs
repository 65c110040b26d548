//! Held-key state and fire rate limiting
//!
//! Key events arrive between ticks and only flip booleans; ticks read the map.

use std::collections::HashMap;

use crate::consts::ARROW_KEYS;
use crate::normalize_key;

/// Which keys are currently held
///
/// A physical key may be known under several names (`KeyboardEvent.code`
/// and `KeyboardEvent.key`); it counts as held under each of them.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// First name of each held key -> every name it was pressed under
    held: HashMap<String, Vec<String>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key_down(&mut self, key: &str) {
        self.press(&[key]);
    }

    pub fn on_key_up(&mut self, key: &str) {
        self.release(&[key]);
    }

    /// Hold one key under all of `names`
    pub fn press(&mut self, names: &[&str]) {
        let Some(first) = names.first() else {
            return;
        };
        let mut aliases: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = normalize_key(name);
            if !aliases.iter().any(|a| a == name) {
                aliases.push(name.to_string());
            }
        }
        self.held.insert(normalize_key(first).to_string(), aliases);
    }

    /// Release every key held under any of `names`
    pub fn release(&mut self, names: &[&str]) {
        for name in names {
            let name = normalize_key(name);
            self.held.retain(|_, aliases| !aliases.iter().any(|a| a == name));
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        let key = normalize_key(key);
        self.held
            .values()
            .any(|aliases| aliases.iter().any(|a| a == key))
    }

    /// Whether any held key is known by none of the `allowed` names
    pub fn any_held_except(&self, allowed: &[&str]) -> bool {
        self.held
            .values()
            .any(|aliases| !aliases.iter().any(|a| allowed.contains(&a.as_str())))
    }

    /// Release everything (focus loss)
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

/// At most one shot per cooldown window while the fire key is held
#[derive(Debug, Clone)]
pub struct FireControl {
    pub cooldown_ms: f64,
    last_shot_at: Option<f64>,
}

impl FireControl {
    pub fn new(cooldown_ms: f64) -> Self {
        Self {
            cooldown_ms,
            last_shot_at: None,
        }
    }

    /// Decide whether to fire this tick and record the shot.
    ///
    /// Fires when a fire key is held, no key other than fire, arrow and
    /// `steering` keys is held, and the cooldown has elapsed.
    pub fn try_fire(
        &mut self,
        input: &InputState,
        fire_keys: &[&str],
        steering_keys: &[&str],
        now_ms: f64,
    ) -> bool {
        if !fire_keys.iter().any(|k| input.is_held(k)) {
            return false;
        }

        let mut allowed: Vec<&str> = Vec::with_capacity(fire_keys.len() + steering_keys.len() + 4);
        allowed.extend(fire_keys.iter().map(|k| normalize_key(k)));
        allowed.extend(steering_keys.iter().map(|k| normalize_key(k)));
        allowed.extend(ARROW_KEYS);
        if input.any_held_except(&allowed) {
            return false;
        }

        if let Some(last) = self.last_shot_at {
            if now_ms - last < self.cooldown_ms {
                return false;
            }
        }
        self.last_shot_at = Some(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRE: [&str; 1] = ["Space"];

    #[test]
    fn keys_toggle() {
        let mut input = InputState::new();
        assert!(!input.is_held("ArrowLeft"));
        input.on_key_down("ArrowLeft");
        assert!(input.is_held("ArrowLeft"));
        input.on_key_up("ArrowLeft");
        assert!(!input.is_held("ArrowLeft"));
    }

    #[test]
    fn space_spellings_are_one_key() {
        let mut input = InputState::new();
        input.on_key_down(" ");
        assert!(input.is_held("Space"));
        input.on_key_up("Spacebar");
        assert!(!input.is_held(" "));
    }

    #[test]
    fn cooldown_limits_rate_while_held() {
        let mut input = InputState::new();
        input.on_key_down("Space");
        let mut fire = FireControl::new(220.0);

        let shots: Vec<f64> = (0..20)
            .map(|tick| tick as f64 * 30.0)
            .filter(|&now| fire.try_fire(&input, &FIRE, &[], now))
            .collect();
        // 0, 240, 480 (first tick at or after each 220 ms window)
        assert_eq!(shots, vec![0.0, 240.0, 480.0]);
    }

    #[test]
    fn arrows_do_not_block_firing() {
        let mut input = InputState::new();
        input.on_key_down("Space");
        input.on_key_down("ArrowLeft");
        input.on_key_down("ArrowUp");
        let mut fire = FireControl::new(220.0);
        assert!(fire.try_fire(&input, &FIRE, &[], 0.0));
    }

    #[test]
    fn unrelated_key_blocks_firing() {
        let mut input = InputState::new();
        input.on_key_down("Space");
        input.on_key_down("KeyQ");
        let mut fire = FireControl::new(220.0);
        assert!(!fire.try_fire(&input, &FIRE, &[], 0.0));

        // a blocked tick does not start the cooldown
        input.on_key_up("KeyQ");
        assert!(fire.try_fire(&input, &FIRE, &[], 30.0));
    }

    #[test]
    fn bound_steering_keys_are_exempt() {
        let mut input = InputState::new();
        input.on_key_down("Space");
        input.on_key_down("a");
        let mut fire = FireControl::new(220.0);
        assert!(fire.try_fire(&input, &FIRE, &["a", "d"], 0.0));
    }

    #[test]
    fn key_held_under_code_and_key_names() {
        let mut input = InputState::new();
        input.press(&["KeyW", "w"]);
        assert!(input.is_held("KeyW"));
        assert!(input.is_held("w"));

        // shift changed the key name between press and release
        input.release(&["KeyW", "W"]);
        assert!(!input.is_held("w"));
        assert!(!input.any_held_except(&[]));
    }

    #[test]
    fn fire_bound_by_key_name_is_not_blocked_by_its_code() {
        let mut input = InputState::new();
        input.press(&["KeyF", "f"]);
        let mut fire = FireControl::new(220.0);
        assert!(fire.try_fire(&input, &["f"], &[], 0.0));
    }

    #[test]
    fn no_fire_without_fire_key() {
        let input = InputState::new();
        let mut fire = FireControl::new(220.0);
        assert!(!fire.try_fire(&input, &FIRE, &[], 1000.0));
    }
}
