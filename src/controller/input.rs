/// Platform-agnostic keyboard state
use std::collections::HashMap;

use winit::keyboard::KeyCode;

/// Held/released state per key code, fed by key events and read by the
/// per-frame systems. Keys that were never seen count as released.
pub struct InputState {
    held: HashMap<String, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self { held: HashMap::new() }
    }

    /// Record the most recent press/release for `code`. Repeated identical
    /// events (key auto-repeat) are harmless.
    pub fn set_key(&mut self, code: &str, pressed: bool) {
        self.held.insert(code.to_string(), pressed);
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.get(code).copied().unwrap_or(false)
    }

    /// Release everything, used when the window loses focus so keys can't
    /// get stuck held.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration for camera translation.
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            // "KeyW", never "KeyW " - a stray trailing space in the binding
            // would leave forward motion permanently dead.
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
        }
    }
}

/// Canonical string identifier for a physical key ("KeyW", "ArrowUp", ...).
pub fn key_name(code: KeyCode) -> String {
    format!("{code:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_key_is_released() {
        let input = InputState::new();
        assert!(!input.is_held("KeyW"));
    }

    #[test]
    fn test_set_key_idempotent() {
        let mut input = InputState::new();
        input.set_key("KeyW", true);
        input.set_key("KeyW", true);
        assert!(input.is_held("KeyW"));
        input.set_key("KeyW", false);
        assert!(!input.is_held("KeyW"));
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputState::new();
        input.set_key("KeyW", true);
        input.set_key("KeyA", true);
        input.clear();
        assert!(!input.is_held("KeyW"));
        assert!(!input.is_held("KeyA"));
    }

    #[test]
    fn test_key_name_matches_event_codes() {
        assert_eq!(key_name(KeyCode::KeyW), "KeyW");
        assert_eq!(key_name(KeyCode::ArrowUp), "ArrowUp");
    }
}
