//! Frame-coherent keyboard state.
//!
//! [`KeyboardState`] accumulates winit key events between frames and answers
//! whether a key is held, was pressed this frame, or was released this frame.
//! Keys are tracked by physical [`KeyCode`] so the flight layout does not move
//! with the user's keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Platform-independent key event, also used by flight scripts and tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: KeyCode,
    pub state: ElementState,
    /// Auto-repeat events are dropped.
    pub repeat: bool,
}

/// Held and edge-triggered key sets.
///
/// Forward events with [`process_event`](Self::process_event), read state
/// during the frame, then call [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed_this_frame: HashSet<KeyCode>,
    released_this_frame: HashSet<KeyCode>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a winit [`KeyEvent`]. Unidentified physical keys are ignored.
    pub fn process_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(key) = event.physical_key {
            self.process_raw(RawKeyEvent {
                key,
                state: event.state,
                repeat: event.repeat,
            });
        }
    }

    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => self.press(event.key),
            ElementState::Released => self.release(event.key),
        }
    }

    /// Marks `key` held. A key that is already held does not re-trigger.
    pub fn press(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.pressed_this_frame.insert(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            self.released_this_frame.insert(key);
        }
    }

    /// Releases every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.released_this_frame.extend(self.held.drain());
    }

    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    #[must_use]
    pub fn just_released(&self, key: KeyCode) -> bool {
        self.released_this_frame.contains(&key)
    }

    /// Whether any key went down this frame.
    #[must_use]
    pub fn any_just_pressed(&self) -> bool {
        !self.pressed_this_frame.is_empty()
    }

    /// Currently held keys, in no particular order.
    pub fn held_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().copied()
    }

    /// Clears the per-frame edge sets. Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(key: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent { key, state, repeat }
    }

    #[test]
    fn test_press_sets_held_and_edge() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed, false));
        assert!(kb.is_pressed(KeyCode::KeyW));
        assert!(kb.just_pressed(KeyCode::KeyW));

        kb.clear_transients();
        assert!(kb.is_pressed(KeyCode::KeyW));
        assert!(!kb.just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_release_sets_edge() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::Space);
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::Space, ElementState::Released, false));
        assert!(!kb.is_pressed(KeyCode::Space));
        assert!(kb.just_released(KeyCode::Space));
    }

    #[test]
    fn test_repeat_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyA, ElementState::Pressed, true));
        assert!(!kb.is_pressed(KeyCode::KeyA));
    }

    #[test]
    fn test_double_press_is_single_edge() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyB);
        kb.clear_transients();
        kb.press(KeyCode::KeyB);
        assert!(!kb.just_pressed(KeyCode::KeyB));
    }

    #[test]
    fn test_any_just_pressed_tracks_new_presses_only() {
        let mut kb = KeyboardState::new();
        assert!(!kb.any_just_pressed());
        kb.press(KeyCode::KeyW);
        assert!(kb.any_just_pressed());
        kb.clear_transients();
        // Still held, but not new.
        kb.press(KeyCode::KeyW);
        assert!(!kb.any_just_pressed());
        kb.release(KeyCode::KeyW);
        assert!(!kb.any_just_pressed());
    }

    #[test]
    fn test_release_all_on_focus_loss() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyW);
        kb.press(KeyCode::ArrowUp);
        kb.clear_transients();
        kb.release_all();
        assert_eq!(kb.held_keys().count(), 0);
        assert!(kb.just_released(KeyCode::KeyW));
        assert!(kb.just_released(KeyCode::ArrowUp));
    }
}
