use std::collections::HashSet;

use super::types::{Key, KeyAction, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent};

/// Input state for the shell's single window.
///
/// Platform backends feed raw transitions through here so every emitted
/// event carries a consistent modifier set, and so key repeat can be told
/// apart from a fresh press.
#[derive(Debug, Default)]
pub struct InputTracker {
    modifiers: Modifiers,
    keys_down: HashSet<Key>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Replaces the held-modifier bits, keeping lock state.
    pub fn set_held_modifiers(&mut self, held: Modifiers) {
        self.modifiers = (self.modifiers & Modifiers::LOCKS) | (held & Modifiers::HELD);
    }

    /// Records a key transition and builds the event to dispatch.
    ///
    /// `pressed` with the key already down is reported as a repeat, whether
    /// or not the platform flagged it. Lock keys toggle their modifier bit on
    /// press; the platform does not report lock state directly.
    pub fn key(&mut self, key: Key, code: u32, pressed: bool) -> KeyEvent {
        let action = if pressed {
            if self.keys_down.insert(key) {
                self.toggle_lock(key);
                KeyAction::Press
            } else {
                KeyAction::Repeat
            }
        } else {
            self.keys_down.remove(&key);
            KeyAction::Release
        };

        KeyEvent {
            key,
            code,
            action,
            modifiers: self.modifiers,
        }
    }

    fn toggle_lock(&mut self, key: Key) {
        match key {
            Key::CapsLock => self.modifiers.toggle(Modifiers::CAPS_LOCK),
            Key::NumLock => self.modifiers.toggle(Modifiers::NUM_LOCK),
            _ => {}
        }
    }

    pub fn button(&self, button: MouseButton, pressed: bool) -> MouseEvent {
        let action = if pressed {
            MouseAction::Press
        } else {
            MouseAction::Release
        };

        MouseEvent {
            button,
            action,
            modifiers: self.modifiers,
        }
    }

    /// Forgets held keys and modifiers.
    ///
    /// Releases that happen while unfocused are never delivered; without this
    /// a key pressed before losing focus would repeat forever after.
    pub fn focus_lost(&mut self) {
        self.keys_down.clear();
        self.modifiers &= Modifiers::LOCKS;
    }
}
