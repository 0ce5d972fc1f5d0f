use std::fmt;

use bitflags::bitflags;

/// Physical keyboard key.
///
/// Covers the full desktop key set, including the two locale-dependent keys
/// found on non-US layouts (`World1`, `World2`). Keys the platform reports
/// but this enum does not name arrive as `Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Printable
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    Semicolon,
    Equal,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    LeftBracket,
    Backslash,
    RightBracket,
    GraveAccent,
    World1,
    World2,

    // Function and navigation
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,
    PageUp,
    PageDown,
    Home,
    End,
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13,
    F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24, F25,

    // Keypad
    Kp0, Kp1, Kp2, Kp3, Kp4, Kp5, Kp6, Kp7, Kp8, Kp9,
    KpDecimal,
    KpDivide,
    KpMultiply,
    KpSubtract,
    KpAdd,
    KpEnter,
    KpEqual,

    // Modifiers
    LeftShift,
    LeftControl,
    LeftAlt,
    LeftSuper,
    RightShift,
    RightControl,
    RightAlt,
    RightSuper,
    Menu,

    /// Platform key without a named variant.
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyAction {
    Press,
    Release,
    /// Auto-repeat while the key is held.
    Repeat,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Buttons have no repeat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseAction {
    Press,
    Release,
}

bitflags! {
    /// Modifier and lock-key state at the time of an event.
    #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT     = 0x01;
        const CONTROL   = 0x02;
        const ALT       = 0x04;
        const SUPER     = 0x08;
        const CAPS_LOCK = 0x10;
        const NUM_LOCK  = 0x20;
    }
}

impl Modifiers {
    /// The held-modifier bits, without lock state.
    pub const HELD: Modifiers = Modifiers::SHIFT
        .union(Modifiers::CONTROL)
        .union(Modifiers::ALT)
        .union(Modifiers::SUPER);

    pub const LOCKS: Modifiers = Modifiers::CAPS_LOCK.union(Modifiers::NUM_LOCK);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    /// Platform scancode, stable for a given physical key.
    pub code: u32,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub action: MouseAction,
    pub modifiers: Modifiers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_and_lock_masks_partition_all_bits() {
        assert_eq!(Modifiers::HELD | Modifiers::LOCKS, Modifiers::all());
        assert!(Modifiers::HELD.intersection(Modifiers::LOCKS).is_empty());
    }
}
