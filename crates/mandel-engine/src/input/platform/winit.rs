use glam::DVec2;
use winit::event::{MouseButton as WinitMouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, ModifiersState, NativeKeyCode, PhysicalKey};

use crate::input::{Key, Modifiers, MouseButton};

/// Pixel-precise scroll (touchpads) is reported in pixels; line-based wheels
/// in lines. Handlers receive lines.
const PIXELS_PER_LINE: f64 = 20.0;

pub(crate) fn map_modifiers(m: ModifiersState) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, m.shift_key());
    out.set(Modifiers::CONTROL, m.control_key());
    out.set(Modifiers::ALT, m.alt_key());
    out.set(Modifiers::SUPER, m.super_key());
    out
}

pub(crate) fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Scroll offset in lines, `+y` away from the user.
pub(crate) fn scroll_offset(delta: MouseScrollDelta) -> DVec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => DVec2::new(x as f64, y as f64),
        MouseScrollDelta::PixelDelta(p) => DVec2::new(p.x, p.y) / PIXELS_PER_LINE,
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> (Key, u32) {
    match pk {
        PhysicalKey::Code(code) => (map_key_code(code), code as u32),
        PhysicalKey::Unidentified(native) => {
            let code = match native {
                NativeKeyCode::Xkb(c) | NativeKeyCode::Android(c) => c,
                NativeKeyCode::Windows(c) | NativeKeyCode::MacOS(c) => c as u32,
                NativeKeyCode::Unidentified => 0,
            };
            (Key::Unknown(code), code)
        }
    }
}

fn map_key_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Space => Key::Space,
        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Comma => Key::Comma,
        KeyCode::Minus => Key::Minus,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,
        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Equal => Key::Equal,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::BracketLeft => Key::LeftBracket,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::BracketRight => Key::RightBracket,
        KeyCode::Backquote => Key::GraveAccent,
        KeyCode::IntlBackslash => Key::World1,
        KeyCode::IntlRo => Key::World2,

        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::ScrollLock => Key::ScrollLock,
        KeyCode::NumLock => Key::NumLock,
        KeyCode::PrintScreen => Key::PrintScreen,
        KeyCode::Pause => Key::Pause,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,
        KeyCode::F13 => Key::F13,
        KeyCode::F14 => Key::F14,
        KeyCode::F15 => Key::F15,
        KeyCode::F16 => Key::F16,
        KeyCode::F17 => Key::F17,
        KeyCode::F18 => Key::F18,
        KeyCode::F19 => Key::F19,
        KeyCode::F20 => Key::F20,
        KeyCode::F21 => Key::F21,
        KeyCode::F22 => Key::F22,
        KeyCode::F23 => Key::F23,
        KeyCode::F24 => Key::F24,
        KeyCode::F25 => Key::F25,

        KeyCode::Numpad0 => Key::Kp0,
        KeyCode::Numpad1 => Key::Kp1,
        KeyCode::Numpad2 => Key::Kp2,
        KeyCode::Numpad3 => Key::Kp3,
        KeyCode::Numpad4 => Key::Kp4,
        KeyCode::Numpad5 => Key::Kp5,
        KeyCode::Numpad6 => Key::Kp6,
        KeyCode::Numpad7 => Key::Kp7,
        KeyCode::Numpad8 => Key::Kp8,
        KeyCode::Numpad9 => Key::Kp9,
        KeyCode::NumpadDecimal => Key::KpDecimal,
        KeyCode::NumpadDivide => Key::KpDivide,
        KeyCode::NumpadMultiply => Key::KpMultiply,
        KeyCode::NumpadSubtract => Key::KpSubtract,
        KeyCode::NumpadAdd => Key::KpAdd,
        KeyCode::NumpadEnter => Key::KpEnter,
        KeyCode::NumpadEqual => Key::KpEqual,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlRight => Key::RightControl,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperRight => Key::RightSuper,
        KeyCode::ContextMenu => Key::Menu,

        other => Key::Unknown(other as u32),
    }
}
