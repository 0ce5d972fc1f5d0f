//! Backend-specific translation into [`crate::input`] types.

mod winit;

pub(crate) use self::winit::{map_key, map_modifiers, map_mouse_button, scroll_offset};
