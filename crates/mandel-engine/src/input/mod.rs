//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Platform backends translate native events into these and feed them to the
//! shell, which dispatches them to the application's handlers.

pub(crate) mod platform;
mod state;
mod types;

pub use state::InputTracker;
pub use types::{Key, KeyAction, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent};
