use glam::{DVec2, IVec2};

use crate::gl::Gl;
use crate::window::Platform;

/// Handles available to application callbacks.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
pub struct AppCtx<'a> {
    pub(crate) gl: &'a Gl,
    pub(crate) platform: &'a mut dyn Platform,
    pub(crate) cursor: DVec2,
}

impl<'a> AppCtx<'a> {
    /// GL handle of the window's context. Current for the whole callback.
    pub fn gl(&self) -> &Gl {
        self.gl
    }

    /// Framebuffer size in pixels.
    pub fn window_size(&self) -> IVec2 {
        self.platform.window_size()
    }

    /// Cursor position in window pixels as of the event being handled.
    pub fn mouse_pos(&self) -> DVec2 {
        self.cursor
    }

    /// Presents the frame drawn so far.
    pub fn swap_buffers(&mut self) {
        self.platform.swap_buffers();
    }

    pub fn should_close(&self) -> bool {
        self.platform.should_close()
    }

    /// Asks the main loop to stop after the current iteration.
    pub fn set_should_close(&mut self) {
        self.platform.set_should_close(true);
    }
}
