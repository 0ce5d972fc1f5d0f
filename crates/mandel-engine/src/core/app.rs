use glam::{DVec2, IVec2};

use crate::input::{KeyEvent, MouseEvent};
use crate::window::{ContextHints, Platform, Shell};

use super::ctx::AppCtx;

/// Application contract driven by [`Shell`].
///
/// Every event handler defaults to a no-op, so an application overrides only
/// the ones it reacts to. Handlers run synchronously inside the shell's poll
/// primitive, one at a time, on the thread that owns the window.
pub trait App: Sized {
    /// Window title.
    fn name(&self) -> &str;

    /// Called before the window exists, to adjust the requested context.
    fn pre_init(&mut self, hints: &mut ContextHints) -> anyhow::Result<()> {
        let _ = hints;
        Ok(())
    }

    /// Called once the context is current and GL is loaded.
    fn post_init(&mut self, ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Main loop. Receives the whole shell so it can pump events with
    /// [`Shell::poll_events`] / [`Shell::wait_events`], which call back into
    /// this application's handlers.
    fn run<P: Platform>(shell: &mut Shell<Self, P>) -> anyhow::Result<()>;

    fn key_event(&mut self, ctx: &mut AppCtx<'_>, event: KeyEvent) {
        let _ = (ctx, event);
    }

    fn mouse_event(&mut self, ctx: &mut AppCtx<'_>, event: MouseEvent) {
        let _ = (ctx, event);
    }

    /// Cursor position in window pixels, origin top-left.
    fn cursor_event(&mut self, ctx: &mut AppCtx<'_>, position: DVec2) {
        let _ = (ctx, position);
    }

    /// Scroll offset in lines; `+y` scrolls up.
    fn scroll_event(&mut self, ctx: &mut AppCtx<'_>, offset: DVec2) {
        let _ = (ctx, offset);
    }

    /// New framebuffer size in pixels.
    fn resize_event(&mut self, ctx: &mut AppCtx<'_>, size: IVec2) {
        let _ = (ctx, size);
    }
}
