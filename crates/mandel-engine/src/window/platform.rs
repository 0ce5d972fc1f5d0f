use std::fmt;
use std::time::Duration;

use glam::{DVec2, IVec2};
use thiserror::Error;

use crate::gl::GlApi;
use crate::input::{KeyEvent, MouseEvent};

/// Windowing-subsystem failure.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum PlatformError {
    #[error("windowing system unavailable: {0}")]
    Unavailable(String),

    #[error("windowing system not initialized")]
    NotInitialized,

    #[error("no window has been created")]
    NoWindow,

    #[error("window creation failed: {0}")]
    Window(String),

    #[error("graphics context error: {0}")]
    Context(String),

    #[error("failed to load GL entry points: {0}")]
    Loader(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}

/// Receives every error the platform produces, as it happens.
pub type ErrorHook = Box<dyn FnMut(&PlatformError) + 'static>;

/// Holds the installed [`ErrorHook`] and routes failures through it.
#[derive(Default)]
pub struct ErrorReporter {
    hook: Option<ErrorHook>,
}

impl ErrorReporter {
    pub fn set(&mut self, hook: ErrorHook) {
        self.hook = Some(hook);
    }

    /// Hands `err` to the hook and returns it for propagation.
    pub fn report(&mut self, err: PlatformError) -> PlatformError {
        if let Some(hook) = self.hook.as_mut() {
            hook(&err);
        }
        err
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("installed", &self.hook.is_some())
            .finish()
    }
}

/// Capabilities requested for the window and its GL context.
///
/// Filled with defaults by the shell, then handed to the application's
/// `pre_init` hook before the window exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextHints {
    /// Requested `(major, minor)` GL version.
    pub gl_version: (u8, u8),
    pub core_profile: bool,
    /// Request a debug context so debug output is delivered.
    pub debug: bool,
    pub vsync: bool,
    pub resizable: bool,
    /// MSAA sample count; 0 disables multisampling.
    pub samples: u8,
}

impl Default for ContextHints {
    fn default() -> Self {
        Self {
            gl_version: (4, 1),
            core_profile: true,
            debug: true,
            vsync: true,
            resizable: true,
            samples: 0,
        }
    }
}

/// How long [`Platform::poll_events`] may block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PollMode {
    /// Return immediately with whatever is queued.
    Poll,
    /// Block until at least one event is available.
    Wait,
    /// Block until an event arrives or the timeout elapses.
    WaitTimeout(Duration),
}

/// A discrete occurrence delivered by the windowing subsystem.
///
/// Positions and sizes are in physical window pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlatformEvent {
    Key(KeyEvent),
    MouseButton(MouseEvent),
    CursorMoved(DVec2),
    /// Scroll offset in lines.
    Scroll(DVec2),
    Resized(IVec2),
    CloseRequested,
}

/// Windowing and GL-context backend driven by the shell.
///
/// One window per platform instance. Methods other than `set_error_hook`,
/// `init` and `terminate` require a successful `init`; window and context
/// methods require a successful `create_window`.
pub trait Platform {
    /// Installs the receiver for every subsequent platform error.
    fn set_error_hook(&mut self, hook: ErrorHook);

    fn init(&mut self) -> Result<(), PlatformError>;

    /// Creates the single window and its GL context. Fails if a window
    /// already exists.
    fn create_window(
        &mut self,
        title: &str,
        size: IVec2,
        hints: &ContextHints,
    ) -> Result<(), PlatformError>;

    /// Makes the window's GL context current on the calling thread.
    fn make_current(&mut self) -> Result<(), PlatformError>;

    /// Resolves the GL entry points of the current context.
    fn load_gl(&mut self) -> Result<Box<dyn GlApi>, PlatformError>;

    /// Framebuffer size in pixels.
    fn window_size(&self) -> IVec2;

    /// Presents the back buffer. Failures go to the error hook.
    fn swap_buffers(&mut self);

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, value: bool);

    /// Appends every pending event to `events`, in arrival order.
    fn poll_events(&mut self, mode: PollMode, events: &mut Vec<PlatformEvent>);

    /// Destroys the window and shuts the subsystem down. Safe to call twice.
    fn terminate(&mut self);
}
