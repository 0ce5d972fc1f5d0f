use std::time::Duration;

use glam::{DVec2, IVec2};
use thiserror::Error;

use crate::core::{App, AppCtx};
use crate::gl::Gl;
use crate::logging;

use super::platform::{ContextHints, Platform, PlatformError, PlatformEvent, PollMode};
use super::winit_platform::WinitPlatform;

/// Lifecycle of a [`Shell`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShellState {
    Uninitialized,
    Initialized,
    Running,
    Terminated,
}

/// Startup failure. Every variant is fatal to [`Shell::init`].
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to initialize the windowing system")]
    Platform(#[source] PlatformError),

    #[error("failed to create the window")]
    WindowCreation(#[source] PlatformError),

    #[error("failed to make the GL context current")]
    Context(#[source] PlatformError),

    #[error("failed to load GL")]
    GlLoad(#[source] PlatformError),

    #[error("pre-init hook failed: {0:#}")]
    PreInit(anyhow::Error),

    #[error("post-init hook failed: {0:#}")]
    PostInit(anyhow::Error),

    #[error("cannot {operation} while the shell is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ShellState,
    },
}

/// Owns the window, its GL context and the application, and routes platform
/// events to the application's handlers.
///
/// Field order matters: the application (and every GPU resource it owns) is
/// dropped while the context is still alive, then the platform is torn down.
pub struct Shell<A: App, P: Platform = WinitPlatform> {
    app: A,
    ctx: ShellCtx<P>,
}

struct ShellCtx<P: Platform> {
    platform: P,
    gl: Option<Gl>,
    state: ShellState,
    cursor: DVec2,
    events: Vec<PlatformEvent>,
}

impl<P: Platform> Drop for ShellCtx<P> {
    fn drop(&mut self) {
        if let Some(gl) = self.gl.take() {
            gl.mark_lost();
        }
        self.platform.terminate();
    }
}

impl<A: App, P: Platform> Shell<A, P> {
    pub fn new(app: A, platform: P) -> Self {
        Self {
            app,
            ctx: ShellCtx {
                platform,
                gl: None,
                state: ShellState::Uninitialized,
                cursor: DVec2::ZERO,
                events: Vec::new(),
            },
        }
    }

    /// Brings up the windowing system, the window and its GL context, then
    /// hands control to the application's init hooks.
    ///
    /// On failure the state stays [`ShellState::Uninitialized`].
    pub fn init(&mut self, width: i32, height: i32) -> Result<(), ShellError> {
        self.expect_state("init", ShellState::Uninitialized)?;

        let cursor = self.ctx.cursor;
        let platform = &mut self.ctx.platform;

        platform.set_error_hook(logging::platform_error_hook());
        platform.init().map_err(ShellError::Platform)?;

        let mut hints = ContextHints::default();
        self.app.pre_init(&mut hints).map_err(ShellError::PreInit)?;

        let size = IVec2::new(width, height);
        platform
            .create_window(self.app.name(), size, &hints)
            .map_err(ShellError::WindowCreation)?;
        platform.make_current().map_err(ShellError::Context)?;

        let mut api = platform.load_gl().map_err(ShellError::GlLoad)?;
        if hints.debug && !api.enable_debug_output(logging::gl_debug_sink()) {
            log::warn!("GL debug output is not supported by this context");
        }
        let gl = Gl::new(api);

        let mut ctx = AppCtx {
            gl: &gl,
            platform,
            cursor,
        };
        self.app.post_init(&mut ctx).map_err(ShellError::PostInit)?;

        self.ctx.gl = Some(gl);
        self.ctx.state = ShellState::Initialized;

        log::info!("initialized `{}` at {}x{}", self.app.name(), width, height);
        Ok(())
    }

    /// Runs the application's main loop to completion.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.expect_state("run", ShellState::Initialized)?;

        self.ctx.state = ShellState::Running;
        let result = A::run(self);
        self.ctx.state = ShellState::Terminated;

        log::debug!("main loop finished");
        result
    }

    /// Dispatches every queued event without blocking.
    pub fn poll_events(&mut self) -> Result<(), ShellError> {
        self.pump(PollMode::Poll)
    }

    /// Blocks until at least one event arrives, then dispatches all queued ones.
    pub fn wait_events(&mut self) -> Result<(), ShellError> {
        self.pump(PollMode::Wait)
    }

    pub fn wait_events_timeout(&mut self, timeout: Duration) -> Result<(), ShellError> {
        self.pump(PollMode::WaitTimeout(timeout))
    }

    fn pump(&mut self, mode: PollMode) -> Result<(), ShellError> {
        self.expect_ready("poll events")?;

        let mut events = std::mem::take(&mut self.ctx.events);
        self.ctx.platform.poll_events(mode, &mut events);

        for event in events.drain(..) {
            self.dispatch(event);
        }

        self.ctx.events = events;
        Ok(())
    }

    fn dispatch(&mut self, event: PlatformEvent) {
        if let PlatformEvent::CursorMoved(position) = event {
            self.ctx.cursor = position;
        }

        let platform = &mut self.ctx.platform;
        let Some(gl) = self.ctx.gl.as_ref() else {
            return;
        };

        let mut ctx = AppCtx {
            gl,
            platform,
            cursor: self.ctx.cursor,
        };

        match event {
            PlatformEvent::Key(e) => self.app.key_event(&mut ctx, e),
            PlatformEvent::MouseButton(e) => self.app.mouse_event(&mut ctx, e),
            PlatformEvent::CursorMoved(position) => self.app.cursor_event(&mut ctx, position),
            PlatformEvent::Scroll(offset) => self.app.scroll_event(&mut ctx, offset),
            PlatformEvent::Resized(size) => self.app.resize_event(&mut ctx, size),
            PlatformEvent::CloseRequested => ctx.set_should_close(),
        }
    }

    /// Calls `f` with the application and a callback context, outside of any
    /// event. Used by main loops for work such as the first draw.
    pub fn with_app<R>(
        &mut self,
        f: impl FnOnce(&mut A, &mut AppCtx<'_>) -> R,
    ) -> Result<R, ShellError> {
        const OPERATION: &str = "access the GL context";
        self.expect_ready(OPERATION)?;

        let state = self.ctx.state;
        let cursor = self.ctx.cursor;
        let platform = &mut self.ctx.platform;
        let Some(gl) = self.ctx.gl.as_ref() else {
            return Err(ShellError::InvalidState {
                operation: OPERATION,
                state,
            });
        };

        let mut ctx = AppCtx {
            gl,
            platform,
            cursor,
        };
        Ok(f(&mut self.app, &mut ctx))
    }

    fn expect_state(&self, operation: &'static str, expected: ShellState) -> Result<(), ShellError> {
        if self.ctx.state == expected {
            Ok(())
        } else {
            Err(ShellError::InvalidState {
                operation,
                state: self.ctx.state,
            })
        }
    }

    fn expect_ready(&self, operation: &'static str) -> Result<(), ShellError> {
        match self.ctx.state {
            ShellState::Initialized | ShellState::Running => Ok(()),
            state => Err(ShellError::InvalidState { operation, state }),
        }
    }

    pub fn state(&self) -> ShellState {
        self.ctx.state
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    pub fn platform(&self) -> &P {
        &self.ctx.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.ctx.platform
    }

    /// GL handle; `None` before a successful [`init`](Self::init).
    pub fn gl(&self) -> Option<&Gl> {
        self.ctx.gl.as_ref()
    }

    pub fn window_size(&self) -> IVec2 {
        self.ctx.platform.window_size()
    }

    /// Last cursor position reported by the platform, in window pixels.
    pub fn mouse_pos(&self) -> DVec2 {
        self.ctx.cursor
    }

    pub fn should_close(&self) -> bool {
        self.ctx.platform.should_close()
    }

    pub fn set_should_close(&mut self, value: bool) {
        self.ctx.platform.set_should_close(value);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::gl::{DebugMessage, DebugSeverity, VertexBuffer};
    use crate::headless::{FailurePoint, GlCall, HeadlessPlatform};
    use crate::input::{Key, KeyAction, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent};
    use crate::logging::capture;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        PreInit,
        PostInit(IVec2),
        Key(KeyEvent),
        Mouse(MouseEvent, DVec2),
        Cursor(DVec2),
        Scroll(DVec2),
        Resize(IVec2),
    }

    #[derive(Default)]
    struct Probe {
        seen: Rc<RefCell<Vec<Seen>>>,
        fail_pre_init: bool,
        samples: u8,
        buffer: Option<VertexBuffer>,
    }

    impl App for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn pre_init(&mut self, hints: &mut ContextHints) -> anyhow::Result<()> {
            self.seen.borrow_mut().push(Seen::PreInit);
            if self.fail_pre_init {
                anyhow::bail!("refusing");
            }
            hints.samples = self.samples;
            Ok(())
        }

        fn post_init(&mut self, ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
            self.seen.borrow_mut().push(Seen::PostInit(ctx.window_size()));
            self.buffer = Some(VertexBuffer::with_data(ctx.gl(), &[0.0f32; 4])?);
            Ok(())
        }

        fn run<P: Platform>(shell: &mut Shell<Self, P>) -> anyhow::Result<()> {
            while !shell.should_close() {
                shell.wait_events()?;
            }
            Ok(())
        }

        fn key_event(&mut self, ctx: &mut AppCtx<'_>, event: KeyEvent) {
            self.seen.borrow_mut().push(Seen::Key(event));
            if event.key == Key::Escape {
                ctx.set_should_close();
            }
        }

        fn mouse_event(&mut self, ctx: &mut AppCtx<'_>, event: MouseEvent) {
            self.seen.borrow_mut().push(Seen::Mouse(event, ctx.mouse_pos()));
        }

        fn cursor_event(&mut self, _ctx: &mut AppCtx<'_>, position: DVec2) {
            self.seen.borrow_mut().push(Seen::Cursor(position));
        }

        fn scroll_event(&mut self, _ctx: &mut AppCtx<'_>, offset: DVec2) {
            self.seen.borrow_mut().push(Seen::Scroll(offset));
        }

        fn resize_event(&mut self, _ctx: &mut AppCtx<'_>, size: IVec2) {
            self.seen.borrow_mut().push(Seen::Resize(size));
        }
    }

    fn key(key: Key, action: KeyAction) -> PlatformEvent {
        PlatformEvent::Key(KeyEvent {
            key,
            code: 0,
            action,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn init_runs_hooks_in_order_and_becomes_initialized() {
        let probe = Probe { samples: 4, ..Probe::default() };
        let seen = Rc::clone(&probe.seen);
        let mut shell = Shell::new(probe, HeadlessPlatform::new());

        shell.init(800, 600).unwrap();

        assert_eq!(shell.state(), ShellState::Initialized);
        assert_eq!(*seen.borrow(), vec![Seen::PreInit, Seen::PostInit(IVec2::new(800, 600))]);
        assert_eq!(shell.platform().title(), Some("probe"));
        assert_eq!(shell.platform().hints().map(|h| h.samples), Some(4));
        assert!(shell.platform().gl_log().contains(&GlCall::EnableDebugOutput));
    }

    #[test]
    fn failed_window_creation_keeps_shell_uninitialized() {
        let platform = HeadlessPlatform::new().fail_at(FailurePoint::CreateWindow);
        let mut shell = Shell::new(Probe::default(), platform);

        let err = shell.init(800, 600).unwrap_err();

        assert!(matches!(err, ShellError::WindowCreation(_)));
        assert_eq!(shell.state(), ShellState::Uninitialized);
        assert!(shell.gl().is_none());
        assert_eq!(shell.platform().reported_errors(), 1);
    }

    #[test]
    fn retried_init_does_not_build_a_second_window() {
        let platform = HeadlessPlatform::new().fail_at(FailurePoint::MakeCurrent);
        let mut shell = Shell::new(Probe::default(), platform);

        assert!(matches!(shell.init(800, 600), Err(ShellError::Context(_))));
        let err = shell.init(800, 600).unwrap_err();

        assert!(matches!(
            err,
            ShellError::WindowCreation(PlatformError::Window(ref msg)) if msg == "window already exists"
        ));
        assert_eq!(shell.state(), ShellState::Uninitialized);
        assert_eq!(shell.platform().reported_errors(), 2);
    }

    #[test]
    fn each_failure_point_maps_to_its_error() {
        let cases = [
            (FailurePoint::Init, "Platform"),
            (FailurePoint::MakeCurrent, "Context"),
            (FailurePoint::LoadGl, "GlLoad"),
        ];

        for (point, expected) in cases {
            let mut shell = Shell::new(Probe::default(), HeadlessPlatform::new().fail_at(point));
            let err = shell.init(800, 600).unwrap_err();
            let name = match err {
                ShellError::Platform(_) => "Platform",
                ShellError::Context(_) => "Context",
                ShellError::GlLoad(_) => "GlLoad",
                _ => "other",
            };
            assert_eq!(name, expected, "{point:?}");
        }
    }

    #[test]
    fn pre_init_failure_stops_before_window() {
        let probe = Probe { fail_pre_init: true, ..Probe::default() };
        let mut shell = Shell::new(probe, HeadlessPlatform::new());

        let err = shell.init(800, 600).unwrap_err();

        assert!(matches!(err, ShellError::PreInit(_)));
        assert!(err.to_string().contains("refusing"));
        assert_eq!(shell.platform().title(), None);
    }

    #[test]
    fn init_twice_is_rejected() {
        let mut shell = Shell::new(Probe::default(), HeadlessPlatform::new());
        shell.init(800, 600).unwrap();

        assert!(matches!(
            shell.init(800, 600),
            Err(ShellError::InvalidState { state: ShellState::Initialized, .. })
        ));
    }

    #[test]
    fn polling_before_init_is_rejected() {
        let mut shell = Shell::new(Probe::default(), HeadlessPlatform::new());
        assert!(matches!(shell.poll_events(), Err(ShellError::InvalidState { .. })));
        assert!(shell.run().is_err());
    }

    #[test]
    fn events_reach_matching_handlers_in_order() {
        let probe = Probe::default();
        let seen = Rc::clone(&probe.seen);
        let mut shell = Shell::new(probe, HeadlessPlatform::new());
        shell.init(800, 600).unwrap();
        seen.borrow_mut().clear();

        let press = MouseEvent {
            button: MouseButton::Left,
            action: MouseAction::Press,
            modifiers: Modifiers::empty(),
        };

        let platform = shell.platform_mut();
        platform.push_event(PlatformEvent::CursorMoved(DVec2::new(10.0, 20.0)));
        platform.push_event(PlatformEvent::MouseButton(press));
        platform.push_event(PlatformEvent::Scroll(DVec2::new(0.0, -1.0)));
        platform.push_event(PlatformEvent::Resized(IVec2::new(400, 300)));
        platform.push_event(key(Key::A, KeyAction::Repeat));

        shell.poll_events().unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::Cursor(DVec2::new(10.0, 20.0)),
                Seen::Mouse(press, DVec2::new(10.0, 20.0)),
                Seen::Scroll(DVec2::new(0.0, -1.0)),
                Seen::Resize(IVec2::new(400, 300)),
                Seen::Key(KeyEvent {
                    key: Key::A,
                    code: 0,
                    action: KeyAction::Repeat,
                    modifiers: Modifiers::empty(),
                }),
            ]
        );
        assert_eq!(shell.mouse_pos(), DVec2::new(10.0, 20.0));
        assert_eq!(shell.window_size(), IVec2::new(400, 300));
    }

    #[test]
    fn close_request_sets_flag_without_dispatch() {
        let probe = Probe::default();
        let seen = Rc::clone(&probe.seen);
        let mut shell = Shell::new(probe, HeadlessPlatform::new());
        shell.init(800, 600).unwrap();
        seen.borrow_mut().clear();

        shell.platform_mut().push_event(PlatformEvent::CloseRequested);
        shell.poll_events().unwrap();

        assert!(shell.should_close());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn run_loops_until_handler_requests_close() {
        let probe = Probe::default();
        let seen = Rc::clone(&probe.seen);
        let mut shell = Shell::new(probe, HeadlessPlatform::new());
        shell.init(800, 600).unwrap();

        shell.platform_mut().push_event(key(Key::Space, KeyAction::Press));
        shell.platform_mut().push_event(key(Key::Escape, KeyAction::Press));
        shell.platform_mut().push_event(key(Key::B, KeyAction::Press));

        shell.run().unwrap();

        assert_eq!(shell.state(), ShellState::Terminated);
        let keys = seen
            .borrow()
            .iter()
            .filter(|s| matches!(s, Seen::Key(_)))
            .count();
        assert_eq!(keys, 3);
        assert!(matches!(shell.run(), Err(_)));
    }

    #[test]
    fn with_app_exposes_live_context() {
        let mut shell = Shell::new(Probe::default(), HeadlessPlatform::new());
        assert!(shell.with_app(|_, _| ()).is_err());

        shell.init(640, 480).unwrap();
        let size = shell.with_app(|_, ctx| {
            ctx.swap_buffers();
            ctx.window_size()
        });

        assert_eq!(size.unwrap(), IVec2::new(640, 480));
        assert_eq!(shell.platform().swap_count(), 1);
    }

    #[test]
    fn gl_debug_messages_are_routed_to_sink() {
        let mut shell = Shell::new(Probe::default(), HeadlessPlatform::new());
        shell.init(800, 600).unwrap();
        capture::start();

        let delivered = shell.platform().gl_log().emit_debug(&DebugMessage {
            source: 0x8246,
            kind: 0x824c,
            id: 1,
            severity: DebugSeverity::High,
            text: "GL_INVALID_OPERATION".into(),
        });

        assert!(delivered);
        let records: Vec<_> = capture::take()
            .into_iter()
            .filter(|r| r.target == logging::GL_TARGET)
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, log::Level::Error);
        assert!(records[0].message.contains("GL_INVALID_OPERATION"));
    }

    #[test]
    fn drop_releases_app_resources_then_terminates() {
        let platform = HeadlessPlatform::new();
        let log = platform.gl_log();
        let terminated = platform.termination_probe();

        let mut shell = Shell::new(Probe::default(), platform);
        shell.init(800, 600).unwrap();
        drop(shell);

        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 1);
        assert!(terminated.get());
    }

    #[test]
    fn resources_outliving_shell_skip_gpu_calls() {
        let platform = HeadlessPlatform::new();
        let log = platform.gl_log();

        let mut shell = Shell::new(Probe::default(), platform);
        shell.init(800, 600).unwrap();
        let leaked = shell.app_mut().buffer.take().unwrap();
        drop(shell);
        drop(leaked);

        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 0);
    }
}
