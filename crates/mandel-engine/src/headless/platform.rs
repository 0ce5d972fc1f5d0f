use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::IVec2;

use crate::gl::GlApi;
use crate::window::{
    ContextHints, ErrorHook, ErrorReporter, Platform, PlatformError, PlatformEvent, PollMode,
};

use super::gl::{GlLog, RecordingGl};

/// Platform step a [`HeadlessPlatform`] can be told to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailurePoint {
    Init,
    CreateWindow,
    MakeCurrent,
    LoadGl,
}

/// Window-less [`Platform`] driven by a scripted event queue.
///
/// GL calls go to a [`RecordingGl`] whose log is available before and after
/// the shell takes ownership. A blocking poll on an empty queue sets the
/// close flag instead of blocking, so event-driven main loops terminate once
/// the script runs out.
pub struct HeadlessPlatform {
    errors: ErrorReporter,
    reported: usize,
    fail_at: Option<FailurePoint>,
    gl: Option<RecordingGl>,
    log: GlLog,
    events: VecDeque<PlatformEvent>,
    initialized: bool,
    title: Option<String>,
    hints: Option<ContextHints>,
    size: IVec2,
    current: bool,
    should_close: bool,
    swaps: usize,
    terminated: Rc<Cell<bool>>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::with_gl(RecordingGl::new())
    }

    /// Uses a preconfigured recorder as the context's GL.
    pub fn with_gl(gl: RecordingGl) -> Self {
        Self {
            errors: ErrorReporter::default(),
            reported: 0,
            fail_at: None,
            log: gl.log(),
            gl: Some(gl),
            events: VecDeque::new(),
            initialized: false,
            title: None,
            hints: None,
            size: IVec2::ZERO,
            current: false,
            should_close: false,
            swaps: 0,
            terminated: Rc::new(Cell::new(false)),
        }
    }

    pub fn fail_at(mut self, point: FailurePoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn push_event(&mut self, event: PlatformEvent) {
        self.events.push_back(event);
    }

    pub fn gl_log(&self) -> GlLog {
        self.log.clone()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn hints(&self) -> Option<&ContextHints> {
        self.hints.as_ref()
    }

    pub fn swap_count(&self) -> usize {
        self.swaps
    }

    /// Errors routed through the installed error hook so far.
    pub fn reported_errors(&self) -> usize {
        self.reported
    }

    /// Flag that flips to `true` once `terminate` runs, observable after drop.
    pub fn termination_probe(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.terminated)
    }

    fn report(&mut self, err: PlatformError) -> PlatformError {
        self.reported += 1;
        self.errors.report(err)
    }

    fn check(&mut self, point: FailurePoint, err: impl FnOnce() -> PlatformError) -> Result<(), PlatformError> {
        if self.fail_at == Some(point) {
            return Err(self.report(err()));
        }
        Ok(())
    }
}

impl Platform for HeadlessPlatform {
    fn set_error_hook(&mut self, hook: ErrorHook) {
        self.errors.set(hook);
    }

    fn init(&mut self) -> Result<(), PlatformError> {
        self.check(FailurePoint::Init, || {
            PlatformError::Unavailable("headless init disabled".into())
        })?;
        self.initialized = true;
        Ok(())
    }

    fn create_window(
        &mut self,
        title: &str,
        size: IVec2,
        hints: &ContextHints,
    ) -> Result<(), PlatformError> {
        if !self.initialized {
            return Err(self.report(PlatformError::NotInitialized));
        }
        if self.title.is_some() {
            return Err(self.report(PlatformError::Window("window already exists".into())));
        }
        self.check(FailurePoint::CreateWindow, || {
            PlatformError::Window("headless window creation disabled".into())
        })?;

        self.title = Some(title.to_owned());
        self.hints = Some(hints.clone());
        self.size = size;
        Ok(())
    }

    fn make_current(&mut self) -> Result<(), PlatformError> {
        if self.title.is_none() {
            return Err(self.report(PlatformError::NoWindow));
        }
        self.check(FailurePoint::MakeCurrent, || {
            PlatformError::Context("headless context disabled".into())
        })?;
        self.current = true;
        Ok(())
    }

    fn load_gl(&mut self) -> Result<Box<dyn GlApi>, PlatformError> {
        if !self.current {
            return Err(self.report(PlatformError::Context("no current context".into())));
        }
        self.check(FailurePoint::LoadGl, || {
            PlatformError::Loader("headless loader disabled".into())
        })?;

        match self.gl.take() {
            Some(gl) => Ok(Box::new(gl)),
            None => Err(self.report(PlatformError::Loader("GL already loaded".into()))),
        }
    }

    fn window_size(&self) -> IVec2 {
        self.size
    }

    fn swap_buffers(&mut self) {
        if self.current {
            self.swaps += 1;
        } else {
            self.report(PlatformError::Present("no current context".into()));
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn poll_events(&mut self, mode: PollMode, events: &mut Vec<PlatformEvent>) {
        if self.events.is_empty() && mode == PollMode::Wait {
            log::debug!("headless event script exhausted; closing");
            self.should_close = true;
            return;
        }

        for event in self.events.drain(..) {
            if let PlatformEvent::Resized(size) = event {
                self.size = size;
            }
            events.push(event);
        }
    }

    fn terminate(&mut self) {
        self.current = false;
        self.initialized = false;
        self.terminated.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_before_init_is_reported() {
        let mut platform = HeadlessPlatform::new();
        let err = platform
            .create_window("t", IVec2::new(1, 1), &ContextHints::default())
            .unwrap_err();

        assert_eq!(err, PlatformError::NotInitialized);
        assert_eq!(platform.reported_errors(), 1);
    }

    #[test]
    fn second_window_is_refused() {
        let mut platform = HeadlessPlatform::new();
        platform.init().unwrap();
        platform
            .create_window("first", IVec2::new(8, 8), &ContextHints::default())
            .unwrap();

        let err = platform
            .create_window("second", IVec2::new(16, 16), &ContextHints::default())
            .unwrap_err();

        assert_eq!(err, PlatformError::Window("window already exists".into()));
        assert_eq!(platform.title(), Some("first"));
        assert_eq!(platform.window_size(), IVec2::new(8, 8));
        assert_eq!(platform.reported_errors(), 1);
    }

    #[test]
    fn gl_can_only_be_loaded_once() {
        let mut platform = HeadlessPlatform::new();
        platform.init().unwrap();
        platform
            .create_window("t", IVec2::new(8, 8), &ContextHints::default())
            .unwrap();
        platform.make_current().unwrap();

        assert!(platform.load_gl().is_ok());
        assert!(matches!(platform.load_gl(), Err(PlatformError::Loader(_))));
    }

    #[test]
    fn resize_events_update_window_size() {
        let mut platform = HeadlessPlatform::new();
        platform.push_event(PlatformEvent::Resized(IVec2::new(30, 40)));

        let mut out = Vec::new();
        platform.poll_events(PollMode::Poll, &mut out);

        assert_eq!(out, vec![PlatformEvent::Resized(IVec2::new(30, 40))]);
        assert_eq!(platform.window_size(), IVec2::new(30, 40));
    }

    #[test]
    fn empty_poll_does_not_close_but_empty_wait_does() {
        let mut platform = HeadlessPlatform::new();
        let mut out = Vec::new();

        platform.poll_events(PollMode::Poll, &mut out);
        assert!(!platform.should_close());

        platform.poll_events(PollMode::Wait, &mut out);
        assert!(platform.should_close());
        assert!(out.is_empty());
    }
}
