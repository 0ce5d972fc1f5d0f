use std::num::NonZeroU32;
use std::time::Duration;

use glam::{DVec2, IVec2};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, NotCurrentGlContext,
    PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::gl::{GlApi, GlowApi};
use crate::input::platform::{map_key, map_modifiers, map_mouse_button, scroll_offset};
use crate::input::InputTracker;

use super::platform::{
    ContextHints, ErrorHook, ErrorReporter, Platform, PlatformError, PlatformEvent, PollMode,
};

/// Desktop [`Platform`]: a winit window with a glutin GL context.
///
/// Events are pumped on demand rather than through `EventLoop::run_app`, so
/// the application keeps control of its main loop.
#[derive(Default)]
pub struct WinitPlatform {
    errors: ErrorReporter,
    input: InputTracker,
    size: IVec2,
    vsync: bool,
    should_close: bool,

    // Declaration order is drop order: context before surface before window.
    context: Option<PossiblyCurrentContext>,
    pending_context: Option<NotCurrentContext>,
    surface: Option<Surface<WindowSurface>>,
    config: Option<Config>,
    window: Option<Window>,
    event_loop: Option<EventLoop<()>>,
}

impl WinitPlatform {
    fn try_init(&mut self) -> Result<(), PlatformError> {
        if self.event_loop.is_some() {
            return Ok(());
        }
        let event_loop =
            EventLoop::new().map_err(|e| PlatformError::Unavailable(e.to_string()))?;
        self.event_loop = Some(event_loop);
        Ok(())
    }

    fn try_create_window(
        &mut self,
        title: &str,
        size: IVec2,
        hints: &ContextHints,
    ) -> Result<(), PlatformError> {
        if self.window.is_some() {
            return Err(PlatformError::Window("window already exists".into()));
        }
        let event_loop = self.event_loop.as_ref().ok_or(PlatformError::NotInitialized)?;

        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(size.x.max(1) as u32, size.y.max(1) as u32))
            .with_resizable(hints.resizable);

        let mut template = ConfigTemplateBuilder::new().with_alpha_size(8);
        if hints.samples > 0 {
            template = template.with_multisampling(hints.samples);
        }

        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, pick_config)
            .map_err(|e| PlatformError::Window(e.to_string()))?;
        let window =
            window.ok_or_else(|| PlatformError::Window("display builder returned no window".into()))?;

        let raw = window
            .window_handle()
            .map_err(|e| PlatformError::Window(e.to_string()))?
            .as_raw();

        let (major, minor) = hints.gl_version;
        let profile = if hints.core_profile {
            GlProfile::Core
        } else {
            GlProfile::Compatibility
        };
        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(profile)
            .with_debug(hints.debug)
            .build(Some(raw));

        let display = config.display();

        // SAFETY: `raw` belongs to `window`, which is stored alongside the
        // context and outlives it (see field order).
        let context = unsafe { display.create_context(&config, &context_attrs) }
            .map_err(|e| PlatformError::Context(e.to_string()))?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .map_err(|e| PlatformError::Window(e.to_string()))?;
        // SAFETY: as above, the surface is dropped before the window.
        let surface = unsafe { display.create_window_surface(&config, &surface_attrs) }
            .map_err(|e| PlatformError::Context(e.to_string()))?;

        let inner = window.inner_size();
        log::info!(
            "created window `{title}` {}x{} (GL {major}.{minor}, {} samples)",
            inner.width,
            inner.height,
            config.num_samples()
        );

        self.size = IVec2::new(inner.width as i32, inner.height as i32);
        self.vsync = hints.vsync;
        self.pending_context = Some(context);
        self.surface = Some(surface);
        self.config = Some(config);
        self.window = Some(window);
        Ok(())
    }

    fn try_make_current(&mut self) -> Result<(), PlatformError> {
        if self.context.is_some() {
            return Ok(());
        }
        let surface = self.surface.as_ref().ok_or(PlatformError::NoWindow)?;
        let pending = self.pending_context.take().ok_or(PlatformError::NoWindow)?;

        let context = pending
            .make_current(surface)
            .map_err(|e| PlatformError::Context(e.to_string()))?;

        if self.vsync {
            if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
                log::warn!("failed to enable vsync: {e}");
            }
        }

        self.context = Some(context);
        Ok(())
    }

    fn try_load_gl(&mut self) -> Result<Box<dyn GlApi>, PlatformError> {
        if self.context.is_none() {
            return Err(PlatformError::Context("no current context".into()));
        }
        let display = self.config.as_ref().ok_or(PlatformError::NoWindow)?.display();

        if display.get_proc_address(c"glCreateShader").is_null() {
            return Err(PlatformError::Loader("glCreateShader is not exported".into()));
        }

        // SAFETY: the context is current on this thread and lives until
        // `terminate`, after the shell has dropped every GL user.
        let api = unsafe { GlowApi::from_loader(|name| display.get_proc_address(name)) };
        Ok(Box::new(api))
    }

    fn try_swap_buffers(&mut self) -> Result<(), PlatformError> {
        let (Some(context), Some(surface)) = (self.context.as_ref(), self.surface.as_ref()) else {
            return Err(PlatformError::NoWindow);
        };
        if let Some(window) = self.window.as_ref() {
            window.pre_present_notify();
        }
        surface
            .swap_buffers(context)
            .map_err(|e| PlatformError::Present(e.to_string()))
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    // The picker cannot fail; glutin only calls it with at least one candidate.
    configs
        .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
        .expect("display offered no GL configs")
}

impl Platform for WinitPlatform {
    fn set_error_hook(&mut self, hook: ErrorHook) {
        self.errors.set(hook);
    }

    fn init(&mut self) -> Result<(), PlatformError> {
        self.try_init().map_err(|e| self.errors.report(e))
    }

    fn create_window(
        &mut self,
        title: &str,
        size: IVec2,
        hints: &ContextHints,
    ) -> Result<(), PlatformError> {
        self.try_create_window(title, size, hints)
            .map_err(|e| self.errors.report(e))
    }

    fn make_current(&mut self) -> Result<(), PlatformError> {
        self.try_make_current().map_err(|e| self.errors.report(e))
    }

    fn load_gl(&mut self) -> Result<Box<dyn GlApi>, PlatformError> {
        self.try_load_gl().map_err(|e| self.errors.report(e))
    }

    fn window_size(&self) -> IVec2 {
        self.size
    }

    fn swap_buffers(&mut self) {
        if let Err(e) = self.try_swap_buffers() {
            self.errors.report(e);
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn poll_events(&mut self, mode: PollMode, events: &mut Vec<PlatformEvent>) {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return;
        };

        let timeout = match mode {
            PollMode::Poll => Some(Duration::ZERO),
            PollMode::Wait => None,
            PollMode::WaitTimeout(timeout) => Some(timeout),
        };

        let mut pump = Pump {
            events,
            input: &mut self.input,
            size: &mut self.size,
            surface: self.surface.as_ref(),
            context: self.context.as_ref(),
        };

        if let PumpStatus::Exit(code) = event_loop.pump_app_events(timeout, &mut pump) {
            log::debug!("event loop exited with code {code}");
            self.should_close = true;
        }
    }

    fn terminate(&mut self) {
        if self.event_loop.is_none() {
            return;
        }
        self.context = None;
        self.pending_context = None;
        self.surface = None;
        self.config = None;
        self.window = None;
        self.event_loop = None;
        log::debug!("windowing system shut down");
    }
}

impl Drop for WinitPlatform {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Collects one pump's worth of window events.
struct Pump<'a> {
    events: &'a mut Vec<PlatformEvent>,
    input: &'a mut InputTracker,
    size: &'a mut IVec2,
    surface: Option<&'a Surface<WindowSurface>>,
    context: Option<&'a PossiblyCurrentContext>,
}

impl Pump<'_> {
    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        *self.size = IVec2::new(new_size.width as i32, new_size.height as i32);

        let (Some(surface), Some(context)) = (self.surface, self.context) else {
            return;
        };
        if let (Some(w), Some(h)) = (NonZeroU32::new(new_size.width), NonZeroU32::new(new_size.height)) {
            surface.resize(context, w, h);
        }
    }
}

impl ApplicationHandler for Pump<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let translated = match event {
            WindowEvent::CloseRequested => Some(PlatformEvent::CloseRequested),

            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
                Some(PlatformEvent::Resized(*self.size))
            }

            WindowEvent::ModifiersChanged(m) => {
                self.input.set_held_modifiers(map_modifiers(m.state()));
                None
            }

            WindowEvent::Focused(false) => {
                self.input.focus_lost();
                None
            }

            WindowEvent::CursorMoved { position, .. } => {
                Some(PlatformEvent::CursorMoved(DVec2::new(position.x, position.y)))
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                Some(PlatformEvent::MouseButton(
                    self.input.button(map_mouse_button(button), pressed),
                ))
            }

            WindowEvent::MouseWheel { delta, .. } => Some(PlatformEvent::Scroll(scroll_offset(delta))),

            WindowEvent::KeyboardInput { event, .. } => {
                let (key, code) = map_key(event.physical_key);
                let pressed = event.state == ElementState::Pressed;
                Some(PlatformEvent::Key(self.input.key(key, code, pressed)))
            }

            _ => None,
        };

        if let Some(event) = translated {
            self.events.push(event);
        }
    }
}
