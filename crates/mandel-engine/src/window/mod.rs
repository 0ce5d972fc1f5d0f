//! Window, GL context and the application shell.
//!
//! [`Shell`] owns one window through a [`Platform`] backend and drives an
//! [`App`](crate::core::App). [`WinitPlatform`] is the desktop backend;
//! [`crate::headless::HeadlessPlatform`] runs without a display.

mod platform;
mod shell;
mod winit_platform;

pub use platform::{
    ContextHints, ErrorHook, ErrorReporter, Platform, PlatformError, PlatformEvent, PollMode,
};
pub use shell::{Shell, ShellError, ShellState};
pub use winit_platform::WinitPlatform;
