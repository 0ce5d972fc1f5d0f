use log::Level;

use crate::gl::{DebugMessage, DebugSeverity, DebugSink};
use crate::window::{ErrorHook, PlatformError};

pub const PLATFORM_TARGET: &str = "mandel::platform";
pub const GL_TARGET: &str = "mandel::gl";

/// Error hook that logs every windowing-subsystem error.
pub fn platform_error_hook() -> ErrorHook {
    Box::new(|err: &PlatformError| {
        log::error!(target: PLATFORM_TARGET, "{err}");
    })
}

/// Debug-output sink that logs driver messages at a level matching their severity.
pub fn gl_debug_sink() -> DebugSink {
    Box::new(|msg: &DebugMessage| {
        log::log!(
            target: GL_TARGET,
            debug_level(msg.severity),
            "[source {:#x}, type {:#x}, id {}] {}",
            msg.source,
            msg.kind,
            msg.id,
            msg.text.trim_end()
        );
    })
}

pub fn debug_level(severity: DebugSeverity) -> Level {
    match severity {
        DebugSeverity::High => Level::Error,
        DebugSeverity::Medium => Level::Warn,
        DebugSeverity::Low => Level::Info,
        DebugSeverity::Notification => Level::Debug,
    }
}
