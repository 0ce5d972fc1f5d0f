//! Display-less backends.
//!
//! [`HeadlessPlatform`] stands in for the windowing system and
//! [`RecordingGl`] for the driver, so the whole shell and every GPU resource
//! can run in tests and on machines without a display.

mod gl;
mod platform;

pub use gl::{recording_gl, GlCall, GlLog, RecordedUniform, RecordingGl};
pub use platform::{FailurePoint, HeadlessPlatform};
