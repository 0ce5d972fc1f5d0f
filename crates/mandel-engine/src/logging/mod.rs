//! Logging utilities.
//!
//! Logger initialization plus the two diagnostic sinks the shell installs:
//! windowing-subsystem errors and GL debug output both end up in the `log`
//! facade rather than being raised as errors.

#[cfg(test)]
pub(crate) mod capture;
mod init;
mod sinks;

pub use init::{init_logging, LoggingConfig};
pub use sinks::{debug_level, gl_debug_sink, platform_error_hook, GL_TARGET, PLATFORM_TARGET};
