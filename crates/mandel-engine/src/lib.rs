//! Mandel engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the viewer: a
//! thin OpenGL resource layer and an event-driven application shell.

pub mod core;
pub mod gl;
pub mod headless;
pub mod input;
pub mod logging;
pub mod window;
