//! Core engine-facing contracts.
//!
//! This module defines the interface between the shell (window, context and
//! event pump) and the application built on top of it. Handlers see the shell
//! only through [`AppCtx`].

mod app;
mod ctx;

pub use app::App;
pub use ctx::AppCtx;
