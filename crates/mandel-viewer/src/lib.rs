//! Interactive Mandelbrot viewer.
//!
//! All fractal evaluation happens in the fragment shaders under `res/`; this
//! crate owns the view transform, the input bindings and the redraw policy.

pub mod config;
pub mod cycle;
pub mod view;
pub mod viewer;

pub use config::ViewerConfig;
pub use viewer::Viewer;
