use std::path::{Path, PathBuf};

use glam::{DVec2, IVec2};

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    /// Initial window size in pixels.
    pub size: IVec2,
    /// One directory per shader variant, each holding `vertex.glsl` and
    /// `fragment.glsl`. Cycled in this order.
    pub shader_dirs: Vec<PathBuf>,
    /// Initial pixels per unit.
    pub initial_scale: DVec2,
    pub max_iterations: i32,
    pub iteration_step: i32,
    pub zoom_in: f64,
    pub zoom_out: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let res = Path::new(env!("CARGO_MANIFEST_DIR")).join("res");

        Self {
            title: "Mandelbrot".to_string(),
            size: IVec2::new(1280, 960),
            shader_dirs: (1..=3).map(|i| res.join(format!("shader{i}"))).collect(),
            initial_scale: DVec2::splat(200.0),
            max_iterations: 1000,
            iteration_step: 500,
            zoom_in: 1.1,
            zoom_out: 0.9,
        }
    }
}
