use std::path::Path;

use anyhow::Context;
use glam::{DVec2, IVec2};
use mandel_engine::core::{App, AppCtx};
use mandel_engine::gl::{
    Gl, ShaderBuilder, ShaderProgram, ShaderStage, VertexArray, VertexBuffer, VertexLayout,
};
use mandel_engine::input::{Key, KeyAction, KeyEvent, MouseAction, MouseEvent};
use mandel_engine::window::{Platform, Shell};

use crate::config::ViewerConfig;
use crate::cycle::Cycle;
use crate::view::{Drag, ViewTransform};

/// Two triangles covering clip space.
const QUAD: [f32; 12] = [
    -1.0, 1.0, //
    1.0, 1.0, //
    1.0, -1.0, //
    -1.0, 1.0, //
    -1.0, -1.0, //
    1.0, -1.0, //
];

const U_ONE_OVER_SCALE: &str = "u_one_over_scale";
const U_OFFSET: &str = "u_offset";
const U_MAX_IT: &str = "u_max_it";

/// GPU state built once the context is up.
struct Scene {
    shaders: Cycle<ShaderProgram>,
    vertex_array: VertexArray,
    _quad: VertexBuffer,
}

/// Escape-time fractal viewer.
///
/// Redraws only in response to input: drag to pan, scroll or hold Q/A to
/// zoom around the cursor, Left/Right to switch shaders, Up/Down to change
/// the iteration limit.
pub struct Viewer {
    config: ViewerConfig,
    view: ViewTransform,
    drag: Drag,
    max_iterations: i32,
    scene: Option<Scene>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            view: ViewTransform::new(config.initial_scale),
            drag: Drag::default(),
            max_iterations: config.max_iterations,
            config,
            scene: None,
        }
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn max_iterations(&self) -> i32 {
        self.max_iterations
    }

    /// Index of the active shader; 0 before the scene is loaded.
    pub fn shader_index(&self) -> usize {
        self.scene.as_ref().map_or(0, |s| s.shaders.index())
    }

    fn load_scene(&mut self, ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
        let gl = ctx.gl();

        self.view.center_on_origin(ctx.window_size());

        let quad = VertexBuffer::with_data(gl, &QUAD)?;
        let mut layout = VertexLayout::new();
        layout.push::<f32>(2);

        let vertex_array = VertexArray::new(gl)?;
        vertex_array.add_buffer(&quad, &layout);

        let programs = self
            .config
            .shader_dirs
            .iter()
            .map(|dir| {
                load_program(gl, dir)
                    .with_context(|| format!("failed to build shader in {}", dir.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let shaders = Cycle::new(programs).context("no shader directories configured")?;

        for shader in shaders.iter() {
            shader.bind();
            shader.set_uniform(U_MAX_IT, self.max_iterations);
        }

        log::info!("loaded {} shader variants", shaders.len());

        self.scene = Some(Scene {
            shaders,
            vertex_array,
            _quad: quad,
        });
        Ok(())
    }

    fn redraw(&self, ctx: &mut AppCtx<'_>) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };

        let shader = scene.shaders.current();
        shader.bind();
        shader.set_uniform(U_ONE_OVER_SCALE, self.view.one_over_scale());
        shader.set_uniform(U_OFFSET, self.view.offset);

        scene.vertex_array.bind();

        let gl = ctx.gl();
        gl.clear_color_buffer();
        gl.draw_triangles(0, 6);

        ctx.swap_buffers();
    }

    /// Uploads the iteration limit to the active shader.
    fn push_max_iterations(&self) {
        if let Some(scene) = self.scene.as_ref() {
            let shader = scene.shaders.current();
            shader.bind();
            shader.set_uniform(U_MAX_IT, self.max_iterations);
        }
    }

    fn switch_shader(&mut self, ctx: &mut AppCtx<'_>, forward: bool) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if forward {
            scene.shaders.next();
        } else {
            scene.shaders.prev();
        }
        log::debug!("shader {}", scene.shaders.index());

        self.push_max_iterations();
        self.redraw(ctx);
    }

    fn change_iterations(&mut self, ctx: &mut AppCtx<'_>, increase: bool) {
        let step = self.config.iteration_step;
        self.max_iterations = if increase {
            self.max_iterations.saturating_add(step)
        } else {
            self.max_iterations.saturating_sub(step).max(step)
        };

        self.push_max_iterations();
        self.redraw(ctx);
        log::info!("max_iterations: {}", self.max_iterations);
    }

    fn zoom(&mut self, ctx: &mut AppCtx<'_>, factor: f64) {
        self.view.zoom_at(ctx.mouse_pos(), factor);
        self.redraw(ctx);
    }
}

fn load_program(gl: &Gl, dir: &Path) -> anyhow::Result<ShaderProgram> {
    let mut builder = ShaderBuilder::new(gl);
    builder.add_shader(ShaderStage::Vertex, dir.join("vertex.glsl"))?;
    builder.add_shader(ShaderStage::Fragment, dir.join("fragment.glsl"))?;
    builder.compile_and_link()?;
    Ok(builder.finish()?)
}

impl App for Viewer {
    fn name(&self) -> &str {
        &self.config.title
    }

    fn post_init(&mut self, ctx: &mut AppCtx<'_>) -> anyhow::Result<()> {
        self.load_scene(ctx)
    }

    fn run<P: Platform>(shell: &mut Shell<Self, P>) -> anyhow::Result<()> {
        shell.with_app(|viewer, ctx| viewer.redraw(ctx))?;

        while !shell.should_close() {
            shell.wait_events()?;
        }
        Ok(())
    }

    fn key_event(&mut self, ctx: &mut AppCtx<'_>, event: KeyEvent) {
        match (event.action, event.key) {
            (KeyAction::Press, Key::ArrowRight) => self.switch_shader(ctx, true),
            (KeyAction::Press, Key::ArrowLeft) => self.switch_shader(ctx, false),
            (KeyAction::Press, Key::ArrowUp) => self.change_iterations(ctx, true),
            (KeyAction::Press, Key::ArrowDown) => self.change_iterations(ctx, false),
            (KeyAction::Repeat, Key::Q) => self.zoom(ctx, self.config.zoom_in),
            (KeyAction::Repeat, Key::A) => self.zoom(ctx, self.config.zoom_out),
            _ => {}
        }
    }

    fn mouse_event(&mut self, ctx: &mut AppCtx<'_>, event: MouseEvent) {
        match event.action {
            MouseAction::Press => self.drag.begin(ctx.mouse_pos()),
            MouseAction::Release => self.drag.end(),
        }
    }

    fn cursor_event(&mut self, ctx: &mut AppCtx<'_>, position: DVec2) {
        if let Some(delta) = self.drag.update(position) {
            self.view.pan(delta);
            self.redraw(ctx);
        }
    }

    fn scroll_event(&mut self, ctx: &mut AppCtx<'_>, offset: DVec2) {
        let factor = if offset.y < 0.0 {
            self.config.zoom_out
        } else {
            self.config.zoom_in
        };
        self.zoom(ctx, factor);
    }

    fn resize_event(&mut self, ctx: &mut AppCtx<'_>, size: IVec2) {
        ctx.gl().viewport(0, 0, size.x, size.y);
        self.redraw(ctx);
    }
}
