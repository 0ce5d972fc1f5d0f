use std::ffi::{c_void, CStr};
use std::num::NonZeroU32;

use glow::HasContext;

use super::api::{
    Components, DebugMessage, DebugSeverity, DebugSink, GlApi, ObjectId, ScalarType, ShaderStage,
    UniformData, UniformLocation,
};

/// `glUniform{1,2,3,4}dv`.
type UniformDv = unsafe extern "system" fn(location: i32, count: i32, value: *const f64);

/// Double-precision uniform setters (`ARB_gpu_shader_fp64`, core in 4.0).
///
/// `glow` exposes no f64 uniform calls, so these are resolved separately
/// through the same loader.
#[derive(Debug, Clone, Copy)]
struct DoubleUniforms {
    entries: [Option<UniformDv>; 4],
}

impl DoubleUniforms {
    const NAMES: [&'static CStr; 4] = [
        c"glUniform1dv",
        c"glUniform2dv",
        c"glUniform3dv",
        c"glUniform4dv",
    ];

    /// # Safety
    /// Non-null pointers returned by `loader` for these names must have the
    /// `glUniformNdv` signature.
    unsafe fn load(loader: &mut impl FnMut(&CStr) -> *const c_void) -> Self {
        let mut entries = [None; 4];
        for (slot, name) in entries.iter_mut().zip(Self::NAMES) {
            let ptr = loader(name);
            if ptr.is_null() {
                log::warn!(
                    "{} unavailable; double uniforms will not upload",
                    name.to_string_lossy()
                );
                continue;
            }
            *slot = Some(unsafe { std::mem::transmute::<*const c_void, UniformDv>(ptr) });
        }
        Self { entries }
    }

    fn entry(&self, components: Components) -> Option<UniformDv> {
        self.entries[components.count() - 1]
    }

    /// # Safety
    /// The context the entries were loaded from must be current.
    unsafe fn upload(&self, location: UniformLocation, components: Components, values: &[f64]) {
        let count = values.len() / components.count();
        if count == 0 {
            return;
        }

        match self.entry(components) {
            Some(f) => unsafe { f(location.0 as i32, count as i32, values.as_ptr()) },
            None => log::debug!("skipped dvec{} upload: entry point missing", components.count()),
        }
    }
}

/// [`GlApi`] backed by a loaded `glow` context.
pub struct GlowApi {
    gl: glow::Context,
    doubles: DoubleUniforms,
}

impl GlowApi {
    /// Loads every GL entry point through `loader`.
    ///
    /// # Safety
    /// The context the loader resolves against must be current on this thread
    /// and must outlive the returned value.
    pub unsafe fn from_loader(mut loader: impl FnMut(&CStr) -> *const c_void) -> Self {
        let doubles = unsafe { DoubleUniforms::load(&mut loader) };
        let gl = unsafe { glow::Context::from_loader_function_cstr(loader) };
        log::debug!("loaded GL {:?}", gl.version());
        Self { gl, doubles }
    }
}

fn object(id: ObjectId) -> Option<NonZeroU32> {
    NonZeroU32::new(id)
}

fn buffer(id: ObjectId) -> Option<glow::NativeBuffer> {
    object(id).map(glow::NativeBuffer)
}

fn vertex_array(id: ObjectId) -> Option<glow::NativeVertexArray> {
    object(id).map(glow::NativeVertexArray)
}

fn shader(id: ObjectId) -> Option<glow::NativeShader> {
    object(id).map(glow::NativeShader)
}

fn program(id: ObjectId) -> Option<glow::NativeProgram> {
    object(id).map(glow::NativeProgram)
}

fn scalar_enum(scalar: ScalarType) -> u32 {
    match scalar {
        ScalarType::F32 => glow::FLOAT,
        ScalarType::F64 => glow::DOUBLE,
        ScalarType::I32 => glow::INT,
        ScalarType::U32 => glow::UNSIGNED_INT,
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn severity(raw: u32) -> DebugSeverity {
    match raw {
        glow::DEBUG_SEVERITY_HIGH => DebugSeverity::High,
        glow::DEBUG_SEVERITY_MEDIUM => DebugSeverity::Medium,
        glow::DEBUG_SEVERITY_LOW => DebugSeverity::Low,
        _ => DebugSeverity::Notification,
    }
}

// SAFETY (all methods below): `from_loader` requires the context to stay
// current on this thread for the lifetime of `self`, and every object name
// passed in was produced by this same context.
impl GlApi for GlowApi {
    fn create_buffer(&self) -> Result<ObjectId, String> {
        unsafe { self.gl.create_buffer() }.map(|b| b.0.get())
    }

    fn bind_array_buffer(&self, id: Option<ObjectId>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, id.and_then(buffer)) }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, id: ObjectId) {
        if let Some(b) = buffer(id) {
            unsafe { self.gl.delete_buffer(b) }
        }
    }

    fn create_vertex_array(&self) -> Result<ObjectId, String> {
        unsafe { self.gl.create_vertex_array() }.map(|a| a.0.get())
    }

    fn bind_vertex_array(&self, id: Option<ObjectId>) {
        unsafe { self.gl.bind_vertex_array(id.and_then(vertex_array)) }
    }

    fn delete_vertex_array(&self, id: ObjectId) {
        if let Some(a) = vertex_array(id) {
            unsafe { self.gl.delete_vertex_array(a) }
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        components: u32,
        scalar: ScalarType,
        normalized: bool,
        stride: u32,
        offset: u32,
    ) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                index,
                components as i32,
                scalar_enum(scalar),
                normalized,
                stride as i32,
                offset as i32,
            )
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ObjectId, String> {
        unsafe { self.gl.create_shader(stage_enum(stage)) }.map(|s| s.0.get())
    }

    fn shader_source(&self, id: ObjectId, source: &str) {
        if let Some(s) = shader(id) {
            unsafe { self.gl.shader_source(s, source) }
        }
    }

    fn compile_shader(&self, id: ObjectId) -> Result<(), String> {
        let s = shader(id).ok_or_else(|| "invalid shader name 0".to_owned())?;
        unsafe {
            self.gl.compile_shader(s);
            if self.gl.get_shader_compile_status(s) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(s))
            }
        }
    }

    fn delete_shader(&self, id: ObjectId) {
        if let Some(s) = shader(id) {
            unsafe { self.gl.delete_shader(s) }
        }
    }

    fn create_program(&self) -> Result<ObjectId, String> {
        unsafe { self.gl.create_program() }.map(|p| p.0.get())
    }

    fn attach_shader(&self, program_id: ObjectId, shader_id: ObjectId) {
        if let (Some(p), Some(s)) = (program(program_id), shader(shader_id)) {
            unsafe { self.gl.attach_shader(p, s) }
        }
    }

    fn detach_shader(&self, program_id: ObjectId, shader_id: ObjectId) {
        if let (Some(p), Some(s)) = (program(program_id), shader(shader_id)) {
            unsafe { self.gl.detach_shader(p, s) }
        }
    }

    fn link_program(&self, id: ObjectId) -> Result<(), String> {
        let p = program(id).ok_or_else(|| "invalid program name 0".to_owned())?;
        unsafe {
            self.gl.link_program(p);
            if self.gl.get_program_link_status(p) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(p))
            }
        }
    }

    fn validate_program(&self, id: ObjectId) -> Result<(), String> {
        let p = program(id).ok_or_else(|| "invalid program name 0".to_owned())?;
        unsafe {
            self.gl.validate_program(p);
            if self.gl.get_program_validate_status(p) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(p))
            }
        }
    }

    fn use_program(&self, id: Option<ObjectId>) {
        unsafe { self.gl.use_program(id.and_then(program)) }
    }

    fn delete_program(&self, id: ObjectId) {
        if let Some(p) = program(id) {
            unsafe { self.gl.delete_program(p) }
        }
    }

    fn uniform_location(&self, id: ObjectId, name: &str) -> Option<UniformLocation> {
        let p = program(id)?;
        unsafe { self.gl.get_uniform_location(p, name) }.map(|l| UniformLocation(l.0))
    }

    fn set_uniform(&self, location: UniformLocation, data: UniformData<'_>) {
        let loc = glow::NativeUniformLocation(location.0);
        let loc = Some(&loc);

        unsafe {
            match data {
                UniformData::F32 { components, values } => match components {
                    Components::One => self.gl.uniform_1_f32_slice(loc, values),
                    Components::Two => self.gl.uniform_2_f32_slice(loc, values),
                    Components::Three => self.gl.uniform_3_f32_slice(loc, values),
                    Components::Four => self.gl.uniform_4_f32_slice(loc, values),
                },
                UniformData::F64 { components, values } => {
                    self.doubles.upload(location, components, values)
                }
                UniformData::I32 { components, values } => match components {
                    Components::One => self.gl.uniform_1_i32_slice(loc, values),
                    Components::Two => self.gl.uniform_2_i32_slice(loc, values),
                    Components::Three => self.gl.uniform_3_i32_slice(loc, values),
                    Components::Four => self.gl.uniform_4_i32_slice(loc, values),
                },
                UniformData::U32 { components, values } => match components {
                    Components::One => self.gl.uniform_1_u32_slice(loc, values),
                    Components::Two => self.gl.uniform_2_u32_slice(loc, values),
                    Components::Three => self.gl.uniform_3_u32_slice(loc, values),
                    Components::Four => self.gl.uniform_4_u32_slice(loc, values),
                },
            }
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_color_buffer(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) }
    }

    fn enable_debug_output(&mut self, sink: DebugSink) -> bool {
        if !self.gl.supports_debug() {
            return false;
        }

        unsafe {
            self.gl.enable(glow::DEBUG_OUTPUT);
            self.gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
            self.gl
                .debug_message_callback(move |source, kind, id, raw_severity, text| {
                    sink(&DebugMessage {
                        source,
                        kind,
                        id,
                        severity: severity(raw_severity),
                        text: text.to_owned(),
                    });
                });
        }
        true
    }
}
