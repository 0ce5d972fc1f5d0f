use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::gl::{
    Components, DebugMessage, DebugSink, Gl, GlApi, ObjectId, ScalarType, ShaderStage, UniformData,
    UniformLocation,
};

/// Owned copy of an uploaded uniform payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniform {
    F32 { components: Components, values: Vec<f32> },
    F64 { components: Components, values: Vec<f64> },
    I32 { components: Components, values: Vec<i32> },
    U32 { components: Components, values: Vec<u32> },
}

impl From<UniformData<'_>> for RecordedUniform {
    fn from(data: UniformData<'_>) -> Self {
        match data {
            UniformData::F32 { components, values } => Self::F32 { components, values: values.to_vec() },
            UniformData::F64 { components, values } => Self::F64 { components, values: values.to_vec() },
            UniformData::I32 { components, values } => Self::I32 { components, values: values.to_vec() },
            UniformData::U32 { components, values } => Self::U32 { components, values: values.to_vec() },
        }
    }
}

/// One call made through [`RecordingGl`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateBuffer(ObjectId),
    BindArrayBuffer(Option<ObjectId>),
    ArrayBufferData { len: usize },
    DeleteBuffer(ObjectId),

    CreateVertexArray(ObjectId),
    BindVertexArray(Option<ObjectId>),
    DeleteVertexArray(ObjectId),
    EnableVertexAttrib(u32),
    VertexAttribPointer {
        index: u32,
        components: u32,
        scalar: ScalarType,
        normalized: bool,
        stride: u32,
        offset: u32,
    },

    CreateShader { id: ObjectId, stage: ShaderStage },
    ShaderSource { shader: ObjectId, len: usize },
    CompileShader(ObjectId),
    DeleteShader(ObjectId),

    CreateProgram(ObjectId),
    AttachShader { program: ObjectId, shader: ObjectId },
    DetachShader { program: ObjectId, shader: ObjectId },
    LinkProgram(ObjectId),
    ValidateProgram(ObjectId),
    UseProgram(Option<ObjectId>),
    DeleteProgram(ObjectId),

    UniformLocation { program: ObjectId, name: String },
    SetUniform { location: UniformLocation, values: RecordedUniform },

    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear,
    DrawTriangles { first: i32, count: i32 },
    EnableDebugOutput,
}

#[derive(Default)]
struct LogState {
    calls: Vec<GlCall>,
    debug_sink: Option<DebugSink>,
}

/// Shared view of everything a [`RecordingGl`] was asked to do.
///
/// Cloning yields another handle to the same log.
#[derive(Clone, Default)]
pub struct GlLog {
    state: Rc<RefCell<LogState>>,
}

impl GlLog {
    fn push(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }

    /// Snapshot of recorded calls, oldest first.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn contains(&self, call: &GlCall) -> bool {
        self.state.borrow().calls.contains(call)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets recorded calls; the debug sink stays installed.
    pub fn clear(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Delivers `msg` as if the driver emitted it.
    ///
    /// Returns `false` when debug output was never enabled.
    pub fn emit_debug(&self, msg: &DebugMessage) -> bool {
        let state = self.state.borrow();
        match state.debug_sink.as_ref() {
            Some(sink) => {
                sink(msg);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for GlLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlLog").field("calls", &self.len()).finish()
    }
}

/// [`GlApi`] that executes nothing and records every call.
///
/// Object names are handed out from a single counter starting at 1. Uniform
/// locations are assigned per `(program, name)` on first query, so repeated
/// queries agree just like a real driver's.
pub struct RecordingGl {
    log: GlLog,
    next_id: Cell<ObjectId>,
    stages: RefCell<HashMap<ObjectId, ShaderStage>>,
    locations: RefCell<HashMap<(ObjectId, String), UniformLocation>>,
    fail_compile: Option<(ShaderStage, String)>,
    fail_link: Option<String>,
    fail_validate: bool,
    missing_uniforms: HashSet<String>,
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::with_log(GlLog::default())
    }

    pub fn with_log(log: GlLog) -> Self {
        Self {
            log,
            next_id: Cell::new(1),
            stages: RefCell::new(HashMap::new()),
            locations: RefCell::new(HashMap::new()),
            fail_compile: None,
            fail_link: None,
            fail_validate: false,
            missing_uniforms: HashSet::new(),
        }
    }

    /// Compiling any shader of `stage` fails with `log` as the info log.
    pub fn fail_compile(mut self, stage: ShaderStage, log: impl Into<String>) -> Self {
        self.fail_compile = Some((stage, log.into()));
        self
    }

    pub fn fail_link(mut self, log: impl Into<String>) -> Self {
        self.fail_link = Some(log.into());
        self
    }

    pub fn fail_validate(mut self) -> Self {
        self.fail_validate = true;
        self
    }

    /// Programs report no active uniform called `name`.
    pub fn without_uniform(mut self, name: impl Into<String>) -> Self {
        self.missing_uniforms.insert(name.into());
        self
    }

    pub fn log(&self) -> GlLog {
        self.log.clone()
    }

    /// Wraps this recorder in a live [`Gl`] handle.
    pub fn into_gl(self) -> (Gl, GlLog) {
        let log = self.log();
        (Gl::new(Box::new(self)), log)
    }

    fn next_id(&self) -> ObjectId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Fresh recorder with default behaviour.
pub fn recording_gl() -> (Gl, GlLog) {
    RecordingGl::new().into_gl()
}

impl GlApi for RecordingGl {
    fn create_buffer(&self) -> Result<ObjectId, String> {
        let id = self.next_id();
        self.log.push(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<ObjectId>) {
        self.log.push(GlCall::BindArrayBuffer(buffer));
    }

    fn array_buffer_data(&self, data: &[u8]) {
        self.log.push(GlCall::ArrayBufferData { len: data.len() });
    }

    fn delete_buffer(&self, buffer: ObjectId) {
        self.log.push(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<ObjectId, String> {
        let id = self.next_id();
        self.log.push(GlCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, array: Option<ObjectId>) {
        self.log.push(GlCall::BindVertexArray(array));
    }

    fn delete_vertex_array(&self, array: ObjectId) {
        self.log.push(GlCall::DeleteVertexArray(array));
    }

    fn enable_vertex_attrib(&self, index: u32) {
        self.log.push(GlCall::EnableVertexAttrib(index));
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
        self.log.push(GlCall::VertexAttribPointer {
            index,
            components,
            scalar,
            normalized,
            stride,
            offset,
        });
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ObjectId, String> {
        let id = self.next_id();
        self.stages.borrow_mut().insert(id, stage);
        self.log.push(GlCall::CreateShader { id, stage });
        Ok(id)
    }

    fn shader_source(&self, shader: ObjectId, source: &str) {
        self.log.push(GlCall::ShaderSource {
            shader,
            len: source.len(),
        });
    }

    fn compile_shader(&self, shader: ObjectId) -> Result<(), String> {
        self.log.push(GlCall::CompileShader(shader));

        let stage = self.stages.borrow().get(&shader).copied();
        match &self.fail_compile {
            Some((failing, log)) if stage == Some(*failing) => Err(log.clone()),
            _ => Ok(()),
        }
    }

    fn delete_shader(&self, shader: ObjectId) {
        self.stages.borrow_mut().remove(&shader);
        self.log.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<ObjectId, String> {
        let id = self.next_id();
        self.log.push(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: ObjectId, shader: ObjectId) {
        self.log.push(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: ObjectId, shader: ObjectId) {
        self.log.push(GlCall::DetachShader { program, shader });
    }

    fn link_program(&self, program: ObjectId) -> Result<(), String> {
        self.log.push(GlCall::LinkProgram(program));
        match &self.fail_link {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn validate_program(&self, program: ObjectId) -> Result<(), String> {
        self.log.push(GlCall::ValidateProgram(program));
        if self.fail_validate {
            Err("validation failed".to_owned())
        } else {
            Ok(())
        }
    }

    fn use_program(&self, program: Option<ObjectId>) {
        self.log.push(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: ObjectId) {
        self.log.push(GlCall::DeleteProgram(program));
    }

    fn uniform_location(&self, program: ObjectId, name: &str) -> Option<UniformLocation> {
        self.log.push(GlCall::UniformLocation {
            program,
            name: name.to_owned(),
        });

        if self.missing_uniforms.contains(name) {
            return None;
        }

        let mut locations = self.locations.borrow_mut();
        let next = locations.keys().filter(|(p, _)| *p == program).count() as u32;
        let location = *locations
            .entry((program, name.to_owned()))
            .or_insert(UniformLocation(next));
        Some(location)
    }

    fn set_uniform(&self, location: UniformLocation, data: UniformData<'_>) {
        self.log.push(GlCall::SetUniform {
            location,
            values: data.into(),
        });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.log.push(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.log.push(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear_color_buffer(&self) {
        self.log.push(GlCall::Clear);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.log.push(GlCall::DrawTriangles { first, count });
    }

    fn enable_debug_output(&mut self, sink: DebugSink) -> bool {
        self.log.push(GlCall::EnableDebugOutput);
        self.log.state.borrow_mut().debug_sink = Some(sink);
        true
    }
}
