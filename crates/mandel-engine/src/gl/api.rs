use std::fmt;

/// Raw GL object name (buffer, vertex array, shader or program).
///
/// Zero is never a valid name for an object created through [`GlApi`].
pub type ObjectId = u32;

/// Shader stage kinds accepted by [`ShaderBuilder`](super::ShaderBuilder).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex shader",
            ShaderStage::Geometry => "geometry shader",
            ShaderStage::Fragment => "fragment shader",
        };
        f.write_str(name)
    }
}

/// Scalar component types a vertex attribute can be sourced as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    F32,
    F64,
    I32,
    U32,
}

impl ScalarType {
    pub const fn size_in_bytes(self) -> u32 {
        match self {
            ScalarType::F32 | ScalarType::I32 | ScalarType::U32 => 4,
            ScalarType::F64 => 8,
        }
    }
}

/// Resolved uniform location inside one linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

/// Components per uniform element (`float` .. `vec4`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Components {
    One,
    Two,
    Three,
    Four,
}

impl Components {
    pub const fn count(self) -> usize {
        match self {
            Components::One => 1,
            Components::Two => 2,
            Components::Three => 3,
            Components::Four => 4,
        }
    }
}

/// Borrowed uniform payload: flat scalars, `components` per element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformData<'a> {
    F32 { components: Components, values: &'a [f32] },
    F64 { components: Components, values: &'a [f64] },
    I32 { components: Components, values: &'a [i32] },
    U32 { components: Components, values: &'a [u32] },
}

impl UniformData<'_> {
    /// Number of uniform elements described (array length for array uniforms).
    pub fn len(&self) -> usize {
        match self {
            UniformData::F32 { components, values } => values.len() / components.count(),
            UniformData::F64 { components, values } => values.len() / components.count(),
            UniformData::I32 { components, values } => values.len() / components.count(),
            UniformData::U32 { components, values } => values.len() / components.count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Severity attached to a driver debug message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DebugSeverity {
    High,
    Medium,
    Low,
    Notification,
}

/// One message delivered through the driver's debug-output channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugMessage {
    pub source: u32,
    pub kind: u32,
    pub id: u32,
    pub severity: DebugSeverity,
    pub text: String,
}

/// Receiver for driver debug messages.
pub type DebugSink = Box<dyn Fn(&DebugMessage) + Send + Sync + 'static>;

/// The slice of the OpenGL API the resource layer is written against.
///
/// All methods assume the context that produced the implementation is current
/// on the calling thread. Failures GL reports asynchronously (bad enums, wrong
/// binding state) surface through the debug-output channel, not through return
/// values; only object creation, compilation and linking report errors here.
pub trait GlApi {
    fn create_buffer(&self) -> Result<ObjectId, String>;
    fn bind_array_buffer(&self, buffer: Option<ObjectId>);
    /// Replaces the contents of the bound array buffer (static usage).
    fn array_buffer_data(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: ObjectId);

    fn create_vertex_array(&self) -> Result<ObjectId, String>;
    fn bind_vertex_array(&self, array: Option<ObjectId>);
    fn delete_vertex_array(&self, array: ObjectId);
    fn enable_vertex_attrib(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        components: u32,
        scalar: ScalarType,
        normalized: bool,
        stride: u32,
        offset: u32,
    );

    fn create_shader(&self, stage: ShaderStage) -> Result<ObjectId, String>;
    fn shader_source(&self, shader: ObjectId, source: &str);
    /// Compiles `shader`; `Err` carries the info log.
    fn compile_shader(&self, shader: ObjectId) -> Result<(), String>;
    fn delete_shader(&self, shader: ObjectId);

    fn create_program(&self) -> Result<ObjectId, String>;
    fn attach_shader(&self, program: ObjectId, shader: ObjectId);
    fn detach_shader(&self, program: ObjectId, shader: ObjectId);
    /// Links `program`; `Err` carries the info log.
    fn link_program(&self, program: ObjectId) -> Result<(), String>;
    /// Validates `program` against the current state; `Err` carries the info log.
    fn validate_program(&self, program: ObjectId) -> Result<(), String>;
    fn use_program(&self, program: Option<ObjectId>);
    fn delete_program(&self, program: ObjectId);

    fn uniform_location(&self, program: ObjectId, name: &str) -> Option<UniformLocation>;
    /// Uploads to `location` of the program currently in use.
    fn set_uniform(&self, location: UniformLocation, data: UniformData<'_>);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&self);
    fn draw_triangles(&self, first: i32, count: i32);

    /// Enables debug output and routes every message to `sink`.
    ///
    /// Returns `false` when the context has no debug-output support.
    fn enable_debug_output(&mut self, sink: DebugSink) -> bool;
}
