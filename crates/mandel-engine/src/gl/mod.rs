//! GPU resource layer.
//!
//! Thin owning wrappers over OpenGL objects. Everything here talks to the
//! driver through [`GlApi`], so the wrappers run unchanged against the real
//! context ([`GlowApi`]) or the recording double in [`crate::headless`].

mod api;
mod buffer;
mod context;
mod error;
mod glow_api;
mod layout;
mod shader;
mod uniform;
mod vertex_array;

pub use api::{
    Components, DebugMessage, DebugSeverity, DebugSink, GlApi, ObjectId, ScalarType, ShaderStage,
    UniformData, UniformLocation,
};
pub use buffer::VertexBuffer;
pub use context::Gl;
pub use error::{GlError, ShaderError};
pub use glow_api::GlowApi;
pub use layout::{VertexAttribute, VertexElement, VertexLayout};
pub use shader::{ShaderBuilder, ShaderProgram};
pub use uniform::Uniform;
pub use vertex_array::VertexArray;
