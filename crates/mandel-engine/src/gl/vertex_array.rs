use super::api::ObjectId;
use super::buffer::VertexBuffer;
use super::context::Gl;
use super::error::GlError;
use super::layout::VertexLayout;

/// Binds vertex buffers to attribute slots.
///
/// Move-only: the GL object is released exactly once, on drop.
#[derive(Debug)]
pub struct VertexArray {
    gl: Gl,
    id: ObjectId,
}

impl VertexArray {
    pub fn new(gl: &Gl) -> Result<Self, GlError> {
        let id = gl.create_vertex_array().map_err(|message| GlError::Create {
            object: "vertex array",
            message,
        })?;

        Ok(Self { gl: gl.clone(), id })
    }

    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(self.id));
    }

    pub fn unbind(&self) {
        self.gl.bind_vertex_array(None);
    }

    /// Sources one attribute per layout element from `buffer`.
    ///
    /// Leaves this array and `buffer` bound.
    pub fn add_buffer(&self, buffer: &VertexBuffer, layout: &VertexLayout) {
        self.bind();
        buffer.bind();

        let mut offset = 0;
        for (index, element) in (0u32..).zip(layout.elements()) {
            self.gl.enable_vertex_attrib(index);
            self.gl.vertex_attrib_pointer(
                index,
                element.count,
                element.scalar,
                element.normalized,
                layout.stride(),
                offset,
            );
            offset += element.total_size_in_bytes;
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        if self.gl.is_alive() {
            self.gl.delete_vertex_array(self.id);
        }
    }
}
