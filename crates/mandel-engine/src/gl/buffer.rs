use bytemuck::Pod;

use super::api::ObjectId;
use super::context::Gl;
use super::error::GlError;

/// GPU-resident vertex data, owned exclusively by this value.
#[derive(Debug)]
pub struct VertexBuffer {
    gl: Gl,
    id: ObjectId,
}

impl VertexBuffer {
    /// Creates an empty buffer.
    pub fn new(gl: &Gl) -> Result<Self, GlError> {
        let id = gl.create_buffer().map_err(|message| GlError::Create {
            object: "vertex buffer",
            message,
        })?;

        Ok(Self { gl: gl.clone(), id })
    }

    /// Creates a buffer and uploads `data` into it.
    pub fn with_data<T: Pod>(gl: &Gl, data: &[T]) -> Result<Self, GlError> {
        let buffer = Self::new(gl)?;
        buffer.set_data(data);
        Ok(buffer)
    }

    /// Replaces the whole contents of the buffer.
    ///
    /// Leaves the buffer bound to the array-buffer target.
    pub fn set_data<T: Pod>(&self, data: &[T]) {
        self.bind();
        self.gl.array_buffer_data(bytemuck::cast_slice(data));
    }

    pub fn bind(&self) {
        self.gl.bind_array_buffer(Some(self.id));
    }

    pub fn unbind(&self) {
        self.gl.bind_array_buffer(None);
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        if self.gl.is_alive() {
            self.gl.delete_buffer(self.id);
        }
    }
}
