use bytemuck::Pod;
use glam::{DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use super::api::ScalarType;

mod sealed {
    pub trait Sealed {}
}

/// Types a vertex attribute can be declared as.
///
/// Sealed: only 32-bit float/int/uint, double, and their 2/3/4-component glam
/// vectors are accepted, so an unsupported attribute type is a compile error.
pub trait VertexAttribute: Pod + sealed::Sealed {
    const SCALAR: ScalarType;
    const COMPONENTS: u32;
}

macro_rules! vertex_attribute {
    ($($ty:ty => $scalar:ident, $components:literal;)*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl VertexAttribute for $ty {
                const SCALAR: ScalarType = ScalarType::$scalar;
                const COMPONENTS: u32 = $components;
            }
        )*
    };
}

vertex_attribute! {
    f32 => F32, 1;
    Vec2 => F32, 2;
    Vec3 => F32, 3;
    Vec4 => F32, 4;
    f64 => F64, 1;
    DVec2 => F64, 2;
    DVec3 => F64, 3;
    DVec4 => F64, 4;
    i32 => I32, 1;
    IVec2 => I32, 2;
    IVec3 => I32, 3;
    IVec4 => I32, 4;
    u32 => U32, 1;
    UVec2 => U32, 2;
    UVec3 => U32, 3;
    UVec4 => U32, 4;
}

/// One attribute slot in a [`VertexLayout`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexElement {
    /// Scalar components read per vertex.
    pub count: u32,
    pub scalar: ScalarType,
    /// Bytes this attribute occupies in each vertex.
    pub total_size_in_bytes: u32,
    pub normalized: bool,
}

/// Ordered attribute description of interleaved vertex data.
///
/// Attribute indices follow push order, starting at 0.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct VertexLayout {
    stride: u32,
    elements: Vec<VertexElement>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `count` values of `T` as the next attribute.
    pub fn push<T: VertexAttribute>(&mut self, count: u32) -> &mut Self {
        self.push_element::<T>(count, false)
    }

    /// Like [`push`](Self::push), but integer data is normalized to `[0, 1]` /
    /// `[-1, 1]` when read.
    pub fn push_normalized<T: VertexAttribute>(&mut self, count: u32) -> &mut Self {
        self.push_element::<T>(count, true)
    }

    fn push_element<T: VertexAttribute>(&mut self, count: u32, normalized: bool) -> &mut Self {
        let total_size_in_bytes = size_of::<T>() as u32 * count;

        self.elements.push(VertexElement {
            count: T::COMPONENTS * count,
            scalar: T::SCALAR,
            total_size_in_bytes,
            normalized,
        });
        self.stride += total_size_in_bytes;
        self
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }
}
