use glam::{DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use super::api::{Components, UniformData};

mod sealed {
    pub trait Sealed {}
}

/// Values that can be uploaded to a shader uniform.
///
/// Implemented for `f32`, `f64`, `i32`, `u32` and their 2/3/4-component glam
/// vectors; the implementation picks the matching `glUniform*` overload.
pub trait Uniform: Copy + sealed::Sealed {
    fn data(values: &[Self]) -> UniformData<'_>;
}

macro_rules! uniform {
    ($($ty:ty => $variant:ident($scalar:ty), $components:ident;)*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Uniform for $ty {
                fn data(values: &[Self]) -> UniformData<'_> {
                    UniformData::$variant {
                        components: Components::$components,
                        values: bytemuck::cast_slice::<$ty, $scalar>(values),
                    }
                }
            }
        )*
    };
}

uniform! {
    f32 => F32(f32), One;
    Vec2 => F32(f32), Two;
    Vec3 => F32(f32), Three;
    Vec4 => F32(f32), Four;
    f64 => F64(f64), One;
    DVec2 => F64(f64), Two;
    DVec3 => F64(f64), Three;
    DVec4 => F64(f64), Four;
    i32 => I32(i32), One;
    IVec2 => I32(i32), Two;
    IVec3 => I32(i32), Three;
    IVec4 => I32(i32), Four;
    u32 => U32(u32), One;
    UVec2 => U32(u32), Two;
    UVec3 => U32(u32), Three;
    UVec4 => U32(u32), Four;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_maps_to_single_component() {
        assert_eq!(
            i32::data(&[7]),
            UniformData::I32 { components: Components::One, values: &[7] }
        );
    }

    #[test]
    fn vectors_flatten_in_component_order() {
        let v = [DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)];
        let data = DVec2::data(&v);

        assert_eq!(
            data,
            UniformData::F64 { components: Components::Two, values: &[1.0, 2.0, 3.0, 4.0] }
        );
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn vec3_has_no_padding() {
        let v = [Vec3::new(1.0, 2.0, 3.0)];
        assert_eq!(
            Vec3::data(&v),
            UniformData::F32 { components: Components::Three, values: &[1.0, 2.0, 3.0] }
        );
    }
}
