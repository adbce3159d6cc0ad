//! Math primitives used by transforms, the camera and the renderer.
//!
//! - `vec3` holds vector helpers (guarded normalize, cross/dot)
//! - `mat4` holds in-place matrix composition, axis rotation, projections and look-at

pub mod mat4;
pub mod vec3;

pub type Vec3 = cgmath::Vector3<f32>;
pub type Mat4 = cgmath::Matrix4<f32>;

/// Flattens a matrix into the column-major array layout uniforms expect.
pub fn to_cols(m: &Mat4) -> [[f32; 4]; 4] {
    (*m).into()
}
