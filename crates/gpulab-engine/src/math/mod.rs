//! Small linear-algebra types for the cube demo.
//!
//! Conventions match WGSL and wgpu:
//! - matrices are column-major, `m * v` transforms column vectors
//! - right-handed view space, camera looks down -Z
//! - clip-space depth in `[0, 1]`

mod mat4;
mod vec3;

pub use mat4::Mat4;
pub use vec3::Vec3;
