//! Math types shared by the composition core
//!
//! The core only needs positions and translation matrices; everything else in
//! the math library belongs to the collaborators that consume transforms.

pub use nalgebra::{Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;
