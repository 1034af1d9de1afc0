//! Spatial transform owned by every game object
//!
//! Physics, camera and rendering collaborators read and write the position;
//! the translation matrix is derived from it on demand.

use crate::foundation::math::{Mat4, Vec3};

/// Position of a game object in world space (Y-up right-handed)
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// World space position
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Transform at the origin
    pub fn identity() -> Self {
        Self::default()
    }

    /// Transform at `position`
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Translation matrix for the current position
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
    }
}
