//! Position, Euler rotation and scale of a scene node.

use std::time::Duration;

use crate::{
    data_structures::{behavior::Behave, scene_graph::NodeId},
    math::{Mat4, Vec3, mat4},
};

/// Local transform of a node.
///
/// The matrix is derived state: mutate the public fields, then call
/// [`Transform::update_matrix`] (the `update` hook does this every frame).
#[derive(Clone, Debug)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z in object space.
    pub rotation: Vec3,
    pub scale: Vec3,
    matrix: Mat4,
    pub(crate) owner: Option<NodeId>,
}

impl Transform {
    pub fn new() -> Self {
        Self::from_position(Vec3::new(0.0, 0.0, 0.0))
    }

    pub fn from_position(position: Vec3) -> Self {
        let mut transform = Self {
            position,
            rotation: Vec3::new(0.0, 0.0, 0.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
            matrix: mat4::identity(),
            owner: None,
        };
        transform.update_matrix();
        transform
    }

    /// Recomputes `T · Rx · Ry · Rz · S` from the current fields.
    pub fn update_matrix(&mut self) {
        let mut m = mat4::identity();
        mat4::translate(&mut m, self.position);
        mat4::rotate_x(&mut m, self.rotation.x);
        mat4::rotate_y(&mut m, self.rotation.y);
        mat4::rotate_z(&mut m, self.rotation.z);
        mat4::scale(&mut m, self.scale);
        self.matrix = m;
    }

    /// Local-to-world matrix as of the last [`Transform::update_matrix`].
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Behave for Transform {
    fn update(&mut self, _dt: Duration) {
        self.update_matrix();
    }
}
