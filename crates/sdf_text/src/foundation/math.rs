//! Vector aliases and the mesh transform
//!
//! Thin aliases over `nalgebra` plus the TRS transform used to place text
//! meshes under their parent entity.

pub use nalgebra::{Quaternion, Unit, Vector2, Vector3};

/// Layout-space point or size
pub type Vec2 = Vector2<f32>;

/// World-space point, scale or RGB color
pub type Vec3 = Vector3<f32>;

/// Unit rotation
pub type Quat = Unit<Quaternion<f32>>;

/// Local TRS transform of a text mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec3,

    /// Orientation
    pub rotation: Quat,

    /// Per-axis scale, negative to mirror
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::repeat(1.0),
        }
    }
}

impl Transform {
    /// No translation, rotation or scale
    pub fn identity() -> Self {
        Self::default()
    }

    /// Builder pattern: set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: set rotation from axis-angle
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&Unit::new_normalize(axis), angle);
        self
    }

    /// Builder pattern: set a uniform scale
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::repeat(scale);
        self
    }

    /// Map a local-space point into parent space (scale, then rotate, then translate)
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point.component_mul(&self.scale) + self.position
    }
}
