//! Math utilities and types
//!
//! Provides the fundamental math types used for scene node transforms.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        let matrix = self.to_matrix();
        matrix.transform_point(&point)
    }

    /// Combine this transform with another
    ///
    /// `self` is the parent space, `other` is expressed relative to it.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_combine_applies_parent_scale_and_offset() {
        let parent = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::identity(),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let child = Transform::from_position(Vec3::new(1.0, 1.0, 0.0));

        let world = parent.combine(&child);

        assert_relative_eq!(world.position, Vec3::new(12.0, 2.0, 0.0));
        assert_relative_eq!(world.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_to_matrix_matches_transform_point() {
        let transform = Transform {
            position: Vec3::new(0.0, 5.0, 0.0),
            rotation: Quat::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };

        let point = transform.transform_point(Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(point, Point3::new(0.0, 5.0, -1.0), epsilon = 1e-5);
    }
}
