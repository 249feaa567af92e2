//! Physics world interface
//!
//! The scene is the single point that integrates scene node lifetime with
//! physics world membership. Rigid bodies come from dynamics components,
//! ghost objects from proximity components and constraints from constraint
//! components; all of them are keyed by the owning scene node.

pub mod collision_layers;
mod simple_world;

pub use collision_layers::CollisionLayers;
pub use simple_world::{PhysicsObject, PhysicsObjectKind, SimplePhysicsWorld};

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Transform, Vec3};
use crate::scene::component::{ConstraintComponent, DynamicsComponent, ProximityComponent};
use crate::scene::SceneNodeId;

/// Collision shape attached to a dynamics or proximity component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Sphere
    Sphere {
        /// Sphere radius
        radius: f32,
        /// Offset from the node origin
        offset: Vec3,
    },
    /// Box
    Box {
        /// Half size along each axis
        half_extents: Vec3,
        /// Offset from the node origin
        offset: Vec3,
    },
    /// Capsule aligned with the local Y axis
    Capsule {
        /// Radius of the caps and shaft
        radius: f32,
        /// Height of the cylindrical part
        height: f32,
        /// Offset from the node origin
        offset: Vec3,
    },
}

impl CollisionShape {
    /// Sphere centered on the node
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius, offset: Vec3::zeros() }
    }

    /// Box centered on the node
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box { half_extents, offset: Vec3::zeros() }
    }

    /// Radius of a sphere around the node origin enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Sphere { radius, offset } => offset.magnitude() + radius,
            Self::Box { half_extents, offset } => offset.magnitude() + half_extents.magnitude(),
            Self::Capsule { radius, height, offset } => offset.magnitude() + height * 0.5 + radius,
        }
    }
}

/// Physics world fed by the scene's notification pipeline
pub trait PhysicsManager {
    /// Gravity of the world, also handed to particle systems
    fn gravity(&self) -> Vec3 {
        Vec3::new(0.0, -9.81, 0.0)
    }

    /// Add a rigid body for a node's dynamics component
    fn add_rigid_body(&mut self, node: SceneNodeId, dynamics: &DynamicsComponent, world: &Transform);
    /// Remove a node's rigid body
    fn remove_rigid_body(&mut self, node: SceneNodeId);
    /// Push a new world transform into a rigid body
    fn update_rigid_body_transform(&mut self, node: SceneNodeId, world: &Transform, group: u32, mask: u32);

    /// Add a ghost object for a node's proximity component
    fn add_ghost_object(&mut self, node: SceneNodeId, proximity: &ProximityComponent, world: &Transform);
    /// Remove a node's ghost object
    fn remove_ghost_object(&mut self, node: SceneNodeId);
    /// Push a new world transform into a ghost object
    fn update_ghost_object_transform(&mut self, node: SceneNodeId, world: &Transform, group: u32, mask: u32);

    /// Add a constraint owned by a node
    fn add_constraint(&mut self, node: SceneNodeId, constraint: &ConstraintComponent);
    /// Remove a node's constraint
    fn remove_constraint(&mut self, node: SceneNodeId);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_radius_includes_offset() {
        let shape = CollisionShape::Sphere { radius: 1.0, offset: Vec3::new(3.0, 4.0, 0.0) };
        assert_relative_eq!(shape.bounding_radius(), 6.0);

        let capsule = CollisionShape::Capsule { radius: 0.5, height: 2.0, offset: Vec3::zeros() };
        assert_relative_eq!(capsule.bounding_radius(), 1.5);
    }
}
