//! Minimal physics world tracking membership and bounding spheres
//!
//! Does no simulation. It records which rigid bodies, ghost objects and
//! constraints exist and answers broad-phase overlap queries, which is enough
//! for editor use and for headless tools.

use std::collections::HashMap;

use crate::foundation::math::{Transform, Vec3};
use crate::scene::component::{ConstraintComponent, DynamicsComponent, ProximityComponent};
use crate::scene::SceneNodeId;
use super::{CollisionLayers, CollisionShape, PhysicsManager};

/// Kind of physics proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsObjectKind {
    /// Full dynamics collision
    RigidBody,
    /// Proximity-only collision
    GhostObject,
}

/// Physics proxy data stored by the world
#[derive(Debug, Clone)]
pub struct PhysicsObject {
    /// World transform of the owning node
    pub transform: Transform,
    /// Collision group
    pub group: u32,
    /// Collision mask
    pub mask: u32,
    /// Radius enclosing every shape of the proxy
    pub bounding_radius: f32,
}

impl PhysicsObject {
    fn new(shapes: &[CollisionShape], world: &Transform, group: u32, mask: u32) -> Self {
        let max_scale = world.scale.x.abs().max(world.scale.y.abs()).max(world.scale.z.abs());
        let radius = shapes
            .iter()
            .map(CollisionShape::bounding_radius)
            .fold(0.0_f32, f32::max);
        Self {
            transform: world.clone(),
            group,
            mask,
            bounding_radius: radius * max_scale,
        }
    }

    fn center(&self) -> Vec3 {
        self.transform.position
    }
}

/// Physics world without simulation
#[derive(Debug, Default)]
pub struct SimplePhysicsWorld {
    gravity: Option<Vec3>,
    objects: HashMap<(SceneNodeId, PhysicsObjectKind), PhysicsObject>,
    constraints: HashMap<SceneNodeId, ConstraintComponent>,
}

impl SimplePhysicsWorld {
    /// Create an empty world with standard gravity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity: Some(gravity),
            ..Self::default()
        }
    }

    /// Look up a proxy
    pub fn object(&self, node: SceneNodeId, kind: PhysicsObjectKind) -> Option<&PhysicsObject> {
        self.objects.get(&(node, kind))
    }

    /// Number of proxies of the given kind
    pub fn object_count(&self, kind: PhysicsObjectKind) -> usize {
        self.objects.keys().filter(|(_, k)| *k == kind).count()
    }

    /// Number of constraints
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Broad-phase: proxies whose bounding spheres overlap the given one and
    /// whose groups and masks allow interaction
    pub fn overlapping(&self, node: SceneNodeId, kind: PhysicsObjectKind) -> Vec<SceneNodeId> {
        let Some(this) = self.object(node, kind) else {
            return Vec::new();
        };

        let mut result: Vec<SceneNodeId> = self
            .objects
            .iter()
            .filter(|((other, _), _)| *other != node)
            .filter(|(_, other)| {
                CollisionLayers::should_collide(this.group, this.mask, other.group, other.mask)
            })
            .filter(|(_, other)| {
                let reach = this.bounding_radius + other.bounding_radius;
                (this.center() - other.center()).magnitude_squared() <= reach * reach
            })
            .map(|((other, _), _)| *other)
            .collect();
        result.sort();
        result.dedup();
        result
    }

    fn update_object(&mut self, node: SceneNodeId, kind: PhysicsObjectKind, world: &Transform, group: u32, mask: u32) {
        if let Some(object) = self.objects.get_mut(&(node, kind)) {
            object.transform = world.clone();
            object.group = group;
            object.mask = mask;
        } else {
            log::warn!("Scene node {node} has no {kind:?} to update");
        }
    }
}

impl PhysicsManager for SimplePhysicsWorld {
    fn gravity(&self) -> Vec3 {
        self.gravity.unwrap_or_else(|| Vec3::new(0.0, -9.81, 0.0))
    }

    fn add_rigid_body(&mut self, node: SceneNodeId, dynamics: &DynamicsComponent, world: &Transform) {
        let object = PhysicsObject::new(
            &dynamics.collision_shapes,
            world,
            dynamics.collision_group,
            dynamics.collision_mask,
        );
        self.objects.insert((node, PhysicsObjectKind::RigidBody), object);
    }

    fn remove_rigid_body(&mut self, node: SceneNodeId) {
        self.objects.remove(&(node, PhysicsObjectKind::RigidBody));
    }

    fn update_rigid_body_transform(&mut self, node: SceneNodeId, world: &Transform, group: u32, mask: u32) {
        self.update_object(node, PhysicsObjectKind::RigidBody, world, group, mask);
    }

    fn add_ghost_object(&mut self, node: SceneNodeId, proximity: &ProximityComponent, world: &Transform) {
        let object = PhysicsObject::new(
            &proximity.collision_shapes,
            world,
            proximity.collision_group,
            proximity.collision_mask,
        );
        self.objects.insert((node, PhysicsObjectKind::GhostObject), object);
    }

    fn remove_ghost_object(&mut self, node: SceneNodeId) {
        self.objects.remove(&(node, PhysicsObjectKind::GhostObject));
    }

    fn update_ghost_object_transform(&mut self, node: SceneNodeId, world: &Transform, group: u32, mask: u32) {
        self.update_object(node, PhysicsObjectKind::GhostObject, world, group, mask);
    }

    fn add_constraint(&mut self, node: SceneNodeId, constraint: &ConstraintComponent) {
        self.constraints.insert(node, constraint.clone());
    }

    fn remove_constraint(&mut self, node: SceneNodeId) {
        self.constraints.remove(&node);
    }
}
