//! Culling manager interface
//!
//! The scene keeps the visibility acceleration structure in sync with node
//! and component lifetime through [`CullingManager`]. Each renderable
//! category has its own add/remove/update-transform triplet; the scene calls
//! them synchronously and expects them to be cheap.
//!
//! [`SimpleCullingManager`] is the default list-based implementation. It
//! performs linear searches, which is sufficient for editor-sized scenes, and
//! can be replaced by a spatial structure without changing the interface.

mod bounds;
mod simple;

pub use bounds::Aabb;
pub use simple::{CullingCategory, CullingEntry, SimpleCullingManager};

use crate::foundation::math::Mat4;
use crate::scene::component::{
    AmbientLightComponent, DirectionalLightComponent, ModelComponent, OccluderComponent,
    ParticleSystemComponent, PointLightComponent, SpotLightComponent,
};
use crate::scene::SceneNodeId;

/// Visibility structure fed by the scene's notification pipeline
pub trait CullingManager {
    /// Register a model
    fn add_model(&mut self, node: SceneNodeId, model: &ModelComponent, world: &Mat4);
    /// Unregister a model
    fn remove_model(&mut self, node: SceneNodeId);
    /// Move a registered model
    fn update_model_transform(&mut self, node: SceneNodeId, world: &Mat4);

    /// Register a point light
    fn add_point_light(&mut self, node: SceneNodeId, light: &PointLightComponent, world: &Mat4);
    /// Unregister a point light
    fn remove_point_light(&mut self, node: SceneNodeId);
    /// Move a registered point light
    fn update_point_light_transform(&mut self, node: SceneNodeId, world: &Mat4);

    /// Register a spot light
    fn add_spot_light(&mut self, node: SceneNodeId, light: &SpotLightComponent, world: &Mat4);
    /// Unregister a spot light
    fn remove_spot_light(&mut self, node: SceneNodeId);
    /// Move a registered spot light
    fn update_spot_light_transform(&mut self, node: SceneNodeId, world: &Mat4);

    /// Register a directional light
    fn add_directional_light(&mut self, node: SceneNodeId, light: &DirectionalLightComponent, world: &Mat4);
    /// Unregister a directional light
    fn remove_directional_light(&mut self, node: SceneNodeId);
    /// Re-orient a registered directional light
    fn update_directional_light_transform(&mut self, node: SceneNodeId, world: &Mat4);

    /// Register an ambient light
    fn add_ambient_light(&mut self, node: SceneNodeId, light: &AmbientLightComponent);
    /// Unregister an ambient light
    fn remove_ambient_light(&mut self, node: SceneNodeId);
    /// Ambient lights have no position; called for completeness on node moves
    fn update_ambient_light_transform(&mut self, node: SceneNodeId, world: &Mat4);

    /// Register a particle system
    fn add_particle_system(&mut self, node: SceneNodeId, particles: &ParticleSystemComponent, world: &Mat4);
    /// Unregister a particle system
    fn remove_particle_system(&mut self, node: SceneNodeId);
    /// Move a registered particle system
    fn update_particle_system_transform(&mut self, node: SceneNodeId, world: &Mat4);

    /// Register an occluder
    fn add_occluder(&mut self, node: SceneNodeId, occluder: &OccluderComponent, world: &Mat4);
    /// Unregister an occluder
    fn remove_occluder(&mut self, node: SceneNodeId);
    /// Move a registered occluder
    fn update_occluder_transform(&mut self, node: SceneNodeId, world: &Mat4);
}
