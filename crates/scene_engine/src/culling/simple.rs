//! List-based culling manager

use crate::foundation::math::{Mat4, Vec3};
use crate::scene::component::{
    AmbientLightComponent, DirectionalLightComponent, ModelComponent, OccluderComponent,
    ParticleSystemComponent, PointLightComponent, SpotLightComponent,
};
use crate::scene::SceneNodeId;
use super::{Aabb, CullingManager};

/// Renderable category tracked by the culling manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullingCategory {
    /// Model
    Model,
    /// Point light
    PointLight,
    /// Spot light
    SpotLight,
    /// Directional light
    DirectionalLight,
    /// Ambient light
    AmbientLight,
    /// Particle system
    ParticleSystem,
    /// Occluder
    Occluder,
}

impl CullingCategory {
    /// Whether objects of this category are visible from everywhere
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::DirectionalLight | Self::AmbientLight)
    }
}

/// One registered object
#[derive(Debug, Clone, Copy)]
pub struct CullingEntry {
    /// Owning scene node
    pub node: SceneNodeId,
    /// Category of the object
    pub category: CullingCategory,
    /// Bounds in node space
    pub local_bounds: Aabb,
    /// Bounds in world space
    pub bounds: Aabb,
}

/// Simple list-based culling manager (no spatial optimization)
///
/// Performs linear search for all queries. Sufficient for small scenes
/// (<1000 objects).
#[derive(Debug, Default)]
pub struct SimpleCullingManager {
    entries: Vec<CullingEntry>,
}

impl SimpleCullingManager {
    /// Create a new empty culling manager
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of registered objects across all categories
    pub fn object_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether a node has an object of the given category registered
    pub fn contains(&self, node: SceneNodeId, category: CullingCategory) -> bool {
        self.entry(node, category).is_some()
    }

    /// World bounds of a registered object
    pub fn bounds(&self, node: SceneNodeId, category: CullingCategory) -> Option<Aabb> {
        self.entry(node, category).map(|e| e.bounds)
    }

    /// All objects whose world bounds intersect the query volume
    pub fn query_visible(&self, volume: &Aabb) -> Vec<(SceneNodeId, CullingCategory)> {
        self.entries
            .iter()
            .filter(|e| e.category.is_unbounded() || e.bounds.intersects(volume))
            .map(|e| (e.node, e.category))
            .collect()
    }

    /// All objects within a radius of a point
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<(SceneNodeId, CullingCategory)> {
        let radius_squared = radius * radius;
        self.entries
            .iter()
            .filter(|e| {
                if e.category.is_unbounded() {
                    return true;
                }
                let closest_point = Vec3::new(
                    e.bounds.min.x.max(center.x.min(e.bounds.max.x)),
                    e.bounds.min.y.max(center.y.min(e.bounds.max.y)),
                    e.bounds.min.z.max(center.z.min(e.bounds.max.z)),
                );
                (closest_point - center).magnitude_squared() <= radius_squared
            })
            .map(|e| (e.node, e.category))
            .collect()
    }

    /// Clear all registered objects
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry(&self, node: SceneNodeId, category: CullingCategory) -> Option<&CullingEntry> {
        self.entries.iter().find(|e| e.node == node && e.category == category)
    }

    fn add(&mut self, node: SceneNodeId, category: CullingCategory, local_bounds: Aabb, world: &Mat4) {
        if self.contains(node, category) {
            log::warn!("{category:?} of scene node {node} is already registered for culling");
            return;
        }
        let bounds = if category.is_unbounded() {
            local_bounds
        } else {
            local_bounds.transformed(world)
        };
        self.entries.push(CullingEntry { node, category, local_bounds, bounds });
    }

    fn remove(&mut self, node: SceneNodeId, category: CullingCategory) {
        self.entries.retain(|e| !(e.node == node && e.category == category));
    }

    fn update(&mut self, node: SceneNodeId, category: CullingCategory, world: &Mat4) {
        if category.is_unbounded() {
            return;
        }
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.node == node && e.category == category)
        {
            entry.bounds = entry.local_bounds.transformed(world);
        }
    }
}

impl CullingManager for SimpleCullingManager {
    fn add_model(&mut self, node: SceneNodeId, model: &ModelComponent, world: &Mat4) {
        self.add(node, CullingCategory::Model, model.local_bounds, world);
    }

    fn remove_model(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::Model);
    }

    fn update_model_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::Model, world);
    }

    fn add_point_light(&mut self, node: SceneNodeId, light: &PointLightComponent, world: &Mat4) {
        let local = Aabb::from_sphere(Vec3::zeros(), light.radius);
        self.add(node, CullingCategory::PointLight, local, world);
    }

    fn remove_point_light(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::PointLight);
    }

    fn update_point_light_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::PointLight, world);
    }

    fn add_spot_light(&mut self, node: SceneNodeId, light: &SpotLightComponent, world: &Mat4) {
        // Conservative: the sphere swept by the cone's reach
        let local = Aabb::from_sphere(Vec3::zeros(), light.length);
        self.add(node, CullingCategory::SpotLight, local, world);
    }

    fn remove_spot_light(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::SpotLight);
    }

    fn update_spot_light_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::SpotLight, world);
    }

    fn add_directional_light(&mut self, node: SceneNodeId, _light: &DirectionalLightComponent, world: &Mat4) {
        self.add(node, CullingCategory::DirectionalLight, Aabb::infinite(), world);
    }

    fn remove_directional_light(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::DirectionalLight);
    }

    fn update_directional_light_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::DirectionalLight, world);
    }

    fn add_ambient_light(&mut self, node: SceneNodeId, _light: &AmbientLightComponent) {
        self.add(node, CullingCategory::AmbientLight, Aabb::infinite(), &Mat4::identity());
    }

    fn remove_ambient_light(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::AmbientLight);
    }

    fn update_ambient_light_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::AmbientLight, world);
    }

    fn add_particle_system(&mut self, node: SceneNodeId, particles: &ParticleSystemComponent, world: &Mat4) {
        self.add(node, CullingCategory::ParticleSystem, particles.local_bounds, world);
    }

    fn remove_particle_system(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::ParticleSystem);
    }

    fn update_particle_system_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::ParticleSystem, world);
    }

    fn add_occluder(&mut self, node: SceneNodeId, occluder: &OccluderComponent, world: &Mat4) {
        let local = Aabb::from_center_extents(Vec3::zeros(), occluder.half_extents);
        self.add(node, CullingCategory::Occluder, local, world);
    }

    fn remove_occluder(&mut self, node: SceneNodeId) {
        self.remove(node, CullingCategory::Occluder);
    }

    fn update_occluder_transform(&mut self, node: SceneNodeId, world: &Mat4) {
        self.update(node, CullingCategory::Occluder, world);
    }
}
