//! Scene node components
//!
//! Components are a closed set of typed payloads. Dispatch on them is a
//! `match` over [`ComponentKind`], which also defines the canonical order in
//! which a node stores (and serializes) its components.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::culling::Aabb;
use crate::foundation::math::Vec3;
use crate::physics::{CollisionLayers, CollisionShape};
use super::node::SceneNodeId;

/// Discriminant of a [`Component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Renderable model
    Model,
    /// Omni-directional light
    PointLight,
    /// Cone light
    SpotLight,
    /// Infinitely distant light
    DirectionalLight,
    /// Constant ambient term
    AmbientLight,
    /// Particle emitter
    ParticleSystem,
    /// Visibility occluder volume
    Occluder,
    /// Rigid body simulated by the physics world
    Dynamics,
    /// Ghost object reporting overlaps only
    Proximity,
    /// Physics constraint to another node
    Constraint,
    /// Script-driven behaviour
    Script,
    /// Viewpoint
    Camera,
}

impl ComponentKind {
    /// Every kind, in canonical order
    pub const ALL: [Self; 12] = [
        Self::Model,
        Self::PointLight,
        Self::SpotLight,
        Self::DirectionalLight,
        Self::AmbientLight,
        Self::ParticleSystem,
        Self::Occluder,
        Self::Dynamics,
        Self::Proximity,
        Self::Constraint,
        Self::Script,
        Self::Camera,
    ];

    /// Stable display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::PointLight => "PointLight",
            Self::SpotLight => "SpotLight",
            Self::DirectionalLight => "DirectionalLight",
            Self::AmbientLight => "AmbientLight",
            Self::ParticleSystem => "ParticleSystem",
            Self::Occluder => "Occluder",
            Self::Dynamics => "Dynamics",
            Self::Proximity => "Proximity",
            Self::Constraint => "Constraint",
            Self::Script => "Script",
            Self::Camera => "Camera",
        }
    }
}

bitflags! {
    /// What changed in a component, passed along with change notifications
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentChangeFlags: u32 {
        /// Local bounds or extents
        const BOUNDS = 1 << 0;
        /// Color, intensity, shadow casting, asset path
        const APPEARANCE = 1 << 1;
        /// Collision shapes
        const SHAPES = 1 << 2;
        /// Collision group or mask
        const COLLISION_FILTER = 1 << 3;
        /// Mass or kinematic state
        const MASS = 1 << 4;
        /// Attached script sources
        const SCRIPT_SOURCES = 1 << 5;
        /// Particle playback state
        const PLAYBACK = 1 << 6;
    }
}

/// Renderable model component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComponent {
    /// Asset path of the model
    pub model_path: String,
    /// Bounds in model space
    pub local_bounds: Aabb,
    /// Whether the model casts shadows
    pub casts_shadow: bool,
}

impl ModelComponent {
    /// Create a model component with unit bounds
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }
}

impl Default for ModelComponent {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            local_bounds: Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)),
            casts_shadow: true,
        }
    }
}

/// Omni-directional light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLightComponent {
    /// Light color
    pub color: Vec3,
    /// Influence radius
    pub radius: f32,
    /// Whether the light casts shadows
    pub casts_shadow: bool,
}

impl Default for PointLightComponent {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            radius: 10.0,
            casts_shadow: false,
        }
    }
}

/// Cone light pointing down the node's local -Z axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotLightComponent {
    /// Light color
    pub color: Vec3,
    /// Reach of the cone
    pub length: f32,
    /// Inner cone angle in degrees
    pub inner_angle: f32,
    /// Outer cone angle in degrees
    pub outer_angle: f32,
    /// Whether the light casts shadows
    pub casts_shadow: bool,
}

impl Default for SpotLightComponent {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            length: 25.0,
            inner_angle: 30.0,
            outer_angle: 45.0,
            casts_shadow: false,
        }
    }
}

/// Infinitely distant light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLightComponent {
    /// Light color
    pub color: Vec3,
    /// Whether the light casts shadows
    pub casts_shadow: bool,
}

impl Default for DirectionalLightComponent {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            casts_shadow: true,
        }
    }
}

/// Constant ambient light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLightComponent {
    /// Light color
    pub color: Vec3,
}

impl Default for AmbientLightComponent {
    fn default() -> Self {
        Self {
            color: Vec3::new(0.25, 0.25, 0.25),
        }
    }
}

/// Particle emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSystemComponent {
    /// Asset path of the particle system definition
    pub particle_system_path: String,
    /// Start playing as soon as the node joins a scene
    pub play_on_startup: bool,
    /// Current playback state
    pub is_playing: bool,
    /// Gravity applied to particles, taken from the physics world
    pub gravity: Vec3,
    /// Bounds in emitter space
    pub local_bounds: Aabb,
}

impl Default for ParticleSystemComponent {
    fn default() -> Self {
        Self {
            particle_system_path: String::new(),
            play_on_startup: true,
            is_playing: false,
            gravity: Vec3::zeros(),
            local_bounds: Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)),
        }
    }
}

/// Occluder volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccluderComponent {
    /// Half size of the occluding box
    pub half_extents: Vec3,
}

impl Default for OccluderComponent {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        }
    }
}

/// Rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsComponent {
    /// Mass in kilograms; 0 means static
    pub mass: f32,
    /// Shapes making up the body; a body without shapes is not simulated
    pub collision_shapes: Vec<CollisionShape>,
    /// Collision group the body belongs to
    pub collision_group: u32,
    /// Groups the body collides with
    pub collision_mask: u32,
    /// Body is moved by its scene node rather than simulated
    pub is_kinematic: bool,
}

impl Default for DynamicsComponent {
    fn default() -> Self {
        Self {
            mass: 1.0,
            collision_shapes: Vec::new(),
            collision_group: CollisionLayers::DEFAULT,
            collision_mask: CollisionLayers::ALL,
            is_kinematic: false,
        }
    }
}

/// Ghost object reporting overlaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityComponent {
    /// Shapes making up the volume
    pub collision_shapes: Vec<CollisionShape>,
    /// Collision group the volume belongs to
    pub collision_group: u32,
    /// Groups the volume reports overlaps with
    pub collision_mask: u32,
}

impl Default for ProximityComponent {
    fn default() -> Self {
        Self {
            collision_shapes: Vec::new(),
            collision_group: CollisionLayers::SENSOR,
            collision_mask: CollisionLayers::ALL,
        }
    }
}

/// Constraint type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Ball and socket
    #[default]
    Point,
    /// Single rotation axis
    Hinge,
    /// No relative motion
    Fixed,
}

/// Physics constraint between this node's body and another node's body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstraintComponent {
    /// Constraint type
    pub kind: ConstraintKind,
    /// Node whose body is constrained against this one; `None` pins to the world
    pub other: Option<SceneNodeId>,
}

/// Script-driven behaviour
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScriptComponent {
    /// Script sources attached to the node
    pub script_paths: Vec<String>,
}

impl ScriptComponent {
    /// Create a script component with one source
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            script_paths: vec![path.into()],
        }
    }
}

/// Viewpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// A component attached to a scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    /// Renderable model
    Model(ModelComponent),
    /// Omni-directional light
    PointLight(PointLightComponent),
    /// Cone light
    SpotLight(SpotLightComponent),
    /// Infinitely distant light
    DirectionalLight(DirectionalLightComponent),
    /// Constant ambient term
    AmbientLight(AmbientLightComponent),
    /// Particle emitter
    ParticleSystem(ParticleSystemComponent),
    /// Occluder volume
    Occluder(OccluderComponent),
    /// Rigid body
    Dynamics(DynamicsComponent),
    /// Ghost object
    Proximity(ProximityComponent),
    /// Physics constraint
    Constraint(ConstraintComponent),
    /// Script behaviour
    Script(ScriptComponent),
    /// Viewpoint
    Camera(CameraComponent),
}

impl Component {
    /// Discriminant of this component
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Model(_) => ComponentKind::Model,
            Self::PointLight(_) => ComponentKind::PointLight,
            Self::SpotLight(_) => ComponentKind::SpotLight,
            Self::DirectionalLight(_) => ComponentKind::DirectionalLight,
            Self::AmbientLight(_) => ComponentKind::AmbientLight,
            Self::ParticleSystem(_) => ComponentKind::ParticleSystem,
            Self::Occluder(_) => ComponentKind::Occluder,
            Self::Dynamics(_) => ComponentKind::Dynamics,
            Self::Proximity(_) => ComponentKind::Proximity,
            Self::Constraint(_) => ComponentKind::Constraint,
            Self::Script(_) => ComponentKind::Script,
            Self::Camera(_) => ComponentKind::Camera,
        }
    }

    /// Stable display name of this component's kind
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }
}

macro_rules! impl_component_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(component: $ty) -> Self {
                    Self::$variant(component)
                }
            }
        )*
    };
}

impl_component_from! {
    Model => ModelComponent,
    PointLight => PointLightComponent,
    SpotLight => SpotLightComponent,
    DirectionalLight => DirectionalLightComponent,
    AmbientLight => AmbientLightComponent,
    ParticleSystem => ParticleSystemComponent,
    Occluder => OccluderComponent,
    Dynamics => DynamicsComponent,
    Proximity => ProximityComponent,
    Constraint => ConstraintComponent,
    Script => ScriptComponent,
    Camera => CameraComponent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_matches_all() {
        let mut sorted = ComponentKind::ALL;
        sorted.sort();
        assert_eq!(sorted, ComponentKind::ALL);
    }

    #[test]
    fn test_from_conversion_sets_kind() {
        let component: Component = DynamicsComponent::default().into();
        assert_eq!(component.kind(), ComponentKind::Dynamics);
        assert_eq!(component.name(), "Dynamics");
    }
}
