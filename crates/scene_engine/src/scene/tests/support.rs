//! Recording doubles for the systems a scene drives

use std::cell::RefCell;
use std::rc::Rc;

use crate::culling::CullingManager;
use crate::foundation::math::{Mat4, Transform};
use crate::physics::PhysicsManager;
use crate::scene::component::{
    AmbientLightComponent, ConstraintComponent, DirectionalLightComponent, DynamicsComponent, ModelComponent,
    OccluderComponent, ParticleSystemComponent, PointLightComponent, ProximityComponent, SpotLightComponent,
};
use crate::scene::{Component, ComponentChangeFlags, ComponentKind, Scene, SceneEventHandler, SceneNode, SceneNodeId};
use crate::scripting::{ScriptBridge, ScriptEvent};

pub type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, entry: String) {
    log.borrow_mut().push(entry);
}

/// Number of entries equal to `entry`
pub fn count(log: &Log, entry: &str) -> usize {
    log.borrow().iter().filter(|e| *e == entry).count()
}

/// Entries starting with `prefix`, in order
pub fn entries(log: &Log, prefix: &str) -> Vec<String> {
    log.borrow().iter().filter(|e| e.starts_with(prefix)).cloned().collect()
}

pub struct RecordingCulling(pub Log);

impl CullingManager for RecordingCulling {
    fn add_model(&mut self, node: SceneNodeId, _model: &ModelComponent, _world: &Mat4) {
        push(&self.0, format!("add_model {node}"));
    }
    fn remove_model(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_model {node}"));
    }
    fn update_model_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_model {node}"));
    }

    fn add_point_light(&mut self, node: SceneNodeId, _light: &PointLightComponent, _world: &Mat4) {
        push(&self.0, format!("add_point_light {node}"));
    }
    fn remove_point_light(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_point_light {node}"));
    }
    fn update_point_light_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_point_light {node}"));
    }

    fn add_spot_light(&mut self, node: SceneNodeId, _light: &SpotLightComponent, _world: &Mat4) {
        push(&self.0, format!("add_spot_light {node}"));
    }
    fn remove_spot_light(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_spot_light {node}"));
    }
    fn update_spot_light_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_spot_light {node}"));
    }

    fn add_directional_light(&mut self, node: SceneNodeId, _light: &DirectionalLightComponent, _world: &Mat4) {
        push(&self.0, format!("add_directional_light {node}"));
    }
    fn remove_directional_light(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_directional_light {node}"));
    }
    fn update_directional_light_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_directional_light {node}"));
    }

    fn add_ambient_light(&mut self, node: SceneNodeId, _light: &AmbientLightComponent) {
        push(&self.0, format!("add_ambient_light {node}"));
    }
    fn remove_ambient_light(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_ambient_light {node}"));
    }
    fn update_ambient_light_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_ambient_light {node}"));
    }

    fn add_particle_system(&mut self, node: SceneNodeId, _particles: &ParticleSystemComponent, _world: &Mat4) {
        push(&self.0, format!("add_particle_system {node}"));
    }
    fn remove_particle_system(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_particle_system {node}"));
    }
    fn update_particle_system_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_particle_system {node}"));
    }

    fn add_occluder(&mut self, node: SceneNodeId, _occluder: &OccluderComponent, _world: &Mat4) {
        push(&self.0, format!("add_occluder {node}"));
    }
    fn remove_occluder(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_occluder {node}"));
    }
    fn update_occluder_transform(&mut self, node: SceneNodeId, _world: &Mat4) {
        push(&self.0, format!("update_occluder {node}"));
    }
}

pub struct RecordingPhysics(pub Log);

impl PhysicsManager for RecordingPhysics {
    fn add_rigid_body(&mut self, node: SceneNodeId, _dynamics: &DynamicsComponent, _world: &Transform) {
        push(&self.0, format!("add_rigid_body {node}"));
    }
    fn remove_rigid_body(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_rigid_body {node}"));
    }
    fn update_rigid_body_transform(&mut self, node: SceneNodeId, _world: &Transform, _group: u32, _mask: u32) {
        push(&self.0, format!("update_rigid_body {node}"));
    }

    fn add_ghost_object(&mut self, node: SceneNodeId, _proximity: &ProximityComponent, _world: &Transform) {
        push(&self.0, format!("add_ghost_object {node}"));
    }
    fn remove_ghost_object(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_ghost_object {node}"));
    }
    fn update_ghost_object_transform(&mut self, node: SceneNodeId, _world: &Transform, _group: u32, _mask: u32) {
        push(&self.0, format!("update_ghost_object {node}"));
    }

    fn add_constraint(&mut self, node: SceneNodeId, _constraint: &ConstraintComponent) {
        push(&self.0, format!("add_constraint {node}"));
    }
    fn remove_constraint(&mut self, node: SceneNodeId) {
        push(&self.0, format!("remove_constraint {node}"));
    }
}

pub struct RecordingScript(pub Log);

impl ScriptBridge for RecordingScript {
    fn instantiate_scene_node(&mut self, node: &SceneNode) {
        push(&self.0, format!("instantiate {}", node.id()));
    }
    fn uninstantiate_scene_node(&mut self, node: SceneNodeId) {
        push(&self.0, format!("uninstantiate {node}"));
    }
    fn register_component(&mut self, node: &SceneNode, kind: ComponentKind) {
        push(&self.0, format!("register {} {}", node.id(), kind.name()));
    }
    fn unregister_component(&mut self, node: SceneNodeId, kind: ComponentKind) {
        push(&self.0, format!("unregister {node} {}", kind.name()));
    }
    fn post_scene_node_event(&mut self, node: SceneNodeId, event: ScriptEvent) {
        push(&self.0, format!("{} {node}", event.callback_name()));
    }
}

pub struct RecordingHandler(pub Log);

impl SceneEventHandler for RecordingHandler {
    fn on_scene_node_added(&mut self, node: &SceneNode) {
        push(&self.0, format!("added {}", node.name()));
    }
    fn on_scene_node_removed(&mut self, node: &SceneNode) {
        push(&self.0, format!("removed {}", node.name()));
    }
    fn on_scene_node_name_changed(&mut self, node: &SceneNode, previous_name: &str) {
        push(&self.0, format!("renamed {previous_name} -> {}", node.name()));
    }
    fn on_scene_node_parent_changed(&mut self, node: &SceneNode, _previous_parent: Option<SceneNodeId>) {
        push(&self.0, format!("parent_changed {}", node.name()));
    }
    fn on_scene_node_transform(&mut self, node: &SceneNode) {
        push(&self.0, format!("transform {}", node.name()));
    }
    fn on_scene_node_scale(&mut self, node: &SceneNode) {
        push(&self.0, format!("scale {}", node.name()));
    }
    fn on_scene_node_show(&mut self, node: &SceneNode) {
        push(&self.0, format!("show {}", node.name()));
    }
    fn on_scene_node_hide(&mut self, node: &SceneNode) {
        push(&self.0, format!("hide {}", node.name()));
    }
    fn on_scene_node_component_added(&mut self, node: &SceneNode, component: &Component) {
        push(&self.0, format!("component_added {} {}", node.name(), component.name()));
    }
    fn on_scene_node_component_removed(&mut self, node: &SceneNode, component: &Component) {
        push(&self.0, format!("component_removed {} {}", node.name(), component.name()));
    }
    fn on_scene_node_component_changed(&mut self, node: &SceneNode, component: &Component, _flags: ComponentChangeFlags) {
        push(&self.0, format!("component_changed {} {}", node.name(), component.name()));
    }
    fn on_state_stack_frame_committed(&mut self) {
        push(&self.0, "committed".to_owned());
    }
}

/// Logs of every recording double attached to a scene
#[derive(Default)]
pub struct Recorder {
    pub culling: Log,
    pub physics: Log,
    pub script: Log,
    pub events: Log,
}

/// Scene wired to recording culling, physics and event handler doubles
pub fn recording_scene() -> (Scene, Recorder) {
    let recorder = Recorder::default();
    let mut scene = Scene::new()
        .with_culling_manager(Box::new(RecordingCulling(recorder.culling.clone())))
        .with_physics_manager(Box::new(RecordingPhysics(recorder.physics.clone())));
    scene.attach_event_handler(Box::new(RecordingHandler(recorder.events.clone())));
    (scene, recorder)
}

/// Register a recording script bridge
pub fn register_recording_script(scene: &mut Scene, recorder: &Recorder) {
    scene.register_script(Box::new(RecordingScript(recorder.script.clone())));
}
