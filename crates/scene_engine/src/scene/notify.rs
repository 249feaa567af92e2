//! Mutation notification hooks
//!
//! Each hook runs in a fixed order: stage on the state stack, update the
//! culling and physics managers, notify the script bridge, and finally fan
//! out to event handlers. Hooks never fail; a component that cannot be
//! registered is logged and skipped.

use crate::culling::CullingManager;
use crate::foundation::math::{Mat4, Transform};
use crate::physics::PhysicsManager;
use crate::scripting::ScriptEvent;
use crate::state_stack::StagedOperation;
use super::component::{Component, ComponentChangeFlags, ComponentKind};
use super::events::SceneEventHandler;
use super::node::{SceneNode, SceneNodeId};
use super::scene::Scene;

impl Scene {
    /// Record an operation if staging is enabled globally and on the node
    pub(super) fn stage(&mut self, id: SceneNodeId, operation: StagedOperation) {
        if !self.is_state_stack_staging_enabled {
            return;
        }
        let node_enabled = self
            .nodes
            .find_by_id(id)
            .is_some_and(SceneNode::is_state_stack_staging_enabled);
        if !node_enabled {
            return;
        }
        match operation {
            StagedOperation::Insert => self.state_stack.stage_insert(id),
            StagedOperation::Delete => self.state_stack.stage_delete(id),
            StagedOperation::Update => self.state_stack.stage_update(id),
        }
    }

    fn emit(&mut self, id: SceneNodeId, mut f: impl FnMut(&mut dyn SceneEventHandler, &SceneNode)) {
        let Some(node) = self.nodes.find_by_id(id) else {
            return;
        };
        self.event_handlers.for_each(|handler| f(handler, node));
    }

    fn subtree(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        let mut ids = vec![id];
        ids.extend(self.nodes.descendants(id));
        ids
    }

    pub(super) fn on_scene_node_added(&mut self, id: SceneNodeId) {
        self.stage(id, StagedOperation::Insert);

        let needs_update = self
            .nodes
            .find_by_id(id)
            .is_some_and(|node| self.update_manager.needs_update(node));
        if needs_update {
            self.update_manager.add_scene_node(id);
        }

        for kind in self.component_kinds_of(id) {
            self.on_scene_node_component_added(id, kind, false);
        }

        self.instantiate_script(id);
        self.fire_script_startup(id);

        self.emit(id, |handler, node| handler.on_scene_node_added(node));
    }

    pub(super) fn on_scene_node_removed(&mut self, id: SceneNodeId) {
        self.stage(id, StagedOperation::Delete);

        self.fire_script_shutdown(id);

        let components: Vec<Component> = self
            .nodes
            .find_by_id(id)
            .map(|node| node.components().to_vec())
            .unwrap_or_default();
        for component in &components {
            self.on_scene_node_component_removed(id, component, false);
        }

        self.uninstantiate_script(id);
        self.update_manager.remove_scene_node(id);
        self.forget_camera(id);

        self.emit(id, |handler, node| handler.on_scene_node_removed(node));
    }

    pub(super) fn on_scene_node_transform(&mut self, id: SceneNodeId, update_dynamics_object: bool) {
        self.stage(id, StagedOperation::Update);

        let subtree = self.subtree(id);
        // Physics only owns the moved node's body; descendants still follow it.
        for node in &subtree {
            self.sync_transform(*node, update_dynamics_object || *node != id);
        }
        for node in &subtree {
            self.emit(*node, |handler, node| handler.on_scene_node_transform(node));
        }
    }

    pub(super) fn on_scene_node_scale(&mut self, id: SceneNodeId) {
        self.stage(id, StagedOperation::Update);

        let subtree = self.subtree(id);
        for node in &subtree {
            self.sync_transform(*node, false);
            self.rebuild_physics(*node);
        }
        for node in &subtree {
            self.emit(*node, |handler, node| handler.on_scene_node_scale(node));
        }
    }

    pub(super) fn on_scene_node_name_changed(&mut self, id: SceneNodeId, previous_name: &str) {
        self.stage(id, StagedOperation::Update);
        self.emit(id, |handler, node| handler.on_scene_node_name_changed(node, previous_name));
    }

    pub(super) fn on_scene_node_parent_changed(&mut self, id: SceneNodeId, previous_parent: Option<SceneNodeId>) {
        self.stage(id, StagedOperation::Update);

        let subtree = self.subtree(id);
        for node in &subtree {
            self.sync_transform(*node, true);
        }
        self.emit(id, |handler, node| handler.on_scene_node_parent_changed(node, previous_parent));
        for node in &subtree {
            self.emit(*node, |handler, node| handler.on_scene_node_transform(node));
        }
    }

    pub(super) fn on_scene_node_show(&mut self, id: SceneNodeId) {
        self.stage(id, StagedOperation::Update);

        if let Some(world) = self.nodes.world_transform(id) {
            let matrix = world.to_matrix();
            if let Some(node) = self.nodes.find_by_id(id) {
                for component in node.components() {
                    add_to_culling(self.culling.as_mut(), id, component, &matrix);
                }
            }
        }

        self.post_script_event(id, ScriptEvent::Show);
        self.emit(id, |handler, node| handler.on_scene_node_show(node));
    }

    pub(super) fn on_scene_node_hide(&mut self, id: SceneNodeId) {
        self.stage(id, StagedOperation::Update);

        for kind in self.component_kinds_of(id) {
            remove_from_culling(self.culling.as_mut(), id, kind);
        }

        self.post_script_event(id, ScriptEvent::Hide);
        self.emit(id, |handler, node| handler.on_scene_node_hide(node));
    }

    /// Register a component that is already attached to the node
    ///
    /// With `post_events` off this is the bulk registration done while the
    /// node itself joins the scene, which has its own staging and event.
    pub(super) fn on_scene_node_component_added(&mut self, id: SceneNodeId, kind: ComponentKind, post_events: bool) {
        if post_events {
            self.stage(id, StagedOperation::Update);
        }

        self.register_component_with_systems(id, kind);

        if post_events {
            self.refresh_update_registration(id);
            if kind == ComponentKind::Script {
                self.instantiate_script(id);
                self.fire_script_startup(id);
            }
            self.emit(id, |handler, node| {
                if let Some(component) = node.component(kind) {
                    handler.on_scene_node_component_added(node, component);
                }
            });
        }
    }

    /// Unregister a component; it may already be detached from the node
    pub(super) fn on_scene_node_component_removed(&mut self, id: SceneNodeId, component: &Component, post_events: bool) {
        let kind = component.kind();
        if post_events {
            self.stage(id, StagedOperation::Update);
            if kind == ComponentKind::Script {
                self.fire_script_shutdown(id);
            }
        }

        self.unregister_component_from_systems(id, component);

        if post_events {
            if kind == ComponentKind::Script {
                if let Some(script) = self.script.as_mut() {
                    script.uninstantiate_scene_node(id);
                }
            }
            if kind == ComponentKind::Camera {
                self.forget_camera(id);
            }
            self.refresh_update_registration(id);
            self.emit(id, |handler, node| handler.on_scene_node_component_removed(node, component));
        }
    }

    pub(super) fn on_scene_node_component_changed(
        &mut self,
        id: SceneNodeId,
        previous: &Component,
        flags: ComponentChangeFlags,
    ) {
        let kind = previous.kind();
        self.stage(id, StagedOperation::Update);

        self.unregister_component_from_systems(id, previous);
        self.register_component_with_systems(id, kind);
        self.refresh_update_registration(id);

        self.emit(id, |handler, node| {
            if let Some(component) = node.component(kind) {
                handler.on_scene_node_component_changed(node, component, flags);
            }
        });
    }

    fn component_kinds_of(&self, id: SceneNodeId) -> Vec<ComponentKind> {
        self.nodes
            .find_by_id(id)
            .map(SceneNode::component_kinds)
            .unwrap_or_default()
    }

    fn register_component_with_systems(&mut self, id: SceneNodeId, kind: ComponentKind) {
        if kind == ComponentKind::ParticleSystem {
            let gravity = self.physics.gravity();
            if let Some(Component::ParticleSystem(particles)) =
                self.nodes.find_by_id_mut(id).and_then(|node| node.component_mut(kind))
            {
                particles.gravity = gravity;
                if particles.play_on_startup {
                    particles.is_playing = true;
                }
            }
        }

        let Some(world) = self.nodes.world_transform(id) else {
            return;
        };
        let Some(node) = self.nodes.find_by_id(id) else {
            return;
        };
        let Some(component) = node.component(kind) else {
            log::warn!("Scene node {id} has no {} component to register", kind.name());
            return;
        };

        if node.is_visible() {
            add_to_culling(self.culling.as_mut(), id, component, &world.to_matrix());
        }
        add_to_physics(self.physics.as_mut(), id, component, &world);
        if let Some(script) = self.script.as_mut() {
            script.register_component(node, kind);
        }
    }

    fn unregister_component_from_systems(&mut self, id: SceneNodeId, component: &Component) {
        let visible = self.nodes.find_by_id(id).is_some_and(SceneNode::is_visible);
        if visible {
            remove_from_culling(self.culling.as_mut(), id, component.kind());
        }
        remove_from_physics(self.physics.as_mut(), id, component);
        if let Some(script) = self.script.as_mut() {
            script.unregister_component(id, component.kind());
        }
    }

    fn sync_transform(&mut self, id: SceneNodeId, update_dynamics_object: bool) {
        let Some(world) = self.nodes.world_transform(id) else {
            return;
        };
        let Some(node) = self.nodes.find_by_id(id) else {
            return;
        };
        let matrix = world.to_matrix();

        for component in node.components() {
            if node.is_visible() {
                update_culling_transform(self.culling.as_mut(), id, component.kind(), &matrix);
            }
            match component {
                Component::Dynamics(dynamics) if update_dynamics_object && !dynamics.collision_shapes.is_empty() => {
                    self.physics.update_rigid_body_transform(
                        id,
                        &world,
                        dynamics.collision_group,
                        dynamics.collision_mask,
                    );
                }
                Component::Proximity(proximity) if !proximity.collision_shapes.is_empty() => {
                    self.physics.update_ghost_object_transform(
                        id,
                        &world,
                        proximity.collision_group,
                        proximity.collision_mask,
                    );
                }
                _ => {}
            }
        }
    }

    /// Re-create physics proxies whose shapes depend on the node's scale
    fn rebuild_physics(&mut self, id: SceneNodeId) {
        let Some(world) = self.nodes.world_transform(id) else {
            return;
        };
        let Some(node) = self.nodes.find_by_id(id) else {
            return;
        };
        for component in node.components() {
            if matches!(component, Component::Dynamics(_) | Component::Proximity(_)) {
                remove_from_physics(self.physics.as_mut(), id, component);
                add_to_physics(self.physics.as_mut(), id, component, &world);
            }
        }
    }

    pub(super) fn refresh_update_registration(&mut self, id: SceneNodeId) {
        let Some(node) = self.nodes.find_by_id(id) else {
            return;
        };
        if self.update_manager.needs_update(node) {
            self.update_manager.add_scene_node(id);
        } else {
            self.update_manager.remove_scene_node(id);
        }
    }

    // --- Script bridge ---

    fn has_script_component(&self, id: SceneNodeId) -> bool {
        self.nodes
            .find_by_id(id)
            .is_some_and(|node| node.has_component(ComponentKind::Script))
    }

    pub(super) fn instantiate_script(&mut self, id: SceneNodeId) {
        let Some(script) = self.script.as_mut() else {
            return;
        };
        if let Some(node) = self.nodes.find_by_id(id) {
            if node.has_component(ComponentKind::Script) {
                script.instantiate_scene_node(node);
            }
        }
    }

    pub(super) fn uninstantiate_script(&mut self, id: SceneNodeId) {
        if !self.has_script_component(id) {
            return;
        }
        if let Some(script) = self.script.as_mut() {
            script.uninstantiate_scene_node(id);
        }
    }

    /// Post the startup event once per membership
    pub(super) fn fire_script_startup(&mut self, id: SceneNodeId) {
        if self.is_script_events_blocked {
            return;
        }
        let Some(script) = self.script.as_mut() else {
            return;
        };
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            return;
        };
        if node.script_started || !node.has_component(ComponentKind::Script) {
            return;
        }
        node.script_started = true;
        script.post_scene_node_event(id, ScriptEvent::Startup);
    }

    /// Post the shutdown event for a started node
    ///
    /// The started flag is cleared even while events are blocked, so the next
    /// membership starts again.
    pub(super) fn fire_script_shutdown(&mut self, id: SceneNodeId) {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            return;
        };
        if !node.script_started {
            return;
        }
        node.script_started = false;
        if self.is_script_events_blocked {
            return;
        }
        if let Some(script) = self.script.as_mut() {
            script.post_scene_node_event(id, ScriptEvent::Shutdown);
        }
    }

    /// Post an event to a node's script if scripting is live for it
    pub(super) fn post_script_event(&mut self, id: SceneNodeId, event: ScriptEvent) {
        if self.is_script_events_blocked || !self.has_script_component(id) {
            return;
        }
        if let Some(script) = self.script.as_mut() {
            script.post_scene_node_event(id, event);
        }
    }
}

fn add_to_culling(culling: &mut dyn CullingManager, id: SceneNodeId, component: &Component, world: &Mat4) {
    match component {
        Component::Model(model) => culling.add_model(id, model, world),
        Component::PointLight(light) => culling.add_point_light(id, light, world),
        Component::SpotLight(light) => culling.add_spot_light(id, light, world),
        Component::DirectionalLight(light) => culling.add_directional_light(id, light, world),
        Component::AmbientLight(light) => culling.add_ambient_light(id, light),
        Component::ParticleSystem(particles) => culling.add_particle_system(id, particles, world),
        Component::Occluder(occluder) => culling.add_occluder(id, occluder, world),
        Component::Dynamics(_)
        | Component::Proximity(_)
        | Component::Constraint(_)
        | Component::Script(_)
        | Component::Camera(_) => {}
    }
}

fn remove_from_culling(culling: &mut dyn CullingManager, id: SceneNodeId, kind: ComponentKind) {
    match kind {
        ComponentKind::Model => culling.remove_model(id),
        ComponentKind::PointLight => culling.remove_point_light(id),
        ComponentKind::SpotLight => culling.remove_spot_light(id),
        ComponentKind::DirectionalLight => culling.remove_directional_light(id),
        ComponentKind::AmbientLight => culling.remove_ambient_light(id),
        ComponentKind::ParticleSystem => culling.remove_particle_system(id),
        ComponentKind::Occluder => culling.remove_occluder(id),
        ComponentKind::Dynamics
        | ComponentKind::Proximity
        | ComponentKind::Constraint
        | ComponentKind::Script
        | ComponentKind::Camera => {}
    }
}

fn update_culling_transform(culling: &mut dyn CullingManager, id: SceneNodeId, kind: ComponentKind, world: &Mat4) {
    match kind {
        ComponentKind::Model => culling.update_model_transform(id, world),
        ComponentKind::PointLight => culling.update_point_light_transform(id, world),
        ComponentKind::SpotLight => culling.update_spot_light_transform(id, world),
        ComponentKind::DirectionalLight => culling.update_directional_light_transform(id, world),
        ComponentKind::AmbientLight => culling.update_ambient_light_transform(id, world),
        ComponentKind::ParticleSystem => culling.update_particle_system_transform(id, world),
        ComponentKind::Occluder => culling.update_occluder_transform(id, world),
        ComponentKind::Dynamics
        | ComponentKind::Proximity
        | ComponentKind::Constraint
        | ComponentKind::Script
        | ComponentKind::Camera => {}
    }
}

fn add_to_physics(physics: &mut dyn PhysicsManager, id: SceneNodeId, component: &Component, world: &Transform) {
    match component {
        Component::Dynamics(dynamics) => {
            if dynamics.collision_shapes.is_empty() {
                log::warn!("Dynamics component of scene node {id} has no collision shapes, rigid body skipped");
            } else {
                physics.add_rigid_body(id, dynamics, world);
            }
        }
        Component::Proximity(proximity) => {
            if proximity.collision_shapes.is_empty() {
                log::warn!("Proximity component of scene node {id} has no collision shapes, ghost object skipped");
            } else {
                physics.add_ghost_object(id, proximity, world);
            }
        }
        Component::Constraint(constraint) => {
            if constraint.other == Some(id) {
                log::warn!("Constraint of scene node {id} targets itself, skipped");
            } else {
                physics.add_constraint(id, constraint);
            }
        }
        _ => {}
    }
}

fn remove_from_physics(physics: &mut dyn PhysicsManager, id: SceneNodeId, component: &Component) {
    match component {
        Component::Dynamics(dynamics) if !dynamics.collision_shapes.is_empty() => physics.remove_rigid_body(id),
        Component::Proximity(proximity) if !proximity.collision_shapes.is_empty() => physics.remove_ghost_object(id),
        Component::Constraint(constraint) if constraint.other != Some(id) => physics.remove_constraint(id),
        _ => {}
    }
}
