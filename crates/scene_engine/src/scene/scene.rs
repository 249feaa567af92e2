//! Scene aggregate root

use thiserror::Error;

use crate::config::SceneConfig;
use crate::culling::{CullingManager, SimpleCullingManager};
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::physics::{PhysicsManager, SimplePhysicsWorld};
use crate::scripting::{ScriptBridge, ScriptEvent};
use crate::state_stack::{SceneStateStack, StagedOperation};
use super::component::{Component, ComponentChangeFlags, ComponentKind};
use super::container::SceneNodeContainer;
use super::events::{EventHandlerId, EventHandlers, SceneEventHandler};
use super::id_allocator::SceneNodeIdAllocator;
use super::navigation::NavigationMesh;
use super::node::{NodeOwnership, SceneId, SceneNode, SceneNodeFlags, SceneNodeId};
use super::update_manager::{DefaultUpdateManager, UpdateManager};
use super::viewport::{SceneViewport, ViewportId};

/// Scene-wide presentation settings
#[derive(Debug, Clone, PartialEq)]
pub struct SceneProperties {
    /// Display name
    pub name: String,
    /// Clear the background before rendering
    pub background_clear: bool,
    /// Background clear color
    pub background_clear_color: Vec3,
    /// Render in high dynamic range
    pub enable_hdr: bool,
    /// Apply bloom
    pub enable_bloom: bool,
}

impl Default for SceneProperties {
    fn default() -> Self {
        Self::from(&SceneConfig::default())
    }
}

impl From<&SceneConfig> for SceneProperties {
    fn from(config: &SceneConfig) -> Self {
        let [r, g, b] = config.background_clear_color;
        Self {
            name: config.name.clone(),
            background_clear: config.background_clear,
            background_clear_color: Vec3::new(r, g, b),
            enable_hdr: config.enable_hdr,
            enable_bloom: config.enable_bloom,
        }
    }
}

/// Why a node was rejected by [`Scene::add_scene_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddSceneNodeErrorKind {
    /// The node (or one of its detached children) already belongs to a scene
    #[error("scene node already belongs to a scene")]
    AlreadyInScene,
    /// An explicitly requested ID is already used
    #[error("scene node ID {0} is already in use")]
    IdCollision(SceneNodeId),
}

/// Rejected insertion; carries the untouched node back to the caller
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct AddSceneNodeError {
    kind: AddSceneNodeErrorKind,
    node: Box<SceneNode>,
}

impl AddSceneNodeError {
    fn new(kind: AddSceneNodeErrorKind, node: SceneNode) -> Self {
        Self { kind, node: Box::new(node) }
    }

    /// Why the node was rejected
    pub fn kind(&self) -> AddSceneNodeErrorKind {
        self.kind
    }

    /// The rejected node
    pub fn node(&self) -> &SceneNode {
        &self.node
    }

    /// Take the rejected node back
    pub fn into_node(self) -> SceneNode {
        *self.node
    }
}

/// Scene aggregate root
///
/// Owns the scene nodes, their undo/redo history and the systems that mirror
/// them. Every mutation of a node that is part of the scene goes through a
/// method on this type, which runs the matching notification hook.
pub struct Scene {
    pub(super) id: SceneId,
    pub(super) properties: SceneProperties,
    pub(super) nodes: SceneNodeContainer,
    pub(super) id_allocator: SceneNodeIdAllocator,
    pub(super) state_stack: SceneStateStack,
    pub(super) is_state_stack_staging_enabled: bool,
    pub(super) culling: Box<dyn CullingManager>,
    pub(super) physics: Box<dyn PhysicsManager>,
    pub(super) update_manager: Box<dyn UpdateManager>,
    pub(super) script: Option<Box<dyn ScriptBridge>>,
    pub(super) is_script_events_blocked: bool,
    pub(super) event_handlers: EventHandlers,
    pub(super) default_viewport: SceneViewport,
    pub(super) viewports: Vec<(ViewportId, SceneViewport)>,
    pub(super) next_viewport_id: u32,
    pub(super) navigation_mesh: NavigationMesh,
    pub(super) released_nodes: Vec<SceneNode>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with default settings
    pub fn new() -> Self {
        Self::with_config(&SceneConfig::default())
    }

    /// Create an empty scene from configuration
    pub fn with_config(config: &SceneConfig) -> Self {
        log::debug!("Creating scene '{}'", config.name);
        Self {
            id: SceneId::next(),
            properties: SceneProperties::from(config),
            nodes: SceneNodeContainer::new(),
            id_allocator: SceneNodeIdAllocator::with_min_auto_id(config.min_auto_scene_node_id),
            state_stack: SceneStateStack::new(),
            is_state_stack_staging_enabled: config.state_stack_staging_enabled,
            culling: Box::new(SimpleCullingManager::new()),
            physics: Box::new(SimplePhysicsWorld::new()),
            update_manager: Box::new(DefaultUpdateManager::new()),
            script: None,
            is_script_events_blocked: config.script_events_blocked,
            event_handlers: EventHandlers::default(),
            default_viewport: SceneViewport::default(),
            viewports: Vec::new(),
            next_viewport_id: 0,
            navigation_mesh: NavigationMesh::default(),
            released_nodes: Vec::new(),
        }
    }

    /// Replace the culling manager; must be called before nodes are added
    pub fn with_culling_manager(mut self, culling: Box<dyn CullingManager>) -> Self {
        debug_assert!(self.nodes.is_empty(), "culling manager replaced on a populated scene");
        self.culling = culling;
        self
    }

    /// Replace the physics manager; must be called before nodes are added
    pub fn with_physics_manager(mut self, physics: Box<dyn PhysicsManager>) -> Self {
        debug_assert!(self.nodes.is_empty(), "physics manager replaced on a populated scene");
        self.physics = physics;
        self
    }

    /// Replace the update manager; must be called before nodes are added
    pub fn with_update_manager(mut self, update_manager: Box<dyn UpdateManager>) -> Self {
        debug_assert!(self.nodes.is_empty(), "update manager replaced on a populated scene");
        self.update_manager = update_manager;
        self
    }

    /// Identity used as the back-reference of member nodes
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Presentation settings
    pub fn properties(&self) -> &SceneProperties {
        &self.properties
    }

    /// Replace the presentation settings
    pub fn set_properties(&mut self, properties: SceneProperties) {
        self.properties = properties;
    }

    /// Navigation mesh settings
    pub fn navigation_mesh(&self) -> &NavigationMesh {
        &self.navigation_mesh
    }

    /// Replace the navigation mesh settings
    pub fn set_navigation_mesh(&mut self, navigation_mesh: NavigationMesh) {
        self.navigation_mesh = navigation_mesh;
    }

    /// Culling manager fed by this scene
    pub fn culling_manager(&self) -> &dyn CullingManager {
        self.culling.as_ref()
    }

    /// Physics manager fed by this scene
    pub fn physics_manager(&self) -> &dyn PhysicsManager {
        self.physics.as_ref()
    }

    /// Update manager fed by this scene
    pub fn update_manager(&self) -> &dyn UpdateManager {
        self.update_manager.as_ref()
    }

    // --- Nodes ---

    /// The node container
    pub fn scene_nodes(&self) -> &SceneNodeContainer {
        &self.nodes
    }

    /// Look up a node by ID
    pub fn scene_node(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.find_by_id(id)
    }

    /// First node with the given name
    pub fn find_scene_node_by_name(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.find_by_name(name)
    }

    /// Number of nodes
    pub fn scene_node_count(&self) -> usize {
        self.nodes.count()
    }

    /// Node at an insertion-order index
    pub fn scene_node_at(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get_at_index(index)
    }

    /// World transform of a node
    pub fn scene_node_world_transform(&self, id: SceneNodeId) -> Option<Transform> {
        self.nodes.world_transform(id)
    }

    /// Last automatically generated node ID
    pub fn next_scene_node_id(&self) -> u64 {
        self.id_allocator.next_id()
    }

    /// Floor for automatically generated node IDs
    pub fn min_auto_scene_node_id(&self) -> u64 {
        self.id_allocator.min_auto_id()
    }

    /// Change the floor for automatically generated node IDs
    pub fn set_min_auto_scene_node_id(&mut self, min_auto_id: u64) {
        self.id_allocator.set_min_auto_id(min_auto_id);
    }

    pub(super) fn generate_scene_node_id(&mut self) -> SceneNodeId {
        loop {
            let id = self.id_allocator.generate();
            if !self.nodes.contains(id) {
                return id;
            }
            log::debug!("Skipping automatic scene node ID {id}, already in use");
        }
    }

    /// Add a node and its detached children to the scene
    ///
    /// Nodes without an ID get one generated. Fails without touching the
    /// scene if any node of the subtree already belongs to a scene or
    /// requests an ID that is taken.
    pub fn add_scene_node(&mut self, node: SceneNode) -> Result<SceneNodeId, AddSceneNodeError> {
        if let Err(kind) = self.validate_subtree(&node) {
            log::error!("Cannot add scene node '{}' ({}): {kind}", node.name(), node.id());
            return Err(AddSceneNodeError::new(kind, node));
        }
        Ok(self.insert_scene_node(node, None))
    }

    fn validate_subtree(&self, root: &SceneNode) -> Result<(), AddSceneNodeErrorKind> {
        let mut requested = std::collections::HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_in_scene() {
                return Err(AddSceneNodeErrorKind::AlreadyInScene);
            }
            let id = node.id();
            if id.is_assigned() && (self.nodes.contains(id) || !requested.insert(id)) {
                return Err(AddSceneNodeErrorKind::IdCollision(id));
            }
            stack.extend(node.detached_children());
        }
        Ok(())
    }

    /// Insert a validated node under `parent`, then its detached children
    pub(super) fn insert_scene_node(&mut self, mut node: SceneNode, parent: Option<SceneNodeId>) -> SceneNodeId {
        let children = std::mem::take(&mut node.detached_children);
        if !node.id.is_assigned() {
            node.id = self.generate_scene_node_id();
        }
        let id = node.id;

        node.parent = parent.filter(|p| self.nodes.contains(*p));
        node.children.clear();
        node.scene = Some(self.id);
        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.nodes.find_by_id_mut(parent) {
                parent_node.children.push(id);
            }
        }

        log::trace!("Adding scene node '{}' ({id})", node.name());
        self.nodes.insert(node);
        self.on_scene_node_added(id);

        for child in children {
            self.insert_scene_node(child, Some(id));
        }
        id
    }

    /// Create a node owned by the scene; it is dropped when removed
    pub fn create_new_scene_node(&mut self, name: impl Into<String>) -> SceneNodeId {
        let mut node = SceneNode::with_name(name);
        node.ownership = NodeOwnership::Owned;
        self.insert_scene_node(node, None)
    }

    /// Remove a node and all of its descendants
    ///
    /// Nodes the scene created are dropped. Externally created nodes are
    /// returned, children before parents, with their hierarchy links cleared.
    pub fn remove_scene_node(&mut self, id: SceneNodeId) -> Vec<SceneNode> {
        let Some(node) = self.nodes.find_by_id(id) else {
            log::warn!("Cannot remove scene node {id}: not part of this scene");
            return Vec::new();
        };
        let parent = node.parent();

        let mut released = Vec::new();
        self.remove_scene_node_tree(id, &mut released);

        if let Some(parent_node) = parent.and_then(|p| self.nodes.find_by_id_mut(p)) {
            parent_node.children.retain(|c| *c != id);
        }
        released
    }

    pub(super) fn remove_scene_node_tree(&mut self, id: SceneNodeId, released: &mut Vec<SceneNode>) {
        let children = self
            .nodes
            .find_by_id(id)
            .map(|n| n.children().to_vec())
            .unwrap_or_default();
        for child in children.into_iter().rev() {
            self.remove_scene_node_tree(child, released);
        }

        self.on_scene_node_removed(id);

        if let Some(mut node) = self.nodes.remove(id) {
            log::trace!("Removed scene node '{}' ({id})", node.name());
            node.scene = None;
            match node.ownership {
                NodeOwnership::Owned => {}
                NodeOwnership::Borrowed => {
                    node.parent = None;
                    node.children.clear();
                    released.push(node);
                }
            }
        }
    }

    /// Externally created nodes removed by state stack replay or loading
    pub fn drain_released_scene_nodes(&mut self) -> Vec<SceneNode> {
        std::mem::take(&mut self.released_nodes)
    }

    // --- Node mutation ---

    /// Rename a node
    pub fn set_scene_node_name(&mut self, id: SceneNodeId, name: impl Into<String>) -> bool {
        let Some(previous) = self.nodes.rename(id, name.into()) else {
            log::warn!("Cannot rename scene node {id}: not part of this scene");
            return false;
        };
        self.on_scene_node_name_changed(id, &previous);
        true
    }

    /// Set a node's local transform
    pub fn set_scene_node_transform(&mut self, id: SceneNodeId, transform: Transform) -> bool {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot move scene node {id}: not part of this scene");
            return false;
        };
        let previous = std::mem::replace(&mut node.transform, transform);
        let moved = previous.position != node.transform.position || previous.rotation != node.transform.rotation;
        let scaled = previous.scale != node.transform.scale;

        if moved {
            self.on_scene_node_transform(id, true);
        }
        if scaled {
            self.on_scene_node_scale(id);
        }
        true
    }

    /// Set a node's local position
    pub fn set_scene_node_position(&mut self, id: SceneNodeId, position: Vec3) -> bool {
        let Some(node) = self.nodes.find_by_id(id) else {
            log::warn!("Cannot move scene node {id}: not part of this scene");
            return false;
        };
        let transform = Transform { position, ..node.transform().clone() };
        self.set_scene_node_transform(id, transform)
    }

    /// Set a node's local rotation
    pub fn set_scene_node_rotation(&mut self, id: SceneNodeId, rotation: Quat) -> bool {
        let Some(node) = self.nodes.find_by_id(id) else {
            log::warn!("Cannot rotate scene node {id}: not part of this scene");
            return false;
        };
        let transform = Transform { rotation, ..node.transform().clone() };
        self.set_scene_node_transform(id, transform)
    }

    /// Set a node's local scale
    pub fn set_scene_node_scale(&mut self, id: SceneNodeId, scale: Vec3) -> bool {
        let Some(node) = self.nodes.find_by_id(id) else {
            log::warn!("Cannot scale scene node {id}: not part of this scene");
            return false;
        };
        let transform = Transform { scale, ..node.transform().clone() };
        self.set_scene_node_transform(id, transform)
    }

    /// Apply a transform computed by the physics step
    ///
    /// The rigid body already holds this transform, so it is not pushed back.
    pub fn set_scene_node_transform_from_physics(&mut self, id: SceneNodeId, transform: Transform) -> bool {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot move scene node {id}: not part of this scene");
            return false;
        };
        node.transform.position = transform.position;
        node.transform.rotation = transform.rotation;
        self.on_scene_node_transform(id, false);
        true
    }

    /// Make a node visible
    pub fn show_scene_node(&mut self, id: SceneNodeId) -> bool {
        self.set_scene_node_visible(id, true)
    }

    /// Hide a node
    pub fn hide_scene_node(&mut self, id: SceneNodeId) -> bool {
        self.set_scene_node_visible(id, false)
    }

    fn set_scene_node_visible(&mut self, id: SceneNodeId, visible: bool) -> bool {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot change visibility of scene node {id}: not part of this scene");
            return false;
        };
        if node.is_visible() == visible {
            return true;
        }
        node.flags.set(SceneNodeFlags::VISIBLE, visible);
        if visible {
            self.on_scene_node_show(id);
        } else {
            self.on_scene_node_hide(id);
        }
        true
    }

    /// Mark a node static or dynamic
    pub fn set_scene_node_static(&mut self, id: SceneNodeId, is_static: bool) -> bool {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot change scene node {id}: not part of this scene");
            return false;
        };
        if node.is_static() != is_static {
            node.flags.set(SceneNodeFlags::STATIC, is_static);
            self.stage(id, StagedOperation::Update);
            self.refresh_update_registration(id);
        }
        true
    }

    /// Include or exclude a node from scene saves
    pub fn set_scene_node_serialization_enabled(&mut self, id: SceneNodeId, enabled: bool) -> bool {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot change scene node {id}: not part of this scene");
            return false;
        };
        if node.is_serialization_enabled() != enabled {
            node.flags.set(SceneNodeFlags::SERIALIZATION_ENABLED, enabled);
            self.stage(id, StagedOperation::Update);
        }
        true
    }

    /// Opt a node in or out of undo/redo tracking
    pub fn set_scene_node_state_stack_staging_enabled(&mut self, id: SceneNodeId, enabled: bool) -> bool {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot change scene node {id}: not part of this scene");
            return false;
        };
        node.set_state_stack_staging_enabled(enabled);
        true
    }

    /// Make `parent` the parent of `child`
    pub fn attach_scene_node_to_parent(&mut self, child: SceneNodeId, parent: SceneNodeId) -> bool {
        if !self.nodes.contains(child) || !self.nodes.contains(parent) {
            log::warn!("Cannot attach scene node {child} to {parent}: both must be part of this scene");
            return false;
        }
        if self.nodes.is_ancestor_or_self(child, parent) {
            log::warn!("Cannot attach scene node {child} to {parent}: would create a cycle");
            return false;
        }
        self.link_parent(child, Some(parent));
        true
    }

    /// Make a node a root
    pub fn detach_scene_node_from_parent(&mut self, child: SceneNodeId) -> bool {
        if !self.nodes.contains(child) {
            log::warn!("Cannot detach scene node {child}: not part of this scene");
            return false;
        }
        self.link_parent(child, None);
        true
    }

    pub(super) fn link_parent(&mut self, child: SceneNodeId, parent: Option<SceneNodeId>) {
        let Some(previous) = self.nodes.find_by_id(child).map(SceneNode::parent) else {
            return;
        };
        if previous == parent {
            return;
        }

        if let Some(old) = previous.and_then(|p| self.nodes.find_by_id_mut(p)) {
            old.children.retain(|c| *c != child);
        }
        if let Some(new) = parent.and_then(|p| self.nodes.find_by_id_mut(p)) {
            new.children.push(child);
        }
        if let Some(node) = self.nodes.find_by_id_mut(child) {
            node.parent = parent;
        }
        self.on_scene_node_parent_changed(child, previous);
    }

    /// Attach a component to a node, replacing one of the same kind
    ///
    /// A replacement is reported as a change; the replaced component is
    /// returned.
    pub fn add_scene_node_component(&mut self, id: SceneNodeId, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        let kind = component.kind();
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot add {} component to scene node {id}: not part of this scene", kind.name());
            return None;
        };

        match node.add_component(component) {
            Some(previous) => {
                self.on_scene_node_component_changed(id, &previous, ComponentChangeFlags::all());
                Some(previous)
            }
            None => {
                self.on_scene_node_component_added(id, kind, true);
                None
            }
        }
    }

    /// Detach a component from a node
    pub fn remove_scene_node_component(&mut self, id: SceneNodeId, kind: ComponentKind) -> Option<Component> {
        let Some(node) = self.nodes.find_by_id_mut(id) else {
            log::warn!("Cannot remove {} component from scene node {id}: not part of this scene", kind.name());
            return None;
        };
        let component = node.remove_component(kind)?;
        self.on_scene_node_component_removed(id, &component, true);
        Some(component)
    }

    /// Replace a node's component of the same kind, describing what changed
    ///
    /// Returns the previous value, or `None` if the node had no such component.
    pub fn update_scene_node_component(
        &mut self,
        id: SceneNodeId,
        component: impl Into<Component>,
        flags: ComponentChangeFlags,
    ) -> Option<Component> {
        let component = component.into();
        let kind = component.kind();
        let Some(current) = self.nodes.find_by_id_mut(id).and_then(|n| n.component_mut(kind)) else {
            log::warn!("Cannot update {} component of scene node {id}: no such component", kind.name());
            return None;
        };
        let previous = std::mem::replace(current, component);
        self.on_scene_node_component_changed(id, &previous, flags);
        Some(previous)
    }

    // --- Event handlers ---

    /// Attach an event handler; it receives every later notification
    pub fn attach_event_handler(&mut self, handler: Box<dyn SceneEventHandler>) -> EventHandlerId {
        self.event_handlers.attach(handler)
    }

    /// Detach an event handler and hand it back
    pub fn detach_event_handler(&mut self, id: EventHandlerId) -> Option<Box<dyn SceneEventHandler>> {
        let handler = self.event_handlers.detach(id);
        if handler.is_none() {
            log::warn!("Event handler {id:?} is not attached");
        }
        handler
    }

    /// Number of attached event handlers
    pub fn event_handler_count(&self) -> usize {
        self.event_handlers.len()
    }

    // --- Scripting ---

    /// Register the script runtime
    ///
    /// Every node carrying a script component is instantiated and, unless
    /// script events are blocked, started.
    pub fn register_script(&mut self, mut script: Box<dyn ScriptBridge>) {
        if let Some(previous) = self.unregister_script() {
            log::warn!("Replacing the registered script");
            drop(previous);
        }

        for node in self.nodes.iter() {
            for kind in node.component_kinds() {
                script.register_component(node, kind);
            }
            if node.has_component(ComponentKind::Script) {
                script.instantiate_scene_node(node);
            }
        }
        self.script = Some(script);
        log::debug!("Script registered with scene '{}'", self.properties.name);

        for id in self.nodes.ids() {
            self.fire_script_startup(id);
        }
    }

    /// Unregister the script runtime, shutting down started nodes first
    pub fn unregister_script(&mut self) -> Option<Box<dyn ScriptBridge>> {
        self.script.as_ref()?;

        for id in self.nodes.ids() {
            self.fire_script_shutdown(id);
            self.uninstantiate_script(id);
        }
        log::debug!("Script unregistered from scene '{}'", self.properties.name);
        self.script.take()
    }

    /// Whether a script runtime is registered
    pub fn is_script_registered(&self) -> bool {
        self.script.is_some()
    }

    /// Hold back script events (edit mode)
    pub fn block_script_events(&mut self) {
        self.is_script_events_blocked = true;
    }

    /// Deliver script events again; nodes that never started are started now
    pub fn unblock_script_events(&mut self) {
        self.is_script_events_blocked = false;
        for id in self.nodes.ids() {
            self.fire_script_startup(id);
        }
    }

    /// Whether script events are held back
    pub fn are_script_events_blocked(&self) -> bool {
        self.is_script_events_blocked
    }

    /// Advance per-frame updates
    pub fn update(&mut self, delta_seconds: f32) {
        for id in self.update_manager.scene_nodes() {
            self.post_script_event(id, ScriptEvent::Update { delta_seconds });
        }
    }

    /// Report that `other` entered the proximity volume of `node`
    pub fn notify_object_enter(&mut self, node: SceneNodeId, other: SceneNodeId) {
        self.post_script_event(node, ScriptEvent::ObjectEnter { other });
    }

    /// Report that `other` left the proximity volume of `node`
    pub fn notify_object_leave(&mut self, node: SceneNodeId, other: SceneNodeId) {
        self.post_script_event(node, ScriptEvent::ObjectLeave { other });
    }

    // --- State stack staging ---

    /// Whether changes are recorded on the state stack
    pub fn is_state_stack_staging_enabled(&self) -> bool {
        self.is_state_stack_staging_enabled
    }

    /// Turn recording of changes on or off
    pub fn set_state_stack_staging_enabled(&mut self, enabled: bool) {
        self.is_state_stack_staging_enabled = enabled;
    }

    // --- Viewports ---

    /// The default viewport
    pub fn default_viewport(&self) -> &SceneViewport {
        &self.default_viewport
    }

    /// The default viewport, mutably
    pub fn default_viewport_mut(&mut self) -> &mut SceneViewport {
        &mut self.default_viewport
    }

    /// Attach an additional viewport
    pub fn attach_viewport(&mut self, viewport: SceneViewport) -> ViewportId {
        let id = ViewportId(self.next_viewport_id);
        self.next_viewport_id += 1;
        self.viewports.push((id, viewport));
        id
    }

    /// Detach a viewport
    pub fn detach_viewport(&mut self, id: ViewportId) -> Option<SceneViewport> {
        let index = self.viewports.iter().position(|(v, _)| *v == id)?;
        Some(self.viewports.remove(index).1)
    }

    /// An attached viewport
    pub fn viewport(&self, id: ViewportId) -> Option<&SceneViewport> {
        self.viewports.iter().find(|(v, _)| *v == id).map(|(_, viewport)| viewport)
    }

    /// Attached viewports in attachment order
    pub fn viewports(&self) -> impl Iterator<Item = &SceneViewport> + '_ {
        self.viewports.iter().map(|(_, viewport)| viewport)
    }

    pub(super) fn forget_camera(&mut self, node: SceneNodeId) {
        self.default_viewport.forget_camera(node);
        for (_, viewport) in &mut self.viewports {
            viewport.forget_camera(node);
        }
    }
}
