//! Scene node implementation
//!
//! A scene node is the unit of ownership, hierarchy and history in a scene.
//! While detached, a node is a plain value that can be freely edited. Once
//! inserted, the owning [`Scene`](super::Scene) is the only path through which
//! it can be mutated, so every change reaches the notification pipeline.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Quat, Transform, Vec3};
use super::component::{Component, ComponentKind};

/// Unique scene node identifier (0 = unassigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SceneNodeId(pub u64);

impl SceneNodeId {
    /// The unassigned ID
    pub const NONE: Self = Self(0);

    /// Whether an ID has been assigned
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }

    /// Raw value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a scene, used as the node's non-owning back-reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u32);

impl SceneId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

bitflags! {
    /// Per-node behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SceneNodeFlags: u32 {
        /// Node is shown (registered with culling)
        const VISIBLE = 1 << 0;
        /// Node does not move at runtime
        const STATIC = 1 << 1;
        /// Node is written when the scene is saved
        const SERIALIZATION_ENABLED = 1 << 2;
        /// Node changes are recorded on the state stack
        const STATE_STACK_STAGING_ENABLED = 1 << 3;
    }
}

impl Default for SceneNodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::SERIALIZATION_ENABLED | Self::STATE_STACK_STAGING_ENABLED
    }
}

/// Who is responsible for a node's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeOwnership {
    /// Created by the scene; dropped when removed from it
    Owned,
    /// Created externally; handed back to the caller when removed
    #[default]
    Borrowed,
}

/// A node in the scene hierarchy
#[derive(Debug)]
pub struct SceneNode {
    pub(crate) id: SceneNodeId,
    pub(crate) name: String,
    pub(crate) parent: Option<SceneNodeId>,
    pub(crate) children: Vec<SceneNodeId>,
    /// Subtree carried by a detached node; moved into the scene on insertion
    pub(crate) detached_children: Vec<SceneNode>,
    pub(crate) transform: Transform,
    pub(crate) flags: SceneNodeFlags,
    /// Kept sorted by kind so serialized snapshots are canonical
    pub(crate) components: Vec<Component>,
    pub(crate) ownership: NodeOwnership,
    pub(crate) scene: Option<SceneId>,
    pub(crate) script_started: bool,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode {
    /// Create a detached node with default state and no ID
    pub fn new() -> Self {
        Self {
            id: SceneNodeId::NONE,
            name: String::new(),
            parent: None,
            children: Vec::new(),
            detached_children: Vec::new(),
            transform: Transform::identity(),
            flags: SceneNodeFlags::default(),
            components: Vec::new(),
            ownership: NodeOwnership::Borrowed,
            scene: None,
            script_started: false,
        }
    }

    /// Create a detached node with a name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    /// Request a specific ID instead of an automatically generated one
    pub fn with_id(mut self, id: SceneNodeId) -> Self {
        self.id = id;
        self
    }

    /// Attach a component (builder form of [`Self::add_component`])
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.add_component(component);
        self
    }

    /// Get the node ID
    pub fn id(&self) -> SceneNodeId {
        self.id
    }

    /// Get the node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name of a detached node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Parent of this node while it is part of a scene
    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    /// Children of this node while it is part of a scene
    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }

    /// Children carried by this detached node
    pub fn detached_children(&self) -> &[SceneNode] {
        &self.detached_children
    }

    /// Attach a detached child subtree; it joins the scene together with this node
    pub fn add_child(&mut self, child: SceneNode) {
        self.detached_children.push(child);
    }

    /// Local transform relative to the parent
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Set the local transform of a detached node
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Set the local position of a detached node
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Behaviour flags
    pub fn flags(&self) -> SceneNodeFlags {
        self.flags
    }

    /// Replace the behaviour flags of a detached node
    pub fn set_flags(&mut self, flags: SceneNodeFlags) {
        self.flags = flags;
    }

    /// Whether the node is visible
    pub fn is_visible(&self) -> bool {
        self.flags.contains(SceneNodeFlags::VISIBLE)
    }

    /// Whether the node is static
    pub fn is_static(&self) -> bool {
        self.flags.contains(SceneNodeFlags::STATIC)
    }

    /// Whether the node is written on scene save
    pub fn is_serialization_enabled(&self) -> bool {
        self.flags.contains(SceneNodeFlags::SERIALIZATION_ENABLED)
    }

    /// Whether the node's changes are recorded on the state stack
    pub fn is_state_stack_staging_enabled(&self) -> bool {
        self.flags.contains(SceneNodeFlags::STATE_STACK_STAGING_ENABLED)
    }

    /// Opt this node in or out of undo/redo tracking
    ///
    /// Removal from a scene clears the flag permanently; re-enable it before
    /// inserting a returned node again if it should be tracked.
    pub fn set_state_stack_staging_enabled(&mut self, enabled: bool) {
        self.flags.set(SceneNodeFlags::STATE_STACK_STAGING_ENABLED, enabled);
    }

    /// Lifetime ownership tag
    pub fn ownership(&self) -> NodeOwnership {
        self.ownership
    }

    /// Whether the node currently belongs to a scene
    pub fn is_in_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// Whether the script startup callback has fired for the current membership
    pub fn has_script_started(&self) -> bool {
        self.script_started
    }

    /// All attached components, ordered by kind
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Kinds of the attached components, ordered by kind
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        self.components.iter().map(Component::kind).collect()
    }

    /// Get a component by kind
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub(crate) fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.kind() == kind)
    }

    /// Whether a component of the given kind is attached
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.component(kind).is_some()
    }

    /// Attach a component to a detached node, replacing one of the same kind
    ///
    /// Returns the replaced component, if any.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        let kind = component.kind();
        match self.components.binary_search_by_key(&kind, Component::kind) {
            Ok(index) => Some(std::mem::replace(&mut self.components[index], component)),
            Err(index) => {
                self.components.insert(index, component);
                None
            }
        }
    }

    /// Detach a component from a detached node
    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Component> {
        let index = self.components.iter().position(|c| c.kind() == kind)?;
        Some(self.components.remove(index))
    }
}
