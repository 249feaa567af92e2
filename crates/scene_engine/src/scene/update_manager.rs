//! Per-frame update registration

use super::component::ComponentKind;
use super::node::{SceneNode, SceneNodeId};

/// Tracks which nodes need a per-frame update
pub trait UpdateManager {
    /// Whether a node currently needs per-frame updates
    fn needs_update(&self, node: &SceneNode) -> bool;

    /// Start updating a node
    fn add_scene_node(&mut self, node: SceneNodeId);

    /// Stop updating a node
    fn remove_scene_node(&mut self, node: SceneNodeId);

    /// Nodes currently updated, in registration order
    fn scene_nodes(&self) -> Vec<SceneNodeId>;
}

/// Updates nodes carrying scripts, particle systems or simulated bodies
#[derive(Debug, Default)]
pub struct DefaultUpdateManager {
    nodes: Vec<SceneNodeId>,
}

impl DefaultUpdateManager {
    /// Create an empty update manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a node is registered
    pub fn contains(&self, node: SceneNodeId) -> bool {
        self.nodes.contains(&node)
    }
}

impl UpdateManager for DefaultUpdateManager {
    fn needs_update(&self, node: &SceneNode) -> bool {
        node.has_component(ComponentKind::Script)
            || node.has_component(ComponentKind::ParticleSystem)
            || (node.has_component(ComponentKind::Dynamics) && !node.is_static())
    }

    fn add_scene_node(&mut self, node: SceneNodeId) {
        if !self.contains(node) {
            self.nodes.push(node);
        }
    }

    fn remove_scene_node(&mut self, node: SceneNodeId) {
        self.nodes.retain(|n| *n != node);
    }

    fn scene_nodes(&self) -> Vec<SceneNodeId> {
        self.nodes.clone()
    }
}
