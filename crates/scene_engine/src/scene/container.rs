//! Scene node storage
//!
//! The container owns every node of one scene. Nodes live in a slot map and
//! are indexed by ID and by name; a separate order list keeps insertion order
//! for iteration and index access.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use crate::foundation::math::Transform;
use super::node::{SceneNode, SceneNodeId};

slotmap::new_key_type! {
    /// Storage slot of a node inside a container
    struct SceneNodeKey;
}

/// Authoritative set of nodes belonging to one scene
#[derive(Debug, Default)]
pub struct SceneNodeContainer {
    nodes: SlotMap<SceneNodeKey, SceneNode>,
    by_id: HashMap<SceneNodeId, SceneNodeKey>,
    /// Keys sharing a name, in insertion order
    by_name: HashMap<String, Vec<SceneNodeKey>>,
    sequence: SecondaryMap<SceneNodeKey, u64>,
    next_sequence: u64,
    order: Vec<SceneNodeKey>,
}

impl SceneNodeContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a node
    ///
    /// The node must carry an assigned ID that is not yet present. The scene
    /// validates this before calling.
    pub(crate) fn insert(&mut self, node: SceneNode) {
        debug_assert!(node.id().is_assigned(), "inserted scene node has no ID");
        debug_assert!(!self.by_id.contains_key(&node.id()), "duplicate scene node ID {}", node.id());

        let id = node.id();
        let name = node.name().to_owned();
        let key = self.nodes.insert(node);

        self.by_id.insert(id, key);
        self.by_name.entry(name).or_default().push(key);
        self.sequence.insert(key, self.next_sequence);
        self.next_sequence += 1;
        self.order.push(key);
    }

    /// Remove a node from every index and hand it back
    pub(crate) fn remove(&mut self, id: SceneNodeId) -> Option<SceneNode> {
        let Some(key) = self.by_id.remove(&id) else {
            log::warn!("Scene node {id} is not in the container");
            return None;
        };

        let node = self.nodes.remove(key)?;
        self.unindex_name(node.name(), key);
        self.sequence.remove(key);
        self.order.retain(|k| *k != key);
        Some(node)
    }

    /// Look up a node by ID
    pub fn find_by_id(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.by_id.get(&id).and_then(|key| self.nodes.get(*key))
    }

    pub(crate) fn find_by_id_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode> {
        let key = *self.by_id.get(&id)?;
        self.nodes.get_mut(key)
    }

    /// First node with the given name, in insertion order
    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        self.by_name
            .get(name)
            .and_then(|keys| keys.first())
            .and_then(|key| self.nodes.get(*key))
    }

    /// Whether a node with this ID is present
    pub fn contains(&self, id: SceneNodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Number of nodes
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Node at an insertion-order index; stable only between mutations
    pub fn get_at_index(&self, index: usize) -> Option<&SceneNode> {
        self.order.get(index).and_then(|key| self.nodes.get(*key))
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> + '_ {
        self.order.iter().filter_map(|key| self.nodes.get(*key))
    }

    /// IDs in insertion order
    pub fn ids(&self) -> Vec<SceneNodeId> {
        self.iter().map(SceneNode::id).collect()
    }

    /// Local transform composed with every ancestor's
    pub fn world_transform(&self, id: SceneNodeId) -> Option<Transform> {
        let mut node = self.find_by_id(id)?;
        let mut world = node.transform().clone();
        while let Some(parent) = node.parent().and_then(|p| self.find_by_id(p)) {
            world = parent.transform().combine(&world);
            node = parent;
        }
        Some(world)
    }

    /// All descendants of a node, parents before children
    pub fn descendants(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<SceneNodeId> = self
            .find_by_id(id)
            .map(|n| n.children().iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            result.push(next);
            if let Some(node) = self.find_by_id(next) {
                stack.extend(node.children().iter().rev().copied());
            }
        }
        result
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: SceneNodeId, id: SceneNodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.find_by_id(node).and_then(SceneNode::parent);
        }
        false
    }

    /// Rename a node, keeping the name index in sync
    pub(crate) fn rename(&mut self, id: SceneNodeId, name: String) -> Option<String> {
        let key = *self.by_id.get(&id)?;
        let previous = std::mem::replace(&mut self.nodes.get_mut(key)?.name, name.clone());
        if previous == name {
            return Some(previous);
        }

        self.unindex_name(&previous, key);
        let sequence = self.sequence.get(key).copied().unwrap_or(u64::MAX);
        let keys = self.by_name.entry(name).or_default();
        let position = keys
            .iter()
            .position(|k| self.sequence.get(*k).copied().unwrap_or(u64::MAX) > sequence)
            .unwrap_or(keys.len());
        keys.insert(position, key);
        Some(previous)
    }

    fn unindex_name(&mut self, name: &str, key: SceneNodeKey) {
        if let Some(keys) = self.by_name.get_mut(name) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.by_name.remove(name);
            }
        }
    }
}
