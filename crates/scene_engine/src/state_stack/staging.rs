//! Staging area
//!
//! Operations recorded between two commits. Repeated operations on the same
//! node collapse into the one that describes the net change.

use std::collections::HashMap;

use crate::scene::SceneNodeId;

/// Kind of change recorded for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagedOperation {
    /// Node joined the scene
    Insert,
    /// Node left the scene
    Delete,
    /// Node state changed in place
    Update,
}

/// Collapse an already staged operation with a later one on the same node
///
/// `None` means the two cancel out.
pub const fn merge(previous: StagedOperation, next: StagedOperation) -> Option<StagedOperation> {
    use StagedOperation::{Delete, Insert, Update};

    match (previous, next) {
        (Insert, Delete) => None,
        (Insert, Insert | Update) | (Update, Insert) => Some(Insert),
        (Update, Update) => Some(Update),
        (Update | Delete, Delete) | (Delete, Update) => Some(Delete),
        (Delete, Insert) => Some(Update),
    }
}

/// Pending operations keyed by node, remembering first-touch order
#[derive(Debug, Default, Clone)]
pub struct StagingArea {
    entries: HashMap<SceneNodeId, (u64, StagedOperation)>,
    next_order: u64,
}

impl StagingArea {
    /// Create an empty staging area
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operation, merging with anything already staged for the node
    pub fn stage(&mut self, id: SceneNodeId, operation: StagedOperation) {
        match self.entries.get(&id).copied() {
            None => {
                self.entries.insert(id, (self.next_order, operation));
                self.next_order += 1;
            }
            Some((order, previous)) => match merge(previous, operation) {
                Some(merged) => {
                    self.entries.insert(id, (order, merged));
                }
                None => {
                    self.entries.remove(&id);
                }
            },
        }
        log::trace!("Staged {operation:?} for scene node {id}");
    }

    /// Operation currently staged for a node
    pub fn get(&self, id: SceneNodeId) -> Option<StagedOperation> {
        self.entries.get(&id).map(|(_, operation)| *operation)
    }

    /// Number of staged nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the staged operations in the order their nodes were first touched
    pub fn take(&mut self) -> Vec<(SceneNodeId, StagedOperation)> {
        let mut entries: Vec<(u64, SceneNodeId, StagedOperation)> = self
            .entries
            .drain()
            .map(|(id, (order, operation))| (order, id, operation))
            .collect();
        entries.sort_by_key(|(order, _, _)| *order);
        self.next_order = 0;
        entries.into_iter().map(|(_, id, operation)| (id, operation)).collect()
    }

    /// Discard everything staged
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_order = 0;
    }
}
