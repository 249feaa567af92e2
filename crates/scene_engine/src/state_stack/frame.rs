//! Committed frames

use std::rc::Rc;

use crate::scene::SceneNodeId;
use super::StagedOperation;

/// One node's change within a frame
#[derive(Debug, Clone)]
pub struct StateStackFrameEntry {
    /// Node the change applies to
    pub id: SceneNodeId,
    /// Kind of change
    pub operation: StagedOperation,
    /// Serialized node state at commit time; `None` for deletes
    pub snapshot: Option<Rc<[u8]>>,
}

/// Immutable commit point
#[derive(Debug, Clone, Default)]
pub struct StateStackFrame {
    entries: Vec<StateStackFrameEntry>,
}

impl StateStackFrame {
    pub(crate) fn new(entries: Vec<StateStackFrameEntry>) -> Self {
        Self { entries }
    }

    /// Entries in staging order
    pub fn entries(&self) -> &[StateStackFrameEntry] {
        &self.entries
    }

    /// Entry for a node, if the frame touched it
    pub fn entry(&self, id: SceneNodeId) -> Option<&StateStackFrameEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of touched nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the frame touched no node
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
