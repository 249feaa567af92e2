//! Undo/redo state stack
//!
//! Changes to scene nodes are staged per node between commits. A commit turns
//! the staging area into an immutable [`StateStackFrame`] holding a serialized
//! snapshot of every inserted or updated node. Seeking replays frames one at a
//! time, forwards or backwards, so each step only touches the nodes that
//! frame touched.
//!
//! Frames are organized into branches. Forking a branch shares the frames up
//! to the cursor, which keeps the old redo path reachable after an undo
//! followed by a new edit.
//!
//! The stack itself only stores data; [`Scene`](crate::scene::Scene) drives
//! commits and replays because both need the live nodes.

mod branch;
mod frame;
mod staging;

pub use branch::{StateStackBranch, StateStackBranchId};
pub use frame::{StateStackFrame, StateStackFrameEntry};
pub use staging::{merge, StagedOperation, StagingArea};

use std::rc::Rc;

use crate::scene::SceneNodeId;

/// Branches of one scene's history
#[derive(Debug, Clone)]
pub struct SceneStateStack {
    branches: Vec<StateStackBranch>,
    current: usize,
    next_branch_id: u32,
}

impl Default for SceneStateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStateStack {
    /// Create a stack with an empty main branch
    pub fn new() -> Self {
        Self {
            branches: vec![StateStackBranch::new(StateStackBranchId::MAIN, None)],
            current: 0,
            next_branch_id: 1,
        }
    }

    /// Branch receiving commits and seeks
    pub fn current_branch(&self) -> &StateStackBranch {
        &self.branches[self.current]
    }

    fn current_branch_mut(&mut self) -> &mut StateStackBranch {
        &mut self.branches[self.current]
    }

    /// ID of the current branch
    pub fn current_branch_id(&self) -> StateStackBranchId {
        self.current_branch().id()
    }

    /// Look up a branch
    pub fn branch(&self, id: StateStackBranchId) -> Option<&StateStackBranch> {
        self.branches.iter().find(|b| b.id() == id)
    }

    /// All branch IDs in creation order
    pub fn branch_ids(&self) -> Vec<StateStackBranchId> {
        self.branches.iter().map(StateStackBranch::id).collect()
    }

    /// Stage an insert on the current branch
    pub fn stage_insert(&mut self, id: SceneNodeId) {
        self.current_branch_mut().staging.stage(id, StagedOperation::Insert);
    }

    /// Stage a delete on the current branch
    pub fn stage_delete(&mut self, id: SceneNodeId) {
        self.current_branch_mut().staging.stage(id, StagedOperation::Delete);
    }

    /// Stage an update on the current branch
    pub fn stage_update(&mut self, id: SceneNodeId) {
        self.current_branch_mut().staging.stage(id, StagedOperation::Update);
    }

    /// Whether the current branch has uncommitted operations
    pub fn has_staged_changes(&self) -> bool {
        !self.current_branch().staging.is_empty()
    }

    pub(crate) fn clear_staging(&mut self) {
        self.current_branch_mut().staging.clear();
    }

    pub(crate) fn take_staged(&mut self) -> Vec<(SceneNodeId, StagedOperation)> {
        self.current_branch_mut().staging.take()
    }

    /// Whether anything has been committed on the current branch
    pub fn has_frames(&self) -> bool {
        self.current_branch().has_frames()
    }

    /// Cursor of the current branch
    pub fn current_frame_index(&self) -> usize {
        self.current_branch().current_frame_index()
    }

    /// Tip of the current branch
    pub fn max_frame_index(&self) -> usize {
        self.current_branch().max_frame_index()
    }

    /// Frame of the current branch
    pub fn frame(&self, index: usize) -> Option<Rc<StateStackFrame>> {
        self.current_branch().frame(index).cloned()
    }

    pub(crate) fn push_frame(&mut self, frame: StateStackFrame) {
        self.current_branch_mut().push_frame(frame);
    }

    pub(crate) fn set_current_frame_index(&mut self, index: usize) {
        let branch = self.current_branch_mut();
        debug_assert!(index <= branch.max_frame_index());
        branch.current_frame_index = index;
    }

    /// Serialized state of a node as of the end of a frame on the current branch
    ///
    /// `None` if the node did not exist at that point.
    pub fn snapshot_at(&self, id: SceneNodeId, frame_index: usize) -> Option<Rc<[u8]>> {
        let frames = &self.current_branch().frames;
        let end = frame_index.checked_add(1)?.min(frames.len());
        Self::latest_snapshot(&frames[..end], id)
    }

    /// Serialized state of a node just before a frame was applied
    pub fn snapshot_before(&self, id: SceneNodeId, frame_index: usize) -> Option<Rc<[u8]>> {
        let frames = &self.current_branch().frames;
        let end = frame_index.min(frames.len());
        Self::latest_snapshot(&frames[..end], id)
    }

    fn latest_snapshot(frames: &[Rc<StateStackFrame>], id: SceneNodeId) -> Option<Rc<[u8]>> {
        frames
            .iter()
            .rev()
            .find_map(|frame| frame.entry(id))
            .and_then(|entry| match entry.operation {
                StagedOperation::Delete => None,
                StagedOperation::Insert | StagedOperation::Update => entry.snapshot.clone(),
            })
    }

    /// Fork the current branch at its cursor and make the fork current
    ///
    /// Uncommitted operations move to the new branch.
    pub(crate) fn create_branch(&mut self) -> StateStackBranchId {
        let id = StateStackBranchId(self.next_branch_id);
        self.next_branch_id += 1;

        let source = self.current_branch_mut();
        let mut branch = StateStackBranch::new(id, Some(source.id()));
        if source.has_frames() {
            branch.frames = source.frames[..=source.current_frame_index].to_vec();
            branch.current_frame_index = source.current_frame_index;
        }
        branch.staging = std::mem::take(&mut source.staging);

        self.branches.push(branch);
        self.current = self.branches.len() - 1;
        id
    }

    /// Number of leading frames the current branch shares with another
    pub fn shared_frame_count(&self, other: StateStackBranchId) -> Option<usize> {
        let other = self.branch(other)?;
        Some(self.current_branch().shared_frame_count(other))
    }

    pub(crate) fn set_current_branch(&mut self, id: StateStackBranchId) -> bool {
        match self.branches.iter().position(|b| b.id() == id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// Drop every branch and frame
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, operation: StagedOperation, bytes: &[u8]) -> StateStackFrameEntry {
        StateStackFrameEntry {
            id: SceneNodeId(id),
            operation,
            snapshot: (operation != StagedOperation::Delete).then(|| Rc::from(bytes)),
        }
    }

    #[test]
    fn test_snapshot_lookup_walks_back() {
        let mut stack = SceneStateStack::new();
        stack.push_frame(StateStackFrame::new(vec![entry(1, StagedOperation::Insert, b"v0")]));
        stack.push_frame(StateStackFrame::new(vec![entry(2, StagedOperation::Insert, b"other")]));
        stack.push_frame(StateStackFrame::new(vec![entry(1, StagedOperation::Update, b"v2")]));
        stack.push_frame(StateStackFrame::new(vec![entry(1, StagedOperation::Delete, b"")]));

        assert_eq!(stack.snapshot_at(SceneNodeId(1), 1).as_deref(), Some(&b"v0"[..]));
        assert_eq!(stack.snapshot_at(SceneNodeId(1), 2).as_deref(), Some(&b"v2"[..]));
        assert!(stack.snapshot_at(SceneNodeId(1), 3).is_none());
        assert_eq!(stack.snapshot_before(SceneNodeId(1), 3).as_deref(), Some(&b"v2"[..]));
        assert!(stack.snapshot_before(SceneNodeId(1), 0).is_none());
    }

    #[test]
    fn test_create_branch_shares_prefix_and_moves_staging() {
        let mut stack = SceneStateStack::new();
        stack.push_frame(StateStackFrame::default());
        stack.push_frame(StateStackFrame::default());
        stack.push_frame(StateStackFrame::default());
        stack.set_current_frame_index(1);
        stack.stage_update(SceneNodeId(4));

        let fork = stack.create_branch();

        assert_eq!(stack.current_branch_id(), fork);
        assert_eq!(stack.max_frame_index(), 1);
        assert!(stack.has_staged_changes());
        assert_eq!(stack.shared_frame_count(StateStackBranchId::MAIN), Some(2));

        assert!(stack.set_current_branch(StateStackBranchId::MAIN));
        assert!(!stack.has_staged_changes());
        assert_eq!(stack.max_frame_index(), 2);
    }

    #[test]
    fn test_clear_resets_to_main() {
        let mut stack = SceneStateStack::new();
        stack.push_frame(StateStackFrame::default());
        stack.create_branch();

        stack.clear();

        assert_eq!(stack.branch_ids(), vec![StateStackBranchId::MAIN]);
        assert!(!stack.has_frames());
    }
}
