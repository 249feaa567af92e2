//! State stack branches

use std::fmt;
use std::rc::Rc;

use super::{StagingArea, StateStackFrame};

/// Identifier of a branch within one scene's state stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateStackBranchId(pub(crate) u32);

impl StateStackBranchId {
    /// The branch every state stack starts with
    pub const MAIN: Self = Self(0);
}

impl fmt::Display for StateStackBranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch {}", self.0)
    }
}

/// Independent timeline of frames
///
/// Frames are shared with the branch this one was forked from, so a fork
/// costs one reference count per frame.
#[derive(Debug, Clone)]
pub struct StateStackBranch {
    id: StateStackBranchId,
    parent: Option<StateStackBranchId>,
    pub(crate) frames: Vec<Rc<StateStackFrame>>,
    pub(crate) current_frame_index: usize,
    pub(crate) staging: StagingArea,
}

impl StateStackBranch {
    pub(crate) fn new(id: StateStackBranchId, parent: Option<StateStackBranchId>) -> Self {
        Self {
            id,
            parent,
            frames: Vec::new(),
            current_frame_index: 0,
            staging: StagingArea::new(),
        }
    }

    /// Branch ID
    pub fn id(&self) -> StateStackBranchId {
        self.id
    }

    /// Branch this one was forked from
    pub fn parent(&self) -> Option<StateStackBranchId> {
        self.parent
    }

    /// Whether anything has been committed on this branch
    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of committed frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Cursor position
    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// Highest reachable frame index (0 while empty)
    pub fn max_frame_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Frame at an index
    pub fn frame(&self, index: usize) -> Option<&Rc<StateStackFrame>> {
        self.frames.get(index)
    }

    /// Uncommitted operations
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Append a frame after the cursor, discarding any frames beyond it
    pub(crate) fn push_frame(&mut self, frame: StateStackFrame) {
        if self.has_frames() {
            self.frames.truncate(self.current_frame_index + 1);
        }
        self.frames.push(Rc::new(frame));
        self.current_frame_index = self.frames.len() - 1;
    }

    /// Number of leading frames shared with another branch
    pub fn shared_frame_count(&self, other: &Self) -> usize {
        self.frames
            .iter()
            .zip(&other.frames)
            .take_while(|(a, b)| Rc::ptr_eq(a, b))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_truncates_forward_history() {
        let mut branch = StateStackBranch::new(StateStackBranchId::MAIN, None);
        for _ in 0..4 {
            branch.push_frame(StateStackFrame::default());
        }
        assert_eq!(branch.max_frame_index(), 3);

        branch.current_frame_index = 1;
        branch.push_frame(StateStackFrame::default());

        assert_eq!(branch.max_frame_index(), 2);
        assert_eq!(branch.current_frame_index(), 2);
    }

    #[test]
    fn test_shared_frame_count() {
        let mut main = StateStackBranch::new(StateStackBranchId::MAIN, None);
        main.push_frame(StateStackFrame::default());
        main.push_frame(StateStackFrame::default());

        let mut fork = StateStackBranch::new(StateStackBranchId(1), Some(main.id()));
        fork.frames = main.frames[..1].to_vec();
        fork.push_frame(StateStackFrame::default());

        assert_eq!(main.shared_frame_count(&fork), 1);
        assert_eq!(fork.shared_frame_count(&fork.clone()), 2);
    }
}
