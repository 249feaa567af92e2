//! Undo/redo driven from the scene
//!
//! Commits snapshot the staged nodes into a frame. Seeking replays frames one
//! at a time through the regular mutation paths with staging suspended, so
//! culling, physics, scripts and event handlers observe a replay exactly like
//! live edits.

use std::rc::Rc;

use crate::serialization::{restore_scene_node, snapshot_scene_node};
use crate::state_stack::{SceneStateStack, StagedOperation, StateStackBranchId, StateStackFrame, StateStackFrameEntry};
use super::component::{ComponentChangeFlags, ComponentKind};
use super::node::{NodeOwnership, SceneNode, SceneNodeFlags, SceneNodeId};
use super::scene::Scene;

/// Parent link to apply once every node of a frame exists
type PendingLink = (SceneNodeId, Option<SceneNodeId>);

impl Scene {
    /// The scene's undo/redo history
    pub fn state_stack(&self) -> &SceneStateStack {
        &self.state_stack
    }

    /// Cursor of the current branch
    pub fn state_stack_current_frame_index(&self) -> usize {
        self.state_stack.current_frame_index()
    }

    /// Tip of the current branch
    pub fn state_stack_max_frame_index(&self) -> usize {
        self.state_stack.max_frame_index()
    }

    /// Branch receiving commits and seeks
    pub fn current_state_stack_branch(&self) -> StateStackBranchId {
        self.state_stack.current_branch_id()
    }

    /// Turn the staged operations into a new frame after the cursor
    ///
    /// The first commit on a branch records every tracked node as an insert,
    /// giving the history a baseline. Returns `false` when there was nothing
    /// to commit.
    pub fn commit_state_stack_frame(&mut self) -> bool {
        if !self.state_stack.has_frames() {
            self.state_stack.clear_staging();
            for node in self.nodes.iter().filter(|n| n.is_state_stack_staging_enabled()) {
                self.state_stack.stage_insert(node.id());
            }
        } else if !self.state_stack.has_staged_changes() {
            return false;
        }

        let mut entries = Vec::new();
        for (id, operation) in self.state_stack.take_staged() {
            let snapshot = match operation {
                StagedOperation::Delete => None,
                StagedOperation::Insert | StagedOperation::Update => {
                    let Some(node) = self.nodes.find_by_id(id) else {
                        log::warn!("Staged scene node {id} no longer exists, dropped from the frame");
                        continue;
                    };
                    match snapshot_scene_node(node) {
                        Ok(bytes) => Some(Rc::from(bytes)),
                        Err(e) => {
                            log::error!("Failed to snapshot scene node {id}: {e}");
                            continue;
                        }
                    }
                }
            };
            entries.push(StateStackFrameEntry { id, operation, snapshot });
        }

        let count = entries.len();
        self.state_stack.push_frame(StateStackFrame::new(entries));
        log::debug!(
            "Committed frame {} on {} ({count} entries)",
            self.state_stack.current_frame_index(),
            self.state_stack.current_branch_id()
        );

        self.event_handlers.for_each(|handler| handler.on_state_stack_frame_committed());
        true
    }

    /// Move the cursor by `delta` frames (negative = undo)
    ///
    /// Staged changes are committed first. The target is clamped to the
    /// frames of the current branch; returns `false` if the cursor did not
    /// move.
    pub fn seek_state_stack(&mut self, delta: isize) -> bool {
        if self.state_stack.has_staged_changes() {
            self.commit_state_stack_frame();
        }
        if !self.state_stack.has_frames() {
            return false;
        }

        let current = self.state_stack.current_frame_index();
        let max = self.state_stack.max_frame_index();
        let target = current.saturating_add_signed(delta).min(max);
        if target == current {
            return false;
        }

        log::debug!("Seeking {} from frame {current} to {target}", self.state_stack.current_branch_id());
        self.replay_to(target);
        true
    }

    /// Serialized state of a node as of a frame on the current branch
    pub fn get_scene_node_snapshot_at(&self, id: SceneNodeId, frame_index: usize) -> Option<Rc<[u8]>> {
        self.state_stack.snapshot_at(id, frame_index)
    }

    /// Fork the history at the cursor and continue on the fork
    ///
    /// Staged changes move to the fork. A scene without history gets a
    /// baseline frame first so the fork has a shared starting point.
    pub fn create_state_stack_branch(&mut self) -> StateStackBranchId {
        if !self.state_stack.has_frames() {
            self.commit_state_stack_frame();
        }
        let id = self.state_stack.create_branch();
        log::debug!("Created state stack {id}");
        id
    }

    /// Make another branch current, replaying the scene to its cursor
    ///
    /// The scene is reverted to the last frame both branches share, then
    /// replayed forward along the target branch.
    pub fn switch_state_stack_branch(&mut self, id: StateStackBranchId) -> bool {
        if id == self.state_stack.current_branch_id() {
            return true;
        }
        let Some(target_cursor) = self.state_stack.branch(id).map(|b| b.current_frame_index()) else {
            log::warn!("Cannot switch to state stack {id}: no such branch");
            return false;
        };

        if self.state_stack.has_staged_changes() {
            self.commit_state_stack_frame();
        }

        let shared = self.state_stack.shared_frame_count(id).unwrap_or(0);
        if shared == 0 {
            log::warn!("Cannot switch to state stack {id}: no shared history");
            return false;
        }
        let pivot = (shared - 1).min(target_cursor);

        let saved_cursor = self.state_stack.current_frame_index();
        self.replay_to(pivot.min(saved_cursor));
        self.state_stack.set_current_frame_index(saved_cursor);

        self.state_stack.set_current_branch(id);
        self.state_stack.set_current_frame_index(pivot.min(saved_cursor));
        self.replay_to(target_cursor);

        log::debug!("Switched to state stack {id} at frame {target_cursor}");
        true
    }

    /// Revert or apply frames until the cursor reaches `target`
    fn replay_to(&mut self, target: usize) {
        let staging = std::mem::replace(&mut self.is_state_stack_staging_enabled, false);

        let mut cursor = self.state_stack.current_frame_index();
        while cursor > target {
            self.revert_frame(cursor);
            cursor -= 1;
        }
        while cursor < target {
            cursor += 1;
            self.apply_frame(cursor);
        }
        self.state_stack.set_current_frame_index(target);

        self.is_state_stack_staging_enabled = staging;
    }

    fn revert_frame(&mut self, index: usize) {
        let Some(frame) = self.state_stack.frame(index) else {
            return;
        };
        let mut pending = Vec::new();

        for entry in frame.entries().iter().rev() {
            if entry.operation == StagedOperation::Insert {
                continue;
            }
            match self.state_stack.snapshot_before(entry.id, index) {
                Some(snapshot) => self.restore_snapshot(&snapshot, &mut pending),
                None => log::warn!("No earlier state for scene node {} in frame {index}", entry.id),
            }
        }
        self.resolve_links(pending);

        for entry in frame.entries().iter().rev() {
            if entry.operation == StagedOperation::Insert {
                self.release_scene_node(entry.id);
            }
        }
    }

    fn apply_frame(&mut self, index: usize) {
        let Some(frame) = self.state_stack.frame(index) else {
            return;
        };
        let mut pending = Vec::new();

        for entry in frame.entries() {
            if entry.operation == StagedOperation::Delete {
                continue;
            }
            match &entry.snapshot {
                Some(snapshot) => self.restore_snapshot(snapshot, &mut pending),
                None => log::warn!("Frame {index} has no snapshot for scene node {}", entry.id),
            }
        }
        self.resolve_links(pending);

        for entry in frame.entries().iter().rev() {
            if entry.operation == StagedOperation::Delete {
                self.release_scene_node(entry.id);
            }
        }
    }

    /// Remove a node during replay, queueing externally created nodes
    pub(super) fn release_scene_node(&mut self, id: SceneNodeId) {
        let Some(parent) = self.nodes.find_by_id(id).map(SceneNode::parent) else {
            return;
        };
        let mut released = Vec::new();
        self.remove_scene_node_tree(id, &mut released);
        if let Some(parent_node) = parent.and_then(|p| self.nodes.find_by_id_mut(p)) {
            parent_node.children.retain(|c| *c != id);
        }
        self.released_nodes.append(&mut released);
    }

    /// Bring a node to a snapshot, creating it if it is missing
    fn restore_snapshot(&mut self, snapshot: &[u8], pending: &mut Vec<PendingLink>) {
        let restored = match restore_scene_node(snapshot) {
            Ok(restored) => restored,
            Err(e) => {
                log::error!("Failed to restore scene node snapshot: {e}");
                return;
            }
        };
        let id = restored.node.id();
        pending.push((id, restored.parent));

        if self.nodes.contains(id) {
            self.apply_in_place(restored.node);
        } else {
            let mut node = restored.node;
            node.ownership = NodeOwnership::Owned;
            self.insert_scene_node(node, None);
        }
    }

    fn resolve_links(&mut self, pending: Vec<PendingLink>) {
        for (id, parent) in pending {
            let parent = parent.filter(|p| self.nodes.contains(*p));
            if parent.is_some_and(|p| self.nodes.is_ancestor_or_self(id, p)) {
                log::warn!("Restored parent of scene node {id} would create a cycle, left as a root");
                self.link_parent(id, None);
            } else {
                self.link_parent(id, parent);
            }
        }
    }

    /// Diff a live node against its snapshot and apply the differences
    fn apply_in_place(&mut self, target: SceneNode) {
        let id = target.id();
        let Some(current) = self.nodes.find_by_id(id) else {
            return;
        };

        let rename = current.name() != target.name();
        let transform_changed = current.transform() != target.transform();
        let visible = target.is_visible();
        let visibility_changed = current.is_visible() != visible;
        let direct_flags = SceneNodeFlags::STATIC
            | SceneNodeFlags::SERIALIZATION_ENABLED
            | SceneNodeFlags::STATE_STACK_STAGING_ENABLED;
        let flags = (current.flags() - direct_flags) | (target.flags() & direct_flags);

        if rename {
            self.set_scene_node_name(id, target.name());
        }
        if transform_changed {
            self.set_scene_node_transform(id, target.transform().clone());
        }
        if visibility_changed {
            if visible {
                self.show_scene_node(id);
            } else {
                self.hide_scene_node(id);
            }
        }
        if let Some(node) = self.nodes.find_by_id_mut(id) {
            node.flags = flags;
        }

        for kind in ComponentKind::ALL {
            let live = self.nodes.find_by_id(id).and_then(|n| n.component(kind)).cloned();
            match (live, target.component(kind)) {
                (None, Some(wanted)) => {
                    self.add_scene_node_component(id, wanted.clone());
                }
                (Some(_), None) => {
                    self.remove_scene_node_component(id, kind);
                }
                (Some(live), Some(wanted)) if live != *wanted => {
                    self.update_scene_node_component(id, wanted.clone(), ComponentChangeFlags::all());
                }
                _ => {}
            }
        }
        self.refresh_update_registration(id);
    }
}
