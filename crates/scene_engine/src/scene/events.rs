//! Scene event handler interface

use super::component::{Component, ComponentChangeFlags};
use super::node::{SceneNode, SceneNodeId};

/// Receives scene node lifecycle notifications
///
/// Every method has an empty default so consumers implement only what they
/// need. Handlers run after all internal bookkeeping for the mutation is
/// complete. They must not mutate the scene from inside a callback.
#[allow(unused_variables)]
pub trait SceneEventHandler {
    /// A node joined the scene
    fn on_scene_node_added(&mut self, node: &SceneNode) {}

    /// A node is about to leave the scene
    fn on_scene_node_removed(&mut self, node: &SceneNode) {}

    /// A node was renamed
    fn on_scene_node_name_changed(&mut self, node: &SceneNode, previous_name: &str) {}

    /// A node was attached to or detached from a parent
    fn on_scene_node_parent_changed(&mut self, node: &SceneNode, previous_parent: Option<SceneNodeId>) {}

    /// A node's world transform changed
    fn on_scene_node_transform(&mut self, node: &SceneNode) {}

    /// A node's scale changed
    fn on_scene_node_scale(&mut self, node: &SceneNode) {}

    /// A node was shown
    fn on_scene_node_show(&mut self, node: &SceneNode) {}

    /// A node was hidden
    fn on_scene_node_hide(&mut self, node: &SceneNode) {}

    /// A component was attached to a node in the scene
    fn on_scene_node_component_added(&mut self, node: &SceneNode, component: &Component) {}

    /// A component was detached from a node in the scene
    fn on_scene_node_component_removed(&mut self, node: &SceneNode, component: &Component) {}

    /// A component of a node in the scene was modified
    fn on_scene_node_component_changed(
        &mut self,
        node: &SceneNode,
        component: &Component,
        flags: ComponentChangeFlags,
    ) {
    }

    /// A state stack frame was committed
    fn on_state_stack_frame_committed(&mut self) {}
}

/// Handle returned when attaching an event handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandlerId(pub(crate) u32);

/// Attached handlers in attachment order
#[derive(Default)]
pub(crate) struct EventHandlers {
    next_id: u32,
    handlers: Vec<(EventHandlerId, Box<dyn SceneEventHandler>)>,
}

impl EventHandlers {
    pub(crate) fn attach(&mut self, handler: Box<dyn SceneEventHandler>) -> EventHandlerId {
        let id = EventHandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    pub(crate) fn detach(&mut self, id: EventHandlerId) -> Option<Box<dyn SceneEventHandler>> {
        let index = self.handlers.iter().position(|(handler_id, _)| *handler_id == id)?;
        Some(self.handlers.remove(index).1)
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn for_each(&mut self, mut f: impl FnMut(&mut dyn SceneEventHandler)) {
        for (_, handler) in &mut self.handlers {
            f(handler.as_mut());
        }
    }
}
