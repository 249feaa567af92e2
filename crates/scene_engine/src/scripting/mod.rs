//! Scripting bridge interface
//!
//! A scene forwards node lifetime and a fixed set of events to the script
//! runtime that is currently registered with it. Nothing is forwarded while
//! no bridge is registered, and events (but not instantiation) are held back
//! while the scene has script events blocked.

use crate::scene::{ComponentKind, SceneNode, SceneNodeId};

/// Event delivered to a node's script-side representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptEvent {
    /// Node became live in a scene with a registered script
    Startup,
    /// Node is leaving the scene, or the script is being unregistered
    Shutdown,
    /// Per-frame tick
    Update {
        /// Seconds since the previous update
        delta_seconds: f32,
    },
    /// Node was shown
    Show,
    /// Node was hidden
    Hide,
    /// Another node entered this node's proximity volume
    ObjectEnter {
        /// The node that entered
        other: SceneNodeId,
    },
    /// Another node left this node's proximity volume
    ObjectLeave {
        /// The node that left
        other: SceneNodeId,
    },
}

impl ScriptEvent {
    /// Script callback name for the event
    pub const fn callback_name(&self) -> &'static str {
        match self {
            Self::Startup => "OnStartup",
            Self::Shutdown => "OnShutdown",
            Self::Update { .. } => "OnUpdate",
            Self::Show => "OnShow",
            Self::Hide => "OnHide",
            Self::ObjectEnter { .. } => "OnObjectEnter",
            Self::ObjectLeave { .. } => "OnObjectLeave",
        }
    }
}

/// Script runtime registered with a scene
pub trait ScriptBridge {
    /// Create the script-side object for a node that carries a script component
    fn instantiate_scene_node(&mut self, node: &SceneNode);

    /// Destroy a node's script-side object
    fn uninstantiate_scene_node(&mut self, node: SceneNodeId);

    /// Expose one of a node's components to scripts
    fn register_component(&mut self, node: &SceneNode, kind: ComponentKind);

    /// Withdraw a component from scripts
    fn unregister_component(&mut self, node: SceneNodeId, kind: ComponentKind);

    /// Deliver an event to a node's script
    fn post_scene_node_event(&mut self, node: SceneNodeId, event: ScriptEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_names() {
        assert_eq!(ScriptEvent::Startup.callback_name(), "OnStartup");
        assert_eq!(ScriptEvent::Update { delta_seconds: 0.016 }.callback_name(), "OnUpdate");
        assert_eq!(
            ScriptEvent::ObjectLeave { other: SceneNodeId(4) }.callback_name(),
            "OnObjectLeave"
        );
    }
}
