//! Scene aggregate and scene nodes
//!
//! A [`Scene`] owns its nodes through a [`SceneNodeContainer`], records their
//! history on a [`SceneStateStack`](crate::state_stack::SceneStateStack) and
//! keeps the culling, physics, scripting and update systems in sync with
//! every change.
//!
//! ## Mutation pipeline
//!
//! ```text
//! add / remove / setter / state stack seek
//!      ↓
//! on_scene_node_* hook
//!      ↓
//! 1. stage on the state stack
//! 2. culling and physics managers
//! 3. script bridge
//! 4. event handlers
//! ```

pub mod component;
mod container;
mod events;
mod history;
mod id_allocator;
mod navigation;
mod node;
mod notify;
mod persist;
#[allow(clippy::module_inception)]
mod scene;
mod update_manager;
mod viewport;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentChangeFlags, ComponentKind};
pub use container::SceneNodeContainer;
pub use events::{EventHandlerId, SceneEventHandler};
pub use id_allocator::SceneNodeIdAllocator;
pub use navigation::NavigationMesh;
pub use node::{NodeOwnership, SceneId, SceneNode, SceneNodeFlags, SceneNodeId};
pub use scene::{AddSceneNodeError, AddSceneNodeErrorKind, Scene, SceneProperties};
pub use update_manager::{DefaultUpdateManager, UpdateManager};
pub use viewport::{SceneViewport, ViewportId};
