//! # Scene Engine
//!
//! Scene node ownership, undo/redo history and mutation notification for the
//! engine's scene layer.
//!
//! ## Features
//!
//! - **Scene Node Container**: ID and name indexed node storage with stable
//!   insertion-order iteration
//! - **State Stack**: per-frame snapshot deltas with staging, commit, seek
//!   (undo/redo) and branching
//! - **Notification Pipeline**: every structural change is pushed to culling,
//!   physics, scripting and attached event handlers in a fixed order
//! - **Binary Chunk Format**: versioned, forward compatible scene and node
//!   serialization shared by saving and history snapshots
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut scene = Scene::new();
//! let a = scene.create_new_scene_node("a");
//! let _b = scene.create_new_scene_node("b");
//! scene.commit_state_stack_frame();
//!
//! scene.remove_scene_node(a);
//! scene.commit_state_stack_frame();
//! assert_eq!(scene.scene_node_count(), 1);
//!
//! scene.seek_state_stack(-1);
//! assert_eq!(scene.scene_node_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod culling;
pub mod foundation;
pub mod physics;
pub mod scene;
pub mod scripting;
pub mod serialization;
pub mod state_stack;

mod error;

pub use error::{SceneError, SceneResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig, SceneConfig},
        culling::{Aabb, CullingManager, SimpleCullingManager},
        foundation::math::{Mat4, Quat, Transform, Vec3},
        physics::{CollisionLayers, PhysicsManager, SimplePhysicsWorld},
        scene::{
            AddSceneNodeError, Component, ComponentChangeFlags, ComponentKind, NodeOwnership,
            Scene, SceneEventHandler, SceneNode, SceneNodeFlags, SceneNodeId,
        },
        scripting::{ScriptBridge, ScriptEvent},
        state_stack::{StagedOperation, StateStackBranchId},
        SceneError, SceneResult,
    };
}
