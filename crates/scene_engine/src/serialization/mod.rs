//! Binary chunk serialization
//!
//! Scenes and individual nodes are written as a sequence of versioned chunks.
//! The per-node routine is shared by full scene saves and state stack
//! snapshots, so a node reconstructed from history and a node loaded from a
//! file go through the same code.

pub mod chunk;
mod node;
mod stream;

pub use chunk::{Chunk, ChunkHeader};
pub use node::{deserialize_scene_node, restore_scene_node, serialize_scene_node, snapshot_scene_node, DeserializedSceneNode};

pub(crate) use stream::{
    read_bool, read_f32, read_string, read_u32, read_u64, read_vec3, write_bool, write_f32, write_string,
    write_u32, write_u64, write_vec3,
};
