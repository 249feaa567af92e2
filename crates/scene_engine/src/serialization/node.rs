//! Per-node serialization
//!
//! One routine encodes a node for both full scene saves and state stack
//! snapshots. A node is three chunks: general (ID, name, flags, parent),
//! transform and components. Component payloads are RON text so that adding
//! a field to a component type does not need a new chunk version.

use std::io::{Read, Write};

use crate::error::{SceneError, SceneResult};
use crate::scene::{Component, SceneNode, SceneNodeFlags, SceneNodeId};
use super::chunk::{write_chunk, Chunk, CHUNK_NODE_COMPONENTS, CHUNK_NODE_GENERAL, CHUNK_NODE_TRANSFORM};
use super::stream::{read_string, read_transform, read_u32, read_u64, write_string, write_transform, write_u32, write_u64};

/// Node state read back from a stream
#[derive(Debug)]
pub struct DeserializedSceneNode {
    /// Detached node carrying the stored ID, name, flags, transform and components
    pub node: SceneNode,
    /// Parent at the time of writing
    pub parent: Option<SceneNodeId>,
}

/// Write a node's full state
pub fn serialize_scene_node<W: Write>(node: &SceneNode, writer: &mut W) -> SceneResult<()> {
    write_chunk(writer, CHUNK_NODE_GENERAL, |body| {
        write_u64(body, node.id().get())?;
        write_string(body, node.name())?;
        write_u32(body, node.flags().bits())?;
        write_u64(body, node.parent().map_or(0, SceneNodeId::get))
    })?;

    write_chunk(writer, CHUNK_NODE_TRANSFORM, |body| write_transform(body, node.transform()))?;

    write_chunk(writer, CHUNK_NODE_COMPONENTS, |body| {
        let count = u32::try_from(node.components().len())
            .map_err(|_| SceneError::CorruptedData("too many components".to_owned()))?;
        write_u32(body, count)?;
        for component in node.components() {
            let text = ron::to_string(component).map_err(|e| {
                SceneError::ComponentPayload(format!("failed to encode {} component: {e}", component.name()))
            })?;
            write_string(body, &text)?;
        }
        Ok(())
    })
}

/// Serialize a node into a fresh buffer
pub fn snapshot_scene_node(node: &SceneNode) -> SceneResult<Vec<u8>> {
    let mut buf = Vec::new();
    serialize_scene_node(node, &mut buf)?;
    Ok(buf)
}

/// Read a node written by [`serialize_scene_node`]
pub fn deserialize_scene_node<R: Read>(reader: &mut R) -> SceneResult<DeserializedSceneNode> {
    let general = Chunk::read_expected(reader, CHUNK_NODE_GENERAL)?;
    let (id, name, flags, parent) = general.parse(|cursor| {
        let id = read_u64(cursor)?;
        let name = read_string(cursor)?;
        let flags = read_u32(cursor)?;
        let parent = read_u64(cursor)?;
        Ok((id, name, flags, parent))
    })?;

    let transform = Chunk::read_expected(reader, CHUNK_NODE_TRANSFORM)?.parse(|cursor| read_transform(cursor))?;

    let components = Chunk::read_expected(reader, CHUNK_NODE_COMPONENTS)?.parse(|cursor| {
        let count = read_u32(cursor)?;
        let mut components = Vec::new();
        for _ in 0..count {
            let text = read_string(cursor)?;
            let component: Component = ron::from_str(&text)
                .map_err(|e| SceneError::ComponentPayload(format!("failed to decode component: {e}")))?;
            components.push(component);
        }
        Ok(components)
    })?;

    let mut node = SceneNode::with_name(name).with_id(SceneNodeId(id));
    node.set_flags(SceneNodeFlags::from_bits_truncate(flags));
    node.set_transform(transform);
    for component in components {
        if node.add_component(component).is_some() {
            log::warn!("Scene node {} stored two components of the same kind; keeping the last", SceneNodeId(id));
        }
    }

    Ok(DeserializedSceneNode {
        node,
        parent: (parent != 0).then_some(SceneNodeId(parent)),
    })
}

/// Decode a snapshot produced by [`snapshot_scene_node`]
pub fn restore_scene_node(snapshot: &[u8]) -> SceneResult<DeserializedSceneNode> {
    let mut cursor = std::io::Cursor::new(snapshot);
    deserialize_scene_node(&mut cursor)
}
