//! Full scene save and load
//!
//! A scene is five chunks in fixed order: info, properties, navigation,
//! hierarchy and nodes. Chunks with other IDs may be interleaved; they are
//! offered to the caller and otherwise skipped. Loading parses and validates
//! the whole stream before the scene is touched.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use crate::error::{SceneError, SceneResult};
use crate::serialization::chunk::{
    chunk_name, write_chunk, Chunk, ChunkHeader, CHUNK_SCENE_HIERARCHY, CHUNK_SCENE_INFO, CHUNK_SCENE_NAVIGATION,
    CHUNK_SCENE_NODES, CHUNK_SCENE_PROPERTIES,
};
use crate::serialization::{
    deserialize_scene_node, read_bool, read_f32, read_string, read_u32, read_u64, read_vec3, serialize_scene_node,
    write_bool, write_f32, write_string, write_u32, write_u64, write_vec3,
};
use super::navigation::NavigationMesh;
use super::node::{NodeOwnership, SceneNode, SceneNodeId};
use super::scene::{Scene, SceneProperties};

const SCENE_CHUNK_ORDER: [u32; 5] = [
    CHUNK_SCENE_INFO,
    CHUNK_SCENE_PROPERTIES,
    CHUNK_SCENE_NAVIGATION,
    CHUNK_SCENE_HIERARCHY,
    CHUNK_SCENE_NODES,
];

fn count_u32(len: usize, what: &str) -> SceneResult<u32> {
    u32::try_from(len).map_err(|_| SceneError::CorruptedData(format!("too many {what} to serialize")))
}

/// Everything read from a scene stream, validated but not yet applied
struct ParsedScene {
    next_id: u64,
    min_auto_id: u64,
    properties: SceneProperties,
    navigation_mesh: NavigationMesh,
    /// `(child, parent)` local node indices
    hierarchy: Vec<(usize, usize)>,
    nodes: Vec<SceneNode>,
}

impl Scene {
    /// Write every serializable node and the scene settings
    ///
    /// Nodes with serialization disabled are left out; their serializable
    /// children are saved as roots.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> SceneResult<()> {
        let nodes: Vec<&SceneNode> = self.nodes.iter().filter(|n| n.is_serialization_enabled()).collect();
        let node_count = count_u32(nodes.len(), "scene nodes")?;
        let index: HashMap<SceneNodeId, u32> = nodes.iter().map(|n| n.id()).zip(0..).collect();

        write_chunk(writer, CHUNK_SCENE_INFO, |body| {
            write_u64(body, self.id_allocator.next_id())?;
            write_u64(body, self.id_allocator.min_auto_id())
        })?;

        write_chunk(writer, CHUNK_SCENE_PROPERTIES, |body| {
            let properties = &self.properties;
            write_string(body, &properties.name)?;
            write_bool(body, properties.background_clear)?;
            write_vec3(body, &properties.background_clear_color)?;
            write_bool(body, properties.enable_hdr)?;
            write_bool(body, properties.enable_bloom)
        })?;

        write_chunk(writer, CHUNK_SCENE_NAVIGATION, |body| {
            let mesh = &self.navigation_mesh;
            write_f32(body, mesh.cell_size)?;
            write_f32(body, mesh.walkable_height)?;
            write_f32(body, mesh.walkable_radius)?;
            write_f32(body, mesh.walkable_climb)?;
            write_f32(body, mesh.max_slope_degrees)
        })?;

        write_chunk(writer, CHUNK_SCENE_HIERARCHY, |body| {
            let pairs: Vec<(u32, u32)> = nodes
                .iter()
                .filter_map(|node| {
                    let parent = index.get(&node.parent()?)?;
                    Some((*index.get(&node.id())?, *parent))
                })
                .collect();
            write_u32(body, count_u32(pairs.len(), "hierarchy links")?)?;
            for (child, parent) in pairs {
                write_u32(body, child)?;
                write_u32(body, parent)?;
            }
            Ok(())
        })?;

        write_chunk(writer, CHUNK_SCENE_NODES, |body| {
            write_u32(body, node_count)?;
            for node in &nodes {
                write_u64(body, node.id().get())?;
            }
            for node in &nodes {
                let mut payload = Vec::new();
                serialize_scene_node(node, &mut payload)?;
                write_u32(body, count_u32(payload.len(), "node bytes")?)?;
                body.extend_from_slice(&payload);
            }
            Ok(())
        })?;

        log::info!("Serialized scene '{}' ({} nodes)", self.properties.name, nodes.len());
        Ok(())
    }

    /// Replace the scene's contents with a stream written by [`Self::serialize`]
    ///
    /// `on_unknown_chunk` receives chunks this reader does not know and
    /// returns whether it consumed them. On error the scene is unchanged.
    /// After loading, the state stack holds a single baseline frame.
    pub fn deserialize<R: Read>(
        &mut self,
        reader: &mut R,
        mut on_unknown_chunk: impl FnMut(&ChunkHeader, &[u8]) -> bool,
    ) -> SceneResult<()> {
        let parsed = parse_scene(reader, &mut on_unknown_chunk)?;
        self.apply_parsed(parsed);
        Ok(())
    }

    fn apply_parsed(&mut self, parsed: ParsedScene) {
        let staging = std::mem::replace(&mut self.is_state_stack_staging_enabled, false);

        let roots: Vec<SceneNodeId> = self
            .nodes
            .iter()
            .filter(|n| n.parent().is_none())
            .map(SceneNode::id)
            .collect();
        for root in roots.into_iter().rev() {
            self.release_scene_node(root);
        }

        self.properties = parsed.properties;
        self.navigation_mesh = parsed.navigation_mesh;
        self.id_allocator.restore(parsed.next_id, parsed.min_auto_id);

        let count = parsed.nodes.len();
        for root in build_trees(parsed.nodes, &parsed.hierarchy) {
            self.insert_scene_node(root, None);
        }

        self.state_stack.clear();
        self.is_state_stack_staging_enabled = staging;
        if staging {
            self.commit_state_stack_frame();
        }
        log::info!("Deserialized scene '{}' ({count} nodes)", self.properties.name);
    }
}

fn parse_scene<R: Read>(
    reader: &mut R,
    on_unknown_chunk: &mut impl FnMut(&ChunkHeader, &[u8]) -> bool,
) -> SceneResult<ParsedScene> {
    let mut next_expected = 0;
    let mut info = None;
    let mut properties = None;
    let mut navigation_mesh = None;
    let mut hierarchy = None;
    let mut node_data = None;

    while let Some(chunk) = Chunk::read(reader)? {
        let id = chunk.header.id;
        let Some(position) = SCENE_CHUNK_ORDER.iter().position(|known| *known == id) else {
            if !on_unknown_chunk(&chunk.header, &chunk.payload) {
                log::debug!("Skipping unknown chunk {id:#x} ({} bytes)", chunk.header.size);
            }
            continue;
        };
        if position != next_expected {
            let expected = SCENE_CHUNK_ORDER.get(next_expected).copied().unwrap_or(id);
            log::error!("Scene chunk '{}' out of order", chunk_name(id));
            return Err(SceneError::UnexpectedChunk { expected: chunk_name(expected), found: id });
        }
        chunk.header.expect_version()?;
        next_expected += 1;

        match id {
            CHUNK_SCENE_INFO => {
                info = Some(chunk.parse(|cursor| Ok((read_u64(cursor)?, read_u64(cursor)?)))?);
            }
            CHUNK_SCENE_PROPERTIES => {
                properties = Some(chunk.parse(|cursor| {
                    Ok(SceneProperties {
                        name: read_string(cursor)?,
                        background_clear: read_bool(cursor)?,
                        background_clear_color: read_vec3(cursor)?,
                        enable_hdr: read_bool(cursor)?,
                        enable_bloom: read_bool(cursor)?,
                    })
                })?);
            }
            CHUNK_SCENE_NAVIGATION => {
                navigation_mesh = Some(chunk.parse(|cursor| {
                    Ok(NavigationMesh {
                        cell_size: read_f32(cursor)?,
                        walkable_height: read_f32(cursor)?,
                        walkable_radius: read_f32(cursor)?,
                        walkable_climb: read_f32(cursor)?,
                        max_slope_degrees: read_f32(cursor)?,
                    })
                })?);
            }
            CHUNK_SCENE_HIERARCHY => {
                hierarchy = Some(chunk.parse(|cursor| {
                    let count = read_u32(cursor)?;
                    let mut pairs = Vec::new();
                    for _ in 0..count {
                        pairs.push((read_u32(cursor)? as usize, read_u32(cursor)? as usize));
                    }
                    Ok(pairs)
                })?);
            }
            _ => {
                node_data = Some(chunk.parse(|cursor| {
                    let count = read_u32(cursor)? as usize;
                    let mut ids = Vec::new();
                    for _ in 0..count {
                        ids.push(SceneNodeId(read_u64(cursor)?));
                    }
                    let mut nodes = Vec::new();
                    for _ in 0..count {
                        let size = u64::from(read_u32(cursor)?);
                        let start = cursor.position();
                        let node = deserialize_scene_node(cursor)?.node;
                        if cursor.position() - start != size {
                            return Err(SceneError::CorruptedData(format!(
                                "scene node {} payload size mismatch",
                                node.id()
                            )));
                        }
                        nodes.push(node);
                    }
                    Ok((ids, nodes))
                })?);
            }
        }
    }

    if let Some(missing) = SCENE_CHUNK_ORDER.get(next_expected) {
        return Err(SceneError::MissingChunk(chunk_name(*missing)));
    }
    let (
        Some((next_id, min_auto_id)),
        Some(properties),
        Some(navigation_mesh),
        Some(hierarchy),
        Some((ids, nodes)),
    ) = (info, properties, navigation_mesh, hierarchy, node_data)
    else {
        return Err(SceneError::CorruptedData("scene chunks incomplete".to_owned()));
    };

    validate_nodes(&ids, &nodes)?;
    validate_hierarchy(&hierarchy, nodes.len())?;

    Ok(ParsedScene {
        next_id,
        min_auto_id,
        properties,
        navigation_mesh,
        hierarchy,
        nodes,
    })
}

fn validate_nodes(ids: &[SceneNodeId], nodes: &[SceneNode]) -> SceneResult<()> {
    let mut seen = HashSet::new();
    for (listed, node) in ids.iter().zip(nodes) {
        if *listed != node.id() {
            return Err(SceneError::CorruptedData(format!(
                "node table lists {listed} but the payload holds {}",
                node.id()
            )));
        }
        if !listed.is_assigned() {
            return Err(SceneError::CorruptedData("scene node without an ID".to_owned()));
        }
        if !seen.insert(*listed) {
            return Err(SceneError::CorruptedData(format!("duplicate scene node {listed}")));
        }
    }
    Ok(())
}

fn validate_hierarchy(hierarchy: &[(usize, usize)], count: usize) -> SceneResult<()> {
    let mut parent_of = vec![None; count];
    for &(child, parent) in hierarchy {
        if child >= count || parent >= count || child == parent {
            return Err(SceneError::CorruptedData(format!("invalid hierarchy link {child} -> {parent}")));
        }
        if parent_of[child].replace(parent).is_some() {
            return Err(SceneError::CorruptedData(format!("node index {child} has two parents")));
        }
    }

    for start in 0..count {
        let mut current = start;
        let mut steps = 0;
        while let Some(parent) = parent_of[current] {
            steps += 1;
            if steps > count {
                return Err(SceneError::CorruptedData("hierarchy contains a cycle".to_owned()));
            }
            current = parent;
        }
    }
    Ok(())
}

/// Assemble detached trees from a validated forest, roots in stream order
fn build_trees(nodes: Vec<SceneNode>, hierarchy: &[(usize, usize)]) -> Vec<SceneNode> {
    let mut children_of = vec![Vec::new(); nodes.len()];
    let mut has_parent = vec![false; nodes.len()];
    for &(child, parent) in hierarchy {
        children_of[parent].push(child);
        has_parent[child] = true;
    }
    for children in &mut children_of {
        children.sort_unstable();
    }

    let mut slots: Vec<Option<SceneNode>> = nodes.into_iter().map(Some).collect();
    (0..slots.len())
        .filter(|i| !has_parent[*i])
        .filter_map(|i| take_tree(i, &mut slots, &children_of))
        .collect()
}

fn take_tree(index: usize, slots: &mut [Option<SceneNode>], children_of: &[Vec<usize>]) -> Option<SceneNode> {
    let mut node = slots[index].take()?;
    node.ownership = NodeOwnership::Owned;
    for &child in &children_of[index] {
        if let Some(child) = take_tree(child, slots, children_of) {
            node.add_child(child);
        }
    }
    Some(node)
}
