//! Full scene save and load

use std::io::Cursor;

use approx::assert_relative_eq;

use crate::error::SceneError;
use crate::foundation::math::Vec3;
use crate::physics::CollisionShape;
use crate::scene::component::{DynamicsComponent, ModelComponent, PointLightComponent};
use crate::scene::{ComponentKind, NavigationMesh, NodeOwnership, Scene, SceneNode, SceneNodeId, SceneProperties};
use crate::serialization::chunk::{write_chunk, ChunkHeader};

fn sample_scene() -> (Scene, SceneNodeId, SceneNodeId) {
    let mut scene = Scene::new();
    scene.set_properties(SceneProperties {
        name: "Courtyard".to_owned(),
        background_clear: false,
        background_clear_color: Vec3::new(0.1, 0.2, 0.3),
        enable_hdr: true,
        enable_bloom: true,
    });
    scene.set_navigation_mesh(NavigationMesh { cell_size: 0.25, ..NavigationMesh::default() });

    let tower = scene.create_new_scene_node("tower");
    scene.add_scene_node_component(tower, ModelComponent::new("tower.mesh"));
    scene.set_scene_node_position(tower, Vec3::new(4.0, 0.0, -2.0));

    let lamp = scene.create_new_scene_node("lamp");
    scene.add_scene_node_component(lamp, PointLightComponent::default());
    scene.add_scene_node_component(
        lamp,
        DynamicsComponent { collision_shapes: vec![CollisionShape::sphere(0.2)], ..DynamicsComponent::default() },
    );
    scene.attach_scene_node_to_parent(lamp, tower);
    (scene, tower, lamp)
}

fn save(scene: &Scene) -> Vec<u8> {
    let mut bytes = Vec::new();
    scene.serialize(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_save_load_round_trip() {
    let (source, tower, lamp) = sample_scene();
    let bytes = save(&source);

    let mut loaded = Scene::new();
    loaded.deserialize(&mut Cursor::new(&bytes), |_, _| false).unwrap();

    assert_eq!(loaded.scene_node_count(), 2);
    assert_eq!(loaded.properties(), source.properties());
    assert_relative_eq!(loaded.navigation_mesh().cell_size, 0.25);

    let lamp_node = loaded.scene_node(lamp).unwrap();
    assert_eq!(lamp_node.name(), "lamp");
    assert_eq!(lamp_node.parent(), Some(tower));
    assert_eq!(lamp_node.ownership(), NodeOwnership::Owned);
    assert_eq!(
        lamp_node.component_kinds(),
        vec![ComponentKind::PointLight, ComponentKind::Dynamics]
    );
    assert_eq!(loaded.scene_node(tower).unwrap().children(), &[lamp]);

    let world = loaded.scene_node_world_transform(lamp).unwrap();
    assert_relative_eq!(world.position.x, 4.0);
    assert_relative_eq!(world.position.z, -2.0);

    // Counters survive, so new nodes do not reuse saved IDs.
    assert_eq!(loaded.create_new_scene_node("new"), SceneNodeId(3));
}

#[test]
fn test_load_commits_baseline_frame() {
    let (source, tower, _) = sample_scene();
    let bytes = save(&source);
    let mut loaded = Scene::new();
    loaded.create_new_scene_node("old");
    loaded.commit_state_stack_frame();
    loaded.create_new_scene_node("older");
    loaded.commit_state_stack_frame();

    loaded.deserialize(&mut Cursor::new(&bytes), |_, _| false).unwrap();

    assert_eq!(loaded.state_stack_max_frame_index(), 0);
    assert_eq!(loaded.state_stack().frame(0).unwrap().len(), 2);
    assert!(!loaded.state_stack().has_staged_changes());
    assert!(loaded.find_scene_node_by_name("old").is_none());
    assert!(loaded.scene_node(tower).is_some());
}

#[test]
fn test_load_releases_external_nodes() {
    let (source, _, _) = sample_scene();
    let bytes = save(&source);
    let mut target = Scene::new();
    target.add_scene_node(SceneNode::with_name("external").with_id(SceneNodeId(50))).unwrap();

    target.deserialize(&mut Cursor::new(&bytes), |_, _| false).unwrap();

    let released = target.drain_released_scene_nodes();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].name(), "external");
}

#[test]
fn test_unknown_chunks_reach_callback() {
    let (source, _, _) = sample_scene();
    let mut bytes = Vec::new();
    write_chunk(&mut bytes, 0xBEEF_0001, |body| {
        body.extend_from_slice(b"editor");
        Ok(())
    })
    .unwrap();
    bytes.extend(save(&source));

    let mut seen = Vec::new();
    let mut loaded = Scene::new();
    loaded
        .deserialize(&mut Cursor::new(&bytes), |header: &ChunkHeader, payload: &[u8]| {
            seen.push((header.id, payload.to_vec()));
            true
        })
        .unwrap();

    assert_eq!(seen, vec![(0xBEEF_0001, b"editor".to_vec())]);
    assert_eq!(loaded.scene_node_count(), 2);
}

#[test]
fn test_unsupported_version_leaves_scene_untouched() {
    let (source, _, _) = sample_scene();
    let mut bytes = save(&source);
    // Version field of the first chunk header.
    bytes[4..8].copy_from_slice(&99u32.to_le_bytes());

    let mut target = Scene::new();
    let keep = target.create_new_scene_node("keep");
    let result = target.deserialize(&mut Cursor::new(&bytes), |_, _| false);

    assert!(matches!(result, Err(SceneError::UnsupportedChunkVersion { version: 99, .. })));
    assert_eq!(target.scene_node_count(), 1);
    assert!(target.scene_node(keep).is_some());
    assert_eq!(target.properties().name, SceneProperties::default().name);
}

#[test]
fn test_truncated_stream_reports_missing_chunk() {
    let (source, _, _) = sample_scene();
    let bytes = save(&source);
    let first_size = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let truncated = &bytes[..ChunkHeader::SIZE + first_size];

    let mut target = Scene::new();
    let result = target.deserialize(&mut Cursor::new(truncated), |_, _| false);

    assert!(matches!(result, Err(SceneError::MissingChunk("SceneProperties"))));
}

#[test]
fn test_out_of_order_chunk_is_rejected() {
    let (source, _, _) = sample_scene();
    let bytes = save(&source);
    let first_size = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let first = &bytes[..ChunkHeader::SIZE + first_size];
    let mut doubled = first.to_vec();
    doubled.extend_from_slice(&bytes);

    let mut target = Scene::new();
    let result = target.deserialize(&mut Cursor::new(&doubled), |_, _| false);

    assert!(matches!(result, Err(SceneError::UnexpectedChunk { expected: "SceneProperties", .. })));
}

#[test]
fn test_serialization_disabled_nodes_are_skipped() {
    let (mut source, tower, lamp) = sample_scene();
    source.set_scene_node_serialization_enabled(tower, false);
    let bytes = save(&source);

    let mut loaded = Scene::new();
    loaded.deserialize(&mut Cursor::new(&bytes), |_, _| false).unwrap();

    assert_eq!(loaded.scene_node_count(), 1);
    assert!(loaded.scene_node(tower).is_none());
    assert_eq!(loaded.scene_node(lamp).unwrap().parent(), None);
}
