//! Node lifecycle through the scene: IDs, ownership, hooks and events

use std::collections::HashSet;

use approx::assert_relative_eq;

use super::support::{count, entries, recording_scene, register_recording_script};
use crate::config::SceneConfig;
use crate::foundation::math::Vec3;
use crate::physics::CollisionShape;
use crate::scene::component::{
    CameraComponent, ConstraintComponent, DynamicsComponent, ModelComponent, ScriptComponent,
};
use crate::scene::{
    AddSceneNodeErrorKind, ComponentKind, Scene, SceneId, SceneNode, SceneNodeFlags, SceneNodeId, SceneViewport,
};

#[test]
fn test_auto_ids_are_unique() {
    let mut scene = Scene::new();
    let ids: HashSet<SceneNodeId> = (0..100).map(|i| scene.create_new_scene_node(format!("n{i}"))).collect();

    assert_eq!(ids.len(), 100);
    assert!(!ids.contains(&SceneNodeId::NONE));
}

#[test]
fn test_auto_ids_skip_explicit_ids() {
    let mut scene = Scene::new();
    scene.create_new_scene_node("a");
    scene.create_new_scene_node("b");
    scene.add_scene_node(SceneNode::with_name("explicit").with_id(SceneNodeId(3))).unwrap();

    assert_eq!(scene.create_new_scene_node("c"), SceneNodeId(4));
}

#[test]
fn test_min_auto_id_floor() {
    let mut scene = Scene::new();
    assert_eq!(scene.create_new_scene_node("low"), SceneNodeId(1));

    scene.set_min_auto_scene_node_id(100);

    assert_eq!(scene.create_new_scene_node("a"), SceneNodeId(100));
    assert_eq!(scene.create_new_scene_node("b"), SceneNodeId(101));
    assert_eq!(scene.min_auto_scene_node_id(), 100);
}

#[test]
fn test_min_auto_id_from_config() {
    let mut scene = Scene::with_config(&SceneConfig::new("configured").with_min_auto_scene_node_id(50));

    assert_eq!(scene.create_new_scene_node("a"), SceneNodeId(50));
    assert_eq!(scene.properties().name, "configured");
}

#[test]
fn test_subtree_added_parent_first_and_removed_children_first() {
    let (mut scene, rec) = recording_scene();
    let mut b = SceneNode::with_name("b");
    b.add_child(SceneNode::with_name("c"));
    let mut a = SceneNode::with_name("a");
    a.add_child(b);

    let root = scene.add_scene_node(a).unwrap();
    assert_eq!(entries(&rec.events, "added"), vec!["added a", "added b", "added c"]);
    assert_eq!(scene.scene_node_count(), 3);

    let returned = scene.remove_scene_node(root);

    assert_eq!(entries(&rec.events, "removed"), vec!["removed c", "removed b", "removed a"]);
    assert!(scene.scene_nodes().is_empty());
    let names: Vec<&str> = returned.iter().map(SceneNode::name).collect();
    assert_eq!(names, vec!["c", "b", "a"]);
    assert!(returned.iter().all(|n| !n.is_in_scene() && n.parent().is_none()));
}

#[test]
fn test_owned_nodes_are_not_returned() {
    let mut scene = Scene::new();
    let parent = scene.create_new_scene_node("owned");
    let child = scene.add_scene_node(SceneNode::with_name("borrowed")).unwrap();
    assert!(scene.attach_scene_node_to_parent(child, parent));

    let returned = scene.remove_scene_node(parent);

    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].name(), "borrowed");
}

#[test]
fn test_add_with_colliding_id_returns_node() {
    let (mut scene, rec) = recording_scene();
    let existing = scene.create_new_scene_node("existing");

    let err = scene
        .add_scene_node(SceneNode::with_name("intruder").with_id(existing))
        .unwrap_err();

    assert_eq!(err.kind(), AddSceneNodeErrorKind::IdCollision(existing));
    assert_eq!(err.into_node().name(), "intruder");
    assert_eq!(scene.scene_node_count(), 1);
    assert_eq!(entries(&rec.events, "added").len(), 1);
}

#[test]
fn test_add_with_duplicate_ids_in_subtree_is_rejected() {
    let mut scene = Scene::new();
    let mut root = SceneNode::with_name("root").with_id(SceneNodeId(7));
    root.add_child(SceneNode::with_name("twin").with_id(SceneNodeId(7)));

    let err = scene.add_scene_node(root).unwrap_err();

    assert_eq!(err.kind(), AddSceneNodeErrorKind::IdCollision(SceneNodeId(7)));
    assert_eq!(err.node().detached_children().len(), 1);
    assert!(scene.scene_nodes().is_empty());
}

#[test]
fn test_add_node_already_in_a_scene_is_rejected() {
    let mut scene = Scene::new();
    let mut node = SceneNode::with_name("elsewhere");
    node.scene = Some(SceneId::next());

    let err = scene.add_scene_node(node).unwrap_err();

    assert_eq!(err.kind(), AddSceneNodeErrorKind::AlreadyInScene);
    assert_eq!(scene.scene_node_count(), 0);
}

#[test]
fn test_preattached_model_registered_once() {
    let (mut scene, rec) = recording_scene();

    let id = scene
        .add_scene_node(SceneNode::with_name("crate").with_component(ModelComponent::new("crate.mesh")))
        .unwrap();

    assert_eq!(count(&rec.culling, &format!("add_model {id}")), 1);
    assert_eq!(entries(&rec.culling, "add_").len(), 1);
    // Pre-attached components are covered by the added event.
    assert!(entries(&rec.events, "component_added").is_empty());
}

#[test]
fn test_hidden_node_registers_on_show() {
    let (mut scene, rec) = recording_scene();
    let mut node = SceneNode::with_name("ghost").with_component(ModelComponent::default());
    node.set_flags(SceneNodeFlags::default() - SceneNodeFlags::VISIBLE);

    let id = scene.add_scene_node(node).unwrap();
    assert_eq!(count(&rec.culling, &format!("add_model {id}")), 0);

    assert!(scene.show_scene_node(id));
    assert_eq!(count(&rec.culling, &format!("add_model {id}")), 1);
    assert_eq!(count(&rec.events, "show ghost"), 1);

    assert!(scene.hide_scene_node(id));
    assert_eq!(count(&rec.culling, &format!("remove_model {id}")), 1);

    // Already hidden: no second notification.
    scene.hide_scene_node(id);
    assert_eq!(count(&rec.events, "hide ghost"), 1);
}

#[test]
fn test_component_added_replaced_and_removed() {
    let (mut scene, rec) = recording_scene();
    let id = scene.create_new_scene_node("lamp");

    assert!(scene.add_scene_node_component(id, ModelComponent::new("a.mesh")).is_none());
    assert_eq!(count(&rec.events, "component_added lamp Model"), 1);

    let previous = scene.add_scene_node_component(id, ModelComponent::new("b.mesh"));
    assert!(previous.is_some());
    assert_eq!(count(&rec.events, "component_changed lamp Model"), 1);
    assert_eq!(count(&rec.culling, &format!("remove_model {id}")), 1);
    assert_eq!(count(&rec.culling, &format!("add_model {id}")), 2);

    assert!(scene.remove_scene_node_component(id, ComponentKind::Model).is_some());
    assert_eq!(count(&rec.events, "component_removed lamp Model"), 1);
    assert!(scene.remove_scene_node_component(id, ComponentKind::Model).is_none());
}

#[test]
fn test_transform_propagates_to_children() {
    let (mut scene, rec) = recording_scene();
    let parent = scene.create_new_scene_node("parent");
    let child = scene.create_new_scene_node("child");
    scene.add_scene_node_component(child, ModelComponent::default());
    scene.set_scene_node_position(child, Vec3::new(0.0, 1.0, 0.0));
    assert!(scene.attach_scene_node_to_parent(child, parent));
    rec.events.borrow_mut().clear();
    rec.culling.borrow_mut().clear();

    scene.set_scene_node_position(parent, Vec3::new(5.0, 0.0, 0.0));

    let world = scene.scene_node_world_transform(child).unwrap();
    assert_relative_eq!(world.position.x, 5.0);
    assert_relative_eq!(world.position.y, 1.0);
    assert_eq!(entries(&rec.events, "transform"), vec!["transform parent", "transform child"]);
    assert_eq!(count(&rec.culling, &format!("update_model {child}")), 1);
    assert!(entries(&rec.events, "scale").is_empty());
}

#[test]
fn test_scale_change_is_reported_separately() {
    let (mut scene, rec) = recording_scene();
    let id = scene.create_new_scene_node("box");

    scene.set_scene_node_scale(id, Vec3::new(2.0, 2.0, 2.0));

    assert_eq!(count(&rec.events, "scale box"), 1);
    assert_eq!(count(&rec.events, "transform box"), 0);
}

#[test]
fn test_reparenting_rejects_cycles() {
    let (mut scene, rec) = recording_scene();
    let a = scene.create_new_scene_node("a");
    let b = scene.create_new_scene_node("b");
    assert!(scene.attach_scene_node_to_parent(b, a));
    assert_eq!(count(&rec.events, "parent_changed b"), 1);

    assert!(!scene.attach_scene_node_to_parent(a, b));
    assert!(!scene.attach_scene_node_to_parent(a, a));
    assert_eq!(scene.scene_node(a).unwrap().parent(), None);

    assert!(scene.detach_scene_node_from_parent(b));
    assert!(scene.scene_node(a).unwrap().children().is_empty());
}

#[test]
fn test_rename_updates_lookup() {
    let (mut scene, rec) = recording_scene();
    let id = scene.create_new_scene_node("before");

    assert!(scene.set_scene_node_name(id, "after"));

    assert_eq!(count(&rec.events, "renamed before -> after"), 1);
    assert!(scene.find_scene_node_by_name("before").is_none());
    assert_eq!(scene.find_scene_node_by_name("after").map(SceneNode::id), Some(id));
}

#[test]
fn test_dynamics_without_shapes_is_skipped() {
    let (mut scene, rec) = recording_scene();
    let id = scene.create_new_scene_node("ball");

    scene.add_scene_node_component(id, DynamicsComponent::default());
    assert!(entries(&rec.physics, "add_rigid_body").is_empty());

    let dynamics = DynamicsComponent {
        collision_shapes: vec![CollisionShape::sphere(0.5)],
        ..DynamicsComponent::default()
    };
    scene.add_scene_node_component(id, dynamics);
    assert_eq!(count(&rec.physics, &format!("add_rigid_body {id}")), 1);

    scene.set_scene_node_position(id, Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(count(&rec.physics, &format!("update_rigid_body {id}")), 1);

    let mut from_physics = scene.scene_node(id).unwrap().transform().clone();
    from_physics.position.y = 2.5;
    scene.set_scene_node_transform_from_physics(id, from_physics);
    assert_eq!(count(&rec.physics, &format!("update_rigid_body {id}")), 1);

    scene.remove_scene_node(id);
    assert_eq!(count(&rec.physics, &format!("remove_rigid_body {id}")), 1);
}

#[test]
fn test_physics_move_updates_child_bodies() {
    let (mut scene, rec) = recording_scene();
    let shaped = || DynamicsComponent {
        collision_shapes: vec![CollisionShape::sphere(0.5)],
        ..DynamicsComponent::default()
    };
    let parent = scene.create_new_scene_node("parent");
    let child = scene.create_new_scene_node("child");
    scene.add_scene_node_component(parent, shaped());
    scene.add_scene_node_component(child, shaped());
    scene.attach_scene_node_to_parent(child, parent);
    rec.physics.borrow_mut().clear();

    let mut from_physics = scene.scene_node(parent).unwrap().transform().clone();
    from_physics.position.x = 5.0;
    scene.set_scene_node_transform_from_physics(parent, from_physics);

    assert_eq!(count(&rec.physics, &format!("update_rigid_body {parent}")), 0);
    assert_eq!(count(&rec.physics, &format!("update_rigid_body {child}")), 1);
}

#[test]
fn test_self_constraint_is_skipped() {
    let (mut scene, rec) = recording_scene();
    let id = scene.create_new_scene_node("hinge");
    let other = scene.create_new_scene_node("door");

    scene.add_scene_node_component(id, ConstraintComponent { other: Some(id), ..ConstraintComponent::default() });
    assert!(entries(&rec.physics, "add_constraint").is_empty());

    scene.add_scene_node_component(other, ConstraintComponent { other: Some(id), ..ConstraintComponent::default() });
    assert_eq!(count(&rec.physics, &format!("add_constraint {other}")), 1);
}

#[test]
fn test_script_startup_and_shutdown_once_per_membership() {
    let (mut scene, rec) = recording_scene();
    register_recording_script(&mut scene, &rec);

    let id = scene
        .add_scene_node(SceneNode::with_name("npc").with_component(ScriptComponent::new("npc.lua")))
        .unwrap();
    assert_eq!(count(&rec.script, &format!("instantiate {id}")), 1);
    assert_eq!(count(&rec.script, &format!("OnStartup {id}")), 1);

    scene.block_script_events();
    scene.unblock_script_events();
    assert_eq!(count(&rec.script, &format!("OnStartup {id}")), 1);

    let mut returned = scene.remove_scene_node(id);
    assert_eq!(count(&rec.script, &format!("OnShutdown {id}")), 1);
    assert_eq!(count(&rec.script, &format!("uninstantiate {id}")), 1);

    let node = returned.pop().unwrap();
    assert!(!node.has_script_started());
    scene.add_scene_node(node).unwrap();
    assert_eq!(count(&rec.script, &format!("OnStartup {id}")), 2);
    assert_eq!(count(&rec.script, &format!("OnShutdown {id}")), 1);
}

#[test]
fn test_blocked_script_events_start_on_unblock() {
    let (mut scene, rec) = recording_scene();
    register_recording_script(&mut scene, &rec);
    scene.block_script_events();

    let id = scene
        .add_scene_node(SceneNode::with_name("npc").with_component(ScriptComponent::new("npc.lua")))
        .unwrap();
    scene.hide_scene_node(id);
    assert_eq!(count(&rec.script, &format!("instantiate {id}")), 1);
    assert!(entries(&rec.script, "On").is_empty());

    scene.unblock_script_events();
    assert_eq!(entries(&rec.script, "On"), vec![format!("OnStartup {id}")]);
}

#[test]
fn test_script_registered_after_nodes() {
    let (mut scene, rec) = recording_scene();
    let id = scene
        .add_scene_node(
            SceneNode::with_name("npc")
                .with_component(ModelComponent::default())
                .with_component(ScriptComponent::new("npc.lua")),
        )
        .unwrap();
    scene.create_new_scene_node("plain");

    register_recording_script(&mut scene, &rec);

    assert_eq!(count(&rec.script, &format!("register {id} Model")), 1);
    assert_eq!(count(&rec.script, &format!("register {id} Script")), 1);
    assert_eq!(entries(&rec.script, "instantiate").len(), 1);
    assert_eq!(entries(&rec.script, "OnStartup").len(), 1);

    assert!(scene.unregister_script().is_some());
    assert_eq!(count(&rec.script, &format!("OnShutdown {id}")), 1);
    assert!(!scene.is_script_registered());
}

#[test]
fn test_update_reaches_scripted_nodes() {
    let (mut scene, rec) = recording_scene();
    register_recording_script(&mut scene, &rec);
    let scripted = scene
        .add_scene_node(SceneNode::with_name("npc").with_component(ScriptComponent::new("npc.lua")))
        .unwrap();
    scene.create_new_scene_node("prop");

    scene.update(0.016);

    assert_eq!(entries(&rec.script, "OnUpdate"), vec![format!("OnUpdate {scripted}")]);
}

#[test]
fn test_proximity_notifications_are_forwarded() {
    let (mut scene, rec) = recording_scene();
    register_recording_script(&mut scene, &rec);
    let trigger = scene
        .add_scene_node(SceneNode::with_name("trigger").with_component(ScriptComponent::new("trigger.lua")))
        .unwrap();
    let visitor = scene.create_new_scene_node("visitor");

    scene.notify_object_enter(trigger, visitor);
    scene.notify_object_leave(trigger, visitor);
    scene.notify_object_enter(visitor, trigger);

    assert_eq!(entries(&rec.script, "OnObject").len(), 2);
}

#[test]
fn test_removing_camera_clears_viewports() {
    let mut scene = Scene::new();
    let camera = scene.create_new_scene_node("camera");
    scene.add_scene_node_component(camera, CameraComponent::default());
    scene.default_viewport_mut().camera = Some(camera);
    let viewport = scene.attach_viewport(SceneViewport::new(640, 480).with_camera(camera));

    scene.remove_scene_node(camera);

    assert_eq!(scene.default_viewport().camera, None);
    assert_eq!(scene.viewport(viewport).and_then(|v| v.camera), None);
    assert!(scene.detach_viewport(viewport).is_some());
    assert_eq!(scene.viewports().count(), 0);
}

#[test]
fn test_detached_event_handler_stops_receiving() {
    let (mut scene, rec) = recording_scene();
    let handler = scene.attach_event_handler(Box::new(super::support::RecordingHandler(rec.events.clone())));
    scene.create_new_scene_node("twice");
    assert_eq!(count(&rec.events, "added twice"), 2);

    assert!(scene.detach_event_handler(handler).is_some());
    scene.create_new_scene_node("once");

    assert_eq!(count(&rec.events, "added once"), 1);
    assert_eq!(scene.event_handler_count(), 1);
}
