//! Scene editing demo
//!
//! Builds a small scene, walks its undo history back and forth, forks a
//! branch and round-trips the result through the binary scene format while
//! logging what the scene reports.

use std::io::Cursor;

use rand::Rng;
use scene_engine::config::{Config, ConfigError, EngineConfig};
use scene_engine::foundation::logging;
use scene_engine::physics::CollisionShape;
use scene_engine::prelude::*;
use scene_engine::scene::component::{DynamicsComponent, ModelComponent, PointLightComponent, ScriptComponent};
use thiserror::Error;

#[derive(Error, Debug)]
enum DemoError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("logger already installed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Prints what the scene reports to the log
struct LoggingHandler;

impl SceneEventHandler for LoggingHandler {
    fn on_scene_node_added(&mut self, node: &SceneNode) {
        log::info!("+ {} '{}'", node.id(), node.name());
    }

    fn on_scene_node_removed(&mut self, node: &SceneNode) {
        log::info!("- {} '{}'", node.id(), node.name());
    }

    fn on_scene_node_name_changed(&mut self, node: &SceneNode, previous_name: &str) {
        log::info!("~ {} '{previous_name}' -> '{}'", node.id(), node.name());
    }

    fn on_state_stack_frame_committed(&mut self) {
        log::info!("frame committed");
    }
}

/// Script runtime stand-in that logs every callback it would run
struct LoggingScript;

impl ScriptBridge for LoggingScript {
    fn instantiate_scene_node(&mut self, node: &SceneNode) {
        log::debug!("script: instantiate {}", node.id());
    }

    fn uninstantiate_scene_node(&mut self, node: SceneNodeId) {
        log::debug!("script: uninstantiate {node}");
    }

    fn register_component(&mut self, node: &SceneNode, kind: ComponentKind) {
        log::trace!("script: expose {} of {}", kind.name(), node.id());
    }

    fn unregister_component(&mut self, node: SceneNodeId, kind: ComponentKind) {
        log::trace!("script: withdraw {} of {node}", kind.name());
    }

    fn post_scene_node_event(&mut self, node: SceneNodeId, event: ScriptEvent) {
        log::info!("script: {node}.{}()", event.callback_name());
    }
}

struct DemoApp {
    scene: Scene,
}

impl DemoApp {
    fn new(config: &EngineConfig) -> Self {
        let mut scene = Scene::with_config(&config.scene);
        scene.attach_event_handler(Box::new(LoggingHandler));
        scene.register_script(Box::new(LoggingScript));
        Self { scene }
    }

    /// Populate the scene with a tower, a lamp on top of it and scattered crates
    fn build(&mut self) -> SceneNodeId {
        let scene = &mut self.scene;
        let mut rng = rand::thread_rng();

        let tower = scene.create_new_scene_node("tower");
        scene.add_scene_node_component(tower, ModelComponent::new("models/tower.obj"));

        let lamp = scene.create_new_scene_node("lamp");
        scene.add_scene_node_component(lamp, PointLightComponent::default());
        scene.set_scene_node_position(lamp, Vec3::new(0.0, 12.0, 0.0));
        scene.attach_scene_node_to_parent(lamp, tower);

        for i in 0..5 {
            let id = scene.create_new_scene_node(format!("crate_{i}"));
            scene.add_scene_node_component(id, ModelComponent::new("models/cube.obj"));
            scene.add_scene_node_component(
                id,
                DynamicsComponent {
                    collision_shapes: vec![CollisionShape::cuboid(Vec3::new(0.5, 0.5, 0.5))],
                    ..DynamicsComponent::default()
                },
            );
            let position = Vec3::new(rng.gen_range(-10.0..10.0), 0.5, rng.gen_range(-10.0..10.0));
            scene.set_scene_node_position(id, position);
        }

        let guard = scene.create_new_scene_node("guard");
        scene.add_scene_node_component(guard, ScriptComponent::new("scripts/guard.lua"));

        scene.commit_state_stack_frame();
        tower
    }

    fn walk_history(&mut self, tower: SceneNodeId) {
        let scene = &mut self.scene;

        scene.set_scene_node_name(tower, "watchtower");
        scene.commit_state_stack_frame();

        if let Some(guard) = scene.find_scene_node_by_name("guard").map(SceneNode::id) {
            scene.remove_scene_node(guard);
            scene.commit_state_stack_frame();
        }
        log::info!(
            "{} nodes at frame {} of {}",
            scene.scene_node_count(),
            scene.state_stack_current_frame_index(),
            scene.state_stack_max_frame_index()
        );

        scene.seek_state_stack(-2);
        log::info!("undo x2: {} nodes, tower is '{}'", scene.scene_node_count(), name(scene, tower));

        let fork = scene.create_state_stack_branch();
        scene.set_scene_node_name(tower, "lighthouse");
        scene.commit_state_stack_frame();
        log::info!("{fork}: tower is '{}'", name(scene, tower));

        scene.switch_state_stack_branch(StateStackBranchId::MAIN);
        scene.seek_state_stack(2);
        log::info!("{}: tower is '{}'", StateStackBranchId::MAIN, name(scene, tower));

        scene.update(1.0 / 60.0);
    }

    fn round_trip(&mut self) -> Result<(), DemoError> {
        let mut bytes = Vec::new();
        self.scene.serialize(&mut bytes)?;
        log::info!("saved {} bytes", bytes.len());

        let mut loaded = Scene::new();
        loaded.deserialize(&mut Cursor::new(&bytes), |header, _| {
            log::warn!("unrecognised chunk {:#x}", header.id);
            false
        })?;
        log::info!(
            "loaded '{}' with {} nodes",
            loaded.properties().name,
            loaded.scene_node_count()
        );
        Ok(())
    }
}

fn name(scene: &Scene, id: SceneNodeId) -> String {
    scene.scene_node(id).map_or_else(|| "<gone>".to_owned(), |n| n.name().to_owned())
}

fn load_config() -> Result<EngineConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(&path),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<(), DemoError> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level)?;
    log::info!("Starting scene demo (debug mode: {})", config.debug_mode);

    let mut app = DemoApp::new(&config);
    let tower = app.build();
    app.walk_history(tower);
    app.round_trip()?;

    log::info!("Scene demo finished");
    Ok(())
}
