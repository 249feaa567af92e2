//! Configuration system
//!
//! Scene and engine settings that can be loaded from TOML or RON files.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        Self::parse(path, &contents)
    }

    /// Parse configuration text, picking the format from the path extension
    fn parse(path: &str, contents: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # Scene Configuration
///
/// Initial settings applied when a scene is constructed with
/// [`Scene::with_config`](crate::scene::Scene::with_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name, persisted in the properties chunk
    pub name: String,
    /// Floor for automatically generated scene node IDs
    pub min_auto_scene_node_id: u64,
    /// Whether mutations are recorded on the state stack
    pub state_stack_staging_enabled: bool,
    /// Start with script events blocked (edit mode)
    pub script_events_blocked: bool,
    /// Whether the background is cleared before rendering
    pub background_clear: bool,
    /// Background clear color (linear RGB)
    pub background_clear_color: [f32; 3],
    /// Enable HDR rendering for viewports of this scene
    pub enable_hdr: bool,
    /// Enable bloom for viewports of this scene
    pub enable_bloom: bool,
}

impl SceneConfig {
    /// Create a new scene configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the floor for auto-generated IDs
    pub fn with_min_auto_scene_node_id(mut self, id: u64) -> Self {
        self.min_auto_scene_node_id = id;
        self
    }

    /// Enable or disable state stack staging
    pub fn with_state_stack_staging(mut self, enabled: bool) -> Self {
        self.state_stack_staging_enabled = enabled;
        self
    }

    /// Start with script events blocked or unblocked
    pub fn with_script_events_blocked(mut self, blocked: bool) -> Self {
        self.script_events_blocked = blocked;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_auto_scene_node_id == 0 {
            return Err(ConfigError::Invalid(
                "min_auto_scene_node_id must be at least 1 (0 means unassigned)".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Scene".to_string(),
            min_auto_scene_node_id: 1,
            state_stack_staging_enabled: true,
            script_events_blocked: false,
            background_clear: true,
            background_clear_color: [0.5, 0.5, 0.5],
            enable_hdr: false,
            enable_bloom: false,
        }
    }
}

impl Config for SceneConfig {}

/// # Engine Configuration
///
/// Process-wide settings: logging and debug behaviour plus the configuration
/// of the scene created at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Configuration of the startup scene
    pub scene: SceneConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            scene: SceneConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the startup scene configuration
    pub fn with_scene(mut self, scene: SceneConfig) -> Self {
        self.scene = scene;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}
