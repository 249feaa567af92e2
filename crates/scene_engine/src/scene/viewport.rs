//! Scene viewports

use super::node::SceneNodeId;

/// A view into the scene through a camera node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneViewport {
    /// Camera node rendered from; cleared when that node leaves the scene
    pub camera: Option<SceneNodeId>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for SceneViewport {
    fn default() -> Self {
        Self {
            camera: None,
            width: 1280,
            height: 720,
        }
    }
}

impl SceneViewport {
    /// Create a viewport of the given size without a camera
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: None,
            width,
            height,
        }
    }

    /// Set the camera node
    pub fn with_camera(mut self, camera: SceneNodeId) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Width over height
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub(crate) fn forget_camera(&mut self, node: SceneNodeId) {
        if self.camera == Some(node) {
            self.camera = None;
        }
    }
}

/// Handle of an attached viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportId(pub(crate) u32);
