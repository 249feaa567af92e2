//! Navigation mesh build settings

use serde::{Deserialize, Serialize};

/// Parameters used to build the scene's navigation mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationMesh {
    /// Voxel size on the ground plane
    pub cell_size: f32,
    /// Minimum ceiling clearance for an agent
    pub walkable_height: f32,
    /// Agent radius
    pub walkable_radius: f32,
    /// Maximum ledge height an agent can step over
    pub walkable_climb: f32,
    /// Maximum walkable slope in degrees
    pub max_slope_degrees: f32,
}

impl Default for NavigationMesh {
    fn default() -> Self {
        Self {
            cell_size: 0.3,
            walkable_height: 2.0,
            walkable_radius: 0.6,
            walkable_climb: 0.9,
            max_slope_degrees: 45.0,
        }
    }
}
