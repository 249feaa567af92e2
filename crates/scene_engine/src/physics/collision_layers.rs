//! Collision groups for filtering physics interactions
//!
//! Dynamics and proximity components carry a group (what they are) and a
//! mask (what they interact with). Two objects interact only when each one's
//! group is in the other's mask.

/// Collision group definitions
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision group
    pub const NONE: u32 = 0;

    /// All collision groups
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Ordinary simulated bodies
    pub const DEFAULT: u32 = 1 << 0;

    /// Static environment geometry
    pub const STATIC: u32 = 1 << 1;

    /// Bodies moved by their scene node
    pub const KINEMATIC: u32 = 1 << 2;

    /// Debris and small physics objects
    pub const DEBRIS: u32 = 1 << 3;

    /// Proximity volumes (no physical response)
    pub const SENSOR: u32 = 1 << 4;

    /// Player and NPC characters
    pub const CHARACTER: u32 = 1 << 5;

    /// Check if two objects should interact based on their groups and masks
    pub const fn should_collide(group_a: u32, mask_a: u32, group_b: u32, mask_b: u32) -> bool {
        (group_a & mask_b) != 0 && (group_b & mask_a) != 0
    }

    /// Helper to create a mask from multiple groups
    pub fn mask(groups: &[u32]) -> u32 {
        groups.iter().fold(0, |acc, &group| acc | group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        assert!(CollisionLayers::should_collide(
            CollisionLayers::CHARACTER, CollisionLayers::STATIC,
            CollisionLayers::STATIC, CollisionLayers::CHARACTER,
        ));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        // Character wants to hit debris, debris ignores characters
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::CHARACTER, CollisionLayers::DEBRIS,
            CollisionLayers::DEBRIS, CollisionLayers::STATIC,
        ));
    }

    #[test]
    fn test_mask_creation() {
        let mask = CollisionLayers::mask(&[
            CollisionLayers::DEFAULT,
            CollisionLayers::STATIC,
            CollisionLayers::SENSOR,
        ]);

        assert_eq!(
            mask,
            CollisionLayers::DEFAULT | CollisionLayers::STATIC | CollisionLayers::SENSOR
        );
    }
}
