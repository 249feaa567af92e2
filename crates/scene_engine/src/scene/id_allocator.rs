//! Monotonic scene node ID generation

use super::node::SceneNodeId;

/// Generates scene node IDs above a configurable floor
///
/// IDs below the floor are left for content with stable, hand-assigned or
/// deserialized IDs. Generated IDs only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNodeIdAllocator {
    next_id: u64,
    min_auto_id: u64,
}

impl Default for SceneNodeIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNodeIdAllocator {
    /// Create an allocator whose first ID is 1
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            min_auto_id: 1,
        }
    }

    /// Create an allocator with a floor for automatic IDs
    pub fn with_min_auto_id(min_auto_id: u64) -> Self {
        let mut allocator = Self::new();
        allocator.set_min_auto_id(min_auto_id);
        allocator
    }

    /// Last ID handed out (0 if none)
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Floor for automatic IDs
    pub const fn min_auto_id(&self) -> u64 {
        self.min_auto_id
    }

    /// Change the floor; already generated IDs are unaffected
    pub fn set_min_auto_id(&mut self, min_auto_id: u64) {
        self.min_auto_id = min_auto_id.max(1);
    }

    /// Produce the next ID
    pub fn generate(&mut self) -> SceneNodeId {
        if self.next_id.saturating_add(1) < self.min_auto_id {
            self.next_id = self.min_auto_id;
        } else {
            self.next_id += 1;
        }
        SceneNodeId(self.next_id)
    }

    /// Restore persisted counters; the next ID never moves backwards
    pub(crate) fn restore(&mut self, next_id: u64, min_auto_id: u64) {
        self.next_id = self.next_id.max(next_id);
        self.set_min_auto_id(min_auto_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_starts_at_one() {
        let mut allocator = SceneNodeIdAllocator::new();
        assert_eq!(allocator.generate(), SceneNodeId(1));
        assert_eq!(allocator.generate(), SceneNodeId(2));
    }

    #[test]
    fn test_floor_jump() {
        let mut allocator = SceneNodeIdAllocator::new();
        for _ in 0..5 {
            allocator.generate();
        }
        allocator.set_min_auto_id(100);

        let ids: Vec<u64> = (0..5).map(|_| allocator.generate().get()).collect();

        assert_eq!(ids, vec![100, 101, 102, 103, 104]);
    }

    #[test]
    fn test_lowering_floor_keeps_monotonic() {
        let mut allocator = SceneNodeIdAllocator::with_min_auto_id(50);
        assert_eq!(allocator.generate(), SceneNodeId(50));

        allocator.set_min_auto_id(1);
        assert_eq!(allocator.generate(), SceneNodeId(51));
    }

    #[test]
    fn test_restore_never_rewinds() {
        let mut allocator = SceneNodeIdAllocator::new();
        allocator.restore(10, 1);
        allocator.restore(3, 1);
        assert_eq!(allocator.generate(), SceneNodeId(11));
    }
}
