//! A single grid cell

use crate::core::types::{NodeId, Vec3};

/// One cell of the discretized grid
///
/// Owned by the grid's node arena. `position` is fixed when the node is
/// allocated; `walkable` and `adjacent` are rewritten in place by rescans.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialNode {
    pub walkable: bool,
    pub position: Vec3,
    /// Neighbours reachable in one step, cardinals first then diagonals
    pub adjacent: Vec<NodeId>,
}

impl SpatialNode {
    pub fn new(walkable: bool, position: Vec3) -> Self {
        Self {
            walkable,
            position,
            adjacent: Vec::with_capacity(8),
        }
    }

    pub fn is_adjacent_to(&self, other: NodeId) -> bool {
        self.adjacent.contains(&other)
    }
}
