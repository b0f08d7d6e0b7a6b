//! Distance estimators between node positions
//!
//! All variants work on the XZ plane; height is ignored.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// `|dx| + |dz|`
    #[default]
    Manhattan,
    /// `sqrt(dx² + dz²)`
    Euclidean,
    /// `dx² + dz²`
    ///
    /// Monotonic in true distance, so fine for ranking, but it overestimates
    /// any path longer than one unit. A* paths are not shortest under it.
    SquaredEuclidean,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::Manhattan,
        Heuristic::Euclidean,
        Heuristic::SquaredEuclidean,
    ];

    /// Estimated cost from `from` to `to`
    ///
    /// Also used as the step cost between adjacent cells.
    #[inline]
    pub fn cost(self, from: Vec3, to: Vec3) -> f32 {
        let dx = from.x - to.x;
        let dz = from.z - to.z;
        match self {
            Heuristic::Manhattan => dx.abs() + dz.abs(),
            Heuristic::Euclidean => (dx * dx + dz * dz).sqrt(),
            Heuristic::SquaredEuclidean => dx * dx + dz * dz,
        }
    }

    /// Whether A* stays cost-optimal under this estimate
    pub fn is_admissible(self) -> bool {
        !matches!(self, Heuristic::SquaredEuclidean)
    }
}
