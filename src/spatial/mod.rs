//! Spatial model: grid cells, adjacency and walkability queries

pub mod blocking;
pub mod grid;
pub mod node;

pub use blocking::{Obstacle, ObstacleMap, OpenGround, WalkabilityOracle};
pub use grid::Grid;
pub use node::SpatialNode;
