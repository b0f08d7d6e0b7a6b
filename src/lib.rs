//! Gridpath - grid pathfinding engine
//!
//! Discretizes a planar area into walkable cells, answers shortest-path
//! queries with breadth-first, greedy best-first or A* search, and runs
//! those searches on a bounded worker pool behind a tick-driven dispatcher.

pub mod core;
pub mod pathfinding;
pub mod service;
pub mod spatial;

pub use crate::core::config::{GridConfig, PathfindingConfig, SearchConfig};
pub use crate::core::error::{PathError, Result};
pub use crate::core::types::{CellCoord, NodeId, RequestId, Vec3};
pub use crate::pathfinding::{Algorithm, Heuristic};
pub use crate::service::{PathResult, PathService, RequestStatus, ServiceStats};
pub use crate::spatial::{Grid, Obstacle, ObstacleMap, OpenGround, WalkabilityOracle};
