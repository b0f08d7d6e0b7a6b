//! Graph search over the walkability grid
//!
//! Useful references:
//!  https://www.redblobgames.com/pathfinding/a-star/introduction.html
//!  https://www.redblobgames.com/pathfinding/grids/algorithms.html

pub mod algorithm;
pub mod astar;
pub mod bfs;
pub mod greedy;
pub mod heap;
pub mod heuristic;
pub mod path;
pub mod state;

pub use algorithm::Algorithm;
pub use heap::IndexedPriorityQueue;
pub use heuristic::Heuristic;
pub use path::{build_path, find_route, path_cost, simplify};
pub use state::{CostKey, SearchState, SearchStates};
