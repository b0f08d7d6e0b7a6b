use serde::{Deserialize, Serialize};

use crate::core::types::NodeId;
use crate::pathfinding::heuristic::Heuristic;
use crate::pathfinding::state::SearchStates;
use crate::pathfinding::{astar, bfs, greedy};
use crate::spatial::Grid;

/// Search strategy, selected once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Fewest hops, ignores distance and heuristic
    BreadthFirst,
    /// Always expands the node that looks closest to the goal; fast, not optimal
    GreedyBestFirst,
    /// Shortest path under an admissible heuristic
    #[default]
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::BreadthFirst,
        Algorithm::GreedyBestFirst,
        Algorithm::AStar,
    ];

    /// Run the search, leaving a parent tree rooted at `start` in `states`
    ///
    /// Returns true if `goal` was reached. `states` is reset first, so a
    /// map reused across requests never leaks stale parents.
    pub fn find_path(
        self,
        grid: &Grid,
        start: NodeId,
        goal: NodeId,
        heuristic: Heuristic,
        states: &mut SearchStates,
    ) -> bool {
        match self {
            Algorithm::BreadthFirst => bfs::find_path(grid, start, goal, states),
            Algorithm::GreedyBestFirst => greedy::find_path(grid, start, goal, heuristic, states),
            Algorithm::AStar => astar::find_path(grid, start, goal, heuristic, states),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BreadthFirst => "breadth_first",
            Algorithm::GreedyBestFirst => "greedy_best_first",
            Algorithm::AStar => "a_star",
        }
    }
}
