//! Greedy best-first search
//!
//! Orders the open set by heuristic distance to the goal alone. A node's
//! parent is fixed when it is first discovered and never revisited, so the
//! result is usually short but not guaranteed to be the cheapest.

use crate::core::types::NodeId;
use crate::pathfinding::heap::IndexedPriorityQueue;
use crate::pathfinding::heuristic::Heuristic;
use crate::pathfinding::state::{CostKey, SearchStates};
use crate::spatial::Grid;

pub fn find_path(
    grid: &Grid,
    start: NodeId,
    goal: NodeId,
    heuristic: Heuristic,
    states: &mut SearchStates,
) -> bool {
    states.reset();

    let goal_position = grid.position(goal);
    let mut open_set = IndexedPriorityQueue::with_capacity(grid.max_size());

    let start_h = heuristic.cost(grid.position(start), goal_position);
    let start_state = states.entry(start);
    start_state.h_cost = start_h;
    start_state.in_open_set = true;
    open_set.insert(start, CostKey::new(start_h, start_h));

    while let Some((current, _)) = open_set.extract_min() {
        let current_state = states.entry(current);
        current_state.in_open_set = false;
        current_state.in_closed_set = true;

        if current == goal {
            return true;
        }

        for &neighbor in &grid.node(current).adjacent {
            let state = states.entry(neighbor);
            if state.in_closed_set || state.in_open_set {
                continue;
            }

            let h_cost = heuristic.cost(grid.position(neighbor), goal_position);
            state.parent = Some(current);
            state.h_cost = h_cost;
            state.in_open_set = true;
            open_set.insert(neighbor, CostKey::new(h_cost, h_cost));
        }
    }

    false
}
