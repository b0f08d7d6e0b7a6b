//! A* search
//!
//! Step cost between adjacent cells is the heuristic distance between them,
//! so one function serves as both edge weight and estimate.

use crate::core::types::NodeId;
use crate::pathfinding::heap::IndexedPriorityQueue;
use crate::pathfinding::heuristic::Heuristic;
use crate::pathfinding::state::SearchStates;
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

    let start_state = states.entry(start);
    start_state.g_cost = 0.0;
    start_state.h_cost = heuristic.cost(grid.position(start), goal_position);
    start_state.in_open_set = true;
    open_set.insert(start, start_state.key());

    while let Some((current, _)) = open_set.extract_min() {
        let current_state = states.entry(current);
        current_state.in_open_set = false;
        current_state.in_closed_set = true;
        let current_g = current_state.g_cost;

        if current == goal {
            return true;
        }

        let current_position = grid.position(current);
        for &neighbor in &grid.node(current).adjacent {
            let neighbor_position = grid.position(neighbor);
            let tentative_g = current_g + heuristic.cost(current_position, neighbor_position);

            let state = states.entry(neighbor);
            if state.in_closed_set {
                continue;
            }

            if !state.in_open_set {
                state.parent = Some(current);
                state.g_cost = tentative_g;
                state.h_cost = heuristic.cost(neighbor_position, goal_position);
                state.in_open_set = true;
                open_set.insert(neighbor, state.key());
            } else if tentative_g < state.g_cost {
                // Cheaper route through current: adopt it and re-key in place
                state.parent = Some(current);
                state.g_cost = tentative_g;
                open_set.decrease_key(neighbor, state.key());
            }
        }
    }

    false
}
