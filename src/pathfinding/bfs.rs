//! Breadth-first search: minimum hop count, distance ignored

use std::collections::VecDeque;

use crate::core::types::NodeId;
use crate::pathfinding::state::SearchStates;
use crate::spatial::Grid;

pub fn find_path(grid: &Grid, start: NodeId, goal: NodeId, states: &mut SearchStates) -> bool {
    states.reset();
    states.entry(start);

    let mut frontier = VecDeque::with_capacity(grid.max_size());
    frontier.push_back(start);

    while let Some(current) = frontier.pop_front() {
        if current == goal {
            return true;
        }
        states.entry(current).in_closed_set = true;

        for &neighbor in &grid.node(current).adjacent {
            let state = states.entry(neighbor);
            // A parent marks a node as already discovered; start never gets one
            if state.parent.is_none() && neighbor != start {
                state.parent = Some(current);
                state.in_open_set = true;
                frontier.push_back(neighbor);
            }
        }
    }

    false
}
