//! Path reconstruction and waypoint simplification

use glam::Vec2;

use crate::core::types::{NodeId, Vec3};
use crate::pathfinding::algorithm::Algorithm;
use crate::pathfinding::heuristic::Heuristic;
use crate::pathfinding::state::SearchStates;
use crate::spatial::Grid;

const DIRECTION_EPSILON: f32 = 1e-4;

/// Follow parent links from `goal` back to `start`
///
/// Returns the nodes in start-to-goal order, or `None` if the chain breaks
/// before reaching `start` (the goal was never reached).
pub fn build_path(goal: NodeId, start: NodeId, states: &SearchStates) -> Option<Vec<NodeId>> {
    let mut path = Vec::new();
    let mut current = goal;

    // A parent chain can't be longer than the number of touched nodes
    let max_steps = states.len() + 1;
    while current != start {
        if path.len() > max_steps {
            return None;
        }
        path.push(current);
        current = states.parent(current)?;
    }
    path.push(start);

    path.reverse();
    Some(path)
}

/// Collapse a dense cell path into its turning points
///
/// Keeps the first point, every point where the XZ direction of travel
/// changes, and the last point.
pub fn simplify(points: &[Vec3]) -> Vec<Vec3> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut waypoints = vec![points[0]];
    let mut previous_direction: Option<Vec2> = None;

    for pair in points.windows(2) {
        let direction = Vec2::new(pair[1].x - pair[0].x, pair[1].z - pair[0].z).normalize_or_zero();
        if let Some(previous) = previous_direction {
            if (direction - previous).length_squared() > DIRECTION_EPSILON * DIRECTION_EPSILON {
                waypoints.push(pair[0]);
            }
        }
        previous_direction = Some(direction);
    }

    if let Some(&last) = points.last() {
        waypoints.push(last);
    }
    waypoints
}

/// Sum of step costs along a path, measured with `heuristic`
pub fn path_cost(grid: &Grid, heuristic: Heuristic, path: &[NodeId]) -> f32 {
    path.windows(2)
        .map(|pair| heuristic.cost(grid.position(pair[0]), grid.position(pair[1])))
        .sum()
}

/// Search with a fresh state map and rebuild the cell path
pub fn find_route(
    grid: &Grid,
    algorithm: Algorithm,
    heuristic: Heuristic,
    start: NodeId,
    goal: NodeId,
) -> Option<Vec<NodeId>> {
    let mut states = SearchStates::new();
    if !algorithm.find_path(grid, start, goal, heuristic, &mut states) {
        return None;
    }
    build_path(goal, start, &states)
}
