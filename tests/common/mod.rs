//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use gridpath::pathfinding::path_cost;
use gridpath::{
    CellCoord, Grid, GridConfig, Heuristic, NodeId, Obstacle, ObstacleMap, PathService,
};

/// Unit cells, centred on the origin
pub fn grid_config(size_x: usize, size_y: usize, allow_diagonal: bool) -> GridConfig {
    GridConfig {
        world_size: [size_x as f32, size_y as f32],
        allow_diagonal,
        ..GridConfig::default()
    }
}

/// World-space (x, z) centre of a cell for `config`
pub fn cell_center_2d(config: &GridConfig, cell: CellCoord) -> Vec2 {
    let diameter = config.node_diameter();
    let bottom_left = Vec2::new(
        config.origin[0] - config.world_size[0] / 2.0,
        config.origin[2] - config.world_size[1] / 2.0,
    );
    bottom_left + Vec2::new((cell.x as f32 + 0.5) * diameter, (cell.y as f32 + 0.5) * diameter)
}

/// Obstacle map blocking exactly the listed cells
pub fn block_cells(config: &GridConfig, cells: &[(usize, usize)]) -> ObstacleMap {
    let mut map = ObstacleMap::new();
    for &(x, y) in cells {
        map.add(Obstacle::cell(
            cell_center_2d(config, CellCoord::new(x, y)),
            config.node_diameter(),
        ));
    }
    map
}

pub fn build_grid(config: &GridConfig, blocked: &[(usize, usize)]) -> Grid {
    Grid::new(config, Arc::new(block_cells(config, blocked))).expect("valid grid config")
}

pub fn node(grid: &Grid, x: usize, y: usize) -> NodeId {
    grid.node_at(CellCoord::new(x, y)).expect("cell inside grid")
}

/// Panics unless `path` is a walkable, adjacency-respecting walk from `start` to `goal`
pub fn assert_valid_path(grid: &Grid, path: &[NodeId], start: NodeId, goal: NodeId) {
    assert_eq!(path.first(), Some(&start), "path must begin at start");
    assert_eq!(path.last(), Some(&goal), "path must end at goal");
    for id in &path[1..] {
        assert!(grid.is_walkable(*id), "path enters blocked cell {:?}", grid.cell_of(*id));
    }
    for pair in path.windows(2) {
        assert!(
            grid.node(pair[0]).is_adjacent_to(pair[1]),
            "{:?} -> {:?} is not an edge",
            grid.cell_of(pair[0]),
            grid.cell_of(pair[1])
        );
    }
}

pub fn cost(grid: &Grid, heuristic: Heuristic, path: &[NodeId]) -> f32 {
    path_cost(grid, heuristic, path)
}

/// Tick until every request has been delivered; returns the tick count
pub fn tick_until_idle(service: &mut PathService, max_ticks: u32) -> u32 {
    let mut ticks = 0;
    while !service.is_idle() {
        assert!(ticks < max_ticks, "service still busy after {} ticks", max_ticks);
        service.tick(1.0 / 60.0);
        ticks += 1;
        std::thread::sleep(Duration::from_millis(1));
    }
    ticks
}
