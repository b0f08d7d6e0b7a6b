//! Walkability grid and adjacency graph
//!
//! The grid owns every `SpatialNode` in a flat arena indexed by `NodeId`.
//! Node identity never changes after the first scan: a rescan rewrites
//! `walkable` and `adjacent` in place, so ids held elsewhere stay valid.

use std::fmt::Write as _;
use std::sync::Arc;

use glam::Vec2;

use crate::core::config::GridConfig;
use crate::core::error::Result;
use crate::core::types::{CellCoord, NodeId, Vec3};
use crate::spatial::blocking::WalkabilityOracle;
use crate::spatial::node::SpatialNode;

/// Cardinal offsets in adjacency order: left, right, down, up
const CARDINALS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Diagonal offsets with the indices (into `CARDINALS`) of their two flanks
const DIAGONALS: [((isize, isize), usize, usize); 4] = [
    ((1, -1), 0, 3),
    ((1, 1), 1, 3),
    ((-1, -1), 0, 2),
    ((-1, 1), 1, 2),
];

pub struct Grid {
    size_x: usize,
    size_y: usize,
    world_size: Vec2,
    origin: Vec3,
    node_radius: f32,
    node_diameter: f32,
    allow_diagonal: bool,
    cut_corners: bool,
    nodes: Vec<SpatialNode>,
    oracle: Arc<dyn WalkabilityOracle>,
    generation: u64,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("size_x", &self.size_x)
            .field("size_y", &self.size_y)
            .field("node_radius", &self.node_radius)
            .field("allow_diagonal", &self.allow_diagonal)
            .field("cut_corners", &self.cut_corners)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Allocate the node arena and run the initial scan
    pub fn new(config: &GridConfig, oracle: Arc<dyn WalkabilityOracle>) -> Result<Self> {
        let (size_x, size_y) = config.checked_dimensions()?;

        let mut grid = Self {
            size_x,
            size_y,
            world_size: Vec2::from(config.world_size),
            origin: Vec3::from(config.origin),
            node_radius: config.node_radius,
            node_diameter: config.node_diameter(),
            allow_diagonal: config.allow_diagonal,
            cut_corners: config.cut_corners,
            nodes: Vec::with_capacity(size_x * size_y),
            oracle,
            generation: 0,
        };
        grid.scan();

        tracing::info!(
            "Grid initialized: {}x{} nodes, diameter {}",
            size_x,
            size_y,
            grid.node_diameter
        );
        Ok(grid)
    }

    /// Re-query walkability for every cell and rebuild all adjacency lists
    ///
    /// Must not run while any search reads the grid.
    pub fn scan(&mut self) {
        let half_extents = Vec3::splat(self.node_radius);
        let bottom_left = self.bottom_left();
        let mut blocked = 0usize;

        for y in 0..self.size_y {
            for x in 0..self.size_x {
                let index = self.index_of(x, y);
                let position = match self.nodes.get(index) {
                    Some(node) => node.position,
                    None => {
                        bottom_left
                            + Vec3::new(
                                x as f32 * self.node_diameter + self.node_radius,
                                0.0,
                                y as f32 * self.node_diameter + self.node_radius,
                            )
                    }
                };

                let walkable = !self.oracle.is_blocked(position, half_extents);
                if !walkable {
                    blocked += 1;
                }

                match self.nodes.get_mut(index) {
                    Some(node) => node.walkable = walkable,
                    None => self.nodes.push(SpatialNode::new(walkable, position)),
                }
            }
        }

        self.rebuild_adjacency();
        self.generation += 1;

        tracing::debug!(
            "Grid scan {} complete: {} of {} nodes blocked",
            self.generation,
            blocked,
            self.nodes.len()
        );
    }

    fn rebuild_adjacency(&mut self) {
        let walkable: Vec<bool> = self.nodes.iter().map(|node| node.walkable).collect();

        for y in 0..self.size_y {
            for x in 0..self.size_x {
                let index = self.index_of(x, y);
                let mut adjacent = std::mem::take(&mut self.nodes[index].adjacent);
                adjacent.clear();

                let mut cardinal_open = [false; 4];
                for (slot, &(dx, dy)) in CARDINALS.iter().enumerate() {
                    if let Some(neighbor) = self.offset(x, y, dx, dy) {
                        if walkable[neighbor] {
                            adjacent.push(NodeId(neighbor));
                            cardinal_open[slot] = true;
                        }
                    }
                }

                if self.allow_diagonal {
                    for &((dx, dy), flank_a, flank_b) in DIAGONALS.iter() {
                        let Some(neighbor) = self.offset(x, y, dx, dy) else {
                            continue;
                        };
                        if !walkable[neighbor] {
                            continue;
                        }
                        if self.cut_corners || (cardinal_open[flank_a] && cardinal_open[flank_b]) {
                            adjacent.push(NodeId(neighbor));
                        }
                    }
                }

                self.nodes[index].adjacent = adjacent;
            }
        }
    }

    /// Map a world position to the nearest node, clamping to the grid edge
    pub fn node_from_world_point(&self, position: Vec3) -> NodeId {
        let percent_x = ((position.x - self.origin.x + self.world_size.x / 2.0) / self.world_size.x)
            .clamp(0.0, 1.0);
        let percent_y = ((position.z - self.origin.z + self.world_size.y / 2.0) / self.world_size.y)
            .clamp(0.0, 1.0);

        let x = ((self.size_x - 1) as f32 * percent_x).round() as usize;
        let y = ((self.size_y - 1) as f32 * percent_y).round() as usize;

        NodeId(self.index_of(x.min(self.size_x - 1), y.min(self.size_y - 1)))
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SpatialNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn position(&self, id: NodeId) -> Vec3 {
        self.nodes[id.index()].position
    }

    #[inline]
    pub fn is_walkable(&self, id: NodeId) -> bool {
        self.nodes[id.index()].walkable
    }

    /// Every node in arena order, for read-only consumers
    pub fn nodes(&self) -> &[SpatialNode] {
        &self.nodes
    }

    pub fn node_at(&self, cell: CellCoord) -> Option<NodeId> {
        if cell.x < self.size_x && cell.y < self.size_y {
            Some(NodeId(self.index_of(cell.x, cell.y)))
        } else {
            None
        }
    }

    pub fn cell_of(&self, id: NodeId) -> CellCoord {
        CellCoord::new(id.index() % self.size_x, id.index() / self.size_x)
    }

    /// World-space centre of a cell
    pub fn cell_center(&self, cell: CellCoord) -> Vec3 {
        self.bottom_left()
            + Vec3::new(
                cell.x as f32 * self.node_diameter + self.node_radius,
                0.0,
                cell.y as f32 * self.node_diameter + self.node_radius,
            )
    }

    pub fn size(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    pub fn max_size(&self) -> usize {
        self.size_x * self.size_y
    }

    pub fn node_diameter(&self) -> f32 {
        self.node_diameter
    }

    /// Number of completed scans, including the initial one
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Text dump of the grid, top row first
    ///
    /// `#` blocked, `.` walkable, `*` on `path`, `S`/`G` for path endpoints.
    pub fn to_ascii(&self, path: &[NodeId]) -> String {
        let mut out = String::with_capacity((self.size_x + 1) * self.size_y);
        for y in (0..self.size_y).rev() {
            for x in 0..self.size_x {
                let id = NodeId(self.index_of(x, y));
                let glyph = if path.first() == Some(&id) {
                    'S'
                } else if path.last() == Some(&id) {
                    'G'
                } else if path.contains(&id) {
                    '*'
                } else if self.nodes[id.index()].walkable {
                    '.'
                } else {
                    '#'
                };
                out.push(glyph);
            }
            let _ = writeln!(out);
        }
        out
    }

    fn bottom_left(&self) -> Vec3 {
        self.origin - Vec3::new(self.world_size.x / 2.0, 0.0, self.world_size.y / 2.0)
    }

    #[inline]
    fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.size_x + x
    }

    fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<usize> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        if nx < self.size_x && ny < self.size_y {
            Some(self.index_of(nx, ny))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PathError;
    use crate::spatial::blocking::{Obstacle, ObstacleMap, OpenGround};
    use parking_lot::RwLock;

    fn config(allow_diagonal: bool, cut_corners: bool) -> GridConfig {
        GridConfig {
            world_size: [10.0, 10.0],
            origin: [0.0, 0.0, 0.0],
            node_radius: 0.5,
            allow_diagonal,
            cut_corners,
            rescan_rate: 0.1,
        }
    }

    fn open_grid(allow_diagonal: bool, cut_corners: bool) -> Grid {
        Grid::new(&config(allow_diagonal, cut_corners), Arc::new(OpenGround)).unwrap()
    }

    fn blocked_cells(cells: &[(usize, usize)]) -> Arc<RwLock<ObstacleMap>> {
        let mut map = ObstacleMap::new();
        for &(x, y) in cells {
            // Cell (x, y) of the default 10x10 grid spans [x-5, x-4] on X
            let center = Vec2::new(x as f32 - 4.5, y as f32 - 4.5);
            map.add(Obstacle::cell(center, 1.0));
        }
        Arc::new(RwLock::new(map))
    }

    fn id(grid: &Grid, x: usize, y: usize) -> NodeId {
        grid.node_at(CellCoord::new(x, y)).unwrap()
    }

    #[test]
    fn test_dimensions_and_positions() {
        let grid = open_grid(false, false);
        assert_eq!(grid.size(), (10, 10));
        assert_eq!(grid.max_size(), 100);
        assert_eq!(grid.nodes().len(), 100);
        assert_eq!(grid.generation(), 1);

        let corner = grid.position(id(&grid, 0, 0));
        assert!((corner - Vec3::new(-4.5, 0.0, -4.5)).length() < 1e-5);
        let far = grid.position(id(&grid, 9, 9));
        assert!((far - Vec3::new(4.5, 0.0, 4.5)).length() < 1e-5);
    }

    #[test]
    fn test_origin_offset() {
        let mut cfg = config(false, false);
        cfg.origin = [100.0, 2.0, -50.0];
        let grid = Grid::new(&cfg, Arc::new(OpenGround)).unwrap();

        let corner = grid.position(id(&grid, 0, 0));
        assert!((corner - Vec3::new(95.5, 2.0, -54.5)).length() < 1e-4);
        assert_eq!(
            grid.node_from_world_point(Vec3::new(95.5, 0.0, -54.5)),
            id(&grid, 0, 0)
        );
    }

    #[test]
    fn test_cardinal_adjacency() {
        let grid = open_grid(false, false);

        assert_eq!(grid.node(id(&grid, 0, 0)).adjacent.len(), 2);
        assert_eq!(grid.node(id(&grid, 5, 0)).adjacent.len(), 3);
        assert_eq!(
            grid.node(id(&grid, 5, 5)).adjacent,
            vec![id(&grid, 5, 4), id(&grid, 5, 6), id(&grid, 4, 5), id(&grid, 6, 5)]
        );
    }

    #[test]
    fn test_diagonal_adjacency_reaches_edges() {
        let grid = open_grid(true, false);

        assert_eq!(grid.node(id(&grid, 5, 5)).adjacent.len(), 8);
        assert_eq!(grid.node(id(&grid, 0, 0)).adjacent.len(), 3);
        assert!(grid.node(id(&grid, 8, 8)).is_adjacent_to(id(&grid, 9, 9)));
        assert!(grid.node(id(&grid, 9, 9)).is_adjacent_to(id(&grid, 8, 8)));
    }

    #[test]
    fn test_no_corner_cutting() {
        let grid = Grid::new(&config(true, false), blocked_cells(&[(5, 4)])).unwrap();
        let center = grid.node(id(&grid, 5, 5));

        // (5,4) is the left flank of both (4,4) and (6,4)
        assert!(!center.is_adjacent_to(id(&grid, 5, 4)));
        assert!(!center.is_adjacent_to(id(&grid, 4, 4)));
        assert!(!center.is_adjacent_to(id(&grid, 6, 4)));
        assert!(center.is_adjacent_to(id(&grid, 4, 6)));
        assert!(center.is_adjacent_to(id(&grid, 6, 6)));
        assert_eq!(center.adjacent.len(), 5);
    }

    #[test]
    fn test_corner_cutting_allowed() {
        let grid = Grid::new(&config(true, true), blocked_cells(&[(5, 4)])).unwrap();
        let center = grid.node(id(&grid, 5, 5));

        assert!(center.is_adjacent_to(id(&grid, 4, 4)));
        assert!(center.is_adjacent_to(id(&grid, 6, 4)));
        assert!(!center.is_adjacent_to(id(&grid, 5, 4)));
        assert_eq!(center.adjacent.len(), 7);
    }

    #[test]
    fn test_adjacency_invariants() {
        let grid = Grid::new(&config(true, false), blocked_cells(&[(2, 2), (3, 7), (9, 0)])).unwrap();

        for (index, node) in grid.nodes().iter().enumerate() {
            for neighbor in &node.adjacent {
                assert_ne!(neighbor.index(), index, "self adjacency at {}", index);
                assert!(neighbor.index() < grid.max_size());
                assert!(grid.is_walkable(*neighbor));
            }
        }
    }

    #[test]
    fn test_rescan_preserves_identity() {
        let obstacles = blocked_cells(&[]);
        let mut grid = Grid::new(&config(false, false), obstacles.clone()).unwrap();
        let target = id(&grid, 3, 3);
        let before = grid.position(target);
        assert!(grid.is_walkable(target));

        obstacles
            .write()
            .add(Obstacle::cell(Vec2::new(3.0 - 4.5, 3.0 - 4.5), 1.0));
        grid.scan();

        assert_eq!(grid.generation(), 2);
        assert_eq!(grid.nodes().len(), 100);
        assert_eq!(grid.position(target), before);
        assert!(!grid.is_walkable(target));
        assert!(!grid.node(id(&grid, 3, 4)).is_adjacent_to(target));

        obstacles.write().clear();
        grid.scan();
        assert!(grid.is_walkable(target));
        assert!(grid.node(id(&grid, 3, 4)).is_adjacent_to(target));
    }

    #[test]
    fn test_node_from_world_point() {
        let grid = open_grid(false, false);

        for (x, y) in [(0, 0), (9, 9), (4, 7), (5, 2)] {
            let cell = CellCoord::new(x, y);
            assert_eq!(grid.node_from_world_point(grid.cell_center(cell)), id(&grid, x, y));
        }
    }

    #[test]
    fn test_out_of_bounds_clamps() {
        let grid = open_grid(false, false);

        assert_eq!(
            grid.node_from_world_point(Vec3::new(-100.0, 0.0, -100.0)),
            id(&grid, 0, 0)
        );
        assert_eq!(
            grid.node_from_world_point(Vec3::new(100.0, 5.0, 100.0)),
            id(&grid, 9, 9)
        );
        assert_eq!(
            grid.node_from_world_point(Vec3::new(100.0, 0.0, -100.0)),
            id(&grid, 9, 0)
        );
    }

    #[test]
    fn test_cell_of_roundtrip() {
        let grid = open_grid(false, false);
        let cell = CellCoord::new(7, 2);
        assert_eq!(grid.cell_of(id(&grid, 7, 2)), cell);
        assert!(grid.node_at(CellCoord::new(10, 0)).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = config(false, false);
        cfg.node_radius = -1.0;
        assert!(Grid::new(&cfg, Arc::new(OpenGround)).is_err());

        let mut cfg = config(false, false);
        cfg.world_size = [0.2, 10.0];
        assert!(Grid::new(&cfg, Arc::new(OpenGround)).is_err());

        let mut cfg = config(false, false);
        cfg.world_size = [1e30, 1e30];
        assert!(matches!(
            Grid::new(&cfg, Arc::new(OpenGround)),
            Err(PathError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_ascii_dump() {
        let grid = Grid::new(&config(false, false), blocked_cells(&[(1, 9)])).unwrap();
        let path = [id(&grid, 0, 9), id(&grid, 0, 8), id(&grid, 1, 8)];
        let dump = grid.to_ascii(&path);
        let first_row = dump.lines().next().unwrap();

        assert_eq!(first_row, "S#........");
        assert_eq!(dump.lines().nth(1).unwrap(), "*G........");
        assert_eq!(dump.lines().count(), 10);
    }
}
