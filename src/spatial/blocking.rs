//! Walkability queries for grid scans
//!
//! The grid asks a `WalkabilityOracle` whether the box covering a cell
//! overlaps anything classed as unwalkable. `ObstacleMap` is the in-crate
//! implementation: boxes and polygon footprints on the XZ plane.

use glam::Vec2;
use parking_lot::RwLock;

use crate::core::types::Vec3;

/// Opaque "is this box blocked" query supplied by the environment
pub trait WalkabilityOracle: Send + Sync {
    /// True if the axis-aligned box at `center` with `half_extents` overlaps
    /// unwalkable geometry
    fn is_blocked(&self, center: Vec3, half_extents: Vec3) -> bool;
}

impl<F> WalkabilityOracle for F
where
    F: Fn(Vec3, Vec3) -> bool + Send + Sync,
{
    fn is_blocked(&self, center: Vec3, half_extents: Vec3) -> bool {
        self(center, half_extents)
    }
}

/// Lets the environment be edited between rescans through a shared handle
impl<T: WalkabilityOracle> WalkabilityOracle for RwLock<T> {
    fn is_blocked(&self, center: Vec3, half_extents: Vec3) -> bool {
        self.read().is_blocked(center, half_extents)
    }
}

/// Oracle for an empty world
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGround;

impl WalkabilityOracle for OpenGround {
    fn is_blocked(&self, _center: Vec3, _half_extents: Vec3) -> bool {
        false
    }
}

/// Unwalkable geometry projected onto the XZ plane
#[derive(Debug, Clone, PartialEq)]
pub enum Obstacle {
    /// Axis-aligned rectangle, `min`/`max` are (x, z)
    Rect { min: Vec2, max: Vec2 },
    /// Closed polygon footprint, vertices are (x, z)
    Footprint(Vec<Vec2>),
}

impl Obstacle {
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Obstacle::Rect {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Square covering exactly one cell of the given diameter centred at `center`
    pub fn cell(center: Vec2, diameter: f32) -> Self {
        let half = Vec2::splat(diameter * 0.5);
        Obstacle::Rect {
            min: center - half,
            max: center + half,
        }
    }

    /// Overlap with an open box; touching edges do not count
    pub fn overlaps(&self, box_min: Vec2, box_max: Vec2) -> bool {
        match self {
            Obstacle::Rect { min, max } => {
                min.x < box_max.x && max.x > box_min.x && min.y < box_max.y && max.y > box_min.y
            }
            Obstacle::Footprint(polygon) => footprint_overlaps(polygon, box_min, box_max),
        }
    }
}

/// Collection of obstacles answering walkability queries
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    obstacles: Vec<Obstacle>,
}

impl ObstacleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Remove every obstacle overlapping the given point
    pub fn clear_at(&mut self, point: Vec2) -> usize {
        let epsilon = Vec2::splat(1e-4);
        let before = self.obstacles.len();
        self.obstacles
            .retain(|obstacle| !obstacle.overlaps(point - epsilon, point + epsilon));
        before - self.obstacles.len()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl WalkabilityOracle for ObstacleMap {
    fn is_blocked(&self, center: Vec3, half_extents: Vec3) -> bool {
        let center = Vec2::new(center.x, center.z);
        let half = Vec2::new(half_extents.x, half_extents.z);
        let (box_min, box_max) = (center - half, center + half);
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.overlaps(box_min, box_max))
    }
}

fn footprint_overlaps(polygon: &[Vec2], box_min: Vec2, box_max: Vec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    // Box centre inside the polygon covers the "box fully inside" case
    if footprint_contains(polygon, (box_min + box_max) * 0.5) {
        return true;
    }

    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        if segment_hits_box(polygon[j], polygon[i], box_min, box_max) {
            return true;
        }
        j = i;
    }

    false
}

/// Slab clip of segment `a`-`b` against the open box
fn segment_hits_box(a: Vec2, b: Vec2, box_min: Vec2, box_max: Vec2) -> bool {
    let delta = b - a;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..2 {
        let (start, d, lo, hi) = (a[axis], delta[axis], box_min[axis], box_max[axis]);
        if d.abs() < f32::EPSILON {
            if start <= lo || start >= hi {
                return false;
            }
            continue;
        }
        let t0 = (lo - start) / d;
        let t1 = (hi - start) / d;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
        if t_enter >= t_exit {
            return false;
        }
    }

    true
}

/// Nonzero winding test on the XZ plane. Vertex order does not matter.
fn footprint_contains(polygon: &[Vec2], point: Vec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut winding = 0i32;
    for (k, &a) in polygon.iter().enumerate() {
        let b = polygon[(k + 1) % polygon.len()];
        // > 0 when the point lies left of a -> b
        let side = (b - a).perp_dot(point - a);
        if a.y <= point.y {
            if b.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && side < 0.0 {
            winding -= 1;
        }
    }

    winding != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_query(map: &impl WalkabilityOracle, x: f32, z: f32) -> bool {
        map.is_blocked(Vec3::new(x, 0.0, z), Vec3::splat(0.5))
    }

    #[test]
    fn test_open_ground_never_blocks() {
        assert!(!OpenGround.is_blocked(Vec3::ZERO, Vec3::splat(100.0)));
    }

    #[test]
    fn test_rect_blocks_overlapping_cell() {
        let mut map = ObstacleMap::new();
        map.add(Obstacle::rect(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)));

        assert!(cell_query(&map, 2.5, 2.5));
        assert!(!cell_query(&map, 4.5, 2.5));
    }

    #[test]
    fn test_touching_edges_do_not_block() {
        let mut map = ObstacleMap::new();
        map.add(Obstacle::cell(Vec2::new(2.5, 2.5), 1.0));

        // Neighbouring cells share an edge with the obstacle
        assert!(!cell_query(&map, 1.5, 2.5));
        assert!(!cell_query(&map, 3.5, 2.5));
        assert!(!cell_query(&map, 2.5, 1.5));
        assert!(!cell_query(&map, 3.5, 3.5));
        assert!(cell_query(&map, 2.5, 2.5));
    }

    #[test]
    fn test_rect_normalizes_corners() {
        let obstacle = Obstacle::rect(Vec2::new(3.0, 3.0), Vec2::new(1.0, 1.0));
        assert!(obstacle.overlaps(Vec2::new(1.5, 1.5), Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_footprint_containing_cell() {
        let mut map = ObstacleMap::new();
        map.add(Obstacle::Footprint(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]));

        assert!(cell_query(&map, 5.0, 5.0));
        assert!(!cell_query(&map, 12.0, 5.0));
    }

    #[test]
    fn test_footprint_edge_crossing_cell() {
        // Thin triangle whose edge slices through the cell at (5, 5)
        // without any vertex inside it
        let obstacle = Obstacle::Footprint(vec![
            Vec2::new(0.0, 4.9),
            Vec2::new(10.0, 5.1),
            Vec2::new(10.0, 4.8),
        ]);
        assert!(obstacle.overlaps(Vec2::new(4.5, 4.5), Vec2::new(5.5, 5.5)));
        assert!(!obstacle.overlaps(Vec2::new(4.5, 6.5), Vec2::new(5.5, 7.5)));
    }

    #[test]
    fn test_clear_at_removes_obstacle() {
        let mut map = ObstacleMap::new();
        map.add(Obstacle::cell(Vec2::new(1.5, 1.5), 1.0));
        map.add(Obstacle::cell(Vec2::new(4.5, 1.5), 1.0));

        assert_eq!(map.clear_at(Vec2::new(1.5, 1.5)), 1);
        assert_eq!(map.len(), 1);
        assert!(!cell_query(&map, 1.5, 1.5));
        assert!(cell_query(&map, 4.5, 1.5));

        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |center: Vec3, _half: Vec3| center.x > 5.0;
        assert!(oracle.is_blocked(Vec3::new(6.0, 0.0, 0.0), Vec3::ONE));
        assert!(!oracle.is_blocked(Vec3::new(4.0, 0.0, 0.0), Vec3::ONE));
    }

    #[test]
    fn test_locked_map_sees_edits() {
        let shared = RwLock::new(ObstacleMap::new());
        assert!(!cell_query(&shared, 2.5, 2.5));

        shared.write().add(Obstacle::cell(Vec2::new(2.5, 2.5), 1.0));
        assert!(cell_query(&shared, 2.5, 2.5));
    }

    #[test]
    fn test_footprint_contains_square() {
        let square = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];

        assert!(footprint_contains(&square, Vec2::new(5.0, 5.0)));
        assert!(footprint_contains(&square, Vec2::new(1.0, 1.0)));
        assert!(!footprint_contains(&square, Vec2::new(15.0, 5.0)));
        assert!(!footprint_contains(&square, Vec2::new(-5.0, 5.0)));
    }

    #[test]
    fn test_footprint_contains_concave_either_winding() {
        // L shape with the notch at the top right
        let mut ell = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(6.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 6.0),
            Vec2::new(0.0, 6.0),
        ];

        for _ in 0..2 {
            assert!(footprint_contains(&ell, Vec2::new(1.0, 5.0)));
            assert!(footprint_contains(&ell, Vec2::new(5.0, 1.0)));
            assert!(!footprint_contains(&ell, Vec2::new(4.0, 4.0)));
            assert!(!footprint_contains(&ell, Vec2::new(7.0, 1.0)));
            ell.reverse();
        }

        // Cell sitting in the notch touches nothing
        let footprint = Obstacle::Footprint(ell);
        assert!(!footprint.overlaps(Vec2::new(3.0, 3.0), Vec2::new(5.0, 5.0)));
        assert!(footprint.overlaps(Vec2::new(0.5, 3.0), Vec2::new(1.5, 4.0)));
    }

    #[test]
    fn test_footprint_contains_degenerate() {
        let line = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)];
        assert!(!footprint_contains(&line, Vec2::new(0.5, 0.5)));
        assert!(!Obstacle::Footprint(line).overlaps(Vec2::ZERO, Vec2::ONE));
    }
}
