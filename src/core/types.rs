//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

pub use glam::Vec3;

/// Stable identity of a grid node
///
/// Indexes the grid's node arena. A node keeps its id for the lifetime of
/// the grid, so ids held by an in-flight search stay valid across rescans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identifier handed back by `PathService::request_path`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Integer cell index within the grid (x along world X, y along world Z)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Steps needed between two cells when diagonal moves are allowed
    pub fn chebyshev_distance(&self, other: &Self) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Steps needed between two cells with cardinal moves only
    pub fn manhattan_distance(&self, other: &Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}
