//! Pathfinding configuration with documented defaults
//!
//! All tunables are collected here. Configs load from TOML; every field
//! has a default so partial files are fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PathError, Result};
use crate::pathfinding::{Algorithm, Heuristic};

/// Grid discretization and rescan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space extent of the grid as [X, Z]
    pub world_size: [f32; 2],

    /// World-space centre of the grid
    ///
    /// The bottom-left corner sits at `origin - world_size / 2` on the XZ plane.
    pub origin: [f32; 3],

    /// Half the side length of one cell (world units)
    ///
    /// The number of cells per axis is `round(world_size / (2 * node_radius))`.
    pub node_radius: f32,

    /// Admit the four diagonal neighbours into adjacency
    pub allow_diagonal: bool,

    /// Admit a diagonal even when a flanking cardinal cell is blocked
    ///
    /// Only meaningful when `allow_diagonal` is set. Leaving this off keeps
    /// diagonal paths from squeezing through a blocked corner.
    pub cut_corners: bool,

    /// Seconds between rescans of walkability and adjacency
    pub rescan_rate: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            world_size: [10.0, 10.0],
            origin: [0.0, 0.0, 0.0],
            node_radius: 0.5,
            allow_diagonal: false,
            cut_corners: false,
            rescan_rate: 0.1,
        }
    }
}

/// Upper bound on the number of nodes in one grid
pub const MAX_GRID_CELLS: usize = 1 << 24;

impl GridConfig {
    pub fn node_diameter(&self) -> f32 {
        self.node_radius * 2.0
    }

    /// Cells along X and Z
    pub fn dimensions(&self) -> (usize, usize) {
        let diameter = self.node_diameter();
        (
            (self.world_size[0] / diameter).round() as usize,
            (self.world_size[1] / diameter).round() as usize,
        )
    }

    /// Cells along X and Z, or an error if the node arena would be empty or
    /// larger than `MAX_GRID_CELLS`
    pub fn checked_dimensions(&self) -> Result<(usize, usize)> {
        if !self.node_radius.is_finite() || self.node_radius <= 0.0 {
            return Err(PathError::InvalidConfig(format!(
                "node_radius ({}) must be positive",
                self.node_radius
            )));
        }

        if !self.world_size.iter().all(|extent| extent.is_finite() && *extent > 0.0) {
            return Err(PathError::InvalidConfig(format!(
                "world_size {:?} must be finite and positive",
                self.world_size
            )));
        }

        let (size_x, size_y) = self.dimensions();
        if size_x == 0 || size_y == 0 {
            return Err(PathError::InvalidConfig(format!(
                "world_size {:?} holds no cells of diameter {}",
                self.world_size,
                self.node_diameter()
            )));
        }

        match size_x.checked_mul(size_y) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok((size_x, size_y)),
            _ => Err(PathError::InvalidConfig(format!(
                "{}x{} cells exceeds the limit of {}",
                size_x, size_y, MAX_GRID_CELLS
            ))),
        }
    }
}

/// Search selection and worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    pub heuristic: Heuristic,

    /// Upper bound on concurrently running searches
    pub max_workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AStar,
            heuristic: Heuristic::Manhattan,
            max_workers: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    pub grid: GridConfig,
    pub search: SearchConfig,
}

impl PathfindingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PathfindingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        grid.checked_dimensions()?;

        if grid.rescan_rate.is_nan() || grid.rescan_rate < 0.0 {
            return Err(PathError::InvalidConfig(format!(
                "rescan_rate ({}) must not be negative",
                grid.rescan_rate
            )));
        }

        if self.search.max_workers == 0 {
            return Err(PathError::InvalidConfig(
                "max_workers must be at least 1".into(),
            ));
        }

        if self.search.algorithm == Algorithm::AStar && !self.search.heuristic.is_admissible() {
            tracing::warn!(
                "{:?} overestimates step costs; A* paths will not be shortest",
                self.search.heuristic
            );
        }

        Ok(())
    }
}
