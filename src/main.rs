//! Gridpath - Demo Runner
//!
//! Builds a grid (optionally with a random obstacle field), submits path
//! queries through the service tick loop, and prints the results as an
//! ASCII map or JSON.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gridpath::{
    Algorithm, CellCoord, Heuristic, Obstacle, ObstacleMap, PathService, PathfindingConfig,
    Result, ServiceStats, Vec3,
};

/// Gridpath demo - run path queries against a generated grid
#[derive(Parser, Debug)]
#[command(name = "gridpath")]
#[command(about = "Run grid path queries through the asynchronous path service")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<String>,

    /// Override the configured algorithm: breadth_first, greedy_best_first, a_star
    #[arg(long)]
    algorithm: Option<String>,

    /// Override the configured heuristic: manhattan, euclidean, squared_euclidean
    #[arg(long)]
    heuristic: Option<String>,

    /// Enable diagonal movement
    #[arg(long)]
    diagonal: bool,

    /// Run every algorithm on the same query
    #[arg(long)]
    compare: bool,

    /// Seed for a random obstacle field
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of cells blocked when a seed is given
    #[arg(long, default_value_t = 0.25)]
    density: f32,

    /// Start cell as "x,y"
    #[arg(long, default_value = "0,0")]
    from: String,

    /// Goal cell as "x,y" (defaults to the far corner)
    #[arg(long)]
    to: Option<String>,

    /// Maximum dispatcher ticks before giving up
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u32,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    algorithm: Algorithm,
    heuristic: Heuristic,
    found: bool,
    waypoints: Option<Vec<Vec3>>,
    ticks: u32,
    stats: ServiceStats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridpath=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PathfindingConfig::load(path)?,
        None => PathfindingConfig::default(),
    };
    apply_overrides(&mut config, &args)?;

    let (size_x, size_y) = config.grid.dimensions();
    let from = parse_cell(&args.from)?;
    let to = match &args.to {
        Some(text) => parse_cell(text)?,
        None => CellCoord::new(size_x.saturating_sub(1), size_y.saturating_sub(1)),
    };

    let obstacles = Arc::new(RwLock::new(ObstacleMap::new()));
    if let Some(seed) = args.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        let blocked = scatter_obstacles(&mut obstacles.write(), &config, &mut rng, args.density, &[from, to]);
        tracing::info!("Seed {}: blocked {} cells", seed, blocked);
    }

    let algorithms = if args.compare {
        Algorithm::ALL.to_vec()
    } else {
        vec![config.search.algorithm]
    };

    let mut reports = Vec::new();
    for algorithm in algorithms {
        let mut run_config = config.clone();
        run_config.search.algorithm = algorithm;

        let mut service = PathService::new(&run_config, obstacles.clone())?;
        let (start, goal) = service.with_grid(|grid| (grid.cell_center(from), grid.cell_center(to)));

        let outcome = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&outcome);
        service.request_path(start, goal, move |waypoints, found| {
            *sink.borrow_mut() = Some((waypoints, found));
        });

        let mut ticks = 0;
        while !service.is_idle() && ticks < args.max_ticks {
            service.tick(1.0 / 60.0);
            ticks += 1;
            if !service.is_idle() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }

        let Some((waypoints, found)) = outcome.borrow_mut().take() else {
            tracing::warn!("{} did not finish within {} ticks", algorithm.name(), args.max_ticks);
            continue;
        };

        if args.format != "json" {
            print_text(&service, algorithm, &waypoints, ticks);
        }

        reports.push(RunReport {
            algorithm,
            heuristic: run_config.search.heuristic,
            found,
            waypoints,
            ticks,
            stats: service.stats(),
        });
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn apply_overrides(config: &mut PathfindingConfig, args: &Args) -> Result<()> {
    if let Some(name) = &args.algorithm {
        config.search.algorithm = parse_enum(name)?;
    }
    if let Some(name) = &args.heuristic {
        config.search.heuristic = parse_enum(name)?;
    }
    if args.diagonal {
        config.grid.allow_diagonal = true;
    }
    config.validate()
}

/// Reuse the config's serde names for command-line enum values
fn parse_enum<T: serde::de::DeserializeOwned>(name: &str) -> Result<T> {
    #[derive(serde::Deserialize)]
    struct Holder<T> {
        value: T,
    }
    let holder: Holder<T> = toml::from_str(&format!("value = \"{}\"", name))?;
    Ok(holder.value)
}

fn parse_cell(text: &str) -> Result<CellCoord> {
    let invalid = || gridpath::PathError::InvalidConfig(format!("expected \"x,y\", got {:?}", text));
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(CellCoord::new(x, y))
}

/// Block random cells, leaving `keep_clear` open; returns the number blocked
fn scatter_obstacles(
    map: &mut ObstacleMap,
    config: &PathfindingConfig,
    rng: &mut StdRng,
    density: f32,
    keep_clear: &[CellCoord],
) -> usize {
    let (size_x, size_y) = config.grid.dimensions();
    let diameter = config.grid.node_diameter();
    let bottom_left = Vec2::new(
        config.grid.origin[0] - config.grid.world_size[0] / 2.0,
        config.grid.origin[2] - config.grid.world_size[1] / 2.0,
    );

    let mut blocked = 0;
    for y in 0..size_y {
        for x in 0..size_x {
            if keep_clear.contains(&CellCoord::new(x, y)) || rng.gen::<f32>() >= density {
                continue;
            }
            let center = bottom_left + Vec2::new((x as f32 + 0.5) * diameter, (y as f32 + 0.5) * diameter);
            map.add(Obstacle::cell(center, diameter));
            blocked += 1;
        }
    }
    blocked
}

fn print_text(service: &PathService, algorithm: Algorithm, waypoints: &Option<Vec<Vec3>>, ticks: u32) {
    println!("=== {} ({} ticks) ===", algorithm.name(), ticks);
    service.with_grid(|grid| {
        let marked: Vec<_> = waypoints
            .iter()
            .flatten()
            .map(|&point| grid.node_from_world_point(point))
            .collect();
        print!("{}", grid.to_ascii(&marked));
    });

    match waypoints {
        Some(points) => {
            println!("Found path with {} waypoints:", points.len());
            for point in points {
                println!("  ({:.2}, {:.2})", point.x, point.z);
            }
        }
        None => println!("No path found"),
    }
    println!();
}
