//! Asynchronous path service
//!
//! One dispatcher (whoever calls `tick`) plus a bounded rayon pool of
//! search workers. Workers share the grid read-only; a rescan takes the
//! write side only once the active-worker count has drained to zero.
//!
//! Per tick:
//! 1. advance the rescan timer (may raise a pending rescan)
//! 2. rescan if one is pending and no worker is active
//! 3. start queued requests, FIFO, while no rescan is pending and a worker slot is free
//! 4. drain finished results and invoke their callbacks

pub mod request;
pub mod rescan;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use serde::Serialize;

use crate::core::config::PathfindingConfig;
use crate::core::error::Result;
use crate::core::types::{NodeId, RequestId, Vec3};
use crate::pathfinding::{build_path, simplify, Algorithm, Heuristic, SearchStates};
use crate::spatial::{Grid, WalkabilityOracle};

pub use request::{PathCallback, PathRequest, PathResult, RequestStatus};
pub use rescan::RescanGate;

/// Running totals since the service was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub submitted: u64,
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub rescans: u64,
    /// Results whose search saw a different grid generation than the one
    /// current at dispatch; nonzero means a rescan ran under a live search
    pub rescan_overlaps: u64,
}

/// Holds one worker slot; releases it on drop, even if the search panicked
struct ActiveSlot {
    active: Arc<AtomicUsize>,
}

impl ActiveSlot {
    fn acquire(active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self {
            active: Arc::clone(active),
        }
    }
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Work handed to a pool thread
#[derive(Debug, Clone, Copy)]
struct SearchJob {
    id: RequestId,
    start: NodeId,
    goal: NodeId,
    algorithm: Algorithm,
    heuristic: Heuristic,
    generation: u64,
}

/// Dispatched request awaiting its result
struct InFlight {
    callback: PathCallback,
    generation: u64,
}

pub struct PathService {
    grid: Arc<RwLock<Grid>>,
    algorithm: Algorithm,
    heuristic: Heuristic,
    max_workers: usize,
    pool: rayon::ThreadPool,
    queue: VecDeque<PathRequest>,
    in_flight: AHashMap<RequestId, InFlight>,
    results_tx: Sender<PathResult>,
    results_rx: Receiver<PathResult>,
    active: Arc<AtomicUsize>,
    rescan: RescanGate,
    next_id: u64,
    stats: ServiceStats,
}

impl PathService {
    pub fn new(config: &PathfindingConfig, oracle: Arc<dyn WalkabilityOracle>) -> Result<Self> {
        config.validate()?;

        let grid = Grid::new(&config.grid, oracle)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.search.max_workers)
            .thread_name(|index| format!("path-worker-{}", index))
            .build()?;
        let (results_tx, results_rx) = unbounded();

        tracing::info!(
            "Path service started: {} with {:?}, up to {} workers",
            config.search.algorithm.name(),
            config.search.heuristic,
            config.search.max_workers
        );

        Ok(Self {
            grid: Arc::new(RwLock::new(grid)),
            algorithm: config.search.algorithm,
            heuristic: config.search.heuristic,
            max_workers: config.search.max_workers,
            pool,
            queue: VecDeque::new(),
            in_flight: AHashMap::new(),
            results_tx,
            results_rx,
            active: Arc::new(AtomicUsize::new(0)),
            rescan: RescanGate::new(config.grid.rescan_rate),
            next_id: 0,
            stats: ServiceStats::default(),
        })
    }

    /// Queue a path query between two world positions
    ///
    /// Returns immediately. Positions outside the grid clamp to the nearest
    /// edge node. `on_complete` runs during a later `tick`.
    pub fn request_path<F>(&mut self, start: Vec3, goal: Vec3, on_complete: F) -> RequestId
    where
        F: FnOnce(Option<Vec<Vec3>>, bool) + 'static,
    {
        let (start, goal) = {
            let grid = self.grid.read();
            (grid.node_from_world_point(start), grid.node_from_world_point(goal))
        };

        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.stats.submitted += 1;

        tracing::trace!("Queued request {:?}: {:?} -> {:?}", id, start, goal);
        self.queue.push_back(PathRequest {
            id,
            start,
            goal,
            callback: Box::new(on_complete),
        });
        id
    }

    /// Run one dispatcher step; returns the number of callbacks invoked
    pub fn tick(&mut self, dt: f32) -> usize {
        self.rescan.advance(dt);
        self.try_rescan();

        while !self.rescan.is_pending() && self.active_workers() < self.max_workers {
            let Some(request) = self.queue.pop_front() else {
                break;
            };
            self.dispatch(request);
        }

        self.drain_results()
    }

    /// Ask for a rescan at the next safe point, e.g. after the environment changed
    pub fn request_rescan(&mut self) {
        self.rescan.request();
    }

    fn try_rescan(&mut self) {
        if !self.rescan.ready(self.active_workers()) {
            return;
        }

        // Workers drop their read guard before releasing their slot
        let Some(mut grid) = self.grid.try_write() else {
            tracing::warn!("Rescan deferred: grid is still borrowed");
            return;
        };

        let started = Instant::now();
        grid.scan();
        self.rescan.complete();
        self.stats.rescans += 1;

        tracing::debug!(
            "Rescan {} finished in {:?}",
            grid.generation(),
            started.elapsed()
        );
    }

    fn dispatch(&mut self, request: PathRequest) {
        let PathRequest {
            id,
            start,
            goal,
            callback,
        } = request;
        let generation = self.grid.read().generation();
        self.in_flight.insert(id, InFlight { callback, generation });
        self.stats.dispatched += 1;

        let job = SearchJob {
            id,
            start,
            goal,
            algorithm: self.algorithm,
            heuristic: self.heuristic,
            generation,
        };
        let slot = ActiveSlot::acquire(&self.active);
        let grid = Arc::clone(&self.grid);
        let results = self.results_tx.clone();

        tracing::debug!(
            "Dispatching request {:?} ({} active)",
            id,
            self.active_workers()
        );

        self.pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| run_search(&grid, job)))
                .unwrap_or_else(|_| {
                    tracing::error!("Search for request {:?} panicked", job.id);
                    PathResult::not_found(job.id, job.generation)
                });

            // The receiver lives as long as the service; a send error means it
            // was dropped and nobody is waiting for this result
            let _ = results.send(result);
            drop(slot);
        });
    }

    fn drain_results(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(result) = self.results_rx.try_recv() {
            if result.found {
                self.stats.succeeded += 1;
            } else {
                self.stats.failed += 1;
            }

            match self.in_flight.remove(&result.id) {
                Some(InFlight {
                    callback,
                    generation,
                }) => {
                    if result.generation != generation {
                        self.stats.rescan_overlaps += 1;
                        tracing::error!(
                            "Request {:?} dispatched on grid generation {} but searched {}",
                            result.id,
                            generation,
                            result.generation
                        );
                    }
                    callback(result.waypoints, result.found);
                    delivered += 1;
                }
                None => tracing::warn!("Result for unknown request {:?}", result.id),
            }
        }
        delivered
    }

    /// Where a request currently is; `None` once its callback has run
    pub fn status(&self, id: RequestId) -> Option<RequestStatus> {
        if self.in_flight.contains_key(&id) {
            Some(RequestStatus::Running)
        } else if self.queue.iter().any(|request| request.id == id) {
            Some(RequestStatus::Queued)
        } else {
            None
        }
    }

    /// Read-only access to the grid for display or inspection
    pub fn with_grid<R>(&self, f: impl FnOnce(&Grid) -> R) -> R {
        let grid = self.grid.read();
        f(&grid)
    }

    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn queued_requests(&self) -> usize {
        self.queue.len()
    }

    /// Requests dispatched whose callbacks have not run yet
    pub fn in_flight_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// No queued, running, or undelivered requests
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_empty()
    }

    pub fn is_rescan_pending(&self) -> bool {
        self.rescan.is_pending()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }
}

/// Search, rebuild and simplify one request on a worker thread
fn run_search(grid: &RwLock<Grid>, job: SearchJob) -> PathResult {
    let started = Instant::now();
    let grid = grid.read();
    let generation = grid.generation();
    let mut states = SearchStates::new();

    let found = job
        .algorithm
        .find_path(&grid, job.start, job.goal, job.heuristic, &mut states);

    let route = if found {
        build_path(job.goal, job.start, &states)
    } else {
        None
    };

    let result = match route {
        Some(cells) => {
            let points: Vec<Vec3> = cells.iter().map(|&node| grid.position(node)).collect();
            PathResult::found(job.id, generation, simplify(&points))
        }
        None => PathResult::not_found(job.id, generation),
    };

    tracing::debug!(
        "Request {:?} finished: found={} touched={} in {:?}",
        job.id,
        result.found,
        states.len(),
        started.elapsed()
    );
    result
}
