//! Request and result values exchanged with the path service

use serde::Serialize;

use crate::core::types::{NodeId, RequestId, Vec3};

/// Completion callback: `(waypoints, found)`, waypoints are `None` iff not found
///
/// Always invoked on the thread that calls `PathService::tick`.
pub type PathCallback = Box<dyn FnOnce(Option<Vec<Vec3>>, bool)>;

/// Where a pending request is; once its callback has run it has no status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestStatus {
    Queued,
    Running,
}

/// A submitted query, waiting in the FIFO queue
pub struct PathRequest {
    pub id: RequestId,
    pub start: NodeId,
    pub goal: NodeId,
    pub callback: PathCallback,
}

impl std::fmt::Debug for PathRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRequest")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("goal", &self.goal)
            .finish_non_exhaustive()
    }
}

/// Outcome of one search, produced on a worker thread
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub id: RequestId,
    pub found: bool,
    pub waypoints: Option<Vec<Vec3>>,
    /// Grid generation the search ran against
    pub generation: u64,
}

impl PathResult {
    pub fn found(id: RequestId, generation: u64, waypoints: Vec<Vec3>) -> Self {
        Self {
            id,
            found: true,
            waypoints: Some(waypoints),
            generation,
        }
    }

    pub fn not_found(id: RequestId, generation: u64) -> Self {
        Self {
            id,
            found: false,
            waypoints: None,
            generation,
        }
    }
}
