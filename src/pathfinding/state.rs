//! Per-request search bookkeeping
//!
//! Every search owns its own `SearchStates`; nothing here is shared
//! between requests or threads, which is what lets searches read the grid
//! concurrently without locking node state. Heap positions live in the
//! priority queue's own index table, not here.

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::NodeId;

/// Priority of an open node: lowest `f_cost` first, then lowest `h_cost`
///
/// Field order gives the lexicographic comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CostKey {
    pub f_cost: OrderedFloat<f32>,
    pub h_cost: OrderedFloat<f32>,
}

impl CostKey {
    pub fn new(f_cost: f32, h_cost: f32) -> Self {
        Self {
            f_cost: OrderedFloat(f_cost),
            h_cost: OrderedFloat(h_cost),
        }
    }
}

/// Search bookkeeping for one node within one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub g_cost: f32,
    pub h_cost: f32,
    pub in_open_set: bool,
    pub in_closed_set: bool,
}

impl SearchState {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            parent: None,
            g_cost: 0.0,
            h_cost: 0.0,
            in_open_set: false,
            in_closed_set: false,
        }
    }

    #[inline]
    pub fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }

    #[inline]
    pub fn key(&self) -> CostKey {
        CostKey::new(self.f_cost(), self.h_cost)
    }

    pub fn reset(&mut self) {
        self.parent = None;
        self.g_cost = 0.0;
        self.h_cost = 0.0;
        self.in_open_set = false;
        self.in_closed_set = false;
    }
}

/// Lazily populated map from node to its state for a single request
#[derive(Debug, Clone, Default)]
pub struct SearchStates {
    states: AHashMap<NodeId, SearchState>,
}

impl SearchStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> Option<&SearchState> {
        self.states.get(&node)
    }

    /// State for `node`, created on first touch
    pub fn entry(&mut self, node: NodeId) -> &mut SearchState {
        self.states
            .entry(node)
            .or_insert_with(|| SearchState::new(node))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.states.get(&node).and_then(|state| state.parent)
    }

    /// Clear parent and set membership of every touched node
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.reset();
        }
    }

    /// Number of nodes touched so far
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchState> {
        self.states.values()
    }
}
