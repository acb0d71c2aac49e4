//! Closure Cache
//!
//! Memoized transitive reachability over the downstream adjacency, plus the
//! upstream ancestor lists the execution engine hands us.
//!
//! # Algorithm
//!
//! A downstream closure is computed with an iterative stack worklist:
//!
//! 1. Seed the stack with the cell's direct downstream neighbours
//! 2. Pop a candidate:
//!    - If it has a cached closure, splice that whole set in and stop there
//!    - Else if it has known outgoing edges, push its unvisited neighbours
//!    - Else the edge that led here names a cell we know nothing about; prune it
//! 3. Memoize the result under the starting cell
//!
//! Splicing is only sound because the store invalidates every entry that a
//! structural change could affect before the next query runs.
//!
//! Upstream closures are not computed here. The engine already walks the full
//! ancestor chain when it runs a cell and may prune or order it in ways the
//! edge set cannot reproduce, so the list is stored as an opaque fact.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::{trace, warn};

use super::cell::CellId;

/// Outgoing adjacency: upstream cell to the set of cells that read from it.
pub type DownstreamEdges = IndexMap<CellId, IndexSet<CellId>>;

/// A memoized downstream closure. Shared so repeated queries are cheap.
pub type Closure = Arc<IndexSet<CellId>>;

/// Memoized closures for every cell that has been queried.
#[derive(Debug, Default, Clone)]
pub struct ClosureCache {
    downstream: HashMap<CellId, Closure>,
    upstream: HashMap<CellId, Vec<CellId>>,
}

impl ClosureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cells reachable from `cell` along `edges`, excluding `cell`.
    ///
    /// Served from the cache when present; otherwise computed and memoized.
    pub fn downstream_closure(&mut self, cell: &CellId, edges: &DownstreamEdges) -> Closure {
        if let Some(hit) = self.downstream.get(cell) {
            trace!(cell = %cell, size = hit.len(), "downstream closure cache hit");
            return Arc::clone(hit);
        }

        let mut result = IndexSet::new();
        let mut visited = HashSet::new();
        let mut stack: SmallVec<[CellId; 16]> = SmallVec::new();
        visited.insert(cell.clone());

        if let Some(direct) = edges.get(cell) {
            for next in direct {
                if visited.insert(next.clone()) {
                    stack.push(next.clone());
                }
            }
        }

        while let Some(candidate) = stack.pop() {
            if let Some(cached) = self.downstream.get(&candidate) {
                result.insert(candidate.clone());
                for reached in cached.iter() {
                    if reached != cell {
                        visited.insert(reached.clone());
                        result.insert(reached.clone());
                    }
                }
            } else if let Some(direct) = edges.get(&candidate) {
                result.insert(candidate.clone());
                for next in direct {
                    if visited.insert(next.clone()) {
                        stack.push(next.clone());
                    }
                }
            } else {
                warn!(
                    cell = %cell,
                    candidate = %candidate,
                    "edge references a cell with no known adjacency; pruning from closure"
                );
            }
        }

        trace!(cell = %cell, size = result.len(), "downstream closure computed");
        let closure = Arc::new(result);
        self.downstream.insert(cell.clone(), Arc::clone(&closure));
        closure
    }

    /// The ancestor list last reported by the engine, or empty.
    pub fn upstream_closure(&self, cell: &CellId) -> &[CellId] {
        self.upstream.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record the engine-supplied ancestor list for `cell`.
    ///
    /// An empty list carries no information and leaves the stored one alone.
    pub fn store_upstream(&mut self, cell: &CellId, ancestors: Vec<CellId>) {
        if ancestors.is_empty() {
            return;
        }
        self.upstream.insert(cell.clone(), ancestors);
    }

    /// Get a memoized downstream closure without computing one.
    pub fn cached_downstream(&self, cell: &CellId) -> Option<&IndexSet<CellId>> {
        self.downstream.get(cell).map(|c| c.as_ref())
    }

    /// Number of memoized downstream closures.
    pub fn cached_len(&self) -> usize {
        self.downstream.len()
    }

    /// Drop every memoized downstream closure.
    pub fn invalidate_all(&mut self) {
        if !self.downstream.is_empty() {
            trace!(dropped = self.downstream.len(), "downstream closure cache cleared");
        }
        self.downstream.clear();
    }

    /// Drop the memoized downstream closure of a single cell.
    pub fn invalidate_downstream(&mut self, cell: &CellId) {
        if self.downstream.remove(cell).is_some() {
            trace!(cell = %cell, "downstream closure invalidated");
        }
    }

    /// Drop every closure owned by one of `cells` or containing one of them.
    ///
    /// Returns how many entries were dropped.
    pub fn invalidate_containing(&mut self, cells: &HashSet<CellId>) -> usize {
        let before = self.downstream.len();
        self.downstream.retain(|owner, closure| {
            !cells.contains(owner) && !cells.iter().any(|c| closure.contains(c))
        });
        let dropped = before - self.downstream.len();
        trace!(dropped, "downstream closures invalidated by containment");
        dropped
    }

    /// Remove every trace of `cell`: its own entries, and its appearance in
    /// other cells' ancestor lists.
    ///
    /// Downstream closures that contain `cell` are left to the caller's
    /// invalidation policy.
    pub fn forget(&mut self, cell: &CellId) {
        self.downstream.remove(cell);
        self.upstream.remove(cell);
        for ancestors in self.upstream.values_mut() {
            ancestors.retain(|c| c != cell);
        }
        self.upstream.retain(|_, ancestors| !ancestors.is_empty());
    }

    /// Whether any cache entry mentions `cell`.
    pub fn mentions(&self, cell: &CellId) -> bool {
        self.downstream.contains_key(cell)
            || self.upstream.contains_key(cell)
            || self.downstream.values().any(|c| c.contains(cell))
            || self.upstream.values().any(|a| a.contains(cell))
    }
}
