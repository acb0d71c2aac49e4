//! Graph Store
//!
//! The store owns the cell list, the names each cell defines, and the edge
//! set in two mirrored forms:
//!
//! - `upstream_of[d]`: the cells `d` reads from, with the names read from each
//! - `downstream_of[u]`: the cells that read from `u`
//!
//! `u ∈ upstream_of[d]` exactly when `d ∈ downstream_of[u]`. Every mutator
//! below edits both sides together, and invalidates memoized closures before
//! the edges change so no query can observe a closure built from old edges.
//!
//! Unknown cells are never an error. Queries read them as empty and mutations
//! create them, including cells that are only named by an edge.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::cell::{CellId, NodeName};
use super::closure::{Closure, ClosureCache, DownstreamEdges};
use crate::config::{GraphConfig, InvalidationPolicy};
use crate::engine::ExecutionResult;

/// Incoming adjacency for one cell: upstream cell to the names read from it.
pub type UpstreamEdges = IndexMap<CellId, IndexSet<NodeName>>;

/// The dependency graph of one notebook.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    pub(super) config: GraphConfig,
    pub(super) cells: IndexSet<CellId>,
    pub(super) nodes_by_cell: HashMap<CellId, SmallVec<[NodeName; 4]>>,
    pub(super) upstream_of: IndexMap<CellId, UpstreamEdges>,
    pub(super) downstream_of: DownstreamEdges,
    pub(super) closures: ClosureCache,
}

impl GraphStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Register a cell the host created before it has run.
    ///
    /// Returns `false` if the cell was already known.
    pub fn add_cell(&mut self, cell: impl Into<CellId>) -> bool {
        let cell = cell.into();
        let added = self.ensure_cell(&cell);
        if added {
            debug!(cell = %cell, "cell added");
        }
        added
    }

    /// Apply what the execution engine reported after running a cell.
    ///
    /// The reported names, upstream edges and (when authoritative) downstream
    /// edges replace whatever was recorded for the cell before. A non-empty
    /// ancestor list replaces the stored one; an empty list keeps it.
    pub fn apply_execution_result(&mut self, result: ExecutionResult) {
        let ExecutionResult {
            cell,
            nodes,
            upstream,
            downstream,
            upstream_closure,
        } = result;

        self.ensure_cell(&cell);

        let new_upstream: UpstreamEdges = upstream
            .into_iter()
            .map(|(from, names)| (from, names.into_iter().collect()))
            .collect();
        let old_upstream = self.upstream_of.get(&cell).cloned().unwrap_or_default();

        // Cells whose outgoing edges are about to change: every upstream that
        // gained or lost this cell, and the cell itself.
        let mut sources = HashSet::from([cell.clone()]);
        sources.extend(
            old_upstream
                .keys()
                .filter(|u| !new_upstream.contains_key(*u))
                .cloned(),
        );
        sources.extend(
            new_upstream
                .keys()
                .filter(|u| !old_upstream.contains_key(*u))
                .cloned(),
        );
        self.invalidate_sources(&sources);

        self.nodes_by_cell
            .insert(cell.clone(), nodes.into_iter().collect());

        for dropped in old_upstream.keys().filter(|u| !new_upstream.contains_key(*u)) {
            if let Some(readers) = self.downstream_of.get_mut(dropped) {
                readers.shift_remove(&cell);
            }
        }
        for from in new_upstream.keys() {
            self.ensure_cell(from);
            self.downstream_of
                .entry(from.clone())
                .or_default()
                .insert(cell.clone());
        }
        let upstream_count = new_upstream.len();
        self.upstream_of.insert(cell.clone(), new_upstream);

        if self.config.downstream_edges_authoritative {
            self.replace_downstream(&cell, downstream.into_iter().collect());
        } else if !downstream.is_empty() {
            trace!(
                cell = %cell,
                ignored = downstream.len(),
                "downstream edges not authoritative; ignored"
            );
        }

        self.closures.store_upstream(&cell, upstream_closure);

        debug!(
            cell = %cell,
            upstream = upstream_count,
            downstream = self.downstream_of.get(&cell).map_or(0, IndexSet::len),
            invalidated_sources = sources.len(),
            "execution result applied"
        );
        self.after_mutation();
    }

    /// Remove a cell and every edge and cache entry that mentions it.
    ///
    /// Returns `false`, and leaves the store untouched, for unknown cells.
    pub fn remove_cell(&mut self, cell: &CellId) -> bool {
        if !self.cells.contains(cell) {
            return false;
        }

        // Everything that could reach `cell` has it in its closure.
        self.invalidate_sources(&HashSet::from([cell.clone()]));

        self.cells.shift_remove(cell);
        self.nodes_by_cell.remove(cell);

        if let Some(readers) = self.downstream_of.shift_remove(cell) {
            for reader in &readers {
                if let Some(edges) = self.upstream_of.get_mut(reader) {
                    edges.shift_remove(cell);
                }
            }
        }
        if let Some(edges) = self.upstream_of.shift_remove(cell) {
            for from in edges.keys() {
                if let Some(readers) = self.downstream_of.get_mut(from) {
                    readers.shift_remove(cell);
                }
            }
        }
        self.closures.forget(cell);

        debug!(cell = %cell, remaining = self.cells.len(), "cell removed");
        self.after_mutation();
        true
    }

    /// Overwrite downstream edges in bulk from the engine's own bookkeeping.
    ///
    /// Pairs for cells that `is_live` rejects are skipped, as are rejected
    /// targets inside a list. The whole downstream closure cache is cleared
    /// afterwards regardless of policy. Returns how many pairs were applied.
    pub fn apply_downstream_refresh<I, F>(&mut self, updates: I, is_live: F) -> usize
    where
        I: IntoIterator<Item = (CellId, Vec<CellId>)>,
        F: Fn(&CellId) -> bool,
    {
        let mut applied = 0;
        for (cell, targets) in updates {
            if !is_live(&cell) {
                trace!(cell = %cell, "refresh entry for dead cell skipped");
                continue;
            }
            let targets: IndexSet<CellId> = targets
                .into_iter()
                .filter(|target| {
                    let live = is_live(target);
                    if !live {
                        trace!(cell = %cell, target = %target, "dead refresh target dropped");
                    }
                    live
                })
                .collect();
            self.ensure_cell(&cell);
            self.replace_downstream(&cell, targets);
            applied += 1;
        }

        self.closures.invalidate_all();
        debug!(applied, "downstream refresh applied");
        self.after_mutation();
        applied
    }

    /// All cells reachable downstream of `cell`, excluding `cell` itself.
    pub fn downstream_closure(&mut self, cell: &CellId) -> Closure {
        self.closures.downstream_closure(cell, &self.downstream_of)
    }

    /// The ancestor chain the engine last reported for `cell`.
    pub fn upstream_closure(&self, cell: &CellId) -> &[CellId] {
        self.closures.upstream_closure(cell)
    }

    /// Read access to the closure cache.
    pub fn closures(&self) -> &ClosureCache {
        &self.closures
    }

    /// The outgoing adjacency, as the closure computation sees it.
    pub fn downstream_edges(&self) -> &DownstreamEdges {
        &self.downstream_of
    }

    /// Whether `cell` appears anywhere in the store: cell list, names,
    /// either adjacency map (as key or value) or either closure cache.
    pub fn mentions(&self, cell: &CellId) -> bool {
        self.cells.contains(cell)
            || self.nodes_by_cell.contains_key(cell)
            || self.upstream_of.contains_key(cell)
            || self.downstream_of.contains_key(cell)
            || self.upstream_of.values().any(|edges| edges.contains_key(cell))
            || self.downstream_of.values().any(|readers| readers.contains(cell))
            || self.closures.mentions(cell)
    }

    /// Find an edge recorded on one side of the adjacency but not the other.
    ///
    /// Returns `(upstream, downstream)` of the first mismatch.
    pub fn find_mirror_violation(&self) -> Option<(CellId, CellId)> {
        for (reader, edges) in &self.upstream_of {
            for from in edges.keys() {
                let mirrored = self
                    .downstream_of
                    .get(from)
                    .is_some_and(|readers| readers.contains(reader));
                if !mirrored {
                    return Some((from.clone(), reader.clone()));
                }
            }
        }
        for (from, readers) in &self.downstream_of {
            for reader in readers {
                let mirrored = self
                    .upstream_of
                    .get(reader)
                    .is_some_and(|edges| edges.contains_key(from));
                if !mirrored {
                    return Some((from.clone(), reader.clone()));
                }
            }
        }
        None
    }

    /// Panic if the two adjacency maps disagree.
    ///
    /// A mismatch means a mutator is broken; there is nothing to recover.
    pub fn check_invariants(&self) {
        if let Some((from, reader)) = self.find_mirror_violation() {
            panic!("adjacency out of sync: edge {from} -> {reader} is recorded on one side only");
        }
    }

    /// Make sure `cell` has a slot in the cell list and both adjacency maps.
    fn ensure_cell(&mut self, cell: &CellId) -> bool {
        let added = self.cells.insert(cell.clone());
        if added {
            self.upstream_of.entry(cell.clone()).or_default();
            self.downstream_of.entry(cell.clone()).or_default();
        }
        added
    }

    /// Replace the outgoing edges of `cell`, mirroring the change into the
    /// readers' upstream maps. Edges added here carry no names.
    ///
    /// A recorded read of the cell's own names survives even when `targets`
    /// omits the cell.
    fn replace_downstream(&mut self, cell: &CellId, mut targets: IndexSet<CellId>) {
        let reads_itself = self
            .upstream_of
            .get(cell)
            .is_some_and(|edges| edges.contains_key(cell));
        if reads_itself {
            targets.insert(cell.clone());
        }

        let old = self.downstream_of.get(cell).cloned().unwrap_or_default();
        if old == targets {
            return;
        }

        for gone in old.iter().filter(|d| !targets.contains(*d)) {
            if let Some(edges) = self.upstream_of.get_mut(gone) {
                edges.shift_remove(cell);
            }
        }
        for target in &targets {
            self.ensure_cell(target);
            self.upstream_of
                .entry(target.clone())
                .or_default()
                .entry(cell.clone())
                .or_default();
        }
        self.downstream_of.insert(cell.clone(), targets);
    }

    /// Drop memoized closures that a change to the outgoing edges of
    /// `sources` could make stale.
    fn invalidate_sources(&mut self, sources: &HashSet<CellId>) {
        match self.config.invalidation {
            InvalidationPolicy::Coarse => self.closures.invalidate_all(),
            InvalidationPolicy::Containment => {
                self.closures.invalidate_containing(sources);
            }
        }
    }

    fn after_mutation(&self) {
        if self.config.check_invariants {
            self.check_invariants();
        }
    }
}
