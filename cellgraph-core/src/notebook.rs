//! Notebook Session Graph
//!
//! A notebook session owns one graph. `NotebookGraph` is the single-threaded
//! form: every method runs to completion before the next event, so nothing
//! needs a lock. `SharedNotebookGraph` is for hosts that deliver events from
//! several threads; one mutex guards the store and its closure cache together
//! so edges and closures are never observed half-updated.
//!
//! Both emit a payload-free change notification after every execution
//! result, and after an addition, removal or refresh that changed something.
//! Queries never notify.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::GraphConfig;
use crate::graph::{CellId, Closure, GraphStore};
use crate::engine::ExecutionResult;
use crate::notify::{ObserverId, Observers};
use crate::snapshot::GraphSnapshot;

/// The dependency graph of a single notebook session.
#[derive(Debug, Default)]
pub struct NotebookGraph {
    store: GraphStore,
    observers: Observers,
}

impl NotebookGraph {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            store: GraphStore::with_config(config),
            observers: Observers::new(),
        }
    }

    /// Read access for the query accessors.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Register a change callback.
    pub fn subscribe<F>(&mut self, on_change: F) -> ObserverId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.subscribe(on_change)
    }

    /// Drop a change callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Register a cell before it runs. Notifies only if the cell is new.
    pub fn add_cell(&mut self, cell: impl Into<CellId>) -> bool {
        let added = self.store.add_cell(cell);
        if added {
            self.observers.notify_all();
        }
        added
    }

    /// Apply an execution result and notify observers.
    pub fn apply_execution_result(&mut self, result: ExecutionResult) {
        self.store.apply_execution_result(result);
        self.observers.notify_all();
    }

    /// Remove a cell. Unknown cells are a silent no-op.
    pub fn remove_cell(&mut self, cell: &CellId) -> bool {
        let removed = self.store.remove_cell(cell);
        if removed {
            self.observers.notify_all();
        }
        removed
    }

    /// Apply a refresh batch. Notifies unless every entry was skipped.
    pub fn apply_downstream_refresh<I, F>(&mut self, updates: I, is_live: F) -> usize
    where
        I: IntoIterator<Item = (CellId, Vec<CellId>)>,
        F: Fn(&CellId) -> bool,
    {
        let applied = self.store.apply_downstream_refresh(updates, is_live);
        if applied > 0 {
            self.observers.notify_all();
        }
        applied
    }

    /// All cells reachable downstream of `cell`, memoized.
    pub fn downstream_closure(&mut self, cell: &CellId) -> Closure {
        self.store.downstream_closure(cell)
    }

    /// The ancestor list the engine last reported for `cell`.
    pub fn upstream_closure(&self, cell: &CellId) -> &[CellId] {
        self.store.upstream_closure(cell)
    }

    /// Export the graph for the viewer.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.store)
    }
}

/// A session graph shared across threads.
///
/// Observers run after the lock is released, so a callback may query the
/// graph it is observing.
#[derive(Debug, Clone, Default)]
pub struct SharedNotebookGraph {
    store: Arc<Mutex<GraphStore>>,
    observers: Arc<RwLock<Observers>>,
}

impl SharedNotebookGraph {
    /// Create an empty shared graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty shared graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(GraphStore::with_config(config))),
            observers: Arc::default(),
        }
    }

    /// Register a change callback. It runs on the mutating thread.
    pub fn subscribe<F>(&self, on_change: F) -> ObserverId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.write().subscribe(on_change)
    }

    /// Drop a change callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.write().unsubscribe(id)
    }

    /// Run a read-only query against a consistent view of the graph.
    pub fn read<R>(&self, query: impl FnOnce(&GraphStore) -> R) -> R {
        query(&self.store.lock())
    }

    /// Register a cell before it runs. Notifies only if the cell is new.
    pub fn add_cell(&self, cell: impl Into<CellId>) -> bool {
        let added = self.store.lock().add_cell(cell);
        if added {
            self.notify();
        }
        added
    }

    /// Apply an execution result under the lock, then notify.
    pub fn apply_execution_result(&self, result: ExecutionResult) {
        self.store.lock().apply_execution_result(result);
        self.notify();
    }

    /// Remove a cell. Unknown cells are a silent no-op.
    pub fn remove_cell(&self, cell: &CellId) -> bool {
        let removed = self.store.lock().remove_cell(cell);
        if removed {
            self.notify();
        }
        removed
    }

    /// Apply a refresh batch. Notifies unless every entry was skipped.
    pub fn apply_downstream_refresh<I, F>(&self, updates: I, is_live: F) -> usize
    where
        I: IntoIterator<Item = (CellId, Vec<CellId>)>,
        F: Fn(&CellId) -> bool,
    {
        let applied = self.store.lock().apply_downstream_refresh(updates, is_live);
        if applied > 0 {
            self.notify();
        }
        applied
    }

    /// All cells reachable downstream of `cell`, memoized.
    pub fn downstream_closure(&self, cell: &CellId) -> Closure {
        self.store.lock().downstream_closure(cell)
    }

    /// A copy of the ancestor list the engine last reported for `cell`.
    pub fn upstream_closure(&self, cell: &CellId) -> Vec<CellId> {
        self.store.lock().upstream_closure(cell).to_vec()
    }

    /// Export the graph for the viewer.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.store.lock())
    }

    fn notify(&self) {
        let callbacks = self.observers.read().callbacks();
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn mutations_notify_observers() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut graph = NotebookGraph::new();
        let c = count.clone();
        graph.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        graph.apply_execution_result(ExecutionResult::new("a").defines(["x"]));
        graph.apply_execution_result(ExecutionResult::new("b").reads("a", ["x"]));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        assert!(graph.remove_cell(&CellId::from("b")));
        assert!(!graph.remove_cell(&CellId::from("b")));
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(!graph.add_cell("a"));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn refresh_of_dead_cells_only_is_silent() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut graph = NotebookGraph::new();
        graph.apply_execution_result(ExecutionResult::new("b").reads("a", ["x"]));
        let c = count.clone();
        graph.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let stale = vec![(CellId::from("deleted"), vec![CellId::from("a")])];
        assert_eq!(graph.apply_downstream_refresh(stale, |c| c.as_str() != "deleted"), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let live = vec![(CellId::from("a"), vec![CellId::from("b")])];
        assert_eq!(graph.apply_downstream_refresh(live, |_| true), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shared_refresh_of_dead_cells_only_is_silent() {
        let count = Arc::new(AtomicUsize::new(0));
        let graph = SharedNotebookGraph::new();
        let c = count.clone();
        graph.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let stale = vec![(CellId::from("deleted"), Vec::new())];
        assert_eq!(graph.apply_downstream_refresh(stale, |_| false), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn queries_do_not_notify() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut graph = NotebookGraph::new();
        graph.apply_execution_result(ExecutionResult::new("b").reads("a", ["x"]));
        let c = count.clone();
        graph.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let closure = graph.downstream_closure(&CellId::from("a"));
        assert_eq!(closure.len(), 1);
        assert!(graph.store().immediate_upstream(&CellId::from("b")).len() == 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shared_observer_can_query_the_graph() {
        let graph = SharedNotebookGraph::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let observed = graph.clone();
        let s = seen.clone();
        graph.subscribe(move || {
            let closure = observed.downstream_closure(&CellId::from("a"));
            s.store(closure.len(), Ordering::SeqCst);
        });

        graph.apply_execution_result(ExecutionResult::new("b").reads("a", ["x"]));
        graph.apply_execution_result(ExecutionResult::new("c").reads("b", ["y"]));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shared_graph_across_threads() {
        let graph = SharedNotebookGraph::new();
        graph.apply_execution_result(ExecutionResult::new("root").defines(["r"]));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let graph = graph.clone();
                std::thread::spawn(move || {
                    let cell = format!("leaf-{i}");
                    graph.apply_execution_result(ExecutionResult::new(cell).reads("root", ["r"]));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(graph.downstream_closure(&CellId::from("root")).len(), 4);
        graph.read(|store| {
            assert_eq!(store.cell_count(), 5);
            assert!(store.find_mirror_violation().is_none());
        });
    }
}
