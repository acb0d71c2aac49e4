//! Read-only accessors over the store.
//!
//! None of these touch the closure cache; each is O(1) or O(degree).

use super::cell::{CellId, NodeName};
use super::store::GraphStore;

impl GraphStore {
    /// Cells `cell` reads from.
    pub fn immediate_upstream(&self, cell: &CellId) -> Vec<CellId> {
        self.upstream_of
            .get(cell)
            .map(|edges| edges.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every name `cell` reads, across all of its upstream cells.
    pub fn immediate_upstream_named(&self, cell: &CellId) -> Vec<NodeName> {
        self.upstream_of
            .get(cell)
            .map(|edges| edges.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// `(name, defining cell)` for every name `cell` reads.
    pub fn immediate_upstream_pairs(&self, cell: &CellId) -> Vec<(NodeName, CellId)> {
        let Some(edges) = self.upstream_of.get(cell) else {
            return Vec::new();
        };
        edges
            .iter()
            .flat_map(|(from, names)| names.iter().map(move |name| (name.clone(), from.clone())))
            .collect()
    }

    /// Cells that read from `cell`.
    pub fn immediate_downstream(&self, cell: &CellId) -> Vec<CellId> {
        self.downstream_of
            .get(cell)
            .map(|readers| readers.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Names defined by `cell`'s last execution.
    pub fn nodes(&self, cell: &CellId) -> Vec<NodeName> {
        self.nodes_by_cell
            .get(cell)
            .map(|names| names.to_vec())
            .unwrap_or_default()
    }

    /// Known cells in notebook order.
    pub fn cells(&self) -> impl Iterator<Item = &CellId> + '_ {
        self.cells.iter()
    }

    pub fn contains_cell(&self, cell: &CellId) -> bool {
        self.cells.contains(cell)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::ExecutionResult;
    use crate::graph::{CellId, GraphStore, NodeName};

    fn store() -> GraphStore {
        let mut store = GraphStore::new();
        store.apply_execution_result(ExecutionResult::new("load").defines(["df", "path"]));
        store.apply_execution_result(ExecutionResult::new("cfg").defines(["k"]));
        store.apply_execution_result(
            ExecutionResult::new("plot")
                .defines(["fig"])
                .reads("load", ["df"])
                .reads("cfg", ["k"]),
        );
        store
    }

    #[test]
    fn upstream_accessors() {
        let store = store();
        let plot = CellId::from("plot");

        assert_eq!(
            store.immediate_upstream(&plot),
            vec![CellId::from("load"), CellId::from("cfg")]
        );
        assert_eq!(
            store.immediate_upstream_named(&plot),
            vec![NodeName::from("df"), NodeName::from("k")]
        );
        assert_eq!(
            store.immediate_upstream_pairs(&plot),
            vec![
                (NodeName::from("df"), CellId::from("load")),
                (NodeName::from("k"), CellId::from("cfg")),
            ]
        );
    }

    #[test]
    fn downstream_and_nodes() {
        let store = store();
        assert_eq!(store.immediate_downstream(&CellId::from("load")), vec![CellId::from("plot")]);
        assert_eq!(
            store.nodes(&CellId::from("load")),
            vec![NodeName::from("df"), NodeName::from("path")]
        );
        assert_eq!(store.cell_count(), 3);
    }

    #[test]
    fn unknown_cells_read_as_empty() {
        let store = store();
        let ghost = CellId::from("ghost");
        assert!(store.immediate_upstream(&ghost).is_empty());
        assert!(store.immediate_upstream_named(&ghost).is_empty());
        assert!(store.immediate_upstream_pairs(&ghost).is_empty());
        assert!(store.immediate_downstream(&ghost).is_empty());
        assert!(store.nodes(&ghost).is_empty());
        assert!(!store.contains_cell(&ghost));
    }

    #[test]
    fn queries_do_not_fill_the_cache() {
        let store = store();
        let plot = CellId::from("plot");
        let _ = store.immediate_upstream(&plot);
        let _ = store.immediate_downstream(&plot);
        assert_eq!(store.closures().cached_len(), 0);
    }
}
