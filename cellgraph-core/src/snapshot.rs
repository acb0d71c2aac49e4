//! Graph Snapshot
//!
//! A point-in-time export of the graph for the dependency viewer. Capturing
//! one reads the edge tables and stored ancestor lists only; it never
//! computes downstream closures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::graph::{CellId, GraphStore, NodeName};

/// One cell as the viewer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub id: CellId,
    pub nodes: Vec<NodeName>,
    /// Upstream cell to the names read from it.
    pub upstream: IndexMap<CellId, Vec<NodeName>>,
    pub downstream: Vec<CellId>,
    pub upstream_closure: Vec<CellId>,
}

/// Every known cell, in notebook order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub cells: Vec<CellSnapshot>,
}

impl GraphSnapshot {
    /// Copy the current state of `store`.
    pub fn capture(store: &GraphStore) -> Self {
        let cells = store
            .cells()
            .map(|id| {
                // edges written through the downstream channel carry no names,
                // so seed every upstream cell before filling in what was read
                let mut upstream: IndexMap<CellId, Vec<NodeName>> = store
                    .immediate_upstream(id)
                    .into_iter()
                    .map(|from| (from, Vec::new()))
                    .collect();
                for (name, from) in store.immediate_upstream_pairs(id) {
                    upstream.entry(from).or_default().push(name);
                }
                CellSnapshot {
                    id: id.clone(),
                    nodes: store.nodes(id),
                    upstream,
                    downstream: store.immediate_downstream(id),
                    upstream_closure: store.upstream_closure(id).to_vec(),
                }
            })
            .collect();
        Self { cells }
    }

    pub fn get(&self, cell: &CellId) -> Option<&CellSnapshot> {
        self.cells.iter().find(|c| &c.id == cell)
    }

    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary form for shipping to an out-of-process viewer.
    pub fn to_msgpack(&self) -> GraphResult<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> GraphResult<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
