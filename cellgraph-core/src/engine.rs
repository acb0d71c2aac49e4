//! Execution Engine Payloads
//!
//! The types the execution engine hands the graph. They are plain data and
//! can be built in Rust or decoded from the engine's JSON messages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::graph::{CellId, NodeName};

/// What the engine learned from running one cell.
///
/// # Example
///
/// ```rust
/// use cellgraph_core::engine::ExecutionResult;
///
/// let result = ExecutionResult::new("plot")
///     .defines(["fig"])
///     .reads("load", ["df"])
///     .ancestors(["load"]);
/// assert_eq!(result.upstream.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The cell that ran.
    pub cell: CellId,

    /// Names the cell now defines. Replaces the previous list.
    #[serde(default)]
    pub nodes: Vec<NodeName>,

    /// Upstream cell to the names read from it. Replaces the previous map.
    #[serde(default)]
    pub upstream: IndexMap<CellId, Vec<NodeName>>,

    /// Cells that read from this one.
    ///
    /// With `downstream_edges_authoritative` set (the default) this list
    /// replaces every outgoing edge of the cell, so an absent or empty list
    /// means "no readers", not "unknown". Rerunning a cell without it erases
    /// the reads other cells recorded against it. A read of the cell's own
    /// names is kept regardless.
    #[serde(default)]
    pub downstream: Vec<CellId>,

    /// Full ancestor chain as the engine computed it. Empty means unknown.
    #[serde(default)]
    pub upstream_closure: Vec<CellId>,
}

impl ExecutionResult {
    /// Start an empty result for `cell`.
    pub fn new(cell: impl Into<CellId>) -> Self {
        Self {
            cell: cell.into(),
            nodes: Vec::new(),
            upstream: IndexMap::new(),
            downstream: Vec::new(),
            upstream_closure: Vec::new(),
        }
    }

    /// Decode a result from the engine's JSON message.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add names the cell defines.
    pub fn defines<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeName>,
    {
        self.nodes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Record that the cell read `names` from `from`.
    pub fn reads<I, N>(mut self, from: impl Into<CellId>, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeName>,
    {
        self.upstream
            .entry(from.into())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Add cells that read from this one.
    pub fn feeds<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellId>,
    {
        self.downstream.extend(cells.into_iter().map(Into::into));
        self
    }

    /// Append to the ancestor chain, kept in the order given.
    pub fn ancestors<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellId>,
    {
        self.upstream_closure.extend(cells.into_iter().map(Into::into));
        self
    }
}

/// One cell's downstream list inside a refresh batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamUpdate {
    pub cell: CellId,
    #[serde(default)]
    pub downstream: Vec<CellId>,
}

/// A batch of downstream lists from the engine's own bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamRefresh {
    #[serde(default)]
    pub updates: Vec<DownstreamUpdate>,
}

impl DownstreamRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a refresh batch from the engine's JSON message.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add the full downstream list for `cell`.
    pub fn push<I, C>(mut self, cell: impl Into<CellId>, downstream: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellId>,
    {
        self.updates.push(DownstreamUpdate {
            cell: cell.into(),
            downstream: downstream.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl IntoIterator for DownstreamRefresh {
    type Item = (CellId, Vec<CellId>);
    type IntoIter = RefreshPairs;

    fn into_iter(self) -> Self::IntoIter {
        RefreshPairs(self.updates.into_iter())
    }
}

/// Iterator over `(cell, downstream)` pairs of a refresh batch.
#[derive(Debug)]
pub struct RefreshPairs(std::vec::IntoIter<DownstreamUpdate>);

impl Iterator for RefreshPairs {
    type Item = (CellId, Vec<CellId>);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|update| (update.cell, update.downstream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_engine_message() {
        let json = r#"{
            "cell": "plot",
            "nodes": ["fig"],
            "upstream": {"load": ["df"], "cfg": ["k", "n"]},
            "upstream_closure": ["load", "cfg", "init"]
        }"#;
        let result = ExecutionResult::from_json(json).unwrap();

        assert_eq!(result.cell, CellId::from("plot"));
        let froms: Vec<_> = result.upstream.keys().map(CellId::as_str).collect();
        assert_eq!(froms, vec!["load", "cfg"]);
        assert_eq!(result.upstream[&CellId::from("cfg")].len(), 2);
        assert!(result.downstream.is_empty());
        assert_eq!(result.upstream_closure.len(), 3);
    }

    #[test]
    fn builder_matches_decoded() {
        let built = ExecutionResult::new("b").defines(["y"]).reads("a", ["x"]).feeds(["c"]);
        let decoded = ExecutionResult::from_json(
            r#"{"cell": "b", "nodes": ["y"], "upstream": {"a": ["x"]}, "downstream": ["c"]}"#,
        )
        .unwrap();
        assert_eq!(built, decoded);
    }

    #[test]
    fn missing_cell_is_an_error() {
        assert!(ExecutionResult::from_json(r#"{"nodes": []}"#).is_err());
    }

    #[test]
    fn refresh_iterates_as_pairs() {
        let refresh = DownstreamRefresh::from_json(
            r#"{"updates": [{"cell": "a", "downstream": ["b", "c"]}, {"cell": "c"}]}"#,
        )
        .unwrap();
        assert_eq!(refresh.len(), 2);

        let pairs: Vec<_> = refresh.into_iter().collect();
        assert_eq!(pairs[0].0, CellId::from("a"));
        assert_eq!(pairs[0].1.len(), 2);
        assert!(pairs[1].1.is_empty());
    }
}
