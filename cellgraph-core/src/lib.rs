//! Cellgraph Core
//!
//! This crate provides the incremental cell-dependency graph behind a
//! dataflow notebook. It implements:
//!
//! - A mutable graph of cells, the names they define and the names they read
//! - Memoized downstream reachability with conservative invalidation
//! - Storage for the upstream ancestor chains reported by the execution engine
//! - Change notification for viewers, and a serializable snapshot
//!
//! The crate does not run code or work out dependencies itself; the execution
//! engine reports them after each cell run.
//!
//! # Architecture
//!
//! - `graph`: the store, the closure cache and the read-only accessors
//! - `engine`: payloads the execution engine sends
//! - `notebook`: the per-session owner of a graph, single-threaded or shared
//! - `snapshot`: the viewer-facing export
//! - `config`, `error`, `notify`: ambient plumbing
//!
//! # Example
//!
//! ```rust
//! use cellgraph_core::engine::ExecutionResult;
//! use cellgraph_core::graph::CellId;
//! use cellgraph_core::notebook::NotebookGraph;
//!
//! let mut graph = NotebookGraph::new();
//! graph.apply_execution_result(ExecutionResult::new("a").defines(["x"]));
//! graph.apply_execution_result(ExecutionResult::new("b").defines(["y"]).reads("a", ["x"]));
//! graph.apply_execution_result(ExecutionResult::new("c").reads("b", ["y"]));
//!
//! let downstream = graph.downstream_closure(&CellId::from("a"));
//! assert_eq!(downstream.len(), 2);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod notebook;
pub mod notify;
pub mod snapshot;

pub use config::{GraphConfig, InvalidationPolicy};
pub use engine::{DownstreamRefresh, ExecutionResult};
pub use error::{GraphError, GraphResult};
pub use graph::{CellId, GraphStore, NodeName};
pub use notebook::{NotebookGraph, SharedNotebookGraph};
pub use snapshot::GraphSnapshot;
