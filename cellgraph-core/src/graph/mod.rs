//! Cell Dependency Graph
//!
//! This module implements the dependency graph between notebook cells.
//!
//! # Overview
//!
//! The graph is a directed graph (cycles are tolerated) where:
//!
//! - Nodes are cells, each defining zero or more named values
//! - An edge from A to B means B read a value A defined
//!
//! The execution engine reports edges after each run; the graph never works
//! them out on its own. What it does work out is reachability: the set of
//! cells downstream of a given cell, memoized per cell and invalidated when a
//! structural change could have made an entry stale.
//!
//! # Design Decisions
//!
//! 1. Adjacency is kept in both directions, as typed maps, so either side
//!    can be read in O(degree).
//!
//! 2. Invalidation is coarse by default: any edge change drops the whole
//!    downstream closure cache. Graphs are tens to low hundreds of cells, so
//!    recomputing is cheaper than getting a precise dirty set wrong.
//!
//! 3. Upstream closures are stored as reported by the engine, not derived.

mod cell;
mod closure;
mod query;
mod store;

pub use cell::{CellId, NodeName};
pub use closure::{Closure, ClosureCache, DownstreamEdges};
pub use store::{GraphStore, UpstreamEdges};
