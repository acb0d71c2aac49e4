//! Graph Configuration
//!
//! Knobs that change how the graph trades precision for simplicity. All
//! fields have defaults, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;

/// How much of the downstream closure cache a structural change discards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationPolicy {
    /// Drop every memoized downstream closure on any edge change.
    #[default]
    Coarse,

    /// Drop only closures owned by, or containing, a cell whose outgoing
    /// edges changed. Closures that could not reach those cells stay cached.
    Containment,
}

/// Configuration for a [`GraphStore`](crate::graph::GraphStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Cache invalidation policy.
    pub invalidation: InvalidationPolicy,

    /// Whether the downstream list in an execution result replaces the
    /// cell's outgoing edges. When false, outgoing edges only change through
    /// other cells' upstream reports and batched refreshes.
    pub downstream_edges_authoritative: bool,

    /// Verify the mirrored adjacency after every mutation.
    pub check_invariants: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            invalidation: InvalidationPolicy::default(),
            downstream_edges_authoritative: true,
            check_invariants: cfg!(debug_assertions),
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_invalidation(mut self, policy: InvalidationPolicy) -> Self {
        self.invalidation = policy;
        self
    }

    pub fn with_downstream_edges_authoritative(mut self, authoritative: bool) -> Self {
        self.downstream_edges_authoritative = authoritative;
        self
    }

    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }
}
