//! Cell and Node Identifiers
//!
//! This module defines the identifier types that live in the dependency graph.
//! Both are opaque strings: cell ids are assigned by the host notebook and
//! node names are reported by the execution engine.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a notebook cell.
///
/// The graph never generates these; it only stores what the host hands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    /// Wrap a host-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CellId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for CellId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for CellId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A name (variable) defined by a cell's execution.
///
/// Names are scoped to the cell that defines them; two cells may both define `df`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for NodeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn cell_ids_compare_by_value() {
        let a = CellId::from("cell-1");
        let b = CellId::new(String::from("cell-1"));
        assert_eq!(a, b);
        assert_ne!(a, CellId::from("cell-2"));
    }

    #[test]
    fn cell_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(CellId::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&CellId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        let name: NodeName = serde_json::from_str("\"df\"").unwrap();
        assert_eq!(name.as_str(), "df");
    }
}
