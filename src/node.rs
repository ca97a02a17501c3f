//! Hierarchy data model.
//!
//! A [`Node`] is one category or segment of the dataset. Nodes nest through
//! `children`; a [`PathEntry`] records one step of a navigation path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display-only metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Number(n) => write!(f, "{}", n),
            MetaValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Number(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

/// One node of the hierarchical dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique across the whole tree.
    pub id: String,

    /// Label, unique among siblings. Used as the key for name-path lookups.
    pub name: String,

    /// Measure attached to this node (e.g. a monetary amount).
    pub value: f64,

    /// Ordered children; empty for a leaf.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    /// Depth from the root. Assigned by the engine, input values are ignored.
    #[serde(default)]
    pub level: usize,

    /// Carried for display, never interpreted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Node {
    /// Create a leaf node at level 0.
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            children: Vec::new(),
            level: 0,
            metadata: BTreeMap::new(),
        }
    }

    /// Replace the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Add one metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if the node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Find the first direct child with the given name.
    pub fn child_named(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Path entry describing this node.
    pub fn entry(&self) -> PathEntry {
        PathEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            level: self.level,
        }
    }

    /// Count this node and all descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// One step of a navigation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    pub id: String,
    pub name: String,
    pub level: usize,
}

/// Copy a root sequence, assigning `level` by depth (roots are level 0).
pub fn assign_levels(nodes: &[Node]) -> Vec<Node> {
    assign_levels_from(nodes, 0)
}

fn assign_levels_from(nodes: &[Node], level: usize) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| Node {
            id: node.id.clone(),
            name: node.name.clone(),
            value: node.value,
            children: assign_levels_from(&node.children, level + 1),
            level,
            metadata: node.metadata.clone(),
        })
        .collect()
}

/// Find the first node with `name` in a sibling sequence.
pub fn find_named<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Node> {
    nodes.iter().find(|n| n.name == name)
}
