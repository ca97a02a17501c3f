//! Fold flat grouped records into a nested dataset.
//!
//! Analytics queries return rows keyed by a grouping path, e.g.
//! `["EMEA", "Germany", "Enterprise"]`. [`build_hierarchy`] turns them into
//! the nested [`Node`] sequence the engine consumes:
//!
//! - one node per distinct path prefix, ordered by first appearance
//! - ids are the prefix joined with `/`, with `%` and `/` inside a name
//!   escaped as `%25` and `%2F`, so they are globally unique
//! - a node's value is the sum of the record values at or below it
//! - a record's metadata lands on the node its path ends at

use crate::node::{MetaValue, Node};
use crate::ID_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One grouped row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub path: Vec<String>,
    pub value: f64,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl FlatRecord {
    pub fn new<S: Into<String>>(path: impl IntoIterator<Item = S>, value: f64) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            value,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Builder node: children kept in insertion order with a name lookup.
#[derive(Default)]
struct Branch {
    value: f64,
    metadata: BTreeMap<String, MetaValue>,
    order: Vec<String>,
    children: HashMap<String, Branch>,
}

impl Branch {
    fn child(&mut self, name: &str) -> &mut Branch {
        if !self.children.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.children.entry(name.to_string()).or_default()
    }

    fn into_nodes(mut self, prefix: &str) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(self.order.len());
        for name in self.order {
            let Some(branch) = self.children.remove(&name) else {
                continue;
            };
            let segment = escape_segment(&name);
            let id = if prefix.is_empty() {
                segment
            } else {
                format!("{}{}{}", prefix, ID_SEPARATOR, segment)
            };
            let value = branch.value;
            let metadata = branch.metadata.clone();
            let children = branch.into_nodes(&id);
            nodes.push(Node {
                id,
                name,
                value,
                children,
                level: 0,
                metadata,
            });
        }
        nodes
    }
}

/// Escape a group name for use as one id segment.
fn escape_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => out.push_str("%25"),
            ID_SEPARATOR => out.push_str("%2F"),
            c => out.push(c),
        }
    }
    out
}

/// Build a nested root sequence from grouped records.
///
/// Levels are left at 0; the engine assigns them.
pub fn build_hierarchy<I>(records: I) -> Vec<Node>
where
    I: IntoIterator<Item = FlatRecord>,
{
    let mut root = Branch::default();
    let mut skipped = 0usize;

    for record in records {
        if record.path.is_empty() {
            skipped += 1;
            continue;
        }
        let mut branch = &mut root;
        for name in &record.path {
            branch = branch.child(name);
            branch.value += record.value;
        }
        branch.metadata.extend(record.metadata);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped records with an empty grouping path");
    }
    root.into_nodes("")
}
