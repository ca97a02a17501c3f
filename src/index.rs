//! Lookup caches over one dataset.
//!
//! [`NodeIndex`] owns the leveled tree and two maps built by a single
//! depth-first traversal:
//!
//! - id → node
//! - path key (`.`-joined names from the root) → node
//!
//! Both maps store the node's address (child offsets from the root), so the
//! tree is held once and lookups never clone subtrees. The index is built
//! per engine instance and is immutable afterwards.
//!
//! Later entries win on a key collision, matching the behavior of a map
//! filled in traversal order. Collisions are recorded so callers can report
//! them.

use crate::node::{assign_levels, Node};
use crate::path_key;
use std::collections::{BTreeSet, HashMap};

/// Child offsets from the root sequence down to a node.
type Address = Vec<usize>;

/// Per-instance node arena with id and path-key lookups.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    roots: Vec<Node>,
    by_id: HashMap<String, Address>,
    by_path: HashMap<String, Address>,
    duplicate_ids: BTreeSet<String>,
    ambiguous_paths: BTreeSet<String>,
}

impl NodeIndex {
    /// Assign levels to a copy of `data` and index it.
    pub fn build(data: &[Node]) -> Self {
        let mut index = Self {
            roots: assign_levels(data),
            ..Self::default()
        };

        let mut by_id = HashMap::new();
        let mut by_path = HashMap::new();
        let mut duplicate_ids = BTreeSet::new();
        let mut ambiguous_paths = BTreeSet::new();
        let mut names = Vec::new();
        let mut address = Vec::new();

        for (offset, node) in index.roots.iter().enumerate() {
            address.push(offset);
            visit(
                node,
                &mut names,
                &mut address,
                &mut by_id,
                &mut by_path,
                &mut duplicate_ids,
                &mut ambiguous_paths,
            );
            address.pop();
        }

        for id in &duplicate_ids {
            tracing::warn!(id = %id, "duplicate node id, later node shadows earlier");
        }
        for key in &ambiguous_paths {
            tracing::warn!(path = %key, "ambiguous name path, later node shadows earlier");
        }

        index.by_id = by_id;
        index.by_path = by_path;
        index.duplicate_ids = duplicate_ids;
        index.ambiguous_paths = ambiguous_paths;
        index
    }

    /// Root-level sequence (levels assigned).
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).and_then(|addr| self.resolve(addr))
    }

    /// Look up a node by the `.`-joined key of its name path.
    pub fn get_by_path_key(&self, key: &str) -> Option<&Node> {
        self.by_path.get(key).and_then(|addr| self.resolve(addr))
    }

    /// Look up a node by its name path.
    pub fn get_by_names<S: AsRef<str>>(&self, names: &[S]) -> Option<&Node> {
        if names.is_empty() {
            return None;
        }
        self.get_by_path_key(&path_key(names))
    }

    /// True if more than one node produced this path key.
    pub fn is_ambiguous(&self, key: &str) -> bool {
        self.ambiguous_paths.contains(key)
    }

    /// Path keys shared by more than one node, sorted.
    pub fn ambiguous_paths(&self) -> impl Iterator<Item = &str> {
        self.ambiguous_paths.iter().map(String::as_str)
    }

    /// Ids carried by more than one node, sorted.
    pub fn duplicate_ids(&self) -> impl Iterator<Item = &str> {
        self.duplicate_ids.iter().map(String::as_str)
    }

    /// Number of distinct ids indexed.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn resolve(&self, address: &[usize]) -> Option<&Node> {
        let (first, rest) = address.split_first()?;
        let mut node = self.roots.get(*first)?;
        for offset in rest {
            node = node.children.get(*offset)?;
        }
        Some(node)
    }
}

fn visit<'a>(
    node: &'a Node,
    names: &mut Vec<&'a str>,
    address: &mut Address,
    by_id: &mut HashMap<String, Address>,
    by_path: &mut HashMap<String, Address>,
    duplicate_ids: &mut BTreeSet<String>,
    ambiguous_paths: &mut BTreeSet<String>,
) {
    names.push(&node.name);

    if by_id.insert(node.id.clone(), address.clone()).is_some() {
        duplicate_ids.insert(node.id.clone());
    }
    let key = path_key(names.as_slice());
    if by_path.insert(key.clone(), address.clone()).is_some() {
        ambiguous_paths.insert(key);
    }

    for (offset, child) in node.children.iter().enumerate() {
        address.push(offset);
        visit(
            child,
            names,
            address,
            by_id,
            by_path,
            duplicate_ids,
            ambiguous_paths,
        );
        address.pop();
    }

    names.pop();
}
