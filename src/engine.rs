//! Drill-down navigation state machine.
//!
//! States are identified by the current path; the empty path is the root.
//! Every operation either commits completely or leaves state untouched.
//!
//! # Resolution
//!
//! `drill_down` resolves its target by global id and does not require the
//! target to be a child of the current level, so it doubles as a jump to any
//! node. `drill_up` and `drill_to_level` recompute the visible data by
//! re-walking names through the path-key index (see [`ResolutionMode`]).

use crate::config::{DrillDownConfig, ResolutionMode};
use crate::history::NavOp;
use crate::index::NodeIndex;
use crate::node::{find_named, Node, PathEntry};
use crate::persist::PersistedPath;
use crate::store::PathStore;
use crate::{path_key, Fault};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Owned copy of the navigation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownState {
    pub current_path: Vec<PathEntry>,
    pub current_data: Vec<Node>,
    pub breadcrumbs: Vec<PathEntry>,
}

/// Where the visible data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    Root,
    /// Children of the node with this id.
    Children(String),
    /// Children of the node at this path key.
    PathChildren(String),
}

struct Persistence {
    key: String,
    store: Arc<dyn PathStore>,
}

/// Navigation engine over one dataset.
pub struct DrillDownEngine {
    index: NodeIndex,
    config: DrillDownConfig,
    persistence: Option<Persistence>,
    current_path: Vec<PathEntry>,
    breadcrumbs: Vec<PathEntry>,
    position: Position,
}

impl fmt::Debug for DrillDownEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrillDownEngine")
            .field("nodes", &self.index.len())
            .field("config", &self.config)
            .field("persistent", &self.persistence.is_some())
            .field("current_path", &self.current_path)
            .finish()
    }
}

impl DrillDownEngine {
    /// Build an engine without persistence.
    ///
    /// A `persistence_key` in `config` is ignored without a store.
    pub fn new(initial_data: Vec<Node>, config: DrillDownConfig) -> Self {
        Self::build(&initial_data, config, None)
    }

    /// Build an engine that restores from and saves to `store`.
    ///
    /// Persistence is active only when `config.persistence_key` is set.
    pub fn with_store(
        initial_data: Vec<Node>,
        config: DrillDownConfig,
        store: Arc<dyn PathStore>,
    ) -> Self {
        Self::build(&initial_data, config, Some(store))
    }

    fn build(data: &[Node], config: DrillDownConfig, store: Option<Arc<dyn PathStore>>) -> Self {
        let persistence = match (config.persistence_key.clone(), store) {
            (Some(key), Some(store)) => Some(Persistence { key, store }),
            (Some(key), None) => {
                tracing::warn!(key = %key, "persistence key set without a store, not persisting");
                None
            }
            _ => None,
        };

        let index = NodeIndex::build(data);
        tracing::debug!(
            nodes = index.len(),
            duplicate_ids = index.duplicate_ids().count(),
            ambiguous_paths = index.ambiguous_paths().count(),
            "indexed dataset"
        );

        let mut engine = Self {
            index,
            config,
            persistence,
            current_path: Vec::new(),
            breadcrumbs: Vec::new(),
            position: Position::Root,
        };
        engine.restore();
        engine
    }

    // =========================================================================
    // READ-ONLY STATE
    // =========================================================================

    /// Entries from the root to the current position.
    pub fn current_path(&self) -> &[PathEntry] {
        &self.current_path
    }

    /// Nodes visible at the current position.
    pub fn current_data(&self) -> &[Node] {
        let node = match &self.position {
            Position::Root => None,
            Position::Children(id) => self.index.get(id),
            Position::PathChildren(key) => self.index.get_by_path_key(key),
        };
        match node {
            Some(node) => &node.children,
            None => self.index.roots(),
        }
    }

    /// Breadcrumb trail; always empty when breadcrumbs are disabled.
    pub fn breadcrumbs(&self) -> &[PathEntry] {
        &self.breadcrumbs
    }

    /// Length of the current path.
    pub fn current_depth(&self) -> usize {
        self.current_path.len()
    }

    /// True if below max depth and some visible node has children.
    pub fn can_drill_down(&self) -> bool {
        self.current_depth() < self.config.max_depth
            && self.current_data().iter().any(Node::has_children)
    }

    /// True if not at the root.
    pub fn can_drill_up(&self) -> bool {
        !self.current_path.is_empty()
    }

    /// Maximum path length.
    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    /// Options the engine was built with.
    pub fn config(&self) -> &DrillDownConfig {
        &self.config
    }

    /// Root-level sequence with levels assigned.
    pub fn root_data(&self) -> &[Node] {
        self.index.roots()
    }

    /// Lookup caches over the dataset.
    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    /// Path keys shared by more than one node.
    pub fn ambiguous_paths(&self) -> Vec<String> {
        self.index.ambiguous_paths().map(str::to_string).collect()
    }

    /// Owned snapshot of path, visible data and breadcrumbs.
    pub fn state(&self) -> DrillDownState {
        DrillDownState {
            current_path: self.current_path.clone(),
            current_data: self.current_data().to_vec(),
            breadcrumbs: self.breadcrumbs.clone(),
        }
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// Look up any node by id.
    pub fn get_node_by_id(&self, id: &str) -> Option<&Node> {
        self.index.get(id)
    }

    /// Resolve a name path to the node it ends at.
    pub fn get_node_by_path<S: AsRef<str>>(&self, names: &[S]) -> Option<&Node> {
        if names.is_empty() {
            return None;
        }
        self.index
            .get_by_names(names)
            .or_else(|| walk_names(self.index.roots(), names).ok().and_then(|w| w.last))
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Drill into a node by id. Returns false if rejected.
    pub fn drill_down(&mut self, node_id: &str) -> bool {
        report("drill_down", self.try_drill_down(node_id))
    }

    /// Drill into any node with children, wherever it sits in the tree.
    pub fn try_drill_down(&mut self, node_id: &str) -> Result<(), Fault> {
        let node = self
            .index
            .get(node_id)
            .ok_or_else(|| Fault::UnknownNode(node_id.to_string()))?;
        if node.is_leaf() {
            return Err(Fault::LeafNode(node_id.to_string()));
        }
        if self.current_path.len() >= self.config.max_depth {
            return Err(Fault::MaxDepthReached {
                max: self.config.max_depth,
            });
        }

        let entry = node.entry();
        tracing::debug!(id = %entry.id, level = entry.level, "drill down");
        if self.config.breadcrumbs {
            self.breadcrumbs.push(entry.clone());
        }
        self.current_path.push(entry);
        self.position = Position::Children(node_id.to_string());
        self.persist();
        Ok(())
    }

    /// Move to the parent level. Returns false at the root.
    pub fn drill_up(&mut self) -> bool {
        report("drill_up", self.try_drill_up())
    }

    /// Pop the last path entry and recompute the visible data.
    pub fn try_drill_up(&mut self) -> Result<(), Fault> {
        if self.current_path.is_empty() {
            return Err(Fault::AtRoot);
        }
        let depth = self.current_path.len() - 1;
        self.truncate_to(depth);
        self.persist();
        Ok(())
    }

    /// Cut the path to `level` entries. Returns false if out of range.
    pub fn drill_to_level(&mut self, level: usize) -> bool {
        report("drill_to_level", self.try_drill_to_level(level))
    }

    /// Cut the path to `level` entries and recompute the visible data.
    pub fn try_drill_to_level(&mut self, level: usize) -> Result<(), Fault> {
        if level > self.config.max_depth || level > self.current_path.len() {
            return Err(Fault::LevelOutOfRange {
                level,
                depth: self.current_path.len(),
                max: self.config.max_depth,
            });
        }
        self.truncate_to(level);
        self.persist();
        Ok(())
    }

    /// Return to the root. Always succeeds.
    pub fn reset(&mut self) {
        tracing::debug!("reset to root");
        self.current_path.clear();
        self.breadcrumbs.clear();
        self.position = Position::Root;
        self.persist();
    }

    /// Jump to a name path from the root. Returns false if it does not resolve.
    pub fn go_to_path<S: AsRef<str>>(&mut self, names: &[S]) -> bool {
        report("go_to_path", self.try_go_to_path(names))
    }

    /// Validate the whole name path, then commit it.
    pub fn try_go_to_path<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Fault> {
        if names.len() > self.config.max_depth {
            return Err(Fault::PathTooDeep {
                len: names.len(),
                max: self.config.max_depth,
            });
        }

        let walk = walk_names(self.index.roots(), names)?;
        let position = match walk.last {
            Some(node) => Position::Children(node.id.clone()),
            None => Position::Root,
        };

        tracing::debug!(path = %path_key(names), "go to path");
        self.breadcrumbs = if self.config.breadcrumbs {
            walk.entries.clone()
        } else {
            Vec::new()
        };
        self.current_path = walk.entries;
        self.position = position;
        self.persist();
        Ok(())
    }

    /// Apply a navigation op. Returns whether it changed state.
    pub fn execute(&mut self, op: &NavOp) -> bool {
        match op {
            NavOp::DrillDown { id } => self.drill_down(id),
            NavOp::DrillUp => self.drill_up(),
            NavOp::DrillToLevel { level } => self.drill_to_level(*level),
            NavOp::Reset => {
                self.reset();
                true
            }
            NavOp::GoToPath { names } => self.go_to_path(names.as_slice()),
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Cut path and breadcrumbs to `depth` and recompute the visible data.
    fn truncate_to(&mut self, depth: usize) {
        self.current_path.truncate(depth);
        self.breadcrumbs.truncate(depth);
        self.position = self.resolve_position();
        tracing::debug!(depth, "drill to level");
    }

    fn resolve_position(&self) -> Position {
        let Some(last) = self.current_path.last() else {
            return Position::Root;
        };

        match self.config.resolution {
            ResolutionMode::Strict => match self.index.get(&last.id) {
                Some(_) => Position::Children(last.id.clone()),
                None => Position::Root,
            },
            ResolutionMode::ByName => {
                let names: Vec<&str> = self.current_path.iter().map(|e| e.name.as_str()).collect();
                let key = path_key(names.as_slice());
                if self.index.is_ambiguous(&key) {
                    tracing::warn!(path = %key, "resolving ambiguous name path");
                }
                match self.index.get_by_path_key(&key) {
                    Some(_) => Position::PathChildren(key),
                    None => Position::Root,
                }
            }
        }
    }

    /// Replay a saved path from the store, staying at the root on any problem.
    fn restore(&mut self) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        let text = match persistence.store.load(&persistence.key) {
            Ok(Some(text)) => text,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(key = %persistence.key, error = %e, "failed to load saved path");
                return;
            }
        };
        let saved = match PersistedPath::decode(&text) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(key = %persistence.key, error = %e, "ignoring malformed saved path");
                return;
            }
        };
        if saved.current_path.len() > self.config.max_depth {
            tracing::debug!(
                len = saved.current_path.len(),
                max = self.config.max_depth,
                "saved path deeper than max depth, starting at root"
            );
            return;
        }

        let mut entries = Vec::with_capacity(saved.current_path.len());
        for step in &saved.current_path {
            match self.index.get(&step.id) {
                Some(node) if node.has_children() => entries.push(node.entry()),
                _ => {
                    tracing::debug!(id = %step.id, "saved path no longer navigable, starting at root");
                    return;
                }
            }
        }

        self.position = match entries.last() {
            Some(entry) => Position::Children(entry.id.clone()),
            None => Position::Root,
        };
        if self.config.breadcrumbs {
            self.breadcrumbs = entries.clone();
        }
        self.current_path = entries;
        tracing::debug!(
            depth = self.current_path.len(),
            saved_at = ?saved.saved_at(),
            "restored saved path"
        );
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let saved = PersistedPath::now(self.current_path.clone(), self.breadcrumbs.clone());
        let result = saved
            .encode()
            .map_err(|e| e.to_string())
            .and_then(|text| {
                persistence
                    .store
                    .save(&persistence.key, &text)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            tracing::warn!(key = %persistence.key, error = %error, "failed to save path");
        }
    }
}

fn report(op: &str, result: Result<(), Fault>) -> bool {
    match result {
        Ok(()) => true,
        Err(fault) if fault.is_missing_target() => {
            tracing::debug!(op, %fault, "navigation rejected: unknown target");
            false
        }
        Err(fault) if fault.is_depth_fault() => {
            tracing::debug!(op, %fault, "navigation rejected: depth bound");
            false
        }
        Err(fault) => {
            tracing::debug!(op, %fault, "navigation rejected");
            false
        }
    }
}

/// Result of walking a name path from the root.
struct NameWalk<'a> {
    entries: Vec<PathEntry>,
    last: Option<&'a Node>,
}

/// Walk `names` from `roots`, taking the first sibling with a matching name
/// at each step. Intermediate nodes must have children; the final one may be
/// a leaf.
fn walk_names<'a, S: AsRef<str>>(roots: &'a [Node], names: &[S]) -> Result<NameWalk<'a>, Fault> {
    let mut level: &'a [Node] = roots;
    let mut entries = Vec::with_capacity(names.len());
    let mut last = None;

    for (i, name) in names.iter().enumerate() {
        let name = name.as_ref();
        let node = find_named(level, name).ok_or_else(|| Fault::SegmentNotFound {
            name: name.to_string(),
            level: i,
        })?;
        if i + 1 < names.len() && node.is_leaf() {
            return Err(Fault::SegmentIsLeaf {
                name: name.to_string(),
                level: i,
            });
        }
        entries.push(node.entry());
        level = &node.children;
        last = Some(node);
    }

    Ok(NameWalk { entries, last })
}
