//! Hierarchical drill-down navigation engine.
//!
//! This crate owns a nested category dataset (revenue by region, product,
//! rep, ...) and tracks a user's navigation path through it. A presentation
//! layer renders [`DrillDownEngine::current_data`] and turns clicks and key
//! presses into navigation calls.
//!
//! # Architecture
//!
//! - [`node`] - the data model (nodes and path entries)
//! - [`index`] - per-instance id and path-key lookup caches
//! - [`engine`] - the navigation state machine
//! - [`store`] / [`persist`] - injected key-value persistence of the path
//! - [`history`] - navigation log with deterministic replay
//! - [`hierarchy`] - fold flat grouped records into a nested dataset
//!
//! # Example
//!
//! ```
//! use drilldown::{DrillDownConfig, DrillDownEngine, Node};
//!
//! let data = vec![Node::new("na", "North America", 120.0)
//!     .with_children(vec![Node::new("us", "United States", 100.0)])];
//!
//! let mut engine = DrillDownEngine::new(data, DrillDownConfig::default());
//! assert!(engine.drill_down("na"));
//! assert_eq!(engine.current_depth(), 1);
//! assert_eq!(engine.current_data()[0].name, "United States");
//! ```

pub mod config;
pub mod engine;
mod fault;
pub mod hierarchy;
pub mod history;
pub mod index;
pub mod node;
pub mod persist;
pub mod store;

pub use config::{ConfigError, DrillDownConfig, ResolutionMode};
pub use engine::{DrillDownEngine, DrillDownState};
pub use fault::Fault;
pub use hierarchy::{build_hierarchy, FlatRecord};
pub use history::{NavOp, NavigationLog, TimestampedOp};
pub use index::NodeIndex;
pub use node::{MetaValue, Node, PathEntry};
pub use persist::{PersistError, PersistedPath};
pub use store::{FileStore, MemoryStore, PathStore, StoreError};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default maximum navigation depth.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Separator used to join node names into a path key.
///
/// Names containing this character can collide with deeper paths; the
/// index records such collisions as ambiguous.
pub const PATH_KEY_SEPARATOR: char = '.';

/// Separator used by [`build_hierarchy`] to form node ids from path prefixes.
pub const ID_SEPARATOR: char = '/';

/// Join names into the key used by the path index.
pub fn path_key<S: AsRef<str>>(names: &[S]) -> String {
    let mut key = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            key.push(PATH_KEY_SEPARATOR);
        }
        key.push_str(name.as_ref());
    }
    key
}
