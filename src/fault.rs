//! Fault types for navigation errors.
//!
//! Faults are recoverable: a faulted operation leaves the engine state
//! untouched. The `bool` navigation methods collapse them to `false`; the
//! `try_*` methods return them.

use thiserror::Error;

/// Navigation fault - why an operation did not change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Referenced node id is not in the dataset.
    #[error("Node {0} not found")]
    UnknownNode(String),

    /// Node has no children to drill into.
    #[error("Node {0} is a leaf")]
    LeafNode(String),

    /// Path is already at the maximum depth.
    #[error("Max depth {max} reached")]
    MaxDepthReached { max: usize },

    /// Drill-up requested with an empty path.
    #[error("Already at root")]
    AtRoot,

    /// Requested level is beyond the current depth or the maximum depth.
    #[error("Level {level} out of range (depth {depth}, max {max})")]
    LevelOutOfRange {
        level: usize,
        depth: usize,
        max: usize,
    },

    /// Name path is longer than the maximum depth.
    #[error("Path of length {len} exceeds max depth {max}")]
    PathTooDeep { len: usize, max: usize },

    /// No node with this name at the given step of a name path.
    #[error("No node named {name:?} at level {level}")]
    SegmentNotFound { name: String, level: usize },

    /// Intermediate node of a name path has no children.
    #[error("Node named {name:?} at level {level} has no children")]
    SegmentIsLeaf { name: String, level: usize },
}

impl Fault {
    /// Check if the fault comes from the request's position relative to the
    /// depth bounds rather than from the request's target.
    pub fn is_depth_fault(&self) -> bool {
        matches!(
            self,
            Fault::MaxDepthReached { .. }
                | Fault::AtRoot
                | Fault::LevelOutOfRange { .. }
                | Fault::PathTooDeep { .. }
        )
    }

    /// Check if the fault names a target that does not exist.
    pub fn is_missing_target(&self) -> bool {
        matches!(self, Fault::UnknownNode(_) | Fault::SegmentNotFound { .. })
    }
}
