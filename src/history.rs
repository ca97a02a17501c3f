//! Navigation log for deterministic replay.
//!
//! NavigationLog records navigation ops with a tick, enabling:
//! - Reconstructing a drill-down position from a session
//! - Audit trail of how a user explored a report
//! - Reproducible navigation flows in tests

use crate::config::DrillDownConfig;
use crate::engine::DrillDownEngine;
use crate::node::Node;
use crate::path_key;
use serde::{Deserialize, Serialize};

/// One navigation operation, as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum NavOp {
    DrillDown { id: String },
    DrillUp,
    DrillToLevel { level: usize },
    Reset,
    GoToPath { names: Vec<String> },
}

impl NavOp {
    /// Short command form, e.g. `drill-down a1` or `go-to A.A1`.
    pub fn to_command(&self) -> String {
        match self {
            NavOp::DrillDown { id } => format!("drill-down {}", id),
            NavOp::DrillUp => "drill-up".to_string(),
            NavOp::DrillToLevel { level } => format!("drill-to-level {}", level),
            NavOp::Reset => "reset".to_string(),
            NavOp::GoToPath { names } => format!("go-to {}", path_key(names.as_slice())),
        }
    }
}

/// An op with the tick it was issued at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedOp {
    pub tick: u64,
    pub op: NavOp,
}

/// Log of navigation ops for replay.
///
/// # Determinism
///
/// Given the same dataset, config and log, replay always produces the same
/// final state. Replayed engines never persist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationLog {
    /// Session identifier.
    pub session_id: u64,

    /// Identifies the dataset the ops were recorded against.
    pub dataset_key: String,

    pub events: Vec<TimestampedOp>,
}

impl NavigationLog {
    pub fn new(session_id: u64, dataset_key: impl Into<String>) -> Self {
        Self {
            session_id,
            dataset_key: dataset_key.into(),
            events: Vec::new(),
        }
    }

    /// Record an op unconditionally.
    pub fn record(&mut self, tick: u64, op: NavOp) {
        self.events.push(TimestampedOp { tick, op });
    }

    /// Apply `op` to `engine` and record it only if it changed state.
    pub fn record_outcome(&mut self, engine: &mut DrillDownEngine, tick: u64, op: NavOp) -> bool {
        let applied = engine.execute(&op);
        if applied {
            self.record(tick, op);
        }
        applied
    }

    /// Replay all events onto a fresh engine.
    pub fn replay(&self, data: Vec<Node>, config: &DrillDownConfig) -> DrillDownEngine {
        self.replay_to(data, config, u64::MAX)
    }

    /// Replay events with a tick at or before `target_tick`.
    ///
    /// Ticks need not be sorted; qualifying events run in log order.
    pub fn replay_to(
        &self,
        data: Vec<Node>,
        config: &DrillDownConfig,
        target_tick: u64,
    ) -> DrillDownEngine {
        let mut config = config.clone();
        config.persistence_key = None;
        let mut engine = DrillDownEngine::new(data, config);

        for event in self.events.iter().filter(|e| e.tick <= target_tick) {
            // Rejected ops are no-ops, same as when recorded
            let _ = engine.execute(&event.op);
        }
        engine
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn to_commands(&self) -> Vec<String> {
        self.events.iter().map(|e| e.op.to_command()).collect()
    }
}
