//! Serialized navigation path.
//!
//! Stored as JSON: `{"currentPath": [...], "breadcrumbs": [...], "timestamp": ms}`.

use crate::node::PathEntry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to encode path: {0}")]
    Encode(String),

    #[error("Failed to decode path: {0}")]
    Decode(String),
}

/// Saved navigation position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPath {
    pub current_path: Vec<PathEntry>,
    #[serde(default)]
    pub breadcrumbs: Vec<PathEntry>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl PersistedPath {
    /// Capture a path, stamped with the current time.
    pub fn now(current_path: Vec<PathEntry>, breadcrumbs: Vec<PathEntry>) -> Self {
        Self {
            current_path,
            breadcrumbs,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn encode(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(|e| PersistError::Encode(e.to_string()))
    }

    pub fn decode(text: &str) -> Result<Self, PersistError> {
        serde_json::from_str(text).map_err(|e| PersistError::Decode(e.to_string()))
    }

    /// Saved time as a UTC datetime, if in range.
    pub fn saved_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}
