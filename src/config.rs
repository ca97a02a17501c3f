//! Engine configuration.
//!
//! Built in code, parsed from YAML, or read from `DRILLDOWN_*` environment
//! variables. Every field has a default.

use crate::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_MAX_DEPTH: &str = "DRILLDOWN_MAX_DEPTH";
pub const ENV_BREADCRUMBS: &str = "DRILLDOWN_BREADCRUMBS";
pub const ENV_PERSISTENCE_KEY: &str = "DRILLDOWN_PERSISTENCE_KEY";
pub const ENV_RESOLUTION: &str = "DRILLDOWN_RESOLUTION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value {value:?} for {field}")]
    InvalidValue { field: String, value: String },

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

/// How `drill_up` and `drill_to_level` find the data for the new position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// Re-walk the remaining path's names through the path-key index.
    /// Duplicate sibling names can land on the wrong node.
    #[default]
    ByName,

    /// Resolve through the id of the last remaining path entry.
    Strict,
}

impl FromStr for ResolutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by-name" | "by_name" | "name" => Ok(ResolutionMode::ByName),
            "strict" => Ok(ResolutionMode::Strict),
            other => Err(ConfigError::InvalidValue {
                field: "resolution".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Options for one [`DrillDownEngine`](crate::DrillDownEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillDownConfig {
    /// Maximum path length.
    pub max_depth: usize,

    /// Track breadcrumbs alongside the path.
    pub breadcrumbs: bool,

    /// Key under which the path is saved. `None` disables persistence.
    pub persistence_key: Option<String>,

    pub resolution: ResolutionMode,
}

impl Default for DrillDownConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            breadcrumbs: true,
            persistence_key: None,
            resolution: ResolutionMode::ByName,
        }
    }
}

impl DrillDownConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_breadcrumbs(mut self, enabled: bool) -> Self {
        self.breadcrumbs = enabled;
        self
    }

    pub fn with_persistence_key(mut self, key: impl Into<String>) -> Self {
        self.persistence_key = Some(key.into());
        self
    }

    pub fn with_resolution(mut self, resolution: ResolutionMode) -> Self {
        self.resolution = resolution;
        self
    }

    /// Parse YAML; missing fields take defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Defaults overridden by any `DRILLDOWN_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            config.max_depth = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_MAX_DEPTH.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_BREADCRUMBS) {
            config.breadcrumbs = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                field: ENV_BREADCRUMBS.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_PERSISTENCE_KEY) {
            let key = raw.trim();
            config.persistence_key = (!key.is_empty()).then(|| key.to_string());
        }
        if let Some(raw) = lookup(ENV_RESOLUTION) {
            config.resolution = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
