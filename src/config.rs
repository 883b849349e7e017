//! Engine configuration
//!
//! Loads tuning knobs from YAML. Every field has a default, so an empty file
//! (or no file at all) yields the standard engine behavior.
//!
//! ```yaml
//! default_visualizer: overview
//! merge_read_write_edges: true
//! suppress_redundant_routes: true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EcGraphError;

/// Environment variable naming a YAML config file
pub const CONFIG_ENV_VAR: &str = "EC_GRAPH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// View selected when the caller does not name one
    pub default_visualizer: Option<String>,
    /// Collapse a writes-to + reads-from pair into one reads-writes edge
    pub merge_read_write_edges: bool,
    /// Skip message→channel shortcuts already covered by a routing chain
    pub suppress_redundant_routes: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_visualizer: None,
            merge_read_write_edges: true,
            suppress_redundant_routes: true,
        }
    }
}

impl GraphConfig {
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, EcGraphError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate(Path::new("<inline>"))?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading graph configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate(path)?;

        Ok(config)
    }

    /// Load from the file named by `EC_GRAPH_CONFIG`, else defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self, path: &Path) -> std::result::Result<(), EcGraphError> {
        if let Some(name) = &self.default_visualizer {
            if name.trim().is_empty() {
                return Err(EcGraphError::Config {
                    path: path.to_path_buf(),
                    message: "default_visualizer must not be blank".to_string(),
                });
            }
        }
        Ok(())
    }
}
