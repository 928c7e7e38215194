//! Explorer configuration
//!
//! Settings come from defaults, an optional YAML file, and the `MAX_NODES`
//! environment variable, in increasing precedence.

use crate::graph::LoadConfig;
use crate::query::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Environment variable overriding `max_nodes`
pub const MAX_NODES_ENV: &str = "MAX_NODES";

/// Default node limit for one load
pub const DEFAULT_MAX_NODES: usize = 500;

/// Pattern search budget per loaded node when none is configured
const PATTERN_BUDGET_FACTOR: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for {name}: expected a non-negative integer")]
    InvalidEnv { name: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Explorer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Maximum number of nodes kept from one fetch
    pub max_nodes: usize,
    /// Default case sensitivity of text search
    pub case_sensitive: bool,
    /// Edges a pattern search may examine (defaults to 10 per loaded node)
    pub pattern_budget: Option<usize>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            case_sensitive: false,
            pattern_budget: None,
        }
    }
}

impl ExplorerConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file, then apply the environment override
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&text)?;
        config.apply_env()?;
        info!("Loaded config from {}: max_nodes={}", path.display(), config.max_nodes);
        Ok(config)
    }

    /// Apply `MAX_NODES` from the process environment
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(MAX_NODES_ENV) {
            self.max_nodes = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: MAX_NODES_ENV,
                value,
            })?;
        }
        Ok(())
    }

    pub fn pattern_budget(&self) -> usize {
        self.pattern_budget
            .unwrap_or_else(|| self.max_nodes.saturating_mul(PATTERN_BUDGET_FACTOR))
    }

    pub fn load_config(&self) -> LoadConfig {
        LoadConfig::new(self.max_nodes)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            case_sensitive: self.case_sensitive,
            pattern_budget: self.pattern_budget(),
        }
    }
}
