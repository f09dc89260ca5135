//! Runtime configuration.
//!
//! Values come from three layers, highest priority first:
//!
//! 1. command-line flags and their environment variables
//! 2. an optional YAML file passed with `--config`
//! 3. built-in defaults
//!
//! ```yaml
//! store_path: /var/lib/article_harvester/articles.json
//! timeout_secs: 10
//! user_agent: "Mozilla/5.0 ..."
//! ```

use crate::error::ConfigError;
use crate::scrapers::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_STORE_PATH: &str = "articles.json";

/// Contents of the YAML config file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub store_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub store_path: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
}

impl HarvestConfig {
    /// Merge the CLI/env store path over an optional config file.
    pub fn resolve(store_override: Option<PathBuf>, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let config = Self::merge(store_override, file);
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    fn merge(store_override: Option<PathBuf>, file: FileConfig) -> Self {
        Self {
            store_path: store_override
                .or(file.store_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            user_agent: file
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}
