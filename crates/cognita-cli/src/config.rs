//! Configuration for the `cognita` CLI.
//!
//! Provides the [`CognitaConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `COGNITA_CONFIG` environment variable
//! 3. XDG default: `~/.config/cognita/config.toml`
//! 4. Built-in defaults

use cognita_core::traits::ConfigProvider;
use cognita_core::{Error, Result};
use cognita_graph::{Category, LayoutConfig, LayoutStrategy, PathOptions};
use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the dataset under `<base_path>/data` when none is configured.
pub const DEFAULT_DATASET_FILE: &str = "concepts.json";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CognitaConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Base path for all project data.
    pub base_path: Option<String>,

    /// Dataset location.
    pub data: DataConfig,

    /// Snapshot build settings.
    pub graph: GraphConfig,

    /// Layout constants.
    pub layout: LayoutConfig,

    /// Personalized path settings.
    pub path: PathOptions,
}

/// Dataset location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the JSON dataset file.
    pub path: Option<String>,
}

/// Snapshot build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Node cap for snapshots. Absent means no cap.
    pub max_nodes: Option<usize>,

    /// Default layout strategy.
    pub layout: LayoutStrategy,

    /// Seed for the force-directed layout.
    pub seed: u64,

    /// Default category filter.
    pub category: Option<Category>,

    /// Snapshot cache lifetime in seconds.
    pub cache_ttl_secs: u64,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for CognitaConfig {
    fn default() -> Self {
        Self {
            project_name: "cognita".to_string(),
            base_path: None,
            data: DataConfig::default(),
            graph: GraphConfig::default(),
            layout: LayoutConfig::default(),
            path: PathOptions::default(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_nodes: Some(cognita_graph::DEFAULT_MAX_NODES),
            layout: LayoutStrategy::default(),
            seed: 42,
            category: None,
            cache_ttl_secs: cognita_graph::DEFAULT_TTL.as_secs(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl CognitaConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `COGNITA_CONFIG` env var
    /// 3. XDG default: `~/.config/cognita/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            log::debug!("Loading config from {}", path.display());
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level("COGNITA");
        env_opts.add_section("data");
        env_opts.add_section("graph");
        env_opts.add_section("layout");
        env_opts.add_section("path");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("COGNITA_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cognita").join("config.toml"))
    }

    /// Point the configuration at another dataset file.
    pub fn with_dataset(mut self, path: impl Into<String>) -> Self {
        self.data.path = Some(path.into());
        self
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `COGNITA_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "COGNITA", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for CognitaConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(cognita_core::expand_tilde(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    fn dataset_path(&self) -> Result<PathBuf> {
        match &self.data.path {
            Some(p) => Ok(cognita_core::expand_tilde(p)),
            None => Ok(self.base_path()?.join("data").join(DEFAULT_DATASET_FILE)),
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
