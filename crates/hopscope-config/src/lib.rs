use std::fs;
use std::path::{Path, PathBuf};

use hopscope_core::DEFAULT_EDGE_WEIGHT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HOPSCOPE_DIR_NAME: &str = ".hopscope";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_EDGES_DIR: &str = ".hopscope/units";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HopscopeConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Keep call direction when computing distances. The legacy model
    /// treats every call edge as undirected.
    #[serde(default)]
    pub directed: bool,
    #[serde(default = "default_edge_weight")]
    pub default_weight: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            directed: false,
            default_weight: default_edge_weight(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_edges_dir")]
    pub edges_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            edges_dir: default_edges_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub allow_raw_patterns: bool,
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            allow_raw_patterns: false,
            cache: default_cache(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub fn hopscope_dir(workspace_root: impl AsRef<Path>) -> PathBuf {
    workspace_root.as_ref().join(HOPSCOPE_DIR_NAME)
}

pub fn config_path(workspace_root: impl AsRef<Path>) -> PathBuf {
    hopscope_dir(workspace_root).join(CONFIG_FILE_NAME)
}

pub fn edges_dir(workspace_root: impl AsRef<Path>, config: &HopscopeConfig) -> PathBuf {
    let configured = Path::new(&config.store.edges_dir);
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        workspace_root.as_ref().join(configured)
    }
}

pub fn load_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<HopscopeConfig, ConfigError> {
    let path = config_path(workspace_root);
    if !path.exists() {
        return Ok(HopscopeConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: HopscopeConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

pub fn ensure_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<HopscopeConfig, ConfigError> {
    let workspace_root = workspace_root.as_ref();
    fs::create_dir_all(hopscope_dir(workspace_root))?;

    let path = config_path(workspace_root);
    if path.exists() {
        return load_workspace_config(workspace_root);
    }

    let config = HopscopeConfig::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}

pub fn validate_config(config: &HopscopeConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let weight = config.graph.default_weight;
    if !weight.is_finite() || weight < 0.0 {
        warnings.push(ConfigWarning {
            code: "graph.default_weight",
            message: format!(
                "default_weight {weight} is not a finite non-negative number; edges without a weight will be rejected"
            ),
        });
    } else if weight == 0.0 {
        warnings.push(ConfigWarning {
            code: "graph.default_weight",
            message: "default_weight is 0; unweighted calls collapse to zero distance".to_owned(),
        });
    }

    if config.graph.directed {
        warnings.push(ConfigWarning {
            code: "graph.directed",
            message: "directed distances are enabled; callee-to-caller pairs resolve as unreachable"
                .to_owned(),
        });
    }

    warnings
}

fn default_edge_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

fn default_edges_dir() -> String {
    DEFAULT_EDGES_DIR.to_owned()
}

fn default_cache() -> bool {
    true
}

fn normalize_config(mut config: HopscopeConfig) -> HopscopeConfig {
    let edges_dir = config.store.edges_dir.trim();
    if edges_dir.is_empty() {
        config.store.edges_dir = default_edges_dir();
    } else {
        config.store.edges_dir = edges_dir.to_owned();
    }

    config
}
