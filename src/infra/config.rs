// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub flow: FlowConfig,
}

/// `[backend]` section: where the design agent lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Primary API base URL.
    pub base_url: String,
    /// Optional mirror tried after a retriable primary failure.
    pub backup_url: Option<String>,
    /// Whether to fall back to `backup_url` at all. Off by default; the
    /// backup mirror is not always deployed.
    #[serde(default)]
    pub retry_backup: bool,
    /// Per-request timeout. Image generation can take 30-60s.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.decora.app".into(),
            backup_url: None,
            retry_backup: false,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// `[flow]` section: intake flow knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub min_budget: u32,
    pub max_budget: u32,
    pub default_budget: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_budget: 300,
            max_budget: 10_000,
            default_budget: 1_500,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
