use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use treasury_types::ExecutionPolicy;

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_PATH_ENV: &str = "TREASURY_CONFIG_PATH";
pub const DEFAULT_CONFIG_FILE: &str = "treasury.toml";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TreasuryConfig {
    /// Human readable label for the committee
    #[serde(default = "default_name")]
    pub name: String,
    /// Owner addresses as hex strings; validated by the registry, not here
    pub owners: Vec<String>,
    pub threshold: usize,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub policy: ExecutionPolicy,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StorageConfig {
    /// Directory of the sled database holding ledger and vault state
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_name() -> String {
    "treasury".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("treasury_data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl TreasuryConfig {
    /// Storage path resolved against the directory holding the config file.
    pub fn storage_path_relative_to(&self, config_path: &Path) -> PathBuf {
        if self.storage.path.is_absolute() {
            return self.storage.path.clone();
        }
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(&self.storage.path),
            _ => self.storage.path.clone(),
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize treasury config: {}", e))
    }
}

/// Picks the config path: explicit flag, then `$TREASURY_CONFIG_PATH`, then `treasury.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn parse_treasury_config(content: &str) -> anyhow::Result<TreasuryConfig> {
    toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))
}

pub fn load_treasury_config(path: &Path) -> anyhow::Result<TreasuryConfig> {
    let config_content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file from {}: {}", path.display(), e))?;
    toml::from_str(&config_content).map_err(|e| {
        anyhow::anyhow!("Failed to parse TOML config from {}: {}", path.display(), e)
    })
}
