use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_HEADER: &str = r#"# QST Configuration File
# Schema: https://json-schema.org/draft-07/schema#
# Generate it with: qst config schema > qst-config-schema.json

"#;

/// Configuration for the qst application
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct PathsConfig {
    /// Directory holding the durable store (defaults to ~/.local/share/qst)
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncSettings {
    /// Run the periodic sync at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the remote post service
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Sync interval in seconds
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// How many recent remote records one pull fetches
    #[serde(default = "default_pull_limit")]
    pub pull_limit: u32,

    /// How long a sync status stays visible
    #[serde(default = "default_status_seconds")]
    pub status_seconds: u64,

    /// Category given to quotes pulled from the remote
    #[serde(default = "default_remote_category")]
    pub remote_category: String,

    /// Per-request timeout; unset means requests may hang
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_server_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

fn default_interval_seconds() -> u64 {
    15
}

fn default_pull_limit() -> u32 {
    5
}

fn default_status_seconds() -> u64 {
    3
}

fn default_remote_category() -> String {
    "Server".to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            server_url: default_server_url(),
            interval_seconds: default_interval_seconds(),
            pull_limit: default_pull_limit(),
            status_seconds: default_status_seconds(),
            remote_category: default_remote_category(),
            request_timeout_seconds: None,
        }
    }
}

impl SyncSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }

    pub fn status_duration(&self) -> Duration {
        Duration::from_secs(self.status_seconds)
    }
}

impl Config {
    /// Default config file location, honouring `QST_CONFIG`
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(custom_path) = std::env::var("QST_CONFIG") {
            return Ok(PathBuf::from(custom_path));
        }
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home_dir.join(".config").join("qst").join("config.toml"))
    }

    /// Load configuration from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, format!("{CONFIG_HEADER}{toml_str}"))
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get the data directory, using default if not configured
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.paths.data_dir {
            return Ok(expand_tilde(dir));
        }
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home_dir.join(".local").join("share").join("qst"))
    }

    /// Generate JSON schema for the configuration
    pub fn generate_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        let json_schema =
            serde_json::to_string_pretty(&schema).context("Failed to serialize schema to JSON")?;
        Ok(json_schema)
    }
}

/// Only a leading `~` is expanded; other paths are used as given
fn expand_tilde(dir: &Path) -> PathBuf {
    let dir_str = dir.to_string_lossy();
    if let Some(rest) = dir_str.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    dir.to_path_buf()
}
