use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::Level;

/// Logging parameters (optional `[log]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level name: "error", "warn"/"warning", "info", "debug" or "trace".
    /// Unknown names fall back to "info".
    pub level: String,
    /// Log file path; `None` logs to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Parse the configured level name leniently.
    pub fn level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "fatal" | "error" => Level::ERROR,
            "warn" | "warning" => Level::WARN,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        }
    }
}

/// Global configuration loaded from `~/.config/kvsum/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvsumConfig {
    /// Number of checksum worker threads per verification run.
    pub workers: usize,
    /// Upper bound on pairs per batch handed to a worker.
    pub max_batch_pairs: usize,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for KvsumConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            max_batch_pairs: 4096,
            log: LogConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kvsum")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KvsumConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KvsumConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: KvsumConfig = toml::from_str(&data)?;
    Ok(cfg)
}
