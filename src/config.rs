use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http::HttpSettings;
use crate::paths::config_file_path;

pub const DEFAULT_CATALOG_URL: &str = "https://podcast-api.netlify.app";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Total attempts per request, including the first one.
    #[serde(default = "default_attempts")]
    pub attempts: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_mpv_bin")]
    pub mpv_bin: PathBuf,
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Overrides `<data_dir>/podshelf/podshelf.db`.
    #[serde(default)]
    pub database: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mpv_bin: default_mpv_bin(),
            seek_step_secs: default_seek_step_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            attempts: self.attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    15
}

fn default_attempts() -> usize {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_mpv_bin() -> PathBuf {
    PathBuf::from("mpv")
}

fn default_seek_step_secs() -> f64 {
    15.0
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_file_path()?)?;
        if let Some(bin) = env::var_os("PODSHELF_MPV_BIN")
            && !bin.is_empty()
        {
            config.player.mpv_bin = PathBuf::from(bin);
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        Ok(config)
    }
}
