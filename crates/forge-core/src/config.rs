use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::format::VolumeUnit;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STATS_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment override for the backend address
pub const API_URL_ENV: &str = "FORGE_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub stats_interval_ms: u64,
    pub volume_unit: VolumeUnit,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            stats_interval_ms: DEFAULT_STATS_INTERVAL_MS,
            volume_unit: VolumeUnit::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load from the user config dir. On first run the defaults are written
    /// there so they can be edited. `FORGE_API_URL` wins over the file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_or_init(&Self::get_config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Like [`Config::load_from`], but a missing file is created with the
    /// defaults. Failing to write it is not fatal.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::new();
        match config.save_to(path) {
            Ok(()) => tracing::info!(path = %path.display(), "wrote default config"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not write default config"),
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn stats_interval(&self) -> Duration {
        // A zero interval would spin the poller
        Duration::from_millis(self.stats_interval_ms.max(1_000))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Base URL without a trailing slash, ready for `format!("{}/stats", ..)`
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("forge").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge").join("config.json");

        let mut config = Config::new();
        config.api_base_url = "https://api.forge.example/".to_string();
        config.volume_unit = VolumeUnit::Usd;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.volume_unit, VolumeUnit::Usd);
        assert_eq!(loaded.base_url(), "https://api.forge.example");
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge").join("config.json");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::new());
        assert!(path.exists());

        // Edits to the written file are picked up next time
        fs::write(&path, r#"{"volume_unit": "usd"}"#).unwrap();
        let reloaded = Config::load_or_init(&path).unwrap();
        assert_eq!(reloaded.volume_unit, VolumeUnit::Usd);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"stats_interval_ms": 5000}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.stats_interval(), Duration::from_millis(5000));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_interval_has_floor() {
        let mut config = Config::new();
        config.stats_interval_ms = 0;
        assert_eq!(config.stats_interval(), Duration::from_secs(1));
    }
}
