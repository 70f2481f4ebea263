//! Configuration management
//!
//! Settings live in a TOML file, by default at
//! `<config dir>/ythook/config.toml`. The `YTHOOK_CONFIG` environment
//! variable points somewhere else. Missing keys take their defaults, so a
//! partial file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::player::YOUTUBE_IFRAME_API_HREF;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "YTHOOK_CONFIG";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
}

/// Timing and loading parameters of the hook scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between playback position checks
    pub poll_interval_ms: u64,
    /// Readiness re-checks after the first one before giving up
    pub api_retries: u32,
    /// Delay between readiness checks
    pub api_retry_delay_ms: u64,
    /// Where the player framework script is loaded from
    pub api_href: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 900,
            api_retries: 2,
            api_retry_delay_ms: 200,
            api_href: YOUTUBE_IFRAME_API_HREF.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn api_retry_delay(&self) -> Duration {
        Duration::from_millis(self.api_retry_delay_ms)
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("scheduler.poll_interval_ms must be at least 1");
        }
        if self.api_href.trim().is_empty() {
            bail!("scheduler.api_href must not be empty");
        }
        Ok(())
    }
}

impl Config {
    /// Default config file path, honouring `YTHOOK_CONFIG`.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("ythook").join("config.toml"))
    }

    /// Load from the default path, falling back to defaults if the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.scheduler.validate()?;
        Ok(config)
    }

    /// Write to the default path, creating parent directories.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}
