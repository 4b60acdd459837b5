use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::power_monitor::{
    CollectorConfig, SamplingMode, DEFAULT_COMMAND_TIMEOUT, DEFAULT_SLOW_PATH_INTERVAL,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sampling mode used when none is given on the command line
    #[serde(default)]
    pub default_mode: SamplingMode,
    #[serde(default = "default_slow_path_interval_secs")]
    pub slow_path_interval_secs: u64,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_slow_path_interval_secs() -> u64 {
    DEFAULT_SLOW_PATH_INTERVAL.as_secs()
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: SamplingMode::default(),
            slow_path_interval_secs: default_slow_path_interval_secs(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // If the file is empty or corrupted, return default config
        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("voltmon").join("config.json"))
    }

    pub fn set_default_mode(&mut self, mode: SamplingMode) {
        self.default_mode = mode;
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            slow_path_interval: Duration::from_secs(self.slow_path_interval_secs),
        }
    }
}
