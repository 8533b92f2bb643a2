//! Application configuration

use anyhow::Result;
use display_panel_core::{DEFAULT_UPDATE_INTERVAL, GROUP_FILE_EXTENSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version of the config format
    pub version: u32,
    /// Period of the display update cycle
    pub update_interval_ms: u64,
    /// Extension given to saved group files
    pub group_extension: String,
    /// Directory the group file dialogs start in
    pub last_group_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "display-panel", "display-panel")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record the directory the group dialogs should start in next time.
    /// Returns true if it changed and the settings need saving.
    pub fn remember_group_dir(&mut self, dir: Option<&Path>) -> bool {
        match dir {
            Some(dir) if self.last_group_dir.as_deref() != Some(dir) => {
                self.last_group_dir = Some(dir.to_path_buf());
                true
            }
            _ => false,
        }
    }

    /// Update period, never shorter than one millisecond
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL.as_millis() as u64,
            group_extension: GROUP_FILE_EXTENSION.to_string(),
            last_group_dir: None,
        }
    }
}
