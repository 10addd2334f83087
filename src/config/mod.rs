//! Configuration management for Modstrap
//!
//! Uses per-user platform paths:
//! - Config: ~/.config/modstrap/config.toml
//! - Data: ~/.local/share/modstrap/ (per-mod settings, log file)

mod paths;

pub use paths::Paths;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mod folder shipped next to the installer (manifest, staging tree, BepInEx)
    pub mod_dir: String,

    /// Command used to request elevation on non-Windows hosts
    pub elevation_command: String,

    /// Additional Steam library roots to scan during game detection
    pub steam_libraries: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mod_dir: "Mod".to_string(),
            elevation_command: "pkexec".to_string(),
            steam_libraries: Vec::new(),
        }
    }
}

impl Config {
    /// Resolve the mod folder, relative paths against the working directory
    pub fn mod_dir(&self) -> PathBuf {
        PathBuf::from(self.mod_dir.trim())
    }

    /// Load configuration from disk or create default
    pub async fn load(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .await
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            let config = Config::default();
            config.save(paths).await?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub async fn save(&self, paths: &Paths) -> Result<()> {
        let config_path = paths.config_file();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_load_writes_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_root(tmp.path());

        let config = Config::load(&paths).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(paths.config_file().exists());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults_for_missing_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_root(tmp.path());
        std::fs::create_dir_all(paths.config_dir()).unwrap();
        std::fs::write(paths.config_file(), "mod_dir = \"/opt/mod\"\n").unwrap();

        let config = Config::load(&paths).await.unwrap();
        assert_eq!(config.mod_dir(), PathBuf::from("/opt/mod"));
        assert_eq!(config.elevation_command, "pkexec");
    }
}
