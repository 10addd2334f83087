//! Per-user path management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Manages per-user application paths (XDG on Linux, AppData on Windows)
#[derive(Debug, Clone)]
pub struct Paths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories for this application
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "modstrap")
            .context("Failed to determine project directories (no home directory?)")?;
        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Root every path under a single directory (tests, portable installs)
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    // ========== Config Paths ==========

    /// Config directory: ~/.config/modstrap/
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Main config file: ~/.config/modstrap/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    // ========== Data Paths ==========

    /// Data directory: ~/.local/share/modstrap/
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Log file: ~/.local/share/modstrap/modstrap.log
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("modstrap.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooted_paths_stay_under_root() {
        let paths = Paths::with_root("/tmp/modstrap-test");
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/tmp/modstrap-test/config/config.toml")
        );
        assert!(paths.log_file().starts_with(paths.data_dir()));
    }
}
