//! Mod folder: manifest, persisted settings and bootstrap deployment

pub mod deploy;
pub mod manifest;
pub mod settings;

pub use deploy::{DeploymentStats, InstallationState, NotReadyReason};
pub use manifest::{Manifest, ProviderSpec};
pub use settings::SettingsStore;

use std::path::{Path, PathBuf};

/// Layout of the mod folder shipped next to the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModLayout {
    root: PathBuf,
}

impl ModLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mod folder root (default ./Mod)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifest document: Mod/manifest.json
    pub fn manifest_file(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    /// Staging tree copied verbatim into the game directory: Mod/CopyToGame/
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("CopyToGame")
    }

    /// Loader core assembly the bootstrap config points at
    pub fn loader_assembly(&self) -> PathBuf {
        self.root
            .join("BepInEx")
            .join("core")
            .join("BepInEx.Preloader.dll")
    }

    /// Loader debug log: Mod/BepInEx/LogOutput.log
    pub fn debug_log(&self) -> PathBuf {
        self.root.join("BepInEx").join("LogOutput.log")
    }
}
