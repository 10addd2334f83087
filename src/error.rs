//! Error taxonomy for the installer library

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by manifest, settings, install and launch operations.
///
/// Only `ManifestMissing` and `ManifestInvalid` are fatal to startup. Every
/// other variant is caught by [`crate::App`] and turned into status text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("mod manifest not found at {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("failed to read mod manifest {}: {source}", path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mod manifest {}: {source}", path.display())]
    ManifestInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("settings file {} is corrupt: {source}", path.display())]
    SettingsCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access settings file {}: {source}", path.display())]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("none of the dropped files is {expected}")]
    WrongFileDropped { expected: String },

    #[error("install failed: {0}")]
    InstallFailed(String),

    #[error("uninstall failed: {0}")]
    UninstallFailed(String),

    #[error("failed to launch {}: {reason}", path.display())]
    LaunchFailed { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
