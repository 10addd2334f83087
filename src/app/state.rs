//! Controller state published to the presentation layer

use crate::mods::InstallationState;
use std::path::PathBuf;

/// Controller lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Manifest and settings not read yet
    #[default]
    Loading,
    /// Manifest unusable; every action is disabled
    Fatal,
    /// Mod known, game executable not found yet
    ReadyNoGame,
    /// Game found, bootstrap not present
    ReadyToInstall,
    /// Game found, both marker files present
    Installed,
}

impl Phase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Loading => "Loading",
            Phase::Fatal => "Error",
            Phase::ReadyNoGame => "Game not found",
            Phase::ReadyToInstall => "Ready to install",
            Phase::Installed => "Installed",
        }
    }

    /// Whether the game path is known and the game can be started
    pub fn can_launch(&self) -> bool {
        matches!(self, Phase::ReadyToInstall | Phase::Installed)
    }
}

/// Immutable view of the controller, pushed to subscribers on every change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub window_title: String,
    pub phase: Phase,
    pub installation: InstallationState,
    pub game_exe_path: Option<PathBuf>,
    pub status: String,
}

impl Snapshot {
    pub fn loading(window_title: String) -> Self {
        Self {
            window_title,
            status: "Loading...".to_string(),
            ..Default::default()
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Set status message with success icon
    pub fn set_status_success(&mut self, msg: impl Into<String>) {
        self.set_status(format!("✓ {}", msg.into()));
    }

    /// Set status message with error icon
    pub fn set_status_error(&mut self, msg: impl Into<String>) {
        self.set_status(format!("✗ {}", msg.into()));
    }
}
