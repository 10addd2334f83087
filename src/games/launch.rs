//! Process launching
//!
//! Launches are fire-and-forget: the child is spawned and never waited on.

use crate::error::{Error, Result};
use crate::mods::deploy::game_dir;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Platform capabilities used by the controller
#[cfg_attr(test, mockall::automock)]
pub trait Launcher: Send + Sync {
    /// Start `exe`, optionally through an elevation request
    fn launch(&self, exe: &Path, elevated: bool) -> Result<()>;

    /// Open a file or folder with the desktop's default handler
    fn open_path(&self, path: &Path) -> Result<()>;
}

/// Launcher backed by the host OS
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    elevation_command: String,
}

impl SystemLauncher {
    /// `elevation_command` is used on non-Windows hosts (e.g. `pkexec`)
    pub fn new(elevation_command: impl Into<String>) -> Self {
        Self {
            elevation_command: elevation_command.into(),
        }
    }

    fn elevated_command(&self, exe: &Path) -> Result<Command> {
        if cfg!(windows) {
            let script = format!(
                "Start-Process -FilePath '{}' -WorkingDirectory '{}' -Verb RunAs",
                ps_quote(exe),
                ps_quote(&game_dir(exe))
            );
            let mut command = Command::new("powershell");
            command.args(["-NoProfile", "-NonInteractive", "-Command", script.as_str()]);
            Ok(command)
        } else {
            let helper: PathBuf = which::which(self.elevation_command.trim()).map_err(|e| {
                Error::LaunchFailed {
                    path: exe.to_path_buf(),
                    reason: format!("elevation helper '{}' not found: {}", self.elevation_command, e),
                }
            })?;
            let mut command = Command::new(helper);
            command.arg(exe);
            Ok(command)
        }
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, exe: &Path, elevated: bool) -> Result<()> {
        let mut command = if elevated {
            self.elevated_command(exe)?
        } else {
            Command::new(exe)
        };
        command.current_dir(game_dir(exe));

        let child = command.spawn().map_err(|e| Error::LaunchFailed {
            path: exe.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            "Launched {} (pid {}, elevated: {})",
            exe.display(),
            child.id(),
            elevated
        );
        Ok(())
    }

    fn open_path(&self, path: &Path) -> Result<()> {
        open::that_detached(path).map_err(|e| Error::LaunchFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Quote for a single-quoted PowerShell string
fn ps_quote(path: &Path) -> String {
    path.display().to_string().replace('\'', "''")
}
