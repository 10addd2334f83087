//! Bootstrap deployment into the game directory
//!
//! Install copies the whole staging tree over the game directory. Uninstall
//! removes only the two marker files, which is enough to stop the bootstrap
//! loader from injecting; the rest of the copied tree is left in place.

use super::ModLayout;
use crate::error::{Error, Result};
use crate::mods::manifest::missing_marker;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Bootstrap loader configuration, generated on every install
pub const BOOTSTRAP_CONFIG: &str = "doorstop_config.ini";

/// Bootstrap loader stub library picked up by the game process
pub const BOOTSTRAP_LOADER: &str = "winhttp.dll";

/// Files whose joint presence in the game directory means "installed"
pub const MARKER_FILES: [&str; 2] = [BOOTSTRAP_CONFIG, BOOTSTRAP_LOADER];

/// Why an install cannot be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    /// No game executable is known yet
    NoGameFound,
    /// The manifest does not name the game executable
    ManifestIncomplete,
}

/// Install status derived from the game directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallationState {
    pub is_installed: bool,
    pub is_ready_to_install: bool,
    pub not_ready: Option<NotReadyReason>,
}

impl InstallationState {
    /// Inspect the game directory next to `game_exe_path`
    ///
    /// Reads the file system only; safe to call after every change.
    pub fn check(game_exe_path: Option<&Path>, game_exe_name: &str) -> Self {
        if game_exe_name == missing_marker("gameExe") {
            return Self {
                not_ready: Some(NotReadyReason::ManifestIncomplete),
                ..Self::default()
            };
        }

        let Some(exe) = game_exe_path else {
            return Self {
                not_ready: Some(NotReadyReason::NoGameFound),
                ..Self::default()
            };
        };

        let dir = game_dir(exe);
        let is_installed = MARKER_FILES.iter().all(|name| dir.join(name).is_file());

        Self {
            is_installed,
            is_ready_to_install: !is_installed,
            not_ready: None,
        }
    }
}

/// Counts reported after a successful install
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeploymentStats {
    pub files_copied: usize,
    pub dirs_created: usize,
}

/// Directory containing the game executable
pub fn game_dir(game_exe_path: &Path) -> PathBuf {
    match game_exe_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Render the bootstrap loader configuration for an absolute loader assembly path
pub fn render_bootstrap_config(loader_assembly: &Path) -> String {
    format!(
        "[UnityDoorstop]\n\
         enabled=true\n\
         targetAssembly={}\n\
         redirectOutputLog=false\n\
         ignoreDisableSwitch=false\n\
         dllSearchPathOverride=\n",
        loader_assembly.display()
    )
}

/// Install the bootstrap next to `game_exe_path`
pub async fn install(layout: &ModLayout, game_exe_path: &Path) -> Result<DeploymentStats> {
    let layout = layout.clone();
    let exe = game_exe_path.to_path_buf();

    tokio::task::spawn_blocking(move || install_blocking(&layout, &exe))
        .await
        .map_err(|e| Error::InstallFailed(format!("install task aborted: {}", e)))?
}

/// Remove the two marker files next to `game_exe_path`
pub async fn uninstall(game_exe_path: &Path) -> Result<()> {
    let dir = game_dir(game_exe_path);

    for name in MARKER_FILES {
        let target = dir.join(name);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => tracing::info!("Removed {}", target.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} already absent", target.display());
            }
            Err(e) => {
                return Err(Error::UninstallFailed(format!(
                    "{}: {}",
                    target.display(),
                    e
                )));
            }
        }
    }

    Ok(())
}

fn install_blocking(layout: &ModLayout, game_exe_path: &Path) -> Result<DeploymentStats> {
    let staging = layout.staging_dir();
    if !staging.is_dir() {
        return Err(Error::InstallFailed(format!(
            "staging folder not found: {}",
            staging.display()
        )));
    }

    let loader_assembly = std::path::absolute(layout.loader_assembly()).map_err(|e| {
        Error::InstallFailed(format!("cannot resolve loader assembly path: {}", e))
    })?;
    let config_path = staging.join(BOOTSTRAP_CONFIG);
    std::fs::write(&config_path, render_bootstrap_config(&loader_assembly))
        .map_err(|e| install_err(&config_path, e))?;
    tracing::debug!("Wrote {}", config_path.display());

    let dest = game_dir(game_exe_path);
    let stats = copy_tree(&staging, &dest)?;

    if let Some(name) = MARKER_FILES.iter().find(|name| !dest.join(name).is_file()) {
        return Err(Error::InstallFailed(format!(
            "staging folder has no {}: {}",
            name,
            staging.display()
        )));
    }

    tracing::info!(
        "Copied {} files ({} directories) into {}",
        stats.files_copied,
        stats.dirs_created,
        dest.display()
    );
    Ok(stats)
}

/// Copy every file under `source` into `dest`, overwriting existing files
fn copy_tree(source: &Path, dest: &Path) -> Result<DeploymentStats> {
    let mut stats = DeploymentStats::default();

    // Parents are yielded before their contents, so directories exist before files land.
    // Symlinked entries are copied as their targets.
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            Error::InstallFailed(format!("failed to read staging folder: {}", e))
        })?;
        let relative = entry.path().strip_prefix(source).map_err(|e| {
            Error::InstallFailed(format!("{}: {}", entry.path().display(), e))
        })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| install_err(&target, e))?;
            stats.dirs_created += 1;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| install_err(parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| install_err(&target, e))?;
            tracing::trace!("{} -> {}", entry.path().display(), target.display());
            stats.files_copied += 1;
        }
    }

    Ok(stats)
}

fn install_err(path: &Path, err: std::io::Error) -> Error {
    Error::InstallFailed(format!("{}: {}", path.display(), err))
}
