//! Application state and orchestration

mod actions;
pub mod state;

pub use state::{Phase, Snapshot};

use crate::error::{Error, Result};
use crate::games::{self, GameDetector, Launcher, ProviderKind};
use crate::mods::{self, InstallationState, Manifest, ModLayout, NotReadyReason, SettingsStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// Controller: reacts to drops and user actions, publishes [`Snapshot`]s
pub struct App {
    layout: ModLayout,
    settings: Arc<SettingsStore>,
    detector: GameDetector,
    launcher: Arc<dyn Launcher>,
    manifest: Option<Manifest>,
    game_exe_path: Option<PathBuf>,
    state: watch::Sender<Snapshot>,
}

impl App {
    /// Create a controller in the `Loading` phase; call [`App::load`] next
    pub fn new(
        layout: ModLayout,
        settings: Arc<SettingsStore>,
        detector: GameDetector,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        let title = format!("Modstrap v{}", crate::APP_VERSION);
        let (state, _) = watch::channel(Snapshot::loading(title));
        Self {
            layout,
            settings,
            detector,
            launcher,
            manifest: None,
            game_exe_path: None,
            state,
        }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Current state
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn layout(&self) -> &ModLayout {
        &self.layout
    }

    /// Startup: manifest, remembered path, automatic detection, state check
    pub async fn load(&mut self) {
        let manifest_path = self.layout.manifest_file();
        let manifest = match Manifest::load(&manifest_path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!("{}", e);
                self.publish(|s| {
                    s.phase = Phase::Fatal;
                    s.set_status_error(format!(
                        "Failed to read mod manifest. This might mean the files are corrupted, \
                         try re-downloading and re-installing.\n\n{}",
                        e
                    ));
                });
                return;
            }
        };

        let title = format!("{} Installer v{}", manifest.mod_title, crate::APP_VERSION);
        let usable = manifest.is_usable();
        let missing = manifest.missing_fields().join(", ");
        self.publish(|s| s.window_title = title);

        if !usable {
            self.manifest = Some(manifest);
            self.publish(|s| {
                s.phase = Phase::Fatal;
                s.set_status_error(format!(
                    "The mod manifest is missing required fields ({}). \
                     Try re-downloading and re-installing the mod.",
                    missing
                ));
            });
            return;
        }

        let remembered = self.remembered_game_path(&manifest).await;
        self.manifest = Some(manifest);
        self.game_exe_path = remembered;

        if self.game_exe_path.is_none() {
            if let Err(e) = self.detect_game().await {
                tracing::warn!("Automatic detection could not be saved: {}", e);
            }
        }

        self.refresh();
    }

    async fn remembered_game_path(&self, manifest: &Manifest) -> Option<PathBuf> {
        match self.settings.load(&manifest.mod_id).await {
            Ok(Some(path)) if path.is_file() => Some(path),
            Ok(Some(path)) => {
                tracing::warn!("Remembered game path no longer exists: {}", path.display());
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings: {}", e);
                None
            }
        }
    }

    /// Run automatic providers; persist and adopt the first hit
    pub async fn detect_game(&mut self) -> Result<Option<PathBuf>> {
        let Some(manifest) = self.usable_manifest() else {
            return Ok(None);
        };

        let detector = self.detector.clone();
        let for_detect = manifest.clone();
        let found = tokio::task::spawn_blocking(move || detector.detect(&for_detect))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Game detection task failed: {}", e);
                None
            });

        if let Some(path) = &found {
            self.settings.save(&manifest.mod_id, path).await?;
            self.game_exe_path = Some(path.clone());
            self.refresh();
        }
        Ok(found)
    }

    /// Accept the first dropped file whose name is the game executable
    pub async fn drop_files(&mut self, files: &[PathBuf]) -> Result<PathBuf> {
        let Some(manifest) = self.usable_manifest() else {
            return Err(Error::WrongFileDropped {
                expected: "a valid mod manifest".to_string(),
            });
        };

        let Some(exe) = files
            .iter()
            .find(|f| games::is_game_exe(f, &manifest.game_exe) && f.is_file())
            .cloned()
        else {
            tracing::info!("Rejected drop of {} file(s)", files.len());
            self.publish(|s| {
                s.set_status_error(format!(
                    "None of the dropped files is {}. Drag {} from the {} install folder.",
                    manifest.game_exe, manifest.game_exe, manifest.game_title
                ));
            });
            return Err(Error::WrongFileDropped {
                expected: manifest.game_exe,
            });
        };

        if let Err(e) = self.settings.save(&manifest.mod_id, &exe).await {
            self.publish(|s| s.set_status_error(format!("Failed to remember the game path: {}", e)));
            return Err(e);
        }

        tracing::info!("Game executable set to {}", exe.display());
        self.game_exe_path = Some(exe.clone());
        self.refresh();
        Ok(exe)
    }

    /// Copy the staging tree into the game directory
    pub async fn install(&mut self) -> Result<()> {
        let Some(exe) = self.game_for(Phase::ReadyToInstall, "install") else {
            return Ok(());
        };

        self.publish(|s| s.set_status("Installing..."));
        match mods::deploy::install(&self.layout, &exe).await {
            Ok(stats) => {
                self.refresh();
                let title = self.mod_title();
                self.publish(|s| {
                    s.set_status_success(format!(
                        "Installed {} ({} files copied). Launch the game to play.",
                        title, stats.files_copied
                    ))
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.refresh();
                self.publish(|s| s.set_status_error(format!("{}. You can try again.", e)));
                Err(e)
            }
        }
    }

    /// Remove the marker files from the game directory
    pub async fn uninstall(&mut self) -> Result<()> {
        let Some(exe) = self.game_for(Phase::Installed, "uninstall") else {
            return Ok(());
        };

        match mods::deploy::uninstall(&exe).await {
            Ok(()) => {
                self.refresh();
                let title = self.mod_title();
                self.publish(|s| s.set_status_success(format!("Uninstalled {}.", title)));
                Ok(())
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.refresh();
                self.publish(|s| s.set_status_error(format!("{}. You can try again.", e)));
                Err(e)
            }
        }
    }

    /// Start the game, elevated when the manifest asks for it
    pub fn launch(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        if snapshot.phase == Phase::Fatal {
            return Ok(());
        }
        let (Some(manifest), Some(exe)) = (self.manifest.as_ref(), self.game_exe_path.clone())
        else {
            self.publish(|s| s.set_status_error("The game has not been found yet."));
            return Ok(());
        };
        if !snapshot.phase.can_launch() {
            self.publish(|s| s.set_status_error("The game has not been found yet."));
            return Ok(());
        }

        let game_title = manifest.game_title.clone();
        match self.launcher.launch(&exe, manifest.require_admin) {
            Ok(()) => {
                self.publish(|s| s.set_status(format!("Starting {}...", game_title)));
                Ok(())
            }
            Err(e) => {
                self.publish(|s| s.set_status_error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Open the shipped mod folder
    pub fn open_mod_folder(&mut self) -> Result<()> {
        let root = self.layout.root().to_path_buf();
        self.open_existing(&root, root.is_dir(), "Mod folder not found")
    }

    /// Open the loader's debug log
    pub fn show_debug_logs(&mut self) -> Result<()> {
        let log = self.layout.debug_log();
        let exists = log.is_file();
        self.open_existing(
            &log,
            exists,
            "No debug log yet. Start the game with the mod installed first",
        )
    }

    fn open_existing(&mut self, path: &Path, exists: bool, absent: &str) -> Result<()> {
        if !exists {
            let msg = format!("{}: {}", absent, path.display());
            self.publish(|s| s.set_status_error(msg));
            return Ok(());
        }
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.launcher.open_path(&absolute).inspect_err(|e| {
            tracing::warn!("{}", e);
        })
    }

    /// Recompute installation state and the derived status text
    fn refresh(&mut self) {
        let Some(manifest) = self.manifest.as_ref() else {
            return;
        };

        let installation = InstallationState::check(self.game_exe_path.as_deref(), &manifest.game_exe);
        let phase = if installation.is_installed {
            Phase::Installed
        } else if installation.is_ready_to_install {
            Phase::ReadyToInstall
        } else if installation.not_ready == Some(NotReadyReason::ManifestIncomplete) {
            Phase::Fatal
        } else {
            Phase::ReadyNoGame
        };

        let status = match phase {
            Phase::Installed => format!(
                "{} is installed. Launch {} to play, or uninstall to restore the game.",
                manifest.mod_title, manifest.game_title
            ),
            Phase::ReadyToInstall => format!(
                "Ready to install {} into {}.",
                manifest.mod_title,
                self.game_exe_path
                    .as_deref()
                    .map(mods::deploy::game_dir)
                    .unwrap_or_default()
                    .display()
            ),
            Phase::Fatal => format!(
                "The mod manifest does not name the game executable. \
                 Try re-downloading and re-installing {}.",
                manifest.mod_title
            ),
            _ => no_game_status(manifest),
        };

        tracing::debug!("State: {:?} {:?}", phase, installation);
        let game_exe_path = self.game_exe_path.clone();
        self.publish(|s| {
            s.phase = phase;
            s.installation = installation;
            s.game_exe_path = game_exe_path;
            s.set_status(status);
        });
    }

    /// Game path when the controller is in `expected` phase; status otherwise.
    /// A fatal state keeps its terminal status.
    fn game_for(&mut self, expected: Phase, action: &str) -> Option<PathBuf> {
        let phase = self.state.borrow().phase;
        if phase == expected {
            return self.game_exe_path.clone();
        }
        if phase == Phase::Fatal {
            return None;
        }
        let msg = format!("Cannot {} right now ({}).", action, phase.display_name());
        self.publish(|s| s.set_status_error(msg));
        None
    }

    fn usable_manifest(&self) -> Option<Manifest> {
        self.manifest.as_ref().filter(|m| m.is_usable()).cloned()
    }

    fn mod_title(&self) -> String {
        self.manifest
            .as_ref()
            .map(|m| m.mod_title.clone())
            .unwrap_or_else(|| "the mod".to_string())
    }

    fn publish(&self, update: impl FnOnce(&mut Snapshot)) {
        self.state.send_modify(update);
    }
}

fn no_game_status(manifest: &Manifest) -> String {
    let providers = games::supported_providers(manifest);
    if providers.iter().any(|p| *p != ProviderKind::Manual) {
        let names: Vec<_> = providers.iter().map(|p| p.display_name()).collect();
        format!(
            "If the game can't be found automatically, drag {} and drop it here. \
             Supported: {}.",
            manifest.game_exe,
            names.join(", ")
        )
    } else {
        format!(
            "Failed to find the game automatically. Drag {} and drop it on this window \
             to install {}.",
            manifest.game_exe, manifest.mod_title
        )
    }
}
