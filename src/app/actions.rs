//! CLI command action handlers

use super::{App, Phase, Snapshot};
use anyhow::{bail, Result};
use std::path::PathBuf;

impl App {
    pub async fn cmd_status(&self) -> Result<()> {
        let snap = self.snapshot();
        print_snapshot(&snap);

        if let Some(manifest) = self.manifest() {
            println!("Mod:          {} ({})", manifest.mod_title, manifest.mod_id);
            println!("Game:         {} [{}]", manifest.game_title, manifest.game_exe);
            println!(
                "Elevation:    {}",
                if manifest.require_admin { "required" } else { "not required" }
            );
            let providers: Vec<_> = crate::games::supported_providers(manifest)
                .iter()
                .map(|p| p.display_name())
                .collect();
            println!("Providers:    {}", providers.join(", "));
            if !manifest.missing_fields().is_empty() {
                println!("Missing:      {}", manifest.missing_fields().join(", "));
            }
        }
        println!("Mod folder:   {}", self.layout().root().display());

        fatal_to_error(&snap)
    }

    pub async fn cmd_drop(&mut self, files: &[String]) -> Result<()> {
        let files: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
        let result = self.drop_files(&files).await;
        print_snapshot(&self.snapshot());
        result?;
        Ok(())
    }

    pub async fn cmd_detect(&mut self) -> Result<()> {
        fatal_to_error(&self.snapshot())?;
        match self.detect_game().await? {
            Some(path) => println!("Found game at {}", path.display()),
            None => println!("No game found by automatic providers."),
        }
        print_snapshot(&self.snapshot());
        Ok(())
    }

    pub async fn cmd_install(&mut self) -> Result<()> {
        let result = self.install().await;
        print_snapshot(&self.snapshot());
        result?;
        self.expect_phase(Phase::Installed)
    }

    pub async fn cmd_uninstall(&mut self) -> Result<()> {
        let result = self.uninstall().await;
        print_snapshot(&self.snapshot());
        result?;
        self.expect_phase(Phase::ReadyToInstall)
    }

    pub async fn cmd_launch(&mut self) -> Result<()> {
        let result = self.launch();
        println!("{}", self.snapshot().status);
        result?;
        fatal_to_error(&self.snapshot())?;
        if !self.snapshot().phase.can_launch() {
            bail!("Game not found. Use 'modstrap drop <path to game exe>' first.");
        }
        Ok(())
    }

    pub async fn cmd_open_mod_folder(&mut self) -> Result<()> {
        let root = self.layout().root().to_path_buf();
        let exists = root.is_dir();
        self.open_mod_folder()?;
        if !exists {
            bail!("{}", self.snapshot().status);
        }
        println!("Opening {}", root.display());
        Ok(())
    }

    pub async fn cmd_logs(&mut self) -> Result<()> {
        let log = self.layout().debug_log();
        let exists = log.is_file();
        self.show_debug_logs()?;
        if !exists {
            bail!("{}", self.snapshot().status);
        }
        println!("Opening {}", log.display());
        Ok(())
    }

    /// Action was refused by the state machine: report it as a failed command
    fn expect_phase(&self, phase: Phase) -> Result<()> {
        let snap = self.snapshot();
        fatal_to_error(&snap)?;
        if snap.phase != phase {
            bail!("Nothing to do in state '{}'", snap.phase.display_name());
        }
        Ok(())
    }
}

fn print_snapshot(snap: &Snapshot) {
    println!("{}", snap.window_title);
    println!("{:-<60}", "");
    println!("State:        {}", snap.phase.display_name());
    if let Some(path) = &snap.game_exe_path {
        println!("Game exe:     {}", path.display());
    }
    println!();
    println!("{}", snap.status);
    println!();
}

fn fatal_to_error(snap: &Snapshot) -> Result<()> {
    if snap.phase == Phase::Fatal {
        bail!("Mod manifest is unusable; nothing can be done until it is fixed.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::Fixture;
    use super::*;
    use crate::games::launch::MockLauncher;
    use crate::mods::deploy::{BOOTSTRAP_CONFIG, BOOTSTRAP_LOADER};
    use std::fs;

    #[tokio::test]
    async fn test_cmd_install_then_uninstall() {
        let fx = Fixture::standard();
        let exe = fx.game_exe();
        let mut app = fx.app(MockLauncher::new()).await;
        app.cmd_drop(&[exe.display().to_string()]).await.unwrap();

        app.cmd_install().await.unwrap();
        assert_eq!(app.snapshot().phase, Phase::Installed);
        assert!(exe.parent().unwrap().join(BOOTSTRAP_CONFIG).is_file());

        app.cmd_uninstall().await.unwrap();
        assert_eq!(app.snapshot().phase, Phase::ReadyToInstall);
        assert!(!exe.parent().unwrap().join(BOOTSTRAP_CONFIG).exists());
    }

    #[tokio::test]
    async fn test_cmd_install_fails_without_loader() {
        let fx = Fixture::standard();
        let exe = fx.game_exe();
        let mut app = fx.app(MockLauncher::new()).await;
        app.cmd_drop(&[exe.display().to_string()]).await.unwrap();
        fs::remove_file(fx.layout.staging_dir().join(BOOTSTRAP_LOADER)).unwrap();

        assert!(app.cmd_install().await.is_err());
        assert_eq!(app.snapshot().phase, Phase::ReadyToInstall);
    }

    #[tokio::test]
    async fn test_cmd_install_without_game_fails() {
        let fx = Fixture::standard();
        let mut app = fx.app(MockLauncher::new()).await;

        let err = app.cmd_install().await.unwrap_err();
        assert!(err.to_string().contains("Nothing to do"));
        assert_eq!(app.snapshot().phase, Phase::ReadyNoGame);
    }

    #[tokio::test]
    async fn test_cmd_uninstall_when_not_installed_fails() {
        let fx = Fixture::standard();
        let exe = fx.game_exe();
        let mut app = fx.app(MockLauncher::new()).await;
        app.cmd_drop(&[exe.display().to_string()]).await.unwrap();

        assert!(app.cmd_uninstall().await.is_err());
        assert_eq!(app.snapshot().phase, Phase::ReadyToInstall);
    }

    #[tokio::test]
    async fn test_cmd_open_mod_folder_missing_is_error() {
        let fx = Fixture::standard();
        let mut launcher = MockLauncher::new();
        launcher.expect_open_path().never();
        let mut app = fx.app(launcher).await;
        fs::remove_dir_all(fx.layout.root()).unwrap();

        let err = app.cmd_open_mod_folder().await.unwrap_err();
        assert!(err.to_string().contains("Mod folder not found"));
    }

    #[tokio::test]
    async fn test_cmd_open_mod_folder_opens_existing_folder() {
        let fx = Fixture::standard();
        let mut launcher = MockLauncher::new();
        launcher.expect_open_path().times(1).returning(|_| Ok(()));
        let mut app = fx.app(launcher).await;

        app.cmd_open_mod_folder().await.unwrap();
    }
}
