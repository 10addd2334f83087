//! Game detection and launching

pub mod launch;

pub use launch::{Launcher, SystemLauncher};

use crate::mods::Manifest;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ways the game executable can be located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Remembered from a drop or an earlier detection
    Manual,
    /// Steam library folders
    Steam,
}

impl ProviderKind {
    /// Parse a manifest provider id
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "manual" => Some(ProviderKind::Manual),
            "steam" => Some(ProviderKind::Steam),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Manual => "Manual",
            ProviderKind::Steam => "Steam",
        }
    }
}

/// Providers offered for a manifest; manual is always first
pub fn supported_providers(manifest: &Manifest) -> Vec<ProviderKind> {
    let mut out = vec![ProviderKind::Manual];
    for spec in &manifest.providers {
        match ProviderKind::from_id(&spec.id) {
            Some(kind) if !out.contains(&kind) => out.push(kind),
            Some(_) => {}
            None => tracing::warn!("Ignoring unknown game provider '{}'", spec.id),
        }
    }
    out
}

/// Game detection utilities
#[derive(Debug, Clone, Default)]
pub struct GameDetector {
    home: Option<PathBuf>,
    extra_libraries: Vec<PathBuf>,
}

impl GameDetector {
    /// Detector for the current user plus configured library roots
    pub fn new(extra_libraries: Vec<PathBuf>) -> Self {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self {
            home,
            extra_libraries,
        }
    }

    /// Detector with an explicit home directory
    pub fn with_home(home: impl Into<PathBuf>, extra_libraries: Vec<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
            extra_libraries,
        }
    }

    /// Find the game executable through the manifest's automatic providers
    pub fn detect(&self, manifest: &Manifest) -> Option<PathBuf> {
        for spec in &manifest.providers {
            if ProviderKind::from_id(&spec.id) != Some(ProviderKind::Steam) {
                continue;
            }

            let folder = spec.folder.as_deref().unwrap_or(&manifest.game_title);
            for steamapps in self.find_steam_libraries() {
                let candidate = steamapps
                    .join("common")
                    .join(folder)
                    .join(&manifest.game_exe);
                if candidate.is_file() {
                    tracing::info!("Found {} via Steam at {}", manifest.game_title, candidate.display());
                    return Some(candidate);
                }
            }
        }

        None
    }

    /// Find all Steam library `steamapps` folders
    fn find_steam_libraries(&self) -> Vec<PathBuf> {
        let mut libraries = Vec::new();
        let mut seen = HashSet::new();

        let mut bases = Vec::new();
        if let Some(home) = &self.home {
            bases.push(home.join(".steam/steam"));
            bases.push(home.join(".local/share/Steam"));
        }
        bases.push(PathBuf::from("/usr/share/steam"));
        bases.extend(self.extra_libraries.iter().cloned());

        for base in bases {
            let steamapps = if base.ends_with("steamapps") {
                base
            } else {
                base.join("steamapps")
            };
            if !steamapps.is_dir() {
                continue;
            }
            push_unique(&mut libraries, &mut seen, steamapps.clone());

            // Additional libraries listed by the Steam client
            let vdf_path = steamapps.join("libraryfolders.vdf");
            if let Ok(content) = std::fs::read_to_string(&vdf_path) {
                for lib in parse_library_paths(&content) {
                    let lib_steamapps = lib.join("steamapps");
                    if lib_steamapps.is_dir() {
                        push_unique(&mut libraries, &mut seen, lib_steamapps);
                    }
                }
            }
        }

        libraries
    }
}

fn push_unique(out: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, path: PathBuf) {
    let key = path.canonicalize().unwrap_or_else(|_| path.clone());
    if seen.insert(key) {
        out.push(path);
    }
}

/// Extract `"path"` values from a libraryfolders.vdf document
fn parse_library_paths(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .filter(|line| line.contains("\"path\""))
        .filter_map(|line| line.split('"').nth(3))
        .map(|path| PathBuf::from(path.replace("\\\\", "\\")))
        .collect()
}

/// Whether `candidate` names the expected executable (case-insensitive file name)
pub fn is_game_exe(candidate: &Path, game_exe: &str) -> bool {
    candidate
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(game_exe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn manifest(providers: serde_json::Value) -> Manifest {
        Manifest::from_value(&json!({
            "modTitle": "Quake VR",
            "id": "quakevr",
            "gameTitle": "Quake",
            "gameExe": "Quake.exe",
            "providers": providers,
        }))
    }

    #[test]
    fn test_manual_provider_always_listed_first() {
        let m = manifest(json!([{ "id": "steam" }, { "id": "epic" }, { "id": "STEAM" }]));
        assert_eq!(
            supported_providers(&m),
            vec![ProviderKind::Manual, ProviderKind::Steam]
        );
    }

    #[test]
    fn test_parse_library_paths() {
        let vdf = r#"
"libraryfolders"
{
    "0"
    {
        "path"      "/home/user/.local/share/Steam"
        "label"     ""
    }
    "1"
    {
        "path"      "/mnt/games/SteamLibrary"
    }
}"#;
        assert_eq!(
            parse_library_paths(vdf),
            vec![
                PathBuf::from("/home/user/.local/share/Steam"),
                PathBuf::from("/mnt/games/SteamLibrary"),
            ]
        );
    }

    #[test]
    fn test_detects_game_in_extra_library() {
        let tmp = tempfile::tempdir().unwrap();
        let library = tmp.path().join("Library");
        let game_dir = library.join("steamapps/common/Quake");
        fs::create_dir_all(&game_dir).unwrap();
        fs::write(game_dir.join("Quake.exe"), b"exe").unwrap();

        let detector = GameDetector::with_home(tmp.path().join("home"), vec![library]);
        let found = detector.detect(&manifest(json!([{ "id": "steam" }])));
        assert_eq!(found, Some(game_dir.join("Quake.exe")));
    }

    #[test]
    fn test_detects_game_in_vdf_listed_library() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        let main = home.join(".local/share/Steam/steamapps");
        fs::create_dir_all(&main).unwrap();
        let second = tmp.path().join("second");
        let game_dir = second.join("steamapps/common/QuakeFolder");
        fs::create_dir_all(&game_dir).unwrap();
        fs::write(game_dir.join("Quake.exe"), b"exe").unwrap();
        fs::write(
            main.join("libraryfolders.vdf"),
            format!("\"path\"  \"{}\"\n", second.display()),
        )
        .unwrap();

        let detector = GameDetector::with_home(&home, Vec::new());
        let found = detector.detect(&manifest(json!([{ "id": "steam", "folder": "QuakeFolder" }])));
        assert_eq!(found, Some(game_dir.join("Quake.exe")));
    }

    #[test]
    fn test_no_providers_detects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let detector = GameDetector::with_home(tmp.path(), Vec::new());
        assert_eq!(detector.detect(&manifest(json!([]))), None);
    }

    #[test]
    fn test_is_game_exe_ignores_case_and_directory() {
        assert!(is_game_exe(Path::new("/games/quake/QUAKE.EXE"), "Quake.exe"));
        assert!(!is_game_exe(Path::new("/games/Quake.exe/readme.txt"), "Quake.exe"));
        assert!(!is_game_exe(Path::new("/"), "Quake.exe"));
    }
}
