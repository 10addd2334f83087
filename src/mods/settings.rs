//! Per-mod persisted settings
//!
//! Stored as `<data_dir>/<mod_id>/settings.json`. Only `gameExePath` is
//! interpreted; any other keys found in the document survive a save.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const GAME_EXE_PATH_KEY: &str = "gameExePath";

/// Reads and writes the remembered game executable path for each mod id
#[derive(Debug)]
pub struct SettingsStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Create a store rooted at the per-user data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Settings file for a mod id
    pub fn settings_file(&self, mod_id: &str) -> PathBuf {
        self.root.join(mod_id).join("settings.json")
    }

    /// Remembered game executable path, `None` on first run
    pub async fn load(&self, mod_id: &str) -> Result<Option<PathBuf>> {
        let path = self.settings_file(mod_id);
        let Some(doc) = read_document(&path).await? else {
            return Ok(None);
        };

        Ok(doc
            .get(GAME_EXE_PATH_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from))
    }

    /// Persist the game executable path, merging into the existing document
    pub async fn save(&self, mod_id: &str, game_exe_path: &Path) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.settings_file(mod_id);

        let mut doc = match read_document(&path).await {
            Ok(doc) => doc.unwrap_or_default(),
            Err(Error::SettingsCorrupt { .. }) => {
                let aside = path.with_extension("json.corrupt");
                tracing::warn!(
                    "Settings file {} is corrupt; moving it to {}",
                    path.display(),
                    aside.display()
                );
                fs::rename(&path, &aside).await.map_err(|source| Error::SettingsIo {
                    path: path.clone(),
                    source,
                })?;
                Map::new()
            }
            Err(e) => return Err(e),
        };

        doc.insert(
            GAME_EXE_PATH_KEY.to_string(),
            Value::String(game_exe_path.to_string_lossy().into_owned()),
        );

        let io_err = |source| Error::SettingsIo {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(doc)).map_err(|source| {
            Error::SettingsCorrupt {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, content).await.map_err(io_err)?;

        tracing::debug!("Saved settings for '{}' to {}", mod_id, path.display());
        Ok(())
    }
}

/// Read the settings document; `Ok(None)` when the file does not exist yet
async fn read_document(path: &Path) -> Result<Option<Map<String, Value>>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::SettingsIo {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let corrupt = |source| Error::SettingsCorrupt {
        path: path.to_path_buf(),
        source,
    };

    match serde_json::from_str::<Value>(content.trim_start_matches('\u{feff}')).map_err(corrupt)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(corrupt(serde::de::Error::custom(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        )))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
