//! Mod manifest reader
//!
//! The manifest is a small JSON document shipped in the mod folder. Every
//! string field is optional in the document: an absent field becomes a
//! visible `[missing <field>]` placeholder so the caller can still show a
//! degraded state instead of failing the whole load.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Game provider entry declared by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderSpec {
    /// Provider kind (e.g. "steam")
    pub id: String,

    /// Install folder name under the provider's library (e.g. steamapps/common/<folder>)
    #[serde(default)]
    pub folder: Option<String>,
}

/// Static descriptor of the mod and its target game
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub mod_title: String,
    pub mod_id: String,
    pub game_title: String,
    pub game_exe: String,
    pub require_admin: bool,
    pub providers: Vec<ProviderSpec>,
    missing: Vec<&'static str>,
}

/// Placeholder used for a field absent from the manifest document
pub fn missing_marker(field: &str) -> String {
    format!("[missing {}]", field)
}

impl Manifest {
    /// Load the manifest from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ManifestMissing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(Error::ManifestUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        // Windows editors like to prepend a BOM
        let content = content.trim_start_matches('\u{feff}');
        let value: Value = serde_json::from_str(content).map_err(|source| Error::ManifestInvalid {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = Self::from_value(&value);
        if !manifest.missing.is_empty() {
            tracing::warn!(
                "Manifest {} is missing fields: {}",
                path.display(),
                manifest.missing.join(", ")
            );
        }
        Ok(manifest)
    }

    /// Build a manifest from an already parsed document
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let doc = value.as_object().unwrap_or(&empty);
        let mut missing = Vec::new();

        let mut field = |name: &'static str| match doc.get(name).and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => {
                missing.push(name);
                missing_marker(name)
            }
        };

        let mod_title = field("modTitle");
        let mod_id = field("id");
        let game_title = field("gameTitle");
        let game_exe = field("gameExe");

        let require_admin = match doc.get("requireAdmin") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        };

        let providers = doc
            .get("providers")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        serde_json::from_value::<ProviderSpec>(entry.clone())
                            .map_err(|e| tracing::warn!("Ignoring malformed provider entry: {}", e))
                            .ok()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            mod_title,
            mod_id,
            game_title,
            game_exe,
            require_admin,
            providers,
            missing,
        }
    }

    /// Names of the document fields that were absent
    pub fn missing_fields(&self) -> &[&'static str] {
        &self.missing
    }

    /// Whether the named document field was absent
    pub fn is_missing(&self, field: &str) -> bool {
        self.missing.iter().any(|m| *m == field)
    }

    /// Whether the settings store and the drop filter can work at all
    pub fn is_usable(&self) -> bool {
        !self.is_missing("id") && !self.is_missing("gameExe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_fields_verbatim() {
        let manifest = Manifest::from_value(&json!({
            "modTitle": "Quake VR",
            "id": "quakevr",
            "gameTitle": "Quake",
            "gameExe": "Quake.exe",
            "requireAdmin": "TRUE",
        }));

        assert_eq!(manifest.mod_title, "Quake VR");
        assert_eq!(manifest.mod_id, "quakevr");
        assert_eq!(manifest.game_title, "Quake");
        assert_eq!(manifest.game_exe, "Quake.exe");
        assert!(manifest.require_admin);
        assert!(manifest.missing_fields().is_empty());
        assert!(manifest.is_usable());
    }

    #[test]
    fn test_missing_fields_become_placeholders() {
        let manifest = Manifest::from_value(&json!({ "id": "quakevr" }));

        assert_eq!(manifest.mod_title, "[missing modTitle]");
        assert_eq!(manifest.game_exe, "[missing gameExe]");
        assert!(!manifest.require_admin);
        assert_eq!(manifest.missing_fields(), &["modTitle", "gameTitle", "gameExe"]);
        assert!(!manifest.is_usable());
    }

    #[test]
    fn test_require_admin_parsing() {
        let parse = |v: Value| Manifest::from_value(&json!({ "requireAdmin": v })).require_admin;
        assert!(parse(json!(true)));
        assert!(parse(json!("True")));
        assert!(!parse(json!("yes")));
        assert!(!parse(json!(1)));
        assert!(!parse(json!(false)));
    }

    #[test]
    fn test_non_object_document_is_all_missing() {
        let manifest = Manifest::from_value(&json!(["not", "an", "object"]));
        assert_eq!(manifest.missing_fields().len(), 4);
    }

    #[test]
    fn test_providers_skip_malformed_entries() {
        let manifest = Manifest::from_value(&json!({
            "providers": [
                { "id": "steam", "folder": "Quake" },
                { "folder": "no id" },
                { "id": "gog" },
            ]
        }));

        assert_eq!(
            manifest.providers,
            vec![
                ProviderSpec { id: "steam".into(), folder: Some("Quake".into()) },
                ProviderSpec { id: "gog".into(), folder: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_is_fatal_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Manifest::load(&tmp.path().join("manifest.json")).await.unwrap_err();
        assert!(matches!(err, Error::ManifestMissing(_)));
    }

    #[tokio::test]
    async fn test_load_strips_bom() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("manifest.json");
        std::fs::write(&path, "\u{feff}{\"id\":\"quakevr\",\"gameExe\":\"Quake.exe\"}").unwrap();

        let manifest = Manifest::load(&path).await.unwrap();
        assert_eq!(manifest.mod_id, "quakevr");
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("manifest.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Manifest::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::ManifestInvalid { .. }));
    }
}
