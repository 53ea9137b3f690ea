//! On-disk preset storage: one pretty-printed JSON document per preset id.

use crate::error::PresetError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const DEFAULT_PRESET_ID: &str = "summary_keywords";

/// A named prompt/schema pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetSummary {
    pub id: String,
    pub name: String,
}

/// Presets are read-mostly. Concurrent saves to the same id are not
/// synchronized; the last writer wins.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Readable presets sorted by id. Unreadable files are skipped.
    pub fn list(&self) -> Vec<PresetSummary> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| {
                let id = path.file_stem()?.to_string_lossy().into_owned();
                let payload: Value = serde_json::from_str(&std::fs::read_to_string(&path).ok()?).ok()?;
                let name = payload
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&id)
                    .to_string();
                Some(PresetSummary { id, name })
            })
            .collect()
    }

    pub fn load(&self, id: &str) -> Result<Preset, PresetError> {
        let path = self.path_for(id);
        let contents = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => PresetError::NotFound(id.to_string()),
            _ => PresetError::Io {
                id: id.to_string(),
                source,
            },
        })?;

        serde_json::from_str(&contents).map_err(|source| PresetError::Malformed {
            id: id.to_string(),
            source,
        })
    }

    /// Loads a preset, treating every failure as "no preset".
    pub fn load_optional(&self, id: &str) -> Option<Preset> {
        match self.load(id) {
            Ok(preset) => Some(preset),
            Err(PresetError::NotFound(_)) => {
                debug!("Preset {} not found in {}", id, self.dir.display());
                None
            }
            Err(e) => {
                warn!("Ignoring preset: {}", e);
                None
            }
        }
    }

    pub fn save(&self, id: &str, preset: &Preset) -> Result<(), PresetError> {
        let io_err = |source| PresetError::Io {
            id: id.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let payload = serde_json::to_string_pretty(preset).map_err(|source| PresetError::Malformed {
            id: id.to_string(),
            source,
        })?;
        std::fs::write(self.path_for(id), payload).map_err(io_err)?;

        debug!("Saved preset {} to {}", id, self.dir.display());
        Ok(())
    }
}
