use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Get/set seam to the persistence collaborator. The core needs nothing
/// beyond string blobs addressed by key.
pub(super) trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Single-file JSON map under the user data dir (or a caller override).
pub(super) struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn open(directory: &Path) -> Result<Self> {
        std::fs::create_dir_all(directory).with_context(|| {
            format!("failed to create preference dir {}", directory.display())
        })?;

        let path = directory.join("prefs.json");
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!(%error, path = %path.display(), "resetting unreadable preference file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Ok(Self { path, entries })
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write preferences to {}", self.path.display()))
    }
}

/// Fallback when no writable directory exists; preferences last for the
/// session only.
#[derive(Default)]
pub(super) struct MemoryStore {
    entries: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

pub(super) fn default_store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("assemblage-scope"))
}

/// Last-used simulation settings, persisted per comparison.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub(super) struct StoredPhysics {
    pub repulsion_strength: f32,
    pub tension_distance: f32,
    pub show_mediator: bool,
    pub highlight_controversies: bool,
}

impl Default for StoredPhysics {
    fn default() -> Self {
        Self {
            repulsion_strength: 150.0,
            tension_distance: 100.0,
            show_mediator: true,
            highlight_controversies: true,
        }
    }
}

pub(super) fn physics_key(comparison_id: &str) -> String {
    format!("assemblage-physics-{comparison_id}")
}

pub(super) fn load_physics(store: &dyn PreferenceStore, comparison_id: &str) -> StoredPhysics {
    store
        .get(&physics_key(comparison_id))
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub(super) fn save_physics(
    store: &mut dyn PreferenceStore,
    comparison_id: &str,
    physics: StoredPhysics,
) {
    match serde_json::to_string(&physics) {
        Ok(raw) => {
            if let Err(error) = store.set(&physics_key(comparison_id), &raw) {
                tracing::warn!(%error, "failed to persist physics preferences");
            }
        }
        Err(error) => tracing::warn!(%error, "failed to serialize physics preferences"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_store_round_trips_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("missing"), None);
        store.set("alpha", "one").unwrap();
        store.set("alpha", "two").unwrap();
        assert_eq!(store.get("alpha").as_deref(), Some("two"));

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("alpha").as_deref(), Some("two"));
    }

    #[test]
    fn unreadable_preference_files_reset_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prefs.json"), "not json at all").unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn physics_blob_round_trips_per_comparison() {
        let mut store = MemoryStore::default();
        let stored = StoredPhysics {
            repulsion_strength: 420.0,
            tension_distance: 210.0,
            show_mediator: false,
            highlight_controversies: false,
        };

        save_physics(&mut store, "brazil-india", stored);
        assert_eq!(load_physics(&store, "brazil-india"), stored);
        // other comparisons keep their own defaults
        assert_eq!(load_physics(&store, "other"), StoredPhysics::default());
    }
}
