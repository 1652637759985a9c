//! Arena Persistence
//!
//! JSON files for the saved arena configuration and named presets.
//! Every operation works on an `ArenaSnapshot` copied out of the live
//! config beforehand, so no session lock is ever held across file I/O.
//!
//! Layout under the store root:
//!   arena.json            - last explicitly saved configuration
//!   presets/<name>.json   - named snapshots

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::game::arena::ArenaSnapshot;

/// Persistence errors.
///
/// `PresetNotFound` / `ArenaNotFound` are reported separately from I/O
/// faults so callers can phrase "does it exist?" replies.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Named preset does not exist.
    #[error("preset '{0}' not found")]
    PresetNotFound(String),

    /// No arena configuration has been saved yet.
    #[error("no saved arena configuration")]
    ArenaNotFound,

    /// Underlying filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or incompatible file contents.
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// On-disk shape of a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetFile {
    /// Preset name (same as the file stem)
    pub name: String,
    /// When the preset was saved
    pub saved_at: DateTime<Utc>,
    /// The snapshot itself
    pub arena: ArenaSnapshot,
}

/// File-backed store for arena configuration and presets.
#[derive(Debug, Clone)]
pub struct ArenaStore {
    root: PathBuf,
}

impl ArenaStore {
    /// Create a store rooted at `root`. Directories are created lazily
    /// on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn arena_path(&self) -> PathBuf {
        self.root.join("arena.json")
    }

    fn preset_dir(&self) -> PathBuf {
        self.root.join("presets")
    }

    fn preset_path(&self, name: &str) -> PathBuf {
        self.preset_dir().join(format!("{name}.json"))
    }

    /// Persist the live arena configuration.
    pub async fn save_arena(&self, snapshot: &ArenaSnapshot) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec_pretty(snapshot)?;
        fs::write(self.arena_path(), json).await?;
        info!(path = %self.arena_path().display(), "arena configuration saved");
        Ok(())
    }

    /// Load the saved arena configuration.
    pub async fn load_arena(&self) -> Result<ArenaSnapshot, StorageError> {
        let bytes = read_or(&self.arena_path(), StorageError::ArenaNotFound).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Save a named preset, overwriting any existing one.
    pub async fn save_preset(
        &self,
        name: &str,
        snapshot: &ArenaSnapshot,
    ) -> Result<(), StorageError> {
        fs::create_dir_all(self.preset_dir()).await?;
        let file = PresetFile {
            name: name.to_string(),
            saved_at: Utc::now(),
            arena: snapshot.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        fs::write(self.preset_path(name), json).await?;
        info!(preset = name, "arena preset saved");
        Ok(())
    }

    /// Load a named preset's snapshot.
    pub async fn load_preset(&self, name: &str) -> Result<ArenaSnapshot, StorageError> {
        let bytes = read_or(
            &self.preset_path(name),
            StorageError::PresetNotFound(name.to_string()),
        )
        .await?;
        let file: PresetFile = serde_json::from_slice(&bytes)?;
        Ok(file.arena)
    }

    /// Delete a named preset.
    pub async fn delete_preset(&self, name: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.preset_path(name)).await {
            Ok(()) => {
                info!(preset = name, "arena preset deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::PresetNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all stored presets, sorted.
    pub async fn list_presets(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut dir = match fs::read_dir(self.preset_dir()).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

async fn read_or(path: &Path, not_found: StorageError) -> Result<Vec<u8>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec3::{Transform, Vec3};
    use crate::game::arena::ArenaConfig;
    use crate::game::state::{PlayerId, Team};

    fn sample_snapshot() -> ArenaSnapshot {
        let mut arena = ArenaConfig::new();
        arena.add_spawn(Team::Red, Transform::new(Vec3::new(1.0, 64.0, 1.0), -5.0, 90.0));
        arena.add_spawn(Team::Red, Transform::at(Vec3::new(2.0, 64.0, 2.0)));
        arena.add_spawn(Team::Blue, Transform::at(Vec3::new(99.0, 64.0, 1.0)));
        arena.set_capture_zone(Team::Red, Vec3::new(0.0, 64.0, 0.0), 3.0);
        arena.set_capture_zone(Team::Blue, Vec3::new(100.0, 64.0, 0.0), 4.5);
        let marker = PlayerId::new([1; 16]);
        arena.start_region(marker, "mid", Vec3::ZERO);
        arena.finish_region(marker, "mid", Vec3::new(8.0, 8.0, 8.0));
        arena.snapshot()
    }

    #[tokio::test]
    async fn test_arena_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());
        let snapshot = sample_snapshot();

        store.save_arena(&snapshot).await.unwrap();
        let loaded = store.load_arena().await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_load_arena_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());
        assert!(matches!(
            store.load_arena().await,
            Err(StorageError::ArenaNotFound)
        ));
    }

    #[tokio::test]
    async fn test_preset_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());
        let snapshot = sample_snapshot();

        store.save_preset("duel-map", &snapshot).await.unwrap();
        let loaded = store.load_preset("duel-map").await.unwrap();
        assert_eq!(loaded, snapshot);

        // Overwrite with an empty snapshot
        store
            .save_preset("duel-map", &ArenaSnapshot::default())
            .await
            .unwrap();
        let loaded = store.load_preset("duel-map").await.unwrap();
        assert_eq!(loaded, ArenaSnapshot::default());
    }

    #[tokio::test]
    async fn test_preset_not_found_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());

        match store.load_preset("ghost").await {
            Err(StorageError::PresetNotFound(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected PresetNotFound, got {other:?}"),
        }
        assert!(matches!(
            store.delete_preset("ghost").await,
            Err(StorageError::PresetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_presets_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());
        assert!(store.list_presets().await.unwrap().is_empty());

        let snapshot = ArenaSnapshot::default();
        store.save_preset("zeta", &snapshot).await.unwrap();
        store.save_preset("alpha", &snapshot).await.unwrap();
        store.save_preset("mid_3", &snapshot).await.unwrap();

        assert_eq!(
            store.list_presets().await.unwrap(),
            vec!["alpha".to_string(), "mid_3".to_string(), "zeta".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_preset() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());
        store.save_preset("gone", &ArenaSnapshot::default()).await.unwrap();
        store.delete_preset("gone").await.unwrap();
        assert!(store.list_presets().await.unwrap().is_empty());
    }
}
