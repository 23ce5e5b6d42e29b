// src/save/src/store.rs
//! File-backed persistence: the run snapshot as JSON, the meta snapshot
//! as a compact bincode blob, both written atomically (temp file, flush,
//! rename). Corrupted or stale data is discarded and reported as "no
//! save", never as a hard failure.

use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use error::GameError;
use meta::MetaState;

use crate::snapshot::RunSnapshot;

const RUN_FILE: &str = "run.json";
const META_FILE: &str = "meta.sav";

pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, GameError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir).context("failed to create save directory")?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_path(&self) -> PathBuf {
        self.dir.join(RUN_FILE)
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), GameError> {
        let temp = path.with_extension("tmp");
        let mut file = fs::File::create(&temp).context("failed to create temporary save file")?;
        file.write_all(bytes).context("failed to write save data")?;
        file.flush().context("failed to flush save data")?;
        fs::rename(temp, path).context("failed to commit save file")?;
        Ok(())
    }

    /* ---------- run snapshot ---------- */

    pub fn save_run(&self, snapshot: &RunSnapshot) -> Result<(), GameError> {
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| GameError::SerializationError(e.to_string()))?;
        self.write_atomic(&self.run_path(), &bytes)
    }

    /// Load the run snapshot, already migrated. Missing, unparsable and
    /// stale files all come back as `None`; the latter two are deleted so
    /// they stop reappearing.
    pub fn load_run(&self, now: u64) -> Result<Option<RunSnapshot>, GameError> {
        let path = self.run_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut snapshot: RunSnapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(_) => {
                let _ = fs::remove_file(&path);
                return Ok(None);
            }
        };
        if snapshot.is_stale(now) {
            let _ = fs::remove_file(&path);
            return Ok(None);
        }
        snapshot.migrate();
        Ok(Some(snapshot))
    }

    pub fn delete_run(&self) -> Result<(), GameError> {
        let path = self.run_path();
        if path.exists() {
            fs::remove_file(path).context("failed to delete run save")?;
        }
        Ok(())
    }

    pub fn has_run(&self) -> bool {
        self.run_path().exists()
    }

    /* ---------- meta snapshot ---------- */

    pub fn save_meta(&self, meta: &MetaState) -> Result<(), GameError> {
        let bytes = bincode::encode_to_vec(meta, bincode::config::standard())
            .map_err(|e| GameError::SerializationError(e.to_string()))?;
        self.write_atomic(&self.meta_path(), &bytes)
    }

    /// Meta-progression falls back to a fresh state when the file is
    /// missing or unreadable; losing relics beats refusing to start.
    pub fn load_meta(&self) -> MetaState {
        let Ok(bytes) = fs::read(self.meta_path()) else {
            return MetaState::default();
        };
        match bincode::decode_from_slice::<MetaState, _>(&bytes, bincode::config::standard()) {
            Ok((meta, _)) => meta,
            Err(_) => MetaState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{RunSnapshot, RETENTION_SECS, SAVE_VERSION};
    use meta::RelicKind;

    const NOW: u64 = 1_700_000_000;

    fn snapshot_at(saved_at: u64) -> RunSnapshot {
        RunSnapshot {
            saved_at,
            save_version: SAVE_VERSION.to_string(),
            ..RunSnapshot::default()
        }
    }

    #[test]
    fn run_roundtrip_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path()).unwrap();
        assert!(!store.has_run());

        let mut snapshot = snapshot_at(NOW);
        snapshot.player.coins = 77;
        store.save_run(&snapshot).unwrap();
        assert!(store.has_run());

        let loaded = store.load_run(NOW).unwrap().unwrap();
        assert_eq!(loaded.player.coins, 77);
        assert_eq!(loaded.save_version, SAVE_VERSION);
    }

    #[test]
    fn corrupted_run_is_discarded_as_no_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("run.json"), b"{not json").unwrap();
        assert_eq!(store.load_run(NOW).unwrap(), None);
        // And the corpse is gone.
        assert!(!store.has_run());
    }

    #[test]
    fn stale_run_is_discarded_as_no_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path()).unwrap();
        store
            .save_run(&snapshot_at(NOW - RETENTION_SECS - 1))
            .unwrap();
        assert_eq!(store.load_run(NOW).unwrap(), None);
        assert!(!store.has_run());
    }

    #[test]
    fn fresh_run_just_inside_the_window_survives() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path()).unwrap();
        store.save_run(&snapshot_at(NOW - RETENTION_SECS)).unwrap();
        assert!(store.load_run(NOW).unwrap().is_some());
    }

    #[test]
    fn meta_roundtrip_and_corrupt_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path()).unwrap();

        let mut meta = MetaState::default();
        meta.total_deaths = 9;
        meta.unlock(RelicKind::BoneCharm);
        store.save_meta(&meta).unwrap();
        let loaded = store.load_meta();
        assert_eq!(loaded.total_deaths, 9);
        assert!(loaded.is_unlocked(RelicKind::BoneCharm));

        std::fs::write(dir.path().join("meta.sav"), b"garbage").unwrap();
        assert_eq!(store.load_meta(), MetaState::default());
    }
}
