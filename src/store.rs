use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, warn};

use crate::app_dirs::AppDirs;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The three persisted namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Workouts,
    ExerciseBank,
    Profile,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Workouts => "gt.workouts.v3",
            StoreKey::ExerciseBank => "gt.exerciseBank.v3",
            StoreKey::Profile => "gt.profile.v1",
        }
    }
}

/// Opaque key to JSON blob storage.
///
/// Reads never fail: a missing or corrupt entry yields the caller's default.
/// A corrupt entry is set aside first, so the write that follows the
/// fallback cannot destroy what was on disk.
pub trait PersistentStore {
    fn read_raw(&self, key: StoreKey) -> Option<Vec<u8>>;
    fn write_raw(&mut self, key: StoreKey, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Moves an unreadable entry out of the way of later writes
    fn set_aside(&self, _key: StoreKey) -> Result<(), StoreError> {
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: StoreKey, default: T) -> T
    where
        Self: Sized,
    {
        let Some(bytes) = self.read_raw(key) else {
            return default;
        };
        match serde_json::from_slice::<Option<T>>(&bytes) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "corrupt store entry, using default");
                if let Err(e) = self.set_aside(key) {
                    error!(key = key.as_str(), error = %e, "could not set corrupt entry aside");
                }
                default
            }
        }
    }

    fn set<T: Serialize>(&mut self, key: StoreKey, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_raw(key, bytes)
    }
}

/// One `<key>.json` file per namespace under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            dir: AppDirs::data_dir(),
        }
    }

    pub fn with_dir<P: AsRef<Path>>(p: P) -> Self {
        Self {
            dir: p.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    /// `<key>.json.corrupt-<epoch ms>`, so repeated failures never overwrite
    /// an earlier copy
    fn corrupt_path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!(
            "{}.json.corrupt-{}",
            key.as_str(),
            chrono::Utc::now().timestamp_millis()
        ))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for FileStore {
    fn read_raw(&self, key: StoreKey) -> Option<Vec<u8>> {
        fs::read(self.path_for(key)).ok()
    }

    /// Writes a sibling temp file and renames it over the entry, so a crash
    /// leaves either the old or the new contents
    fn write_raw(&mut self, key: StoreKey, bytes: Vec<u8>) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn set_aside(&self, key: StoreKey) -> Result<(), StoreError> {
        let target = self.corrupt_path_for(key);
        fs::rename(self.path_for(key), &target)?;
        warn!(key = key.as_str(), to = %target.display(), "corrupt entry set aside");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<StoreKey, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn read_raw(&self, key: StoreKey) -> Option<Vec<u8>> {
        self.entries.get(&key).cloned()
    }

    fn write_raw(&mut self, key: StoreKey, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.entries.insert(key, bytes);
        Ok(())
    }
}
