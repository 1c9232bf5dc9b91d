//! Settings persistence backends.
//!
//! The provider only needs last-write-wins `read`/`write` per user; how the
//! records are kept is up to the backend.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::user::UserId;

pub trait SettingsBackend<T>: Send + Sync {
    fn read(&self, user: UserId) -> Result<Option<T>, StoreError>;

    fn write(&self, user: UserId, record: &T) -> Result<(), StoreError>;
}

/// Transient per-process storage.
pub struct MemoryBackend<T> {
    records: RwLock<HashMap<UserId, T>>,
}

impl<T> MemoryBackend<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryBackend<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> SettingsBackend<T> for MemoryBackend<T> {
    fn read(&self, user: UserId) -> Result<Option<T>, StoreError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .cloned())
    }

    fn write(&self, user: UserId, record: &T) -> Result<(), StoreError> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, record.clone());
        Ok(())
    }
}

/// One TOML file holding every user's record, keyed by user id.
///
/// The whole file is rewritten on each write through a temporary sibling and
/// a rename, so a crash mid-write leaves the previous contents intact.
pub struct TomlFileBackend<T> {
    path: PathBuf,
    records: RwLock<BTreeMap<String, T>>,
}

impl<T> TomlFileBackend<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open `path`, loading existing records. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|err| StoreError::Corrupt {
                path: path.clone(),
                message: err.to_string(),
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(StoreError::File {
                    path,
                    message: err.to_string(),
                })
            }
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &BTreeMap<String, T>) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(records).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            message: err.to_string(),
        })?;

        let file_error = |err: std::io::Error| StoreError::File {
            path: self.path.clone(),
            message: err.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(file_error)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).map_err(file_error)?;
        std::fs::rename(&tmp, &self.path).map_err(file_error)
    }
}

impl<T> SettingsBackend<T> for TomlFileBackend<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    fn read(&self, user: UserId) -> Result<Option<T>, StoreError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user.to_string())
            .cloned())
    }

    fn write(&self, user: UserId, record: &T) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let previous = records.insert(user.to_string(), record.clone());
        if let Err(err) = self.persist(&records) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => records.insert(user.to_string(), old),
                None => records.remove(&user.to_string()),
            };
            return Err(err);
        }
        Ok(())
    }
}
