//! Key-value persistence for the stores.
//!
//! A [`StorageBackend`] is a flat string map (a data directory on native
//! targets, `localStorage` in the browser). A [`Repository`] layers one
//! serialized state object on top of a single key.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::StorageError;

pub const TASKS_STORAGE_KEY: &str = "cybertask-storage";
pub const THEME_STORAGE_KEY: &str = "cybertask-theme";

pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process backend. Clones share the same entries, so a clone handed to a
/// freshly opened store behaves like storage that survived a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert_raw(key, value);
        Ok(())
    }
}

/// Loads and saves one state object.
pub trait Repository<S> {
    /// Returns `None` when nothing usable is stored. Read failures and
    /// malformed payloads count as absent.
    fn load(&self) -> Option<S>;

    fn save(&self, state: &S) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct JsonRepository<B, S> {
    backend: B,
    key: String,
    _state: PhantomData<fn() -> S>,
}

impl<B, S> JsonRepository<B, S> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            _state: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B, S> Repository<S> for JsonRepository<B, S>
where
    B: StorageBackend,
    S: Serialize + DeserializeOwned,
{
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    fn load(&self) -> Option<S> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted state");
                return None;
            }
            Err(error) => {
                warn!(%error, "failed reading persisted state; using defaults");
                return None;
            }
        };

        match serde_json::from_str::<S>(&raw) {
            Ok(state) => Some(state),
            Err(error) => {
                warn!(%error, "ignoring malformed persisted state");
                None
            }
        }
    }

    #[tracing::instrument(skip(self, state), fields(key = %self.key))]
    fn save(&self, state: &S) -> Result<(), StorageError> {
        let json = serde_json::to_string(state)?;
        debug!(bytes = json.len(), "saving state");
        self.backend.set(&self.key, &json)
    }
}

#[cfg(feature = "native")]
pub use file::FileBackend;

#[cfg(feature = "native")]
mod file {
    use std::fs;
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};

    use tempfile::NamedTempFile;
    use tracing::{debug, info};

    use super::StorageBackend;
    use crate::error::StorageError;

    /// Stores each key as `<dir>/<key>.json`, replacing files atomically.
    #[derive(Debug, Clone)]
    pub struct FileBackend {
        dir: PathBuf,
    }

    impl FileBackend {
        #[tracing::instrument(skip(dir))]
        pub fn open(dir: &Path) -> Result<Self, StorageError> {
            fs::create_dir_all(dir)?;
            info!(data_dir = %dir.display(), "opened file storage");
            Ok(Self {
                dir: dir.to_path_buf(),
            })
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl StorageBackend for FileBackend {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let path = self.path_for(key);
            match fs::read_to_string(&path) {
                Ok(raw) => Ok(Some(raw)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let path = self.path_for(key);
            debug!(file = %path.display(), "writing atomically");

            let mut temp = NamedTempFile::new_in(&self.dir)?;
            temp.write_all(value.as_bytes())?;
            temp.flush()?;
            temp.persist(&path).map_err(|err| {
                StorageError::Backend(format!("failed to persist {}: {}", path.display(), err))
            })?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonRepository, MemoryBackend, Repository, TASKS_STORAGE_KEY};
    use crate::task::TaskState;

    #[test]
    fn malformed_payload_reads_as_absent() {
        let backend = MemoryBackend::new();
        backend.insert_raw(TASKS_STORAGE_KEY, "{not json");
        let repo: JsonRepository<_, TaskState> =
            JsonRepository::new(backend.clone(), TASKS_STORAGE_KEY);
        assert!(repo.load().is_none());

        backend.insert_raw(TASKS_STORAGE_KEY, r#"{"tasks":"nope"}"#);
        assert!(repo.load().is_none());
    }

    #[test]
    fn save_writes_plain_state_shape() {
        let backend = MemoryBackend::new();
        let repo: JsonRepository<_, TaskState> =
            JsonRepository::new(backend.clone(), TASKS_STORAGE_KEY);
        repo.save(&TaskState::default()).unwrap();
        assert_eq!(backend.raw(TASKS_STORAGE_KEY).as_deref(), Some(r#"{"tasks":[]}"#));
        assert_eq!(repo.load(), Some(TaskState::default()));
    }

    #[cfg(feature = "native")]
    #[test]
    fn file_backend_missing_key_is_none() {
        use super::{FileBackend, StorageBackend};

        let temp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();
        assert!(backend.get("absent").unwrap().is_none());

        backend.set("present", "{}").unwrap();
        assert_eq!(backend.get("present").unwrap().as_deref(), Some("{}"));
        assert!(backend.path_for("present").exists());
    }
}
