use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::SNAPSHOT_KEY;
use crate::model::{Dataset, LabResult};
use crate::utils::write_atomic;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Falha ao acessar o armazenamento local em {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Falha ao serializar os dados: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A local key-value storage holding string values under named slots.
pub trait SnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Keeps each slot as `<key>.json` inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the directory when it does not exist yet
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(FileStorage { dir })
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        write_atomic(&path, value).map_err(|e| Self::io_error(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Self::io_error(&path, e)),
            _ => Ok(()),
        }
    }
}

/// In-process storage, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Holds the session's dataset and mirrors it into a storage slot.
#[derive(Debug)]
pub struct DatasetStore<S: SnapshotStorage> {
    storage: S,
    dataset: Dataset,
}

impl<S: SnapshotStorage> DatasetStore<S> {
    /// An empty store; call [`DatasetStore::restore`] to load the persisted snapshot
    pub fn new(storage: S) -> Self {
        DatasetStore {
            storage,
            dataset: Dataset::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist `dataset` and make it current.
    ///
    /// The snapshot is written first; if that fails the store keeps its previous
    /// dataset in memory and on disk.
    pub fn replace(&mut self, dataset: Dataset) -> Result<(), StorageError> {
        let snapshot = serialize_snapshot(&dataset)?;
        self.storage.write(SNAPSHOT_KEY, &snapshot)?;
        self.dataset = dataset;
        Ok(())
    }

    /// Load the persisted snapshot, if any.
    ///
    /// A snapshot that cannot be read, is not a JSON array of well-formed
    /// records, or is empty is discarded and the store starts empty. This never
    /// fails.
    pub fn restore(&mut self) -> &Dataset {
        let restored = match self.storage.read(SNAPSHOT_KEY) {
            Ok(Some(snapshot)) => match deserialize_snapshot(&snapshot) {
                Some(dataset) => Some(dataset),
                None => {
                    warn!("discarding unreadable snapshot '{}'", SNAPSHOT_KEY);
                    self.discard_snapshot();
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("failed to read snapshot '{}': {}", SNAPSHOT_KEY, e);
                self.discard_snapshot();
                None
            }
        };

        self.dataset = restored.unwrap_or_default();
        if !self.dataset.is_empty() {
            info!("restored {} lab results", self.dataset.len());
        }
        &self.dataset
    }

    /// Empty the in-memory dataset and remove the persisted snapshot
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.dataset = Dataset::new();
        self.storage.remove(SNAPSHOT_KEY)
    }

    fn discard_snapshot(&mut self) {
        if let Err(e) = self.storage.remove(SNAPSHOT_KEY) {
            warn!("failed to remove snapshot '{}': {}", SNAPSHOT_KEY, e);
        }
    }
}

pub fn serialize_snapshot(dataset: &Dataset) -> Result<String, StorageError> {
    Ok(serde_json::to_string(dataset)?)
}

/// `None` for anything that is not a non-empty array of well-formed records
pub fn deserialize_snapshot(snapshot: &str) -> Option<Dataset> {
    let records: Vec<LabResult> = serde_json::from_str(snapshot).ok()?;
    if records.is_empty() || !records.iter().all(LabResult::is_well_formed) {
        return None;
    }
    Some(Dataset::from_records(records))
}
