//! Durable storage for the persisted subset of the garden store.
//!
//! The state is written as one keyed JSON blob wrapped in a versioned envelope:
//! `{"version": 1, "state": {...}}`. Live weather, forecast, location and the
//! loading/error flags are never part of it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{BudgetTransaction, GardenBed, GardenTask, PlantedItem, WeatherHistoryEntry};

pub const STORAGE_KEY: &str = "dreamgarden-storage";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported state version {found}")]
    VersionMismatch { found: u32 },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Owned form of the persisted subset, produced when decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub beds: Vec<GardenBed>,
    #[serde(default)]
    pub plants: Vec<PlantedItem>,
    #[serde(default)]
    pub tasks: Vec<GardenTask>,
    #[serde(default)]
    pub budget_transactions: Vec<BudgetTransaction>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub weather_history: Vec<WeatherHistoryEntry>,
}

/// Borrowed form used when saving, so a save never clones the collections.
#[derive(Debug, Serialize)]
pub struct PersistedView<'a> {
    pub beds: &'a [GardenBed],
    pub plants: &'a [PlantedItem],
    pub tasks: &'a [GardenTask],
    pub budget_transactions: &'a [BudgetTransaction],
    pub is_premium: bool,
    pub weather_history: &'a [WeatherHistoryEntry],
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    version: u32,
    state: &'a PersistedView<'a>,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    version: u32,
    state: serde_json::Value,
}

pub fn encode_state(view: &PersistedView<'_>) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&EnvelopeOut {
        version: SCHEMA_VERSION,
        state: view,
    })?)
}

pub fn decode_state(blob: &str) -> Result<PersistedState, StorageError> {
    let envelope: EnvelopeIn = serde_json::from_str(blob)?;
    if envelope.version != SCHEMA_VERSION {
        return Err(StorageError::VersionMismatch {
            found: envelope.version,
        });
    }
    Ok(serde_json::from_value(envelope.state)?)
}

/// Reads the stored blob, falling back to an empty state when it is absent,
/// unreadable or undecodable. Never fails.
pub fn load_state(storage: &dyn StateStorage) -> PersistedState {
    let blob = match storage.load() {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!("No saved garden state under '{STORAGE_KEY}', starting empty");
            return PersistedState::default();
        }
        Err(e) => {
            warn!("Could not read saved garden state: {e}; starting empty");
            return PersistedState::default();
        }
    };

    match decode_state(&blob) {
        Ok(state) => state,
        Err(e) => {
            warn!("Discarding saved garden state: {e}");
            PersistedState::default()
        }
    }
}

/// A single keyed blob slot.
pub trait StateStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, blob: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Stores the blob in a JSON file, replacing it atomically on each save.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, blob: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.dir())?;
        let mut tmp = tempfile::NamedTempFile::new_in(self.dir())?;
        tmp.write_all(blob.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot, used when no data file is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent save fail, as a full or revoked storage would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .blob
            .lock()
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, blob: &str) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".to_string()))?;
        *guard = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
