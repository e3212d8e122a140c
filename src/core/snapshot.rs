//! # Snapshot Persistence
//!
//! The durable projection of a list controller, keyed per controller
//! instance. `FileSnapshotStore` keeps one JSON file per key under
//! `~/.pokedex/snapshots/`; `MemorySnapshotStore` keeps them in-process.
//!
//! File writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::Item;

/// First visible item plus the sub-item offset within it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    pub index: usize,
    pub offset: i32,
}

/// Everything needed to resume a list after the process is torn down.
///
/// Invariant: `offset == items.len()` whenever no fetch is in flight.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SnapshotRecord {
    pub offset: usize,
    pub page_size: u32,
    pub has_more: bool,
    pub items: Vec<Item>,
    pub scroll: ScrollPosition,
    pub anchor_id: Option<u32>,
    pub selected_id: Option<u32>,
    pub last_error: Option<String>,
    /// Unix seconds of the last save.
    pub saved_at: i64,
}

impl Default for SnapshotRecord {
    fn default() -> Self {
        Self::new(crate::catalog::DEFAULT_PAGE_SIZE.get())
    }
}

impl SnapshotRecord {
    pub fn new(page_size: u32) -> Self {
        Self {
            offset: 0,
            page_size,
            has_more: true,
            items: Vec::new(),
            scroll: ScrollPosition::default(),
            anchor_id: None,
            selected_id: None,
            last_error: None,
            saved_at: 0,
        }
    }

    /// Index the renderer should bring into view after a restore.
    ///
    /// The stored index wins while it still points at the anchor item.
    /// After a relayout it may not, so the anchor's current position is
    /// used instead; failing both, the stored index is clamped to the list.
    pub fn restore_index(&self) -> usize {
        if self.items.is_empty() {
            return 0;
        }
        if let Some(anchor) = self.anchor_id {
            if self.items.get(self.scroll.index).map(|item| item.id) == Some(anchor) {
                return self.scroll.index;
            }
            if let Some(pos) = self.items.iter().position(|item| item.id == anchor) {
                return pos;
            }
        }
        self.scroll.index.min(self.items.len() - 1)
    }

    /// Index of the last selected item, if it is still in the list.
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected_id?;
        self.items.iter().position(|item| item.id == id)
    }

    pub fn touch(&mut self) {
        self.saved_at = Utc::now().timestamp();
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Parse(serde_json::Error),
    InvalidKey(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "snapshot I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "snapshot parse error: {e}"),
            StoreError::InvalidKey(key) => write!(f, "invalid snapshot key: {key:?}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ============================================================================
// Stores
// ============================================================================

/// Key-value persistence for snapshots. Survives process death when backed by disk.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<SnapshotRecord>, StoreError>;

    fn save(&self, key: &str, record: &SnapshotRecord) -> Result<(), StoreError>;

    /// Deletes the record. Missing keys are not an error.
    fn discard(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per snapshot.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns `~/.pokedex/snapshots/`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pokedex").join("snapshots"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data).map_err(StoreError::Parse)?;
    fs::write(&tmp_path, json).map_err(StoreError::Io)?;
    fs::rename(&tmp_path, path).map_err(StoreError::Io)?;
    Ok(())
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<SnapshotRecord>, StoreError> {
        let path = self.path_for(key)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let record = serde_json::from_str(&json).map_err(StoreError::Parse)?;
        debug!("Snapshot loaded from {}", path.display());
        Ok(Some(record))
    }

    fn save(&self, key: &str, record: &SnapshotRecord) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(StoreError::Io)?;
        atomic_write_json(&path, record)
    }

    fn discard(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// In-process store for tests and hosts without durable storage.
#[derive(Default)]
pub struct MemorySnapshotStore {
    records: Mutex<HashMap<String, SnapshotRecord>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<SnapshotRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Io(io::Error::other("snapshot store lock poisoned")))?;
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &str, record: &SnapshotRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Io(io::Error::other("snapshot store lock poisoned")))?;
        records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn discard(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Io(io::Error::other("snapshot store lock poisoned")))?;
        records.remove(key);
        Ok(())
    }
}
