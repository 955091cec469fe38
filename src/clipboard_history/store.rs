//! History persistence
//!
//! [`HistoryStore`] is the seam between the engine and durable storage.
//! [`FileStore`] keeps the whole history in one JSON file and rewrites it
//! atomically on every save. [`MemoryStore`] keeps nothing on disk; it backs
//! the session when the storage directory is unusable, and backs tests.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::codec;
use super::types::ClipboardItem;
use crate::config::HISTORY_FILE_NAME;
use crate::error::{Error, Result};

/// Durable storage for the full history list.
pub trait HistoryStore: Send + Sync {
    /// Load the stored history, most recent first.
    ///
    /// Never fails: a missing or unreadable file is an empty history.
    fn load(&self) -> Vec<ClipboardItem>;

    /// Replace the stored history with `items`.
    fn save(&self, items: &[ClipboardItem]) -> Result<()>;

    /// Remove any stored history, leaving a fresh empty one behind.
    fn clear(&self) -> Result<()>;
}

impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    fn load(&self) -> Vec<ClipboardItem> {
        (**self).load()
    }

    fn save(&self, items: &[ClipboardItem]) -> Result<()> {
        (**self).save(items)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// History kept in a single JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    file_path: PathBuf,
}

impl FileStore {
    /// Open the store in `dir`, creating the directory if needed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::storage(dir, e))?;
        let store = Self::with_path(dir.join(HISTORY_FILE_NAME));
        info!(path = %store.file_path.display(), "History store ready");
        Ok(store)
    }

    /// Store at an explicit file path. The parent directory is not created.
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        self.file_path.with_extension("json.tmp")
    }
}

impl HistoryStore for FileStore {
    fn load(&self) -> Vec<ClipboardItem> {
        let bytes = match std::fs::read(&self.file_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "No history file yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "Failed to read history file");
                return Vec::new();
            }
        };

        match codec::decode(&bytes) {
            Ok(items) => {
                info!(
                    path = %self.file_path.display(),
                    count = items.len(),
                    "Loaded clipboard history"
                );
                items
            }
            Err(e) => {
                warn!(
                    path = %self.file_path.display(),
                    error = %e,
                    "History file is corrupt, starting empty"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, items: &[ClipboardItem]) -> Result<()> {
        let bytes = codec::encode(items)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, &bytes).map_err(|e| Error::storage(&temp_path, e))?;
        std::fs::rename(&temp_path, &self.file_path)
            .map_err(|e| Error::storage(&self.file_path, e))?;

        debug!(
            path = %self.file_path.display(),
            count = items.len(),
            bytes = bytes.len(),
            "Saved clipboard history (atomic)"
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.file_path) {
            Ok(()) => info!(path = %self.file_path.display(), "Deleted history file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::storage(&self.file_path, e)),
        }
        self.save(&[])
    }
}

/// History kept only in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<ClipboardItem>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, as if `items` had been saved earlier
    pub fn with_items(items: Vec<ClipboardItem>) -> Self {
        Self {
            items: Mutex::new(items),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful saves (clears included)
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn items(&self) -> Vec<ClipboardItem> {
        self.items.lock().clone()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Vec<ClipboardItem> {
        self.items.lock().clone()
    }

    fn save(&self, items: &[ClipboardItem]) -> Result<()> {
        *self.items.lock() = items.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}
