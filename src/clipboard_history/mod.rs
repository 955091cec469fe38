//! Clipboard History Module
//!
//! Keeps a bounded, deduplicated, most-recent-first history of what has been
//! on the system clipboard, persisted to a JSON file.
//!
//! ## Features
//! - Text, images, and images copied from the web (with their source URL)
//! - Change-counter polling: payloads are only read after the clipboard changes
//! - Dedup on insert, eviction of the oldest item past the cap (default 20)
//! - Select an item to put it back on the clipboard without re-recording it
//! - Filter by calendar day and step day-by-day
//!
//! ## Module Structure
//! - `types`: Core types (ClipboardItem, ClipboardContent, ContentKind, ItemId)
//! - `image`: PNG-normalised image payloads
//! - `clipboard`: System clipboard access behind `ClipboardSource`
//! - `change_detection`: Clipboard change counters
//! - `snapshot`: Classifies the current clipboard into an item
//! - `codec`: JSON encoding of the history file
//! - `store`: File and in-memory persistence
//! - `engine`: History list, dedup/eviction and the day filter
//! - `monitor`: Per-tick change detection feeding the engine
//! - `history`: Thread-safe facade used by the UI

mod change_detection;
mod clipboard;
mod codec;
mod engine;
mod history;
mod image;
mod monitor;
mod snapshot;
mod store;
mod types;

#[cfg(test)]
mod test_support;

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::scheduler::ThreadScheduler;

// Re-export public API

// Types
pub use types::{
    parse_text_url, ClipboardContent, ClipboardItem, ContentKind, ItemId, DEFAULT_PREVIEW_CHARS,
};

// Images
pub use image::{has_image_extension, ClipImage, IMAGE_FILE_EXTENSIONS};

// Clipboard access
pub use clipboard::{image_source_from_html, ClipboardSource, SystemClipboard};

// Snapshot reader
pub use snapshot::{read_snapshot, read_snapshot_at};

// Persistence
pub use codec::{decode, encode, FORMAT_VERSION};
pub use store::{FileStore, HistoryStore, MemoryStore};

// Engine / monitor / facade
pub use engine::{DayDirection, HistoryEngine, Removal};
pub use history::{ClipboardHistory, HistoryEvent};
pub use monitor::{ChangeMonitor, PollOutcome};

/// Build the clipboard history for this process from `config`.
///
/// Loads the stored history and wires it to the system clipboard with a
/// background polling thread. Monitoring is not started; call
/// [`ClipboardHistory::start_monitoring`].
///
/// If the storage directory can't be created the history still works, but
/// only in memory for this session.
///
/// # Errors
/// Returns error if the system clipboard is unavailable.
pub fn init_clipboard_history(config: &Config) -> Result<ClipboardHistory> {
    let history_config = &config.history;
    let storage_dir = history_config.storage_dir();

    let store = open_store(&storage_dir);

    let source = SystemClipboard::new()?;
    let engine = HistoryEngine::new(store, history_config);

    info!(
        max_items = engine.max_items(),
        loaded = engine.len(),
        poll_interval_ms = history_config.poll_interval().as_millis() as u64,
        "Initializing clipboard history"
    );

    Ok(ClipboardHistory::new(
        engine,
        Box::new(source),
        Arc::new(ThreadScheduler::new("clipboard-monitor")),
        history_config.poll_interval(),
    ))
}

/// Open the history file store in `dir`, falling back to a memory-only store
/// when the directory can't be created.
fn open_store(dir: &Path) -> Box<dyn HistoryStore> {
    match FileStore::open(dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(
                dir = %dir.display(),
                error = %e,
                "History directory unavailable, keeping history in memory only"
            );
            Box::new(MemoryStore::new())
        }
    }
}
