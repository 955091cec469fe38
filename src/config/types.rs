//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

// ============================================
// HISTORY CONFIG
// ============================================

/// Settings for the clipboard history engine and its monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of items kept in history (default: 20)
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Clipboard polling interval in milliseconds (default: 500)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Text payloads longer than this many bytes are not recorded (default: 100000)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    /// Override for the application-data directory holding the history file.
    /// Supports `~` expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,
}

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            max_items: DEFAULT_MAX_ITEMS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            storage_dir: None,
        }
    }
}

impl HistoryConfig {
    /// History cap, never below 1
    pub fn effective_max_items(&self) -> usize {
        self.max_items.max(1)
    }

    /// Polling interval, clamped to MIN_POLL_INTERVAL_MS
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    /// Resolve the directory the history file lives in.
    ///
    /// Order: configured `storageDir` (tilde-expanded), the platform documents
    /// directory, `~/Documents`, then the temp dir.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return PathBuf::from(shellexpand::tilde(dir).as_ref());
        }
        dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            .unwrap_or_else(std::env::temp_dir)
            .join(DEFAULT_STORAGE_FOLDER)
    }

    /// Full path of the history file
    pub fn history_path(&self) -> PathBuf {
        self.storage_dir().join(HISTORY_FILE_NAME)
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Top-level configuration (~/.clipshelf/config.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    /// Default tracing filter directive, used when RUST_LOG is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history: HistoryConfig::default(),
            log_filter: None,
        }
    }
}

impl Config {
    /// Returns the log filter directive, falling back to the default
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
