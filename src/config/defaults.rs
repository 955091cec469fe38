//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Maximum number of history items kept (oldest evicted first)
pub const DEFAULT_MAX_ITEMS: usize = 20;

/// Clipboard polling interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Lower bound for the polling interval; anything faster is clamped
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Default max text length for clipboard history entries (bytes)
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 100_000;

/// Default tracing filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Name of the application-data folder created under the documents directory
pub const DEFAULT_STORAGE_FOLDER: &str = "Clipshelf";

/// History file name inside the storage directory
pub const HISTORY_FILE_NAME: &str = "clipboard_history.json";

/// Location of the user config file
pub const CONFIG_PATH: &str = "~/.clipshelf/config.json";
