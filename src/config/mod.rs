//! Configuration module - Application settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.clipshelf/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, HistoryConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_MAX_ITEMS, DEFAULT_MAX_TEXT_LENGTH, DEFAULT_POLL_INTERVAL_MS, HISTORY_FILE_NAME,
};

pub use types::{Config, HistoryConfig};

pub use loader::{load_config, load_config_from};

#[cfg(test)]
pub use defaults::{DEFAULT_LOG_FILTER, MIN_POLL_INTERVAL_MS};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
