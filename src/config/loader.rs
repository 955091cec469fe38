//! Configuration loading from file system

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::CONFIG_PATH;
use super::types::Config;

/// Load configuration from ~/.clipshelf/config.json
///
/// Returns Config::default() if the file is missing or fails to parse.
#[instrument(name = "load_config")]
pub fn load_config() -> Config {
    let config_path = PathBuf::from(shellexpand::tilde(CONFIG_PATH).as_ref());
    load_config_from(&config_path)
}

/// Load configuration from an explicit path.
///
/// Never fails: every problem is logged and answered with defaults.
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };

    if content.trim().is_empty() {
        info!(path = %config_path.display(), "Config file is empty, using defaults");
        return Config::default();
    }

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!(
                path = %config_path.display(),
                max_items = config.history.max_items,
                poll_interval_ms = config.history.poll_interval_ms,
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
