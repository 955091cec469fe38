//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.clipshelf/logs/clipshelf.jsonl) - structured, one event per line
//! - **Compact to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use clipshelf::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init(config.log_filter());
//!
//! // Use tracing macros directly
//! tracing::info!(item_id = %id, "Recording clipboard item");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2024-12-25T10:30:45.123Z","level":"INFO","target":"clipshelf::clipboard_history::engine","fields":{"message":"Recording clipboard item","item_id":"…","kind":"text"}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "clipshelf.jsonl";

/// Used when neither RUST_LOG nor the configured directive parses
const FALLBACK_FILTER: &str = "info";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// `default_directive` is the filter used when `RUST_LOG` is unset. If the
/// log file can't be opened, logging continues on stderr only.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
pub fn init(default_directive: &str) -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join(LOG_FILE_NAME);

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "[LOGGING] Failed to open log file {}: {} (stderr only)",
                log_path.display(),
                e
            );
            None
        }
    };

    let (json_layer, file_guard) = match file {
        Some(file) => {
            // Non-blocking so a slow disk never stalls the monitor thread
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let compact_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let initialized = tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(json_layer)
        .with(compact_layer)
        .try_init();
    if let Err(e) = initialized {
        eprintln!("[LOGGING] Subscriber already installed: {}", e);
    }

    tracing::info!(
        log_path = %log_path.display(),
        file_logging = file_guard.is_some(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// RUST_LOG if set and valid, else `default_directive`, else `info`.
fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Get the log directory path (~/.clipshelf/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".clipshelf").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("clipshelf-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_location() {
        let path = log_path();
        assert!(path.ends_with(LOG_FILE_NAME));
        assert_eq!(
            path.parent().and_then(|p| p.file_name()),
            Some(std::ffi::OsStr::new("logs"))
        );
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        // Must not panic on garbage
        let _ = env_filter("clipshelf=[[[");
        let _ = env_filter("debug");
    }
}
