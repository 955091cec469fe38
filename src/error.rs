use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for clipshelf
#[derive(Error, Debug)]
pub enum Error {
    #[error("Clipboard operation failed: {0}")]
    Clipboard(String),

    #[error("Image processing failed: {0}")]
    Image(String),

    #[error("Storage I/O failed for '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode or decode history: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Wrap a platform clipboard failure (arboard / AppKit).
    pub(crate) fn clipboard(err: anyhow::Error) -> Self {
        Self::Clipboard(format!("{:#}", err))
    }

    /// Whether the failure leaves in-memory state intact and can be ignored
    /// for the rest of the session.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage { .. } | Self::Codec(_) | Self::Config(_) => true,
            Self::Clipboard(_) | Self::Image(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use clipshelf::error::ResultExt;
///
/// // Log and keep going if the history file can't be written
/// store.save(&items).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
