//! clipshelf - clipboard history engine
//!
//! This library watches the system clipboard and keeps a bounded,
//! deduplicated history of what was copied, persisted across restarts.

pub mod clipboard_history;
pub mod config;
pub mod error;
pub mod logging;

// Interval scheduling for the clipboard monitor
pub mod scheduler;
