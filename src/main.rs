//! Headless clipboard history daemon.
//!
//! Records clipboard changes into the history file until killed. A UI attaches
//! through the library's `ClipboardHistory`; this binary has no options.

use std::process::ExitCode;

use clipshelf::clipboard_history::{self, HistoryEvent, DEFAULT_PREVIEW_CHARS};
use clipshelf::{config, logging};
use tracing::{debug, error, info};

fn main() -> ExitCode {
    let loaded_config = config::load_config();
    let _guard = logging::init(loaded_config.log_filter());

    info!(
        max_items = loaded_config.history.effective_max_items(),
        poll_interval_ms = loaded_config.history.poll_interval().as_millis() as u64,
        history_path = %loaded_config.history.history_path().display(),
        "clipshelf starting"
    );

    let history = match clipboard_history::init_clipboard_history(&loaded_config) {
        Ok(history) => history,
        Err(e) => {
            error!(error = %e, "Failed to initialize clipboard history");
            return ExitCode::FAILURE;
        }
    };

    let events = history.subscribe();
    history.start_monitoring();

    // The history keeps the sender alive, so this only ends if it is dropped
    for event in events {
        match event {
            HistoryEvent::ItemsChanged => {
                let items = history.items();
                let latest = items
                    .first()
                    .map(|item| item.preview(DEFAULT_PREVIEW_CHARS))
                    .unwrap_or_default();
                info!(count = items.len(), latest = %latest, "Clipboard history updated");
            }
            HistoryEvent::FilterChanged(date) => debug!(?date, "History filter changed"),
        }
    }

    ExitCode::SUCCESS
}
