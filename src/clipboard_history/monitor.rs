//! Clipboard change monitor
//!
//! One [`ChangeMonitor::poll`] is one timer tick. The monitor only reads the
//! clipboard payload when the change counter has moved since the last tick,
//! so an idle clipboard costs a single integer read per tick.
//!
//! The baseline is taken when monitoring starts or resumes. Whatever was on
//! the clipboard at that moment is treated as already seen.

use tracing::{debug, info};

use super::clipboard::ClipboardSource;
use super::engine::HistoryEngine;
use super::snapshot::read_snapshot;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Monitoring is paused; nothing was read
    Paused,
    /// Change counter unchanged; nothing was read
    Unchanged,
    /// Clipboard changed but holds nothing we record
    Unclassified,
    /// A new item was added to history
    Ingested,
    /// The engine declined the item (duplicate, blank or oversized)
    Skipped,
}

#[derive(Debug, Default)]
pub struct ChangeMonitor {
    baseline: Option<i64>,
    paused: bool,
}

impl ChangeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing from the clipboard's current state.
    pub fn start(&mut self, source: &mut dyn ClipboardSource) {
        let count = source.change_count();
        self.baseline = Some(count);
        self.paused = false;
        info!(change_count = count, "Clipboard monitor started");
    }

    /// Stop reacting to clipboard changes until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("Clipboard monitor paused");
        }
        self.paused = true;
    }

    /// Resume, re-baselining so changes made while paused are not ingested.
    pub fn resume(&mut self, source: &mut dyn ClipboardSource) {
        let count = source.change_count();
        self.baseline = Some(count);
        self.paused = false;
        debug!(change_count = count, "Clipboard monitor resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run one tick against `source`, feeding new content into `engine`.
    pub fn poll(
        &mut self,
        source: &mut dyn ClipboardSource,
        engine: &mut HistoryEngine,
    ) -> PollOutcome {
        if self.paused {
            return PollOutcome::Paused;
        }

        let count = source.change_count();
        let Some(baseline) = self.baseline else {
            // Never started: the first tick only establishes the baseline
            self.baseline = Some(count);
            return PollOutcome::Unchanged;
        };
        if count == baseline {
            return PollOutcome::Unchanged;
        }
        self.baseline = Some(count);

        debug!(previous = baseline, change_count = count, "Clipboard changed");
        let Some(item) = read_snapshot(source) else {
            debug!("Clipboard content not classifiable, ignoring");
            return PollOutcome::Unclassified;
        };

        if engine.ingest(item) {
            PollOutcome::Ingested
        } else {
            PollOutcome::Skipped
        }
    }
}
