//! Clipboard history facade
//!
//! [`ClipboardHistory`] is what a UI holds. It serializes timer ticks and UI
//! calls through one mutex around the engine, the monitor, the clipboard and
//! the timer handle. Ticks never wait for that mutex: a tick that finds it
//! busy is skipped.
//!
//! Operations that write to the live clipboard (select, removing the active
//! item) first record any pending external copy, then pause the monitor for
//! the write and re-baseline afterwards, so the history never records its own
//! write-back.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info};

use super::clipboard::ClipboardSource;
use super::engine::{DayDirection, HistoryEngine, Removal};
use super::monitor::{ChangeMonitor, PollOutcome};
use super::types::{ClipboardItem, ItemId};
use crate::error::{Result, ResultExt};
use crate::scheduler::{ScheduleHandle, Scheduler};

/// Change notification for subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// The item list (and so the filtered view) changed
    ItemsChanged,
    /// The day filter changed to the given value
    FilterChanged(Option<NaiveDate>),
}

struct Shared {
    engine: HistoryEngine,
    monitor: ChangeMonitor,
    source: Box<dyn ClipboardSource>,
    subscribers: Vec<Sender<HistoryEvent>>,
    /// Live timer; `None` while stopped or paused
    schedule: Option<ScheduleHandle>,
}

impl Shared {
    fn notify(&mut self, event: HistoryEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn poll(&mut self) -> PollOutcome {
        let outcome = self.monitor.poll(self.source.as_mut(), &mut self.engine);
        if outcome == PollOutcome::Ingested {
            self.notify(HistoryEvent::ItemsChanged);
        }
        outcome
    }

    /// Cancel the timer, if any. Ticks only `try_lock`, so joining the timer
    /// thread while this lock is held cannot deadlock.
    fn stop_ticks(&mut self) {
        if let Some(handle) = self.schedule.take() {
            handle.cancel();
        }
    }

    /// Run `f` with the monitor paused, then re-baseline so `f`'s clipboard
    /// writes are not ingested. Anything copied since the last tick is
    /// recorded first. A user pause stays in effect.
    fn with_monitor_paused<R>(&mut self, f: impl FnOnce(&mut Shared) -> R) -> R {
        self.poll();

        let was_paused = self.monitor.is_paused();
        self.monitor.pause();

        let result = f(self);

        if !was_paused {
            self.monitor.resume(self.source.as_mut());
        }
        result
    }
}

pub struct ClipboardHistory {
    shared: Arc<Mutex<Shared>>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
}

impl std::fmt::Debug for ClipboardHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let monitoring = self.shared.try_lock().map(|shared| shared.schedule.is_some());
        f.debug_struct("ClipboardHistory")
            .field("interval", &self.interval)
            .field("monitoring", &monitoring)
            .finish()
    }
}

impl Drop for ClipboardHistory {
    fn drop(&mut self) {
        self.shared.lock().stop_ticks();
    }
}

impl ClipboardHistory {
    /// Wire an engine to a clipboard. Monitoring does not start until
    /// [`start_monitoring`](Self::start_monitoring).
    pub fn new(
        engine: HistoryEngine,
        source: Box<dyn ClipboardSource>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                monitor: ChangeMonitor::new(),
                source,
                subscribers: Vec::new(),
                schedule: None,
            })),
            scheduler,
            interval,
        }
    }

    // ============================================
    // MONITORING
    // ============================================

    /// Baseline the clipboard and start polling. No-op if already running.
    pub fn start_monitoring(&self) {
        let mut shared = self.shared.lock();
        if shared.schedule.is_some() {
            debug!("Clipboard monitoring already running");
            return;
        }
        let Shared { monitor, source, .. } = &mut *shared;
        monitor.start(source.as_mut());
        shared.schedule = Some(self.schedule_ticks());
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Clipboard monitoring started"
        );
    }

    /// Stop polling entirely. Clipboard changes made while paused are never
    /// recorded.
    pub fn pause_monitoring(&self) {
        let mut shared = self.shared.lock();
        shared.stop_ticks();
        shared.monitor.pause();
        info!("Clipboard monitoring paused");
    }

    /// Re-baseline the clipboard and resume polling.
    pub fn resume_monitoring(&self) {
        let mut shared = self.shared.lock();
        let Shared { monitor, source, .. } = &mut *shared;
        monitor.resume(source.as_mut());
        if shared.schedule.is_none() {
            shared.schedule = Some(self.schedule_ticks());
        }
        info!("Clipboard monitoring resumed");
    }

    pub fn is_monitoring(&self) -> bool {
        self.shared.lock().schedule.is_some()
    }

    /// Run one monitor tick now, waiting for the lock if needed.
    pub fn poll_now(&self) -> PollOutcome {
        self.shared.lock().poll()
    }

    fn schedule_ticks(&self) -> ScheduleHandle {
        // Weak: the handle lives inside `Shared`
        let shared: Weak<Mutex<Shared>> = Arc::downgrade(&self.shared);
        self.scheduler.schedule(
            self.interval,
            Box::new(move || {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let Some(mut guard) = shared.try_lock() else {
                    debug!("History busy, skipping clipboard tick");
                    return;
                };
                guard.poll();
            }),
        )
    }

    // ============================================
    // UI OPERATIONS
    // ============================================

    /// Put the item at `index` of the filtered view back on the clipboard.
    ///
    /// Returns `Ok(None)` for an out-of-range index. History order is not
    /// changed.
    pub fn select(&self, index: usize) -> Result<Option<ClipboardItem>> {
        let mut shared = self.shared.lock();
        // Resolve before the pending-copy poll can shift indices
        let Some(target) = shared.engine.filtered_items().get(index).map(ClipboardItem::id)
        else {
            debug!(index, "Select: index out of range");
            return Ok(None);
        };

        shared.with_monitor_paused(|shared| {
            let Some(item) = shared.engine.activate(target) else {
                debug!(item_id = %target, "Select: item evicted before write-back");
                return Ok(None);
            };
            shared.source.write(item.content())?;
            info!(item_id = %item.id(), kind = %item.kind(), "Copied history item to clipboard");
            Ok(Some(item))
        })
    }

    /// Remove an item. If it was the live clipboard content, the clipboard is
    /// cleared as well.
    pub fn remove(&self, id: ItemId) -> Removal {
        let mut shared = self.shared.lock();
        let removal = if shared.engine.active_id() == Some(id) {
            shared.with_monitor_paused(|shared| {
                // The pending-copy poll may have made another item active
                let removal = shared.engine.remove(id);
                if removal.should_clear_clipboard() {
                    shared.source.clear().log_err();
                }
                removal
            })
        } else {
            shared.engine.remove(id)
        };
        if removal.removed() {
            shared.notify(HistoryEvent::ItemsChanged);
        }
        removal
    }

    /// Empty the history. The live clipboard is left alone.
    pub fn clear_all(&self) {
        let mut shared = self.shared.lock();
        shared.engine.clear_all();
        shared.notify(HistoryEvent::ItemsChanged);
    }

    pub fn set_filter(&self, date: Option<NaiveDate>) {
        let mut shared = self.shared.lock();
        let before = shared.engine.filter();
        shared.engine.set_filter(date);
        if before != date {
            shared.notify(HistoryEvent::FilterChanged(date));
        }
    }

    /// Step the day filter; returns the new filter.
    pub fn navigate_day(&self, direction: DayDirection) -> Option<NaiveDate> {
        let mut shared = self.shared.lock();
        let before = shared.engine.filter();
        let after = shared.engine.navigate_day(direction);
        if before != after {
            shared.notify(HistoryEvent::FilterChanged(after));
        }
        after
    }

    // ============================================
    // READS
    // ============================================

    pub fn filtered_items(&self) -> Vec<ClipboardItem> {
        self.shared.lock().engine.filtered_items().to_vec()
    }

    pub fn items(&self) -> Vec<ClipboardItem> {
        self.shared.lock().engine.items().to_vec()
    }

    pub fn filter(&self) -> Option<NaiveDate> {
        self.shared.lock().engine.filter()
    }

    pub fn active_id(&self) -> Option<ItemId> {
        self.shared.lock().engine.active_id()
    }

    pub fn available_days(&self) -> Vec<NaiveDate> {
        self.shared.lock().engine.available_days()
    }

    pub fn revision(&self) -> u64 {
        self.shared.lock().engine.revision()
    }

    /// Receive a [`HistoryEvent`] whenever the list or the filter changes.
    pub fn subscribe(&self) -> Receiver<HistoryEvent> {
        let (tx, rx) = mpsc::channel();
        self.shared.lock().subscribers.push(tx);
        rx
    }
}
