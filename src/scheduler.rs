//! Interval scheduling for recurring work.
//!
//! `Scheduler` is the seam between recurring work (the clipboard monitor) and
//! the clock. Production code uses [`ThreadScheduler`], which drives a callback
//! from a dedicated thread; tests use [`ManualScheduler`] and fire ticks by hand
//! so no real time has to pass.
//!
//! # Example Usage
//! ```rust,ignore
//! use std::time::Duration;
//! use clipshelf::scheduler::{Scheduler, ThreadScheduler};
//!
//! let scheduler = ThreadScheduler::new("clipboard-monitor");
//! let handle = scheduler.schedule(Duration::from_millis(500), Box::new(|| poll_clipboard()));
//!
//! // Later: stop all further ticks
//! handle.cancel();
//! ```

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Work run on every tick.
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Schedules a callback to run repeatedly at a fixed interval.
pub trait Scheduler: Send + Sync {
    /// Start running `callback` every `interval` until the returned handle is
    /// cancelled or dropped.
    fn schedule(&self, interval: Duration, callback: TickCallback) -> ScheduleHandle;
}

/// Cancellation handle for a scheduled callback.
///
/// Cancelling (or dropping) the handle stops all further ticks. For the
/// thread scheduler the timer thread is joined, so once `cancel` returns no
/// tick is running or pending.
pub struct ScheduleHandle {
    cancelled: Arc<AtomicBool>,
    worker: Option<(Thread, JoinHandle<()>)>,
}

impl ScheduleHandle {
    fn detached(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            worker: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stop further ticks.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some((thread, join)) = self.worker.take() {
            thread.unpark();
            // A tick that cancels its own schedule can't join itself
            if thread.id() == thread::current().id() {
                return;
            }
            if join.join().is_err() {
                error!("Scheduler thread panicked");
            }
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("cancelled", &self.is_cancelled())
            .field("threaded", &self.worker.is_some())
            .finish()
    }
}

// ============================================
// THREAD SCHEDULER
// ============================================

/// Runs each schedule on its own named background thread.
///
/// The loop sleeps for whatever is left of the interval after the callback
/// returns. A callback that overruns its interval simply delays the next tick;
/// ticks never pile up.
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    thread_name: String,
}

impl ThreadScheduler {
    pub fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, interval: Duration, mut callback: TickCallback) -> ScheduleHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let spawned = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                debug!(interval_ms = interval.as_millis() as u64, "Scheduler loop started");
                loop {
                    if flag.load(Ordering::Acquire) {
                        break;
                    }

                    let start = Instant::now();
                    callback();

                    // Park instead of sleep so cancel() can wake us immediately
                    let deadline = start + interval;
                    loop {
                        if flag.load(Ordering::Acquire) {
                            break;
                        }
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        thread::park_timeout(deadline - now);
                    }
                }
                debug!("Scheduler loop stopped");
            });

        match spawned {
            Ok(join) => {
                let thread = join.thread().clone();
                ScheduleHandle {
                    cancelled,
                    worker: Some((thread, join)),
                }
            }
            Err(e) => {
                error!(error = %e, thread = %self.thread_name, "Failed to spawn scheduler thread");
                cancelled.store(true, Ordering::Release);
                ScheduleHandle::detached(cancelled)
            }
        }
    }
}

// ============================================
// MANUAL SCHEDULER
// ============================================

struct ManualEntry {
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    callback: Arc<Mutex<TickCallback>>,
}

/// Scheduler whose ticks are fired explicitly with [`ManualScheduler::tick`].
///
/// Used by tests and by hosts that already own an event loop and want to drive
/// the monitor from it.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    entries: Arc<Mutex<Vec<ManualEntry>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every live callback once. Returns how many callbacks ran.
    pub fn tick(&self) -> usize {
        // Snapshot first: a callback may schedule or cancel while we iterate
        let live: Vec<(Arc<AtomicBool>, Arc<Mutex<TickCallback>>)> = {
            let mut entries = self.entries.lock();
            entries.retain(|e| !e.cancelled.load(Ordering::Acquire));
            entries
                .iter()
                .map(|e| (e.cancelled.clone(), e.callback.clone()))
                .collect()
        };

        let mut ran = 0;
        for (cancelled, callback) in live {
            if cancelled.load(Ordering::Acquire) {
                continue;
            }
            (callback.lock())();
            ran += 1;
        }
        ran
    }

    /// Number of schedules that have not been cancelled
    pub fn active_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Intervals of the live schedules, in registration order
    pub fn intervals(&self) -> Vec<Duration> {
        self.entries
            .lock()
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::Acquire))
            .map(|e| e.interval)
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, interval: Duration, callback: TickCallback) -> ScheduleHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries.lock().push(ManualEntry {
            interval,
            cancelled: cancelled.clone(),
            callback: Arc::new(Mutex::new(callback)),
        });
        info!(interval_ms = interval.as_millis() as u64, "Manual schedule registered");
        ScheduleHandle::detached(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_callback(counter: &Arc<AtomicUsize>) -> TickCallback {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_manual_scheduler_runs_on_tick_only() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _handle = scheduler.schedule(Duration::from_millis(500), counter_callback(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0, "No tick without tick()");

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.intervals(), vec![Duration::from_millis(500)]);
    }

    #[test]
    fn test_manual_cancel_stops_ticks() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_millis(500), counter_callback(&counter));
        assert_eq!(scheduler.active_count(), 1);

        handle.cancel();
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.tick(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let _handle =
                scheduler.schedule(Duration::from_millis(100), counter_callback(&counter));
            scheduler.tick();
        }

        scheduler.tick();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_callback_may_schedule_during_tick() {
        let scheduler = ManualScheduler::new();
        let inner = scheduler.clone();
        let spawned: Arc<Mutex<Vec<ScheduleHandle>>> = Arc::new(Mutex::new(Vec::new()));
        let spawned_in_cb = spawned.clone();

        let _handle = scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                let h = inner.schedule(Duration::from_millis(10), Box::new(|| {}));
                spawned_in_cb.lock().push(h);
            }),
        );

        scheduler.tick();
        assert_eq!(scheduler.active_count(), 2);
        assert_eq!(spawned.lock().len(), 1);
    }

    #[test]
    fn test_thread_scheduler_ticks_and_cancels() {
        let scheduler = ThreadScheduler::new("scheduler-test");
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_millis(5), counter_callback(&counter));

        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(counter.load(Ordering::SeqCst) >= 3, "Expected a few ticks");

        handle.cancel();
        let after_cancel = counter.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            after_cancel,
            "No ticks after cancel returns"
        );
    }
}
