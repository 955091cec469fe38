//! History engine
//!
//! Owns the in-memory history (most recent first), the day filter and its
//! projection, and the identity of the item currently on the clipboard.
//! Every mutation of the list is written through to the [`HistoryStore`]
//! synchronously; write failures are logged and otherwise ignored.

use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::store::HistoryStore;
use super::types::{ClipboardContent, ClipboardItem, ItemId};
use crate::config::HistoryConfig;
use crate::error::ResultExt;

/// Direction for day-by-day filter navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayDirection {
    Forward,
    Backward,
}

/// Result of [`HistoryEngine::remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// No item had that id
    NotFound,
    /// The item was removed
    Removed,
    /// The item was removed and it was the live clipboard content, which the
    /// caller should now clear
    RemovedActive,
}

impl Removal {
    pub fn removed(self) -> bool {
        !matches!(self, Removal::NotFound)
    }

    pub fn should_clear_clipboard(self) -> bool {
        matches!(self, Removal::RemovedActive)
    }
}

pub struct HistoryEngine {
    items: Vec<ClipboardItem>,
    filter: Option<NaiveDate>,
    filtered: Vec<ClipboardItem>,
    active_id: Option<ItemId>,
    max_items: usize,
    max_text_len: usize,
    store: Box<dyn HistoryStore>,
    /// Bumped on every change to `items` or `filter`
    revision: u64,
}

impl std::fmt::Debug for HistoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEngine")
            .field("items", &self.items.len())
            .field("filter", &self.filter)
            .field("filtered", &self.filtered.len())
            .field("active_id", &self.active_id)
            .field("max_items", &self.max_items)
            .field("revision", &self.revision)
            .finish()
    }
}

impl HistoryEngine {
    /// Load history from `store` using the configured limits.
    pub fn new(store: Box<dyn HistoryStore>, config: &HistoryConfig) -> Self {
        Self::with_limits(store, config.effective_max_items(), config.max_text_length)
    }

    pub fn with_limits(
        store: Box<dyn HistoryStore>,
        max_items: usize,
        max_text_len: usize,
    ) -> Self {
        let max_items = max_items.max(1);
        let (items, repaired) = repair_loaded(store.load(), max_items);

        let mut engine = Self {
            items,
            filter: None,
            filtered: Vec::new(),
            active_id: None,
            max_items,
            max_text_len,
            store,
            revision: 0,
        };
        if repaired {
            engine.persist();
        }
        engine.recompute_filtered();
        info!(count = engine.items.len(), max_items, "History engine ready");
        engine
    }

    // ============================================
    // INGEST
    // ============================================

    /// Add a freshly observed clipboard item.
    ///
    /// Returns false when the candidate is rejected (blank or oversized text)
    /// or an equivalent item is already in history. On a duplicate the
    /// existing item becomes the active one and keeps its position.
    pub fn ingest(&mut self, candidate: ClipboardItem) -> bool {
        if let Some(text) = candidate.text_content() {
            if text.trim().is_empty() {
                debug!("Ignoring blank clipboard text");
                return false;
            }
            if text.len() > self.max_text_len {
                warn!(
                    len = text.len(),
                    max = self.max_text_len,
                    "Clipboard text too large, not recording"
                );
                return false;
            }
        }

        if let Some(existing) = self
            .items
            .iter()
            .find(|item| is_equivalent(item.content(), candidate.content()))
        {
            debug!(
                existing_id = %existing.id(),
                kind = %candidate.kind(),
                "Clipboard content already in history"
            );
            self.active_id = Some(existing.id());
            return false;
        }

        info!(item_id = %candidate.id(), kind = %candidate.kind(), "Recording clipboard item");
        self.active_id = Some(candidate.id());
        self.items.insert(0, candidate);

        if self.items.len() > self.max_items {
            let evicted = self.items.split_off(self.max_items);
            for item in &evicted {
                debug!(item_id = %item.id(), "Evicted oldest history item");
            }
        }

        self.persist();
        self.recompute_filtered();
        true
    }

    // ============================================
    // SELECTION / REMOVAL
    // ============================================

    /// Item at `index` of the filtered view, for write-back to the clipboard.
    ///
    /// Marks it active; history order is unchanged. Out-of-range is `None`.
    pub fn select(&mut self, index: usize) -> Option<ClipboardItem> {
        let id = self.filtered.get(index)?.id();
        debug!(index, item_id = %id, "Selected history item");
        self.activate(id)
    }

    /// Mark the item with `id` as the live clipboard content. `None` if it is
    /// no longer in history.
    pub fn activate(&mut self, id: ItemId) -> Option<ClipboardItem> {
        let item = self.get(id)?.clone();
        self.active_id = Some(id);
        Some(item)
    }

    pub fn remove(&mut self, id: ItemId) -> Removal {
        let Some(position) = self.items.iter().position(|item| item.id() == id) else {
            debug!(item_id = %id, "Remove: no such item");
            return Removal::NotFound;
        };

        self.items.remove(position);
        let was_active = self.active_id == Some(id);
        if was_active {
            self.active_id = None;
        }
        info!(item_id = %id, was_active, "Removed history item");

        self.persist();
        self.recompute_filtered();

        if was_active {
            Removal::RemovedActive
        } else {
            Removal::Removed
        }
    }

    pub fn clear_all(&mut self) {
        let count = self.items.len();
        self.items.clear();
        self.active_id = None;
        self.store.clear().warn_on_err();
        self.recompute_filtered();
        info!(count, "Cleared clipboard history");
    }

    // ============================================
    // DAY FILTER
    // ============================================

    /// Show only items created on `date` (local calendar day), or everything
    /// for `None`.
    pub fn set_filter(&mut self, date: Option<NaiveDate>) {
        if self.filter != date {
            debug!(?date, "History filter changed");
        }
        self.filter = date;
        self.recompute_filtered();
    }

    /// Move the filter one day, relative to the local current date.
    pub fn navigate_day(&mut self, direction: DayDirection) -> Option<NaiveDate> {
        self.navigate_day_from(direction, Local::now().date_naive())
    }

    /// [`navigate_day`](Self::navigate_day) with an explicit "today".
    ///
    /// Unfiltered + backward anchors at today; unfiltered + forward does
    /// nothing; forward from today (or later) clears the filter.
    pub fn navigate_day_from(
        &mut self,
        direction: DayDirection,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        let next = match (self.filter, direction) {
            (None, DayDirection::Forward) => return None,
            (None, DayDirection::Backward) => Some(today),
            (Some(day), DayDirection::Forward) if day >= today => None,
            (Some(day), DayDirection::Forward) => day.succ_opt(),
            (Some(day), DayDirection::Backward) => day.pred_opt().or(Some(day)),
        };
        self.set_filter(next);
        next
    }

    // ============================================
    // ACCESSORS
    // ============================================

    /// Full history, most recent first
    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    /// History as seen through the active filter
    pub fn filtered_items(&self) -> &[ClipboardItem] {
        &self.filtered
    }

    pub fn filter(&self) -> Option<NaiveDate> {
        self.filter
    }

    /// Item believed to be on the live clipboard
    pub fn active_id(&self) -> Option<ItemId> {
        self.active_id
    }

    pub fn get(&self, id: ItemId) -> Option<&ClipboardItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Distinct local days present in history, newest first
    pub fn available_days(&self) -> Vec<NaiveDate> {
        let mut seen = HashSet::new();
        let mut days: Vec<NaiveDate> = self
            .items
            .iter()
            .map(ClipboardItem::local_date)
            .filter(|day| seen.insert(*day))
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        days
    }

    fn persist(&self) {
        self.store.save(&self.items).warn_on_err();
    }

    fn recompute_filtered(&mut self) {
        self.filtered = match self.filter {
            Some(day) => self
                .items
                .iter()
                .filter(|item| item.local_date() == day)
                .cloned()
                .collect(),
            None => self.items.clone(),
        };
        self.revision += 1;
    }
}

/// Equivalence used for dedup: same text, or images of the same dimensions
/// (image and web image compare with each other).
fn is_equivalent(existing: &ClipboardContent, candidate: &ClipboardContent) -> bool {
    match (existing.text_content(), candidate.text_content()) {
        (Some(a), Some(b)) => a == b,
        (None, None) => match (existing.image_content(), candidate.image_content()) {
            (Some(a), Some(b)) => a.dimensions() == b.dimensions(),
            _ => false,
        },
        _ => false,
    }
}

/// Drop duplicate ids and anything past the cap. Returns whether anything
/// changed.
fn repair_loaded(mut items: Vec<ClipboardItem>, max_items: usize) -> (Vec<ClipboardItem>, bool) {
    let loaded = items.len();
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.id()));
    if items.len() != loaded {
        warn!(dropped = loaded - items.len(), "Dropped history items with duplicate ids");
    }
    if items.len() > max_items {
        info!(loaded = items.len(), max_items, "Stored history exceeds the cap, truncating");
        items.truncate(max_items);
    }
    let repaired = items.len() != loaded;
    (items, repaired)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
