//! Clipboard change detection
//!
//! Platform-specific clipboard change-sequence counters.
//! Uses NSPasteboard changeCount on macOS for cheap polling (no payload reads).
//! Elsewhere a counter is synthesised from a content fingerprint.

#[cfg(target_os = "macos")]
use objc::sel;
#[cfg(target_os = "macos")]
use objc::sel_impl;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Get the current clipboard change count.
///
/// On macOS, this reads NSPasteboard.generalPasteboard.changeCount which is
/// a cheap integer read. Returns None on other platforms.
#[cfg(target_os = "macos")]
pub fn get_pasteboard_change_count() -> Option<i64> {
    use cocoa::appkit::NSPasteboard;
    use cocoa::base::nil;
    use objc::runtime::Object;

    unsafe {
        let pasteboard: *mut Object = NSPasteboard::generalPasteboard(nil);
        if pasteboard.is_null() {
            return None;
        }

        // changeCount is an NSInteger (i64 on 64-bit)
        let change_count: i64 = objc::msg_send![pasteboard, changeCount];
        Some(change_count)
    }
}

/// Fallback for non-macOS platforms: always returns None (use fingerprints)
#[cfg(not(target_os = "macos"))]
pub fn get_pasteboard_change_count() -> Option<i64> {
    None
}

/// Fingerprint of a text payload
pub fn text_fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    0u8.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint of a raw image payload.
///
/// Hashes dimensions plus the first 1KB of pixels for quick comparison.
pub fn image_fingerprint(width: usize, height: usize, bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    1u8.hash(&mut hasher);
    width.hash(&mut hasher);
    height.hash(&mut hasher);
    let sample_size = 1024.min(bytes.len());
    bytes[..sample_size].hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint used when the clipboard holds nothing we can read
pub const EMPTY_FINGERPRINT: u64 = 0;

/// Change counter synthesised from payload fingerprints.
///
/// The count advances whenever the observed fingerprint differs from the
/// previous one. Copying identical content twice is invisible to it, which is
/// harmless for history because identical text is deduplicated anyway.
#[derive(Debug, Default)]
pub struct FingerprintCounter {
    last_fingerprint: Option<u64>,
    count: i64,
}

impl FingerprintCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current fingerprint and return the resulting count.
    pub fn observe(&mut self, fingerprint: u64) -> i64 {
        if self.last_fingerprint != Some(fingerprint) {
            if self.last_fingerprint.is_some() {
                self.count = self.count.wrapping_add(1);
                debug!(
                    new_count = self.count,
                    "Clipboard change detected via content fingerprint"
                );
            }
            self.last_fingerprint = Some(fingerprint);
        }
        self.count
    }
}
