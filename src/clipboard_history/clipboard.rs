//! System clipboard access
//!
//! [`ClipboardSource`] is everything the history needs from the live
//! clipboard: a change counter, the payload readers used by the snapshot
//! reader, and write-back. [`SystemClipboard`] implements it on top of
//! arboard, opening a fresh handle per operation.

use anyhow::{Context, Result as AnyResult};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

use super::change_detection::{
    get_pasteboard_change_count, image_fingerprint, text_fingerprint, FingerprintCounter,
    EMPTY_FINGERPRINT,
};
use super::image::ClipImage;
use super::types::ClipboardContent;
use crate::error::{Error, Result};

/// The live clipboard as seen by the history.
///
/// Readers return `None`/empty when the clipboard has nothing of that type;
/// they never mutate the clipboard.
pub trait ClipboardSource: Send {
    /// Monotonic change-sequence counter. Advances whenever the clipboard
    /// content is replaced.
    fn change_count(&mut self) -> i64;

    /// Native image object or raw bitmap on the clipboard
    fn read_image(&mut self) -> Option<ClipImage>;

    /// File references on the clipboard (e.g. a copied image file)
    fn read_file_paths(&mut self) -> Vec<PathBuf>;

    /// URL the clipboard content was copied from, if the copying app
    /// attached one
    fn read_source_url(&mut self) -> Option<String>;

    /// Plain text on the clipboard
    fn read_text(&mut self) -> Option<String>;

    /// Replace the clipboard content with a history payload
    fn write(&mut self, content: &ClipboardContent) -> Result<()>;

    /// Empty the clipboard
    fn clear(&mut self) -> Result<()>;
}

/// The platform clipboard, via arboard.
///
/// On macOS the change counter is NSPasteboard's `changeCount`. Elsewhere the
/// counter is synthesised from a fingerprint of the current payload, so each
/// `change_count` call reads the clipboard. Text is tried first; only when
/// the clipboard holds no text is the image read, and arboard decodes the
/// full bitmap for that. An image left on the clipboard therefore costs one
/// bitmap decode per tick on those platforms.
#[derive(Debug, Default)]
pub struct SystemClipboard {
    fingerprints: FingerprintCounter,
}

impl SystemClipboard {
    /// Create the clipboard adapter, verifying the clipboard is reachable.
    pub fn new() -> Result<Self> {
        open_clipboard().map_err(Error::clipboard)?;
        info!(
            native_change_count = get_pasteboard_change_count().is_some(),
            "System clipboard ready"
        );
        Ok(Self::default())
    }

    fn current_fingerprint(&self) -> u64 {
        let Ok(mut clipboard) = open_clipboard() else {
            return EMPTY_FINGERPRINT;
        };
        let text = clipboard.get_text().ok();
        payload_fingerprint(text.as_deref(), || {
            let image = clipboard.get_image().ok()?;
            Some(image_fingerprint(image.width, image.height, &image.bytes))
        })
    }
}

/// Fingerprint of non-empty `text`, else of the image `read_image` yields.
/// `read_image` is only called when there is no text.
fn payload_fingerprint(text: Option<&str>, read_image: impl FnOnce() -> Option<u64>) -> u64 {
    match text {
        Some(text) if !text.is_empty() => text_fingerprint(text),
        _ => read_image().unwrap_or(EMPTY_FINGERPRINT),
    }
}

/// Encode a raw RGBA bitmap, rejecting dimensions that don't fit in `u32`.
fn image_from_rgba(width: usize, height: usize, bytes: Vec<u8>) -> Option<ClipImage> {
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        debug!(width, height, "Clipboard image dimensions out of range, ignoring");
        return None;
    };
    match ClipImage::from_rgba(width, height, bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            debug!(error = %e, "Clipboard image could not be encoded, ignoring");
            None
        }
    }
}

fn open_clipboard() -> AnyResult<arboard::Clipboard> {
    arboard::Clipboard::new().context("Failed to access clipboard")
}

impl ClipboardSource for SystemClipboard {
    fn change_count(&mut self) -> i64 {
        if let Some(count) = get_pasteboard_change_count() {
            return count;
        }
        let fingerprint = self.current_fingerprint();
        self.fingerprints.observe(fingerprint)
    }

    fn read_image(&mut self) -> Option<ClipImage> {
        let mut clipboard = open_clipboard().ok()?;
        let data = clipboard.get_image().ok()?;
        image_from_rgba(data.width, data.height, data.bytes.into_owned())
    }

    fn read_file_paths(&mut self) -> Vec<PathBuf> {
        open_clipboard()
            .ok()
            .and_then(|mut clipboard| clipboard.get().file_list().ok())
            .unwrap_or_default()
    }

    fn read_source_url(&mut self) -> Option<String> {
        let mut clipboard = open_clipboard().ok()?;
        let html = clipboard.get().html().ok()?;
        image_source_from_html(&html)
    }

    fn read_text(&mut self) -> Option<String> {
        open_clipboard().ok()?.get_text().ok()
    }

    fn write(&mut self, content: &ClipboardContent) -> Result<()> {
        let mut clipboard = open_clipboard().map_err(Error::clipboard)?;
        match content {
            ClipboardContent::Text { text, .. } => clipboard
                .set_text(text.as_str())
                .context("Failed to set clipboard text")
                .map_err(Error::clipboard)?,
            ClipboardContent::Image(image) | ClipboardContent::WebImage { image, .. } => {
                let data = image
                    .to_image_data()
                    .map_err(|e| Error::Image(format!("{:#}", e)))?;
                clipboard
                    .set_image(data)
                    .context("Failed to set clipboard image")
                    .map_err(Error::clipboard)?
            }
        }
        debug!(kind = %content.kind(), "Wrote history item to clipboard");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        open_clipboard()
            .and_then(|mut clipboard| clipboard.clear().context("Failed to clear clipboard"))
            .map_err(Error::clipboard)
    }
}

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("Invalid regex")
    })
}

/// Extract the `src` of the first `<img>` in copied HTML, if it is an
/// http(s) URL. Browsers put this fragment on the clipboard next to the
/// bitmap when an image is copied from a page.
pub fn image_source_from_html(html: &str) -> Option<String> {
    let src = img_src_regex().captures(html)?.get(1)?.as_str().trim();
    let url = Url::parse(src).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_text_fingerprint_skips_image_read() {
        let image_reads = Cell::new(0);
        let read_image = || {
            image_reads.set(image_reads.get() + 1);
            Some(42)
        };
        assert_eq!(
            payload_fingerprint(Some("copied"), read_image),
            text_fingerprint("copied")
        );
        assert_eq!(image_reads.get(), 0);
    }

    #[test]
    fn test_image_fingerprint_used_without_text() {
        assert_eq!(payload_fingerprint(None, || Some(42)), 42);
        assert_eq!(payload_fingerprint(Some(""), || Some(42)), 42);
        assert_eq!(payload_fingerprint(None, || None), EMPTY_FINGERPRINT);
    }

    #[test]
    fn test_image_from_rgba_rejects_oversized_dimensions() {
        assert!(image_from_rgba(usize::MAX, 1, vec![0; 4]).is_none());
        assert!(image_from_rgba(1, usize::MAX, vec![0; 4]).is_none());

        let image = image_from_rgba(2, 2, vec![0x80; 16]).expect("valid bitmap");
        assert_eq!(image.dimensions(), (2, 2));
    }

    #[test]
    fn test_image_source_from_browser_html() {
        let html = r#"<meta charset='utf-8'><img src="https://example.com/cat.png" alt="cat">"#;
        assert_eq!(
            image_source_from_html(html).as_deref(),
            Some("https://example.com/cat.png")
        );
    }

    #[test]
    fn test_image_source_handles_single_quotes_and_case() {
        let html = "<IMG class='x' SRC='http://img.example.org/a.jpg'>";
        assert_eq!(
            image_source_from_html(html).as_deref(),
            Some("http://img.example.org/a.jpg")
        );
    }

    #[test]
    fn test_image_source_ignores_data_urls_and_missing_img() {
        assert!(image_source_from_html(r#"<img src="data:image/png;base64,AAAA">"#).is_none());
        assert!(image_source_from_html("<p>just text</p>").is_none());
        assert!(image_source_from_html(r#"<img src="/relative.png">"#).is_none());
    }

    #[cfg(feature = "system-tests")]
    #[test]
    fn test_system_clipboard_text_write_back() {
        let mut clipboard = SystemClipboard::new().expect("clipboard available");
        let before = clipboard.change_count();
        clipboard
            .write(&ClipboardContent::text("clipshelf system test"))
            .expect("write text");
        assert_eq!(
            clipboard.read_text().as_deref(),
            Some("clipshelf system test")
        );
        assert_ne!(clipboard.change_count(), before);
    }
}
