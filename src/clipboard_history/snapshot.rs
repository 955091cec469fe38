//! Clipboard snapshot reader
//!
//! Classifies whatever is currently on the clipboard into a history item.
//! Order (first match wins):
//! 1. an image (native bitmap, or a copied file with an image extension);
//!    with a source URL alongside it becomes a `webImage`
//! 2. text (with URL metadata when the text is itself a URL)
//! 3. nothing

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use url::Url;

use super::clipboard::ClipboardSource;
use super::image::ClipImage;
use super::types::{ClipboardContent, ClipboardItem};

/// Read and classify the current clipboard, stamping the item now.
pub fn read_snapshot(source: &mut dyn ClipboardSource) -> Option<ClipboardItem> {
    read_snapshot_at(source, Utc::now())
}

/// Testable version of [`read_snapshot`] with an explicit timestamp.
pub fn read_snapshot_at(
    source: &mut dyn ClipboardSource,
    timestamp: DateTime<Utc>,
) -> Option<ClipboardItem> {
    classify(source).map(|content| ClipboardItem::new_at(content, timestamp))
}

fn classify(source: &mut dyn ClipboardSource) -> Option<ClipboardContent> {
    if let Some(image) = read_any_image(source) {
        let source_url = source
            .read_source_url()
            .and_then(|raw| Url::parse(raw.trim()).ok());
        return Some(match source_url {
            Some(source_url) => {
                debug!(url = %source_url, "Clipboard holds a web image");
                ClipboardContent::WebImage { image, source_url }
            }
            None => ClipboardContent::Image(image),
        });
    }

    let text = source.read_text()?;
    Some(ClipboardContent::text(text))
}

fn read_any_image(source: &mut dyn ClipboardSource) -> Option<ClipImage> {
    if let Some(image) = source.read_image() {
        return Some(image);
    }

    for path in source.read_file_paths() {
        match ClipImage::from_file(&path) {
            Ok(Some(image)) => {
                debug!(path = %path.display(), "Clipboard references an image file");
                return Some(image);
            }
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Copied image file is unreadable"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard_history::test_support::{sample_image, FakeClipboard};
    use crate::clipboard_history::types::ContentKind;

    #[test]
    fn test_empty_clipboard_yields_nothing() {
        let mut clipboard = FakeClipboard::new();
        assert!(read_snapshot(&mut clipboard).is_none());
    }

    #[test]
    fn test_plain_text() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_text("hello");

        let item = read_snapshot(&mut clipboard).expect("text item");
        assert_eq!(item.kind(), ContentKind::Text);
        assert_eq!(item.text_content(), Some("hello"));
        assert!(item.source_url().is_none());
    }

    #[test]
    fn test_url_text_stays_text_with_metadata() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_text("https://example.com/page");

        let item = read_snapshot(&mut clipboard).expect("text item");
        assert_eq!(item.kind(), ContentKind::Text);
        assert_eq!(
            item.source_url().map(|u| u.as_str()),
            Some("https://example.com/page")
        );
    }

    #[test]
    fn test_image_wins_over_text() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_text("caption");
        clipboard.set_image(sample_image(4, 3));

        let item = read_snapshot(&mut clipboard).expect("image item");
        assert_eq!(item.kind(), ContentKind::Image);
        assert_eq!(item.image_content().map(|i| i.dimensions()), Some((4, 3)));
        assert!(item.text_content().is_none());
    }

    #[test]
    fn test_image_with_source_url_is_web_image() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_image(sample_image(8, 8));
        clipboard.set_source_url("https://example.com/cat.png");

        let item = read_snapshot(&mut clipboard).expect("web image item");
        assert_eq!(item.kind(), ContentKind::WebImage);
        assert_eq!(
            item.source_url().map(|u| u.as_str()),
            Some("https://example.com/cat.png")
        );
    }

    #[test]
    fn test_unparseable_source_url_falls_back_to_image() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_image(sample_image(8, 8));
        clipboard.set_source_url("not a url");

        let item = read_snapshot(&mut clipboard).expect("image item");
        assert_eq!(item.kind(), ContentKind::Image);
    }

    #[test]
    fn test_source_url_without_image_is_ignored() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_text("plain");
        clipboard.set_source_url("https://example.com/");

        let item = read_snapshot(&mut clipboard).expect("text item");
        assert_eq!(item.kind(), ContentKind::Text);
        assert!(item.source_url().is_none());
    }

    #[test]
    fn test_copied_image_file_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        let picture = dir.path().join("picture.png");
        std::fs::write(&notes, "not an image").unwrap();
        std::fs::write(&picture, sample_image(5, 7).png_bytes()).unwrap();

        let mut clipboard = FakeClipboard::new();
        clipboard.set_file_paths(vec![notes, picture]);
        clipboard.set_text("picture.png");

        let item = read_snapshot(&mut clipboard).expect("image item");
        assert_eq!(item.kind(), ContentKind::Image);
        assert_eq!(item.image_content().map(|i| i.dimensions()), Some((5, 7)));
    }

    #[test]
    fn test_broken_image_file_falls_through_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, "garbage").unwrap();

        let mut clipboard = FakeClipboard::new();
        clipboard.set_file_paths(vec![broken]);
        clipboard.set_text("broken.png");

        let item = read_snapshot(&mut clipboard).expect("text item");
        assert_eq!(item.kind(), ContentKind::Text);
    }

    #[test]
    fn test_reader_has_no_side_effects() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_text("keep me");
        let before = clipboard.change_count();

        let _ = read_snapshot(&mut clipboard);
        let _ = read_snapshot(&mut clipboard);

        assert_eq!(clipboard.change_count(), before);
        assert_eq!(clipboard.read_text().as_deref(), Some("keep me"));
        assert_eq!(clipboard.writes(), 0);
    }

    #[test]
    fn test_timestamp_is_applied() {
        let mut clipboard = FakeClipboard::new();
        clipboard.set_text("stamped");
        let ts = Utc::now() - chrono::Duration::days(3);

        let item = read_snapshot_at(&mut clipboard, ts).unwrap();
        assert_eq!(item.timestamp(), ts);
    }
}
