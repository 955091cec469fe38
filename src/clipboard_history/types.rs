//! Clipboard history types
//!
//! A [`ClipboardItem`] is immutable once created. Its payload is a
//! [`ClipboardContent`] sum type, so a text item can never carry an image and
//! an image item can never lack one.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

use super::image::ClipImage;

/// Preview length used when the UI doesn't ask for a specific one
pub const DEFAULT_PREVIEW_CHARS: usize = 80;

/// Opaque, unique identity of a history item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Content types for clipboard entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Text,
    Image,
    WebImage,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::WebImage => "webImage",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a history item, with exactly the fields valid for its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardContent {
    /// Plain text. `source_url` is set when the text itself is a URL.
    Text {
        text: String,
        source_url: Option<Url>,
    },
    /// A raster image copied from anywhere
    Image(ClipImage),
    /// An image that came with the URL it was copied from
    WebImage { image: ClipImage, source_url: Url },
}

impl ClipboardContent {
    /// Text payload; the URL metadata is derived from the text.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let source_url = parse_text_url(&text);
        ClipboardContent::Text { text, source_url }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ClipboardContent::Text { .. } => ContentKind::Text,
            ClipboardContent::Image(_) => ContentKind::Image,
            ClipboardContent::WebImage { .. } => ContentKind::WebImage,
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match self {
            ClipboardContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn image_content(&self) -> Option<&ClipImage> {
        match self {
            ClipboardContent::Image(image) | ClipboardContent::WebImage { image, .. } => {
                Some(image)
            }
            ClipboardContent::Text { .. } => None,
        }
    }

    pub fn source_url(&self) -> Option<&Url> {
        match self {
            ClipboardContent::Text { source_url, .. } => source_url.as_ref(),
            ClipboardContent::WebImage { source_url, .. } => Some(source_url),
            ClipboardContent::Image(_) => None,
        }
    }
}

/// Parse text as a URL with a scheme and a host (or a `file:` URL).
///
/// Surrounding whitespace is ignored, inner whitespace disqualifies the text.
/// Strings like `note:remember` parse as URLs but have no host, so they stay
/// plain text.
pub fn parse_text_url(text: &str) -> Option<Url> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    if url.has_host() || url.scheme() == "file" {
        Some(url)
    } else {
        None
    }
}

/// A single clipboard history entry
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardItem {
    id: ItemId,
    timestamp: DateTime<Utc>,
    content: ClipboardContent,
}

impl ClipboardItem {
    /// New item with a fresh id, stamped now
    pub fn new(content: ClipboardContent) -> Self {
        Self::new_at(content, Utc::now())
    }

    /// New item with a fresh id and an explicit creation time
    pub fn new_at(content: ClipboardContent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            timestamp,
            content,
        }
    }

    /// Rebuild a stored item with its original identity
    pub(crate) fn restore(id: ItemId, timestamp: DateTime<Utc>, content: ClipboardContent) -> Self {
        Self {
            id,
            timestamp,
            content,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ClipboardContent::text(text))
    }

    pub fn image(image: ClipImage) -> Self {
        Self::new(ClipboardContent::Image(image))
    }

    pub fn web_image(image: ClipImage, source_url: Url) -> Self {
        Self::new(ClipboardContent::WebImage { image, source_url })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn content(&self) -> &ClipboardContent {
        &self.content
    }

    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    pub fn text_content(&self) -> Option<&str> {
        self.content.text_content()
    }

    pub fn image_content(&self) -> Option<&ClipImage> {
        self.content.image_content()
    }

    pub fn source_url(&self) -> Option<&Url> {
        self.content.source_url()
    }

    /// Calendar day of the creation time in the local timezone
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }

    /// Short single-line description for list rows.
    pub fn preview(&self, max_chars: usize) -> String {
        match &self.content {
            ClipboardContent::Text { text, .. } => {
                let line = text
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or("");
                truncate_chars(line, max_chars)
            }
            ClipboardContent::Image(image) => {
                let (w, h) = image.dimensions();
                format!("Image {}×{}", w, h)
            }
            ClipboardContent::WebImage { source_url, .. } => match source_url.host_str() {
                Some(host) => format!("Image from {}", host),
                None => "Image from web".to_string(),
            },
        }
    }

    /// Absolute local time, e.g. `2024-03-10 14:05`
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    /// Human relative time against `now`, e.g. `5 min ago` or `yesterday`.
    pub fn relative_timestamp(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.timestamp);
        if elapsed.num_seconds() < 60 {
            return "just now".to_string();
        }
        if elapsed.num_minutes() < 60 {
            return format!("{} min ago", elapsed.num_minutes());
        }

        let today = now.with_timezone(&Local).date_naive();
        let day = self.local_date();
        if day == today {
            return format!("{} h ago", elapsed.num_hours());
        }

        let days = (today - day).num_days();
        match days {
            1 => "yesterday".to_string(),
            2..=6 => format!("{} days ago", days),
            _ => day.format("%Y-%m-%d").to_string(),
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
