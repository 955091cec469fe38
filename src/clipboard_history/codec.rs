//! History file codec
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "version": 1,
//!   "items": [
//!     { "id": "…", "timestamp": "2024-03-10T12:00:00Z", "kind": "text", "text": "hello" },
//!     { "id": "…", "timestamp": "…", "kind": "webImage", "image": "<base64 png>", "sourceUrl": "https://…" }
//!   ]
//! }
//! ```
//!
//! Images are embedded inline as base64 PNG. A bare array of records (the
//! layout before the version envelope existed) is still accepted on decode.
//! Records that can't be turned into a valid item are skipped, never fatal.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::image::ClipImage;
use super::types::{parse_text_url, ClipboardContent, ClipboardItem, ContentKind, ItemId};
use crate::error::Result;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    id: ItemId,
    timestamp: DateTime<Utc>,
    kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_url: Option<String>,
}

#[derive(Serialize)]
struct HistoryFileRef<'a> {
    version: u32,
    items: &'a [ItemRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryFile {
    Versioned {
        version: u32,
        items: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

impl From<&ClipboardItem> for ItemRecord {
    fn from(item: &ClipboardItem) -> Self {
        let (text, image) = match item.content() {
            ClipboardContent::Text { text, .. } => (Some(text.clone()), None),
            ClipboardContent::Image(image) | ClipboardContent::WebImage { image, .. } => {
                (None, Some(BASE64.encode(image.png_bytes())))
            }
        };
        ItemRecord {
            id: item.id(),
            timestamp: item.timestamp(),
            kind: item.kind(),
            text,
            image,
            source_url: item.source_url().map(Url::to_string),
        }
    }
}

impl ItemRecord {
    /// Rebuild the item, or `None` when the record lacks its payload.
    fn into_item(self) -> Option<ClipboardItem> {
        let source_url = self
            .source_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok());

        let content = match self.kind {
            ContentKind::Text => {
                let text = self.text?;
                let source_url = source_url.or_else(|| parse_text_url(&text));
                ClipboardContent::Text { text, source_url }
            }
            ContentKind::Image | ContentKind::WebImage => {
                let image = decode_image(self.image.as_deref()?)?;
                match (self.kind, source_url) {
                    (ContentKind::WebImage, Some(source_url)) => {
                        ClipboardContent::WebImage { image, source_url }
                    }
                    (ContentKind::WebImage, None) => {
                        debug!(id = %self.id, "Web image record without a source URL, keeping as image");
                        ClipboardContent::Image(image)
                    }
                    _ => ClipboardContent::Image(image),
                }
            }
        };

        Some(ClipboardItem::restore(self.id, self.timestamp, content))
    }
}

fn decode_image(base64_data: &str) -> Option<ClipImage> {
    let bytes = BASE64.decode(base64_data).ok()?;
    ClipImage::from_encoded(&bytes).ok()
}

/// Serialize the full history, most recent first.
pub fn encode(items: &[ClipboardItem]) -> Result<Vec<u8>> {
    let records: Vec<ItemRecord> = items.iter().map(ItemRecord::from).collect();
    let bytes = serde_json::to_vec_pretty(&HistoryFileRef {
        version: FORMAT_VERSION,
        items: &records,
    })?;
    Ok(bytes)
}

/// Parse a history file.
///
/// Fails only when the bytes aren't a history document at all. Individual
/// bad records are dropped with a warning.
pub fn decode(bytes: &[u8]) -> Result<Vec<ClipboardItem>> {
    let raw_items = match serde_json::from_slice::<HistoryFile>(bytes)? {
        HistoryFile::Versioned { version, items } => {
            if version > FORMAT_VERSION {
                warn!(
                    version,
                    supported = FORMAT_VERSION,
                    "History file is from a newer version, reading what we can"
                );
            }
            items
        }
        HistoryFile::Legacy(items) => {
            debug!(count = items.len(), "Reading legacy history array");
            items
        }
    };

    let total = raw_items.len();
    let items: Vec<ClipboardItem> = raw_items
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let record = match serde_json::from_value::<ItemRecord>(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed history record");
                    return None;
                }
            };
            let (id, kind) = (record.id, record.kind);
            let item = record.into_item();
            if item.is_none() {
                warn!(index, id = %id, kind = %kind, "Skipping history record without a usable payload");
            }
            item
        })
        .collect();

    if items.len() != total {
        debug!(kept = items.len(), total, "Dropped unusable history records");
    }
    Ok(items)
}
