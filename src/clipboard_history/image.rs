//! Clipboard image payloads
//!
//! Every image that enters history is normalised to PNG bytes. The decoded
//! dimensions are kept next to the bytes so dedup and previews never need a
//! full decode.

use anyhow::{bail, Context, Result};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// File extensions we treat as image files when a file reference is copied
pub const IMAGE_FILE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp",
];

/// A decodable raster image stored as PNG bytes.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct ClipImage {
    width: u32,
    height: u32,
    png: Arc<[u8]>,
}

impl std::fmt::Debug for ClipImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .finish()
    }
}

impl ClipImage {
    /// Encode raw RGBA pixels (as handed out by the clipboard) to PNG.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Image has zero dimension ({}x{})", width, height);
        }

        let rgba_image = image::RgbaImage::from_raw(width, height, rgba)
            .context("Failed to create RGBA image from clipboard data")?;

        let mut png_data = Vec::new();
        rgba_image
            .write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .context("Failed to encode image as PNG")?;

        Ok(Self {
            width,
            height,
            png: png_data.into(),
        })
    }

    /// Decode encoded image bytes of any supported format.
    ///
    /// PNG input is kept byte-for-byte; other formats are re-encoded as PNG.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes).context("Unrecognised image format")?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .context("Failed to decode image bytes")?;

        if format == image::ImageFormat::Png {
            let (width, height) = (decoded.width(), decoded.height());
            if width == 0 || height == 0 {
                bail!("Image has zero dimension ({}x{})", width, height);
            }
            return Ok(Self {
                width,
                height,
                png: bytes.into(),
            });
        }

        debug!(?format, "Re-encoding clipboard image as PNG");
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// Decode an image file, if its extension marks it as an image.
    ///
    /// Returns `Ok(None)` for non-image files so callers can keep looking.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !has_image_extension(path) {
            return Ok(None);
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image file {}", path.display()))?;
        Self::from_encoded(&bytes)
            .with_context(|| format!("Failed to decode image file {}", path.display()))
            .map(Some)
    }

    /// (width, height) in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Decode back to RGBA pixels
    pub fn to_rgba(&self) -> Result<image::RgbaImage> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .context("Failed to decode stored PNG")?;
        Ok(img.to_rgba8())
    }

    /// Convert to the clipboard's image representation for write-back
    pub fn to_image_data(&self) -> Result<arboard::ImageData<'static>> {
        let rgba = self.to_rgba()?;
        Ok(arboard::ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: Cow::Owned(rgba.into_raw()),
        })
    }
}

/// Whether the path ends in a known image extension (case-insensitive)
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_FILE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_rgba() -> Vec<u8> {
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255,
        ]
    }

    #[test]
    fn test_rgba_survives_png_encoding() {
        let image = ClipImage::from_rgba(2, 2, checker_rgba()).expect("Should encode");
        assert_eq!(image.dimensions(), (2, 2));
        assert!(image.png_bytes().starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image.to_rgba().expect("Should decode");
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), checker_rgba());
    }

    #[test]
    fn test_from_rgba_rejects_short_buffer() {
        assert!(ClipImage::from_rgba(10, 10, vec![0u8; 12]).is_err());
    }

    #[test]
    fn test_from_rgba_rejects_zero_dimension() {
        assert!(ClipImage::from_rgba(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn test_from_encoded_keeps_png_bytes() {
        let original = ClipImage::from_rgba(2, 2, checker_rgba()).unwrap();
        let reloaded = ClipImage::from_encoded(original.png_bytes()).expect("Should decode");
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_from_encoded_converts_other_formats() {
        let rgba = image::RgbaImage::from_raw(2, 2, checker_rgba()).unwrap();
        let mut bmp = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut bmp), image::ImageFormat::Bmp)
            .unwrap();

        let image = ClipImage::from_encoded(&bmp).expect("BMP should decode");
        assert_eq!(image.dimensions(), (2, 2));
        assert!(image.png_bytes().starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_from_encoded_rejects_garbage() {
        assert!(ClipImage::from_encoded(b"definitely not an image").is_err());
    }

    #[test]
    fn test_image_extension_check() {
        assert!(has_image_extension(Path::new("/tmp/cat.PNG")));
        assert!(has_image_extension(Path::new("photo.jpeg")));
        assert!(has_image_extension(Path::new("scan.tif")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }

    #[test]
    fn test_from_file_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(ClipImage::from_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_from_file_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        let image = ClipImage::from_rgba(2, 2, checker_rgba()).unwrap();
        std::fs::write(&path, image.png_bytes()).unwrap();

        let loaded = ClipImage::from_file(&path).unwrap().expect("Should be an image");
        assert_eq!(loaded.dimensions(), (2, 2));
    }

    #[test]
    fn test_image_data_for_write_back() {
        let image = ClipImage::from_rgba(2, 2, checker_rgba()).unwrap();
        let data = image.to_image_data().unwrap();
        assert_eq!((data.width, data.height), (2, 2));
        assert_eq!(data.bytes.as_ref(), checker_rgba().as_slice());
    }
}
