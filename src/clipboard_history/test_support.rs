//! In-memory clipboard double shared by the history tests.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use super::clipboard::ClipboardSource;
use super::image::ClipImage;
use super::types::ClipboardContent;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct FakeState {
    change_count: i64,
    text: Option<String>,
    image: Option<ClipImage>,
    file_paths: Vec<PathBuf>,
    source_url: Option<String>,
    payload_reads: usize,
    writes: Vec<ClipboardContent>,
    clears: usize,
    fail_writes: bool,
}

/// Clipboard fake. Clones share state, so a test can keep a handle while the
/// history owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeClipboard {
    state: Arc<Mutex<FakeState>>,
}

impl FakeClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate another app copying text.
    pub fn set_text(&self, text: &str) {
        let mut state = self.state.lock();
        state.text = Some(text.to_string());
        state.change_count += 1;
    }

    pub fn set_image(&self, image: ClipImage) {
        let mut state = self.state.lock();
        state.image = Some(image);
        state.change_count += 1;
    }

    pub fn set_file_paths(&self, paths: Vec<PathBuf>) {
        let mut state = self.state.lock();
        state.file_paths = paths;
        state.change_count += 1;
    }

    pub fn set_source_url(&self, url: &str) {
        self.state.lock().source_url = Some(url.to_string());
    }

    /// Replace everything with a single text payload.
    pub fn copy_text(&self, text: &str) {
        let mut state = self.state.lock();
        state.image = None;
        state.file_paths.clear();
        state.source_url = None;
        state.text = Some(text.to_string());
        state.change_count += 1;
    }

    /// Replace everything with a single image payload.
    pub fn copy_image(&self, image: ClipImage) {
        let mut state = self.state.lock();
        state.text = None;
        state.file_paths.clear();
        state.source_url = None;
        state.image = Some(image);
        state.change_count += 1;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Number of payload reads (text, image, files, url) so far
    pub fn payload_reads(&self) -> usize {
        self.state.lock().payload_reads
    }

    pub fn writes(&self) -> usize {
        self.state.lock().writes.len()
    }

    pub fn last_write(&self) -> Option<ClipboardContent> {
        self.state.lock().writes.last().cloned()
    }

    pub fn clears(&self) -> usize {
        self.state.lock().clears
    }

    pub fn current_text(&self) -> Option<String> {
        self.state.lock().text.clone()
    }
}

impl ClipboardSource for FakeClipboard {
    fn change_count(&mut self) -> i64 {
        self.state.lock().change_count
    }

    fn read_image(&mut self) -> Option<ClipImage> {
        let mut state = self.state.lock();
        state.payload_reads += 1;
        state.image.clone()
    }

    fn read_file_paths(&mut self) -> Vec<PathBuf> {
        let mut state = self.state.lock();
        state.payload_reads += 1;
        state.file_paths.clone()
    }

    fn read_source_url(&mut self) -> Option<String> {
        let mut state = self.state.lock();
        state.payload_reads += 1;
        state.source_url.clone()
    }

    fn read_text(&mut self) -> Option<String> {
        let mut state = self.state.lock();
        state.payload_reads += 1;
        state.text.clone()
    }

    fn write(&mut self, content: &ClipboardContent) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(Error::Clipboard("simulated write failure".to_string()));
        }
        state.text = None;
        state.image = None;
        state.file_paths.clear();
        state.source_url = None;
        match content {
            ClipboardContent::Text { text, .. } => state.text = Some(text.clone()),
            ClipboardContent::Image(image) => state.image = Some(image.clone()),
            ClipboardContent::WebImage { image, source_url } => {
                state.image = Some(image.clone());
                state.source_url = Some(source_url.to_string());
            }
        }
        state.writes.push(content.clone());
        state.change_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.text = None;
        state.image = None;
        state.file_paths.clear();
        state.source_url = None;
        state.clears += 1;
        state.change_count += 1;
        Ok(())
    }
}

/// Solid-colour test image of the given size
pub fn sample_image(width: u32, height: u32) -> ClipImage {
    let pixels = vec![0x40u8; (width * height * 4) as usize];
    ClipImage::from_rgba(width, height, pixels).expect("sample image encodes")
}
