//! Decoded frame type for the sequence cache
//!
//! **Why**: The scrubber only ever displays LDR web-style assets (JPEG, PNG),
//! so a single RGBA8 representation is enough. Frames are decoded once on a
//! worker thread and shared immutably afterwards.
//!
//! **Used by**: ProgressiveLoader (decode), FrameCache (storage),
//! CanvasRenderer (texture upload)
//!
//! # Immutability
//!
//! A `DecodedFrame` never changes after construction. The pixel buffer is an
//! `Arc<[u8]>`, so cloning a frame out of the cache is a refcount bump, not a
//! pixel copy.

use std::path::Path;
use std::sync::Arc;

use log::debug;

/// Immutable decoded image, RGBA8, 4 bytes per pixel.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    width: usize,
    height: usize,
    pixels: Arc<[u8]>,
}

/// Frame decoding errors
#[derive(Debug)]
pub enum FrameError {
    Image(String),
    UnsupportedFormat(String),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Image(e) => write!(f, "Image error: {}", e),
            FrameError::UnsupportedFormat(e) => write!(f, "Unsupported format: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

impl DecodedFrame {
    /// Wrap an already-decoded RGBA8 buffer.
    ///
    /// Buffer length must be `width * height * 4`; a mismatch is a caller bug
    /// and is rejected rather than truncated.
    pub fn from_rgba8(pixels: Vec<u8>, width: usize, height: usize) -> Result<Self, FrameError> {
        if pixels.len() != width * height * 4 {
            return Err(FrameError::Image(format!(
                "buffer size {} does not match {}x{}x4",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Decode a frame from disk (JPEG, PNG).
    pub fn load(path: &Path) -> Result<Self, FrameError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" | "jpg" | "jpeg" => {}
            _ => return Err(FrameError::UnsupportedFormat(format!(".{}", ext))),
        }

        debug!("Decoding frame: {}", path.display());

        let img = image::open(path).map_err(|e| FrameError::Image(e.to_string()))?;
        let width = img.width() as usize;
        let height = img.height() as usize;
        let rgba = img.to_rgba8();

        Self::from_rgba8(rgba.into_raw(), width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolution as tuple
    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Memory size in bytes
    pub fn mem(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Test: frame construction from a raw buffer
    /// Validates: dimensions and buffer are preserved
    #[test]
    fn test_from_rgba8() {
        let frame = DecodedFrame::from_rgba8(vec![0u8; 8 * 4 * 4], 8, 4).unwrap();
        assert_eq!(frame.resolution(), (8, 4));
        assert_eq!(frame.mem(), 8 * 4 * 4);
    }

    /// Test: mismatched buffer size is rejected
    #[test]
    fn test_from_rgba8_size_mismatch() {
        let result = DecodedFrame::from_rgba8(vec![0u8; 10], 8, 4);
        assert!(result.is_err());
    }

    /// Test: cloning shares pixels instead of copying
    #[test]
    fn test_clone_shares_buffer() {
        let frame = DecodedFrame::from_rgba8(vec![7u8; 4 * 4 * 4], 4, 4).unwrap();
        let clone = frame.clone();
        assert!(std::ptr::eq(frame.pixels(), clone.pixels()));
    }

    /// Test: loading a missing file returns an error, not a panic
    #[test]
    fn test_load_missing_file() {
        let result = DecodedFrame::load(&PathBuf::from("/nonexistent/frame_0001.jpeg"));
        assert!(result.is_err());
    }

    /// Test: unknown extensions are rejected before hitting the decoder
    #[test]
    fn test_load_unsupported_extension() {
        let result = DecodedFrame::load(&PathBuf::from("frame.webm"));
        assert!(matches!(result, Err(FrameError::UnsupportedFormat(_))));
    }
}
