//! In-memory raster frames
//!
//! Every image entering the engine is normalized into an [`ImageFrame`]:
//! tightly packed RGBA bytes, row-major, top-to-bottom. Frames are
//! immutable once constructed, so they can be shared across case tasks
//! behind an `Arc` without locking.

pub mod loader;

pub use loader::{decode_frame, encode_png, load_frame, DecodeError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// Width and height of a frame, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimensions value
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels covered
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True if either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error returned when a pixel buffer does not match its declared size
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("pixel buffer has {actual} bytes, expected {expected} for {dimensions}")]
pub struct BufferSizeError {
    /// Declared dimensions
    pub dimensions: Dimensions,
    /// Expected byte length
    pub expected: usize,
    /// Actual byte length
    pub actual: usize,
}

/// Immutable RGBA pixel buffer
///
/// # Examples
///
/// ```
/// use pixel_parity::frame::ImageFrame;
///
/// let frame = ImageFrame::filled(2, 3, [255, 0, 0, 255]);
/// assert_eq!(frame.width(), 2);
/// assert_eq!(frame.height(), 3);
/// assert_eq!(frame.pixel(1, 2), [255, 0, 0, 255]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageFrame {
    /// Create a frame from raw RGBA bytes, checking the length invariant
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferSizeError> {
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(BufferSizeError {
                dimensions: Dimensions::new(width, height),
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a frame where every pixel has the same color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame dimensions
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Raw RGBA bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes in one row
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// RGBA value at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = y as usize * self.stride() + x as usize * CHANNELS;
        let px = &self.pixels[offset..offset + CHANNELS];
        [px[0], px[1], px[2], px[3]]
    }

    /// Consume the frame, returning the raw bytes
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

impl fmt::Debug for ImageFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
