//! Decoding raster files into frames and encoding diff artifacts

use image::{ImageError, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ImageFrame;
use crate::infra::{FileSystem, RealFileSystem};

/// Errors produced while turning bytes into an [`ImageFrame`]
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes are not in a format the loader understands
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The file is truncated or corrupt
    #[error("malformed image data: {0}")]
    Malformed(String),

    /// The image decoded but has no pixels
    #[error("image has zero dimensions ({width}x{height})")]
    ZeroDimensions {
        /// Decoded width
        width: u32,
        /// Decoded height
        height: u32,
    },

    /// The file could not be read
    #[error("failed to read {path}")]
    Io {
        /// File that was being read
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl From<ImageError> for DecodeError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(e) => Self::UnsupportedFormat(e.to_string()),
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Decode in-memory image bytes (PNG or JPEG) into a frame
///
/// # Examples
///
/// ```
/// use pixel_parity::frame::{decode_frame, encode_png, ImageFrame};
///
/// let frame = ImageFrame::filled(4, 2, [0, 128, 255, 255]);
/// let png = encode_png(&frame)?;
/// let decoded = decode_frame(&png)?;
/// assert_eq!(decoded, frame);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_frame(bytes: &[u8]) -> Result<ImageFrame, DecodeError> {
    let format = image::guess_format(bytes)?;
    let rgba = image::load_from_memory_with_format(bytes, format)?.into_rgba8();
    let (width, height) = rgba.dimensions();

    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroDimensions { width, height });
    }

    ImageFrame::new(width, height, rgba.into_raw())
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Read and decode an image file
pub fn load_frame(path: &Path) -> Result<ImageFrame, DecodeError> {
    load_frame_with_fs(path, &RealFileSystem)
}

/// Read and decode an image file with a custom filesystem implementation
pub fn load_frame_with_fs<FS: FileSystem>(path: &Path, fs: &FS) -> Result<ImageFrame, DecodeError> {
    let bytes = fs.read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("decoding {} ({} bytes)", path.display(), bytes.len());
    decode_frame(&bytes)
}

/// Encode a frame as PNG bytes
pub fn encode_png(frame: &ImageFrame) -> Result<Vec<u8>, ImageError> {
    let image = RgbaImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
        .ok_or_else(|| {
            ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })?;

    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
