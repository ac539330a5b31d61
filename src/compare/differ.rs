//! Per-pixel differencing of reconciled buffers
//!
//! Rows are processed in parallel with rayon. Each row reports its own
//! count and the counts are gathered in row order before summing, so the
//! result and the diff image are identical from run to run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::color;
use crate::frame::{Dimensions, ImageFrame, CHANNELS};

/// Default per-pixel color-distance tolerance
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Default highlight color for differing pixels (opaque red)
pub const DEFAULT_HIGHLIGHT: [u8; 4] = [255, 0, 0, 255];

/// How pixels within tolerance are drawn in the diff image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffStyle {
    /// Fully transparent, only differences are visible
    #[default]
    Mask,
    /// Faded grayscale of the reference for context
    Faded,
}

impl DiffStyle {
    /// Get the style name as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mask => "mask",
            Self::Faded => "faded",
        }
    }
}

/// Options controlling the differencer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Color-distance threshold in `[0, 1]`; distances above it count as different
    pub tolerance: f64,
    /// RGBA written for differing pixels
    pub highlight: [u8; 4],
    /// RGBA for differing pixels that got darker in the candidate
    ///
    /// `None` draws every difference with `highlight`.
    pub darker_highlight: Option<[u8; 4]>,
    /// Rendering of pixels within tolerance
    pub style: DiffStyle,
    /// Whether to produce a diff image at all
    pub generate_image: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            highlight: DEFAULT_HIGHLIGHT,
            darker_highlight: None,
            style: DiffStyle::Mask,
            generate_image: true,
        }
    }
}

impl DiffOptions {
    /// Sets the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Draw differences that darkened the candidate in a second color.
    pub fn with_darker_highlight(mut self, rgba: [u8; 4]) -> Self {
        self.darker_highlight = Some(rgba);
        self
    }

    /// Sets the diff style.
    pub fn with_style(mut self, style: DiffStyle) -> Self {
        self.style = style;
        self
    }

    /// Enables or disables diff image generation.
    pub fn with_generate_image(mut self, generate: bool) -> Self {
        self.generate_image = generate;
        self
    }
}

/// Buffers handed to the differencer were not the declared size
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("buffer length mismatch for {region}: reference {reference} bytes, candidate {candidate} bytes")]
pub struct DiffError {
    /// Declared region
    pub region: Dimensions,
    /// Reference buffer length
    pub reference: usize,
    /// Candidate buffer length
    pub candidate: usize,
}

/// Output of a pixel diff
#[derive(Debug, Clone)]
pub struct PixelDiff {
    /// Number of pixels whose distance exceeded the tolerance
    pub different_pixels: u64,
    /// Number of pixels compared
    pub total_pixels: u64,
    /// Visualization, same size as the compared region
    pub diff_image: Option<ImageFrame>,
}

/// Alpha applied to the faded background
const FADE: f64 = 0.1;

/// Compare two equally sized RGBA buffers
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::differ::{diff_buffers, DiffOptions};
/// use pixel_parity::frame::{Dimensions, ImageFrame};
///
/// let a = ImageFrame::filled(2, 2, [0, 0, 0, 255]);
/// let b = ImageFrame::filled(2, 2, [255, 255, 255, 255]);
/// let diff = diff_buffers(
///     a.pixels(),
///     b.pixels(),
///     Dimensions::new(2, 2),
///     &DiffOptions::default().with_tolerance(0.0),
/// )?;
/// assert_eq!(diff.different_pixels, 4);
/// # Ok::<(), pixel_parity::compare::differ::DiffError>(())
/// ```
pub fn diff_buffers(
    reference: &[u8],
    candidate: &[u8],
    region: Dimensions,
    options: &DiffOptions,
) -> Result<PixelDiff, DiffError> {
    let expected = region.area() as usize * CHANNELS;
    if reference.len() != expected || candidate.len() != expected {
        return Err(DiffError {
            region,
            reference: reference.len(),
            candidate: candidate.len(),
        });
    }

    let total_pixels = region.area();
    if total_pixels == 0 {
        return Ok(PixelDiff {
            different_pixels: 0,
            total_pixels,
            diff_image: None,
        });
    }

    let stride = region.width as usize * CHANNELS;

    let (row_counts, diff_image) = if options.generate_image {
        let mut out = vec![0u8; expected];
        let counts: Vec<u64> = out
            .par_chunks_mut(stride)
            .zip(reference.par_chunks(stride))
            .zip(candidate.par_chunks(stride))
            .map(|((out_row, ref_row), cand_row)| diff_row(ref_row, cand_row, Some(out_row), options))
            .collect();
        let image = ImageFrame::new(region.width, region.height, out).map_err(|_| DiffError {
            region,
            reference: reference.len(),
            candidate: candidate.len(),
        })?;
        (counts, Some(image))
    } else {
        let counts: Vec<u64> = reference
            .par_chunks(stride)
            .zip(candidate.par_chunks(stride))
            .map(|(ref_row, cand_row)| diff_row(ref_row, cand_row, None, options))
            .collect();
        (counts, None)
    };

    Ok(PixelDiff {
        different_pixels: row_counts.iter().sum(),
        total_pixels,
        diff_image,
    })
}

fn diff_row(
    reference: &[u8],
    candidate: &[u8],
    mut out: Option<&mut [u8]>,
    options: &DiffOptions,
) -> u64 {
    let mut count = 0;
    let pixels = reference
        .chunks_exact(CHANNELS)
        .zip(candidate.chunks_exact(CHANNELS));

    for (i, (r, c)) in pixels.enumerate() {
        let r = [r[0], r[1], r[2], r[3]];
        let c = [c[0], c[1], c[2], c[3]];
        let different = color::distance(r, c) > options.tolerance;
        if different {
            count += 1;
        }

        if let Some(out) = out.as_deref_mut() {
            let marker = if different {
                match options.darker_highlight {
                    Some(alt) if color::is_darker(r, c) => alt,
                    _ => options.highlight,
                }
            } else {
                match options.style {
                    DiffStyle::Mask => [0, 0, 0, 0],
                    DiffStyle::Faded => {
                        let gray = color::faded_gray(r, FADE);
                        [gray, gray, gray, 255]
                    }
                }
            };
            out[i * CHANNELS..(i + 1) * CHANNELS].copy_from_slice(&marker);
        }
    }

    count
}
