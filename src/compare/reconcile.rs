//! Frame reconciliation
//!
//! Two captures of the same page rarely have identical dimensions (a clone
//! page might be a few pixels taller). Rather than scaling, which would
//! corrupt pixel-level comparison, both frames are cropped to their common
//! top-left region. Page content is top-anchored, so `(0, 0)` is the anchor.

use std::borrow::Cow;
use thiserror::Error;

use crate::frame::{Dimensions, ImageFrame, CHANNELS};

/// The frames share no comparable area
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("frames do not overlap: reference {reference}, candidate {candidate}")]
pub struct NoOverlapError {
    /// Original reference dimensions
    pub reference: Dimensions,
    /// Original candidate dimensions
    pub candidate: Dimensions,
}

/// Two equally sized RGBA buffers cut from the reference and candidate
#[derive(Debug, Clone)]
pub struct Reconciled<'a> {
    /// Size of the compared region
    pub region: Dimensions,
    /// Dimensions of the reference before cropping
    pub reference_original: Dimensions,
    /// Dimensions of the candidate before cropping
    pub candidate_original: Dimensions,
    /// Reference pixels inside the region
    pub reference: Cow<'a, [u8]>,
    /// Candidate pixels inside the region
    pub candidate: Cow<'a, [u8]>,
}

impl Reconciled<'_> {
    /// True if the original frames had identical dimensions
    pub fn dimensions_match(&self) -> bool {
        self.reference_original == self.candidate_original
    }
}

/// Crop both frames to their common top-left region
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::reconcile::reconcile;
/// use pixel_parity::frame::{Dimensions, ImageFrame};
///
/// let reference = ImageFrame::filled(10, 40, [0, 0, 0, 255]);
/// let candidate = ImageFrame::filled(12, 30, [0, 0, 0, 255]);
/// let reconciled = reconcile(&reference, &candidate)?;
/// assert_eq!(reconciled.region, Dimensions::new(10, 30));
/// assert_eq!(reconciled.candidate_original, Dimensions::new(12, 30));
/// # Ok::<(), pixel_parity::compare::NoOverlapError>(())
/// ```
pub fn reconcile<'a>(
    reference: &'a ImageFrame,
    candidate: &'a ImageFrame,
) -> Result<Reconciled<'a>, NoOverlapError> {
    let region = Dimensions::new(
        reference.width().min(candidate.width()),
        reference.height().min(candidate.height()),
    );

    if region.is_empty() {
        return Err(NoOverlapError {
            reference: reference.dimensions(),
            candidate: candidate.dimensions(),
        });
    }

    Ok(Reconciled {
        region,
        reference_original: reference.dimensions(),
        candidate_original: candidate.dimensions(),
        reference: crop_top_left(reference, region),
        candidate: crop_top_left(candidate, region),
    })
}

fn crop_top_left(frame: &ImageFrame, region: Dimensions) -> Cow<'_, [u8]> {
    let row_bytes = region.width as usize * CHANNELS;
    let rows = region.height as usize;

    // Full-width crops are a prefix of the buffer
    if region.width == frame.width() {
        return Cow::Borrowed(&frame.pixels()[..row_bytes * rows]);
    }

    let stride = frame.stride();
    let mut out = Vec::with_capacity(row_bytes * rows);
    for row in frame.pixels().chunks_exact(stride).take(rows) {
        out.extend_from_slice(&row[..row_bytes]);
    }
    Cow::Owned(out)
}
