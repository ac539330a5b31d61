//! Outcome of comparing one reference frame with one candidate frame

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::PassPolicy;
use crate::frame::{Dimensions, ImageFrame};

/// Measurements and verdict for a single comparison
///
/// Only the evaluator constructs these. `passed` is derived from the
/// measurements and the policy in use and has no setter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComparisonResult {
    pixel_difference_count: u64,
    total_compared_pixels: u64,
    diff_percentage: f64,
    reference_dimensions: Dimensions,
    candidate_dimensions: Dimensions,
    dimensions_match: bool,
    height_delta_percentage: f64,
    passed: bool,
    #[serde(skip)]
    diff_image: Option<Arc<ImageFrame>>,
}

impl ComparisonResult {
    pub(crate) fn new(
        pixel_difference_count: u64,
        total_compared_pixels: u64,
        reference_dimensions: Dimensions,
        candidate_dimensions: Dimensions,
        policy: &PassPolicy,
        diff_image: Option<ImageFrame>,
    ) -> Self {
        let mut result = Self {
            pixel_difference_count,
            total_compared_pixels,
            diff_percentage: 0.0,
            reference_dimensions,
            candidate_dimensions,
            dimensions_match: false,
            height_delta_percentage: 0.0,
            passed: false,
            diff_image: diff_image.map(Arc::new),
        };
        result.judge(policy);
        result
    }

    /// Recompute every derived field from the raw counts and dimensions
    ///
    /// Deserialized results go through this so a stored verdict can never
    /// disagree with the stored measurements.
    pub(crate) fn judge(&mut self, policy: &PassPolicy) {
        self.diff_percentage = if self.total_compared_pixels == 0 {
            0.0
        } else {
            (100.0 * self.pixel_difference_count as f64 / self.total_compared_pixels as f64)
                .clamp(0.0, 100.0)
        };
        self.height_delta_percentage = height_delta_percentage(
            self.reference_dimensions.height,
            self.candidate_dimensions.height,
        );
        self.dimensions_match = self.reference_dimensions == self.candidate_dimensions;
        self.passed = policy.accepts(self.diff_percentage, self.height_delta_percentage);
    }

    /// Pixels whose color distance exceeded the tolerance
    pub fn pixel_difference_count(&self) -> u64 {
        self.pixel_difference_count
    }

    /// Pixels inside the compared region
    pub fn total_compared_pixels(&self) -> u64 {
        self.total_compared_pixels
    }

    /// Share of differing pixels, `0..=100`
    pub fn diff_percentage(&self) -> f64 {
        self.diff_percentage
    }

    /// Reference size before reconciliation
    pub fn reference_dimensions(&self) -> Dimensions {
        self.reference_dimensions
    }

    /// Candidate size before reconciliation
    pub fn candidate_dimensions(&self) -> Dimensions {
        self.candidate_dimensions
    }

    /// True when both frames had identical dimensions
    pub fn dimensions_match(&self) -> bool {
        self.dimensions_match
    }

    /// Height difference relative to the taller frame, `0..=100`
    pub fn height_delta_percentage(&self) -> f64 {
        self.height_delta_percentage
    }

    /// Whether the comparison satisfied its pass policy
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Diff visualization, when one was generated
    pub fn diff_image(&self) -> Option<&ImageFrame> {
        self.diff_image.as_deref()
    }
}

/// `100 * |a - b| / max(a, b)`, or `0` when both are zero
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::height_delta_percentage;
///
/// assert_eq!(height_delta_percentage(1000, 1000), 0.0);
/// assert_eq!(height_delta_percentage(1000, 900), 10.0);
/// assert_eq!(height_delta_percentage(0, 0), 0.0);
/// ```
pub fn height_delta_percentage(reference: u32, candidate: u32) -> f64 {
    let max = reference.max(candidate);
    if max == 0 {
        return 0.0;
    }
    100.0 * f64::from(reference.abs_diff(candidate)) / f64::from(max)
}
