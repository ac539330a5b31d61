//! Evaluation of a single (page, viewport) case
//!
//! The evaluator is a pure function of its inputs. It owns no state, so the
//! orchestrator can run any number of evaluations side by side.

use std::path::Path;

use super::differ::{diff_buffers, DiffOptions};
use super::reconcile::reconcile;
use super::{ComparisonResult, PassPolicy};
use crate::frame::{load_frame, ImageFrame};
use crate::model::{CaseOutcome, ErrorKind, ErrorOutcome, PageSpec, TestCase, Viewport};

/// Compare two frames for one page at one viewport
///
/// Reconciliation and differencing failures become an error outcome for
/// this case; they never propagate.
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::{evaluate, DiffOptions, PassPolicy};
/// use pixel_parity::frame::ImageFrame;
/// use pixel_parity::model::{PageSpec, Viewport};
///
/// let page = PageSpec::new("home", "ref.png", "cand.png");
/// let viewport = Viewport::new("desktop", 1920, 1080);
/// let frame = ImageFrame::filled(8, 8, [30, 60, 90, 255]);
///
/// let outcome = evaluate(&page, &viewport, &frame, &frame, &PassPolicy::default(), &DiffOptions::default());
/// assert!(outcome.passed());
/// assert_eq!(outcome.comparison().unwrap().diff_percentage(), 0.0);
/// ```
pub fn evaluate(
    page: &PageSpec,
    viewport: &Viewport,
    reference: &ImageFrame,
    candidate: &ImageFrame,
    policy: &PassPolicy,
    options: &DiffOptions,
) -> CaseOutcome {
    let case = TestCase::new(page, viewport);

    let reconciled = match reconcile(reference, candidate) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("{case}: {e}");
            return CaseOutcome::error(case, ErrorOutcome::new(ErrorKind::NoOverlap, e.to_string()));
        }
    };

    let diff = match diff_buffers(
        &reconciled.reference,
        &reconciled.candidate,
        reconciled.region,
        options,
    ) {
        Ok(d) => d,
        Err(e) => {
            return CaseOutcome::error(case, ErrorOutcome::new(ErrorKind::Internal, e.to_string()));
        }
    };

    let result = ComparisonResult::new(
        diff.different_pixels,
        diff.total_pixels,
        reconciled.reference_original,
        reconciled.candidate_original,
        policy,
        diff.diff_image,
    );

    log::debug!(
        "{case}: {:.2}% different, height delta {:.2}%, passed={}",
        result.diff_percentage(),
        result.height_delta_percentage(),
        result.passed()
    );

    CaseOutcome::compared(case, result)
}

/// Decode two image files and evaluate them
///
/// A file that cannot be read or decoded yields a `decode` error outcome.
pub fn evaluate_files(
    page: &PageSpec,
    viewport: &Viewport,
    reference: &Path,
    candidate: &Path,
    policy: &PassPolicy,
    options: &DiffOptions,
) -> CaseOutcome {
    let frames = load_frame(reference).and_then(|r| load_frame(candidate).map(|c| (r, c)));
    match frames {
        Ok((r, c)) => evaluate(page, viewport, &r, &c, policy, options),
        Err(e) => CaseOutcome::error(
            TestCase::new(page, viewport),
            ErrorOutcome::new(ErrorKind::Decode, e.to_string()),
        ),
    }
}
