//! Test assertion helpers
//!
//! Floating-point comparisons for percentages, plus shorthands for
//! inspecting case outcomes in a report.

use pixel_parity::model::{CaseOutcome, ErrorKind};
use pixel_parity::report::SuiteReport;

/// Assert that two floating-point values are approximately equal
///
/// Use this instead of `assert_eq!` for f64 comparisons that go through
/// division, such as diff percentages.
#[allow(dead_code)]
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff < epsilon,
        "Float values not approximately equal:\n  actual: {}\n  expected: {}\n  diff: {} (epsilon: {})",
        actual, expected, diff, epsilon
    );
}

/// Look up a case and fail with the list of cases if it is missing
#[allow(dead_code)]
pub fn case<'a>(report: &'a SuiteReport, page: &str, viewport: &str) -> &'a CaseOutcome {
    report.case(page, viewport).unwrap_or_else(|| {
        let names: Vec<String> = report.cases().iter().map(|c| c.case.to_string()).collect();
        panic!("no case {page}/{viewport} in {names:?}")
    })
}

/// Assert that a case ended with an error of the given kind
#[allow(dead_code)]
pub fn assert_error_kind(outcome: &CaseOutcome, kind: ErrorKind) {
    match outcome.error_outcome() {
        Some(e) => assert_eq!(e.kind, kind, "{}: {}", outcome.case, e.message),
        None => panic!("{} was compared, expected a {} error", outcome.case, kind.as_str()),
    }
}

/// Case names in report order, as "page/viewport"
#[allow(dead_code)]
pub fn case_order(report: &SuiteReport) -> Vec<String> {
    report.cases().iter().map(|c| c.case.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_pass() {
        assert_approx_eq(0.75, 0.75, 0.01);
        assert_approx_eq(0.75, 0.7501, 0.01);
        assert_approx_eq(12.5, 12.45, 0.1);
    }

    #[test]
    #[should_panic(expected = "Float values not approximately equal")]
    fn test_assert_approx_eq_fail() {
        assert_approx_eq(0.75, 0.80, 0.01);
    }
}
