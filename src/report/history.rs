//! Run-to-run comparison
//!
//! Artifacts are named deterministically, so two reports can be matched
//! case by case. A regression is a case that passed before and does not
//! pass now.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::SuiteReport;
use crate::model::{CaseOutcome, TestCase};

/// How a case changed between two runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseChange {
    /// Passed before, does not pass now
    Regressed,
    /// Did not pass before, passes now
    Fixed,
    /// Same pass/fail status
    Unchanged,
    /// Only present in the current run
    Added,
    /// Only present in the previous run
    Removed,
}

/// One case matched across two runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaseDelta {
    /// Page and viewport
    pub case: TestCase,
    /// Classification
    pub change: CaseChange,
    /// Diff percentage in the previous run, if it was compared
    pub previous_diff_percentage: Option<f64>,
    /// Diff percentage in the current run, if it was compared
    pub current_diff_percentage: Option<f64>,
}

impl CaseDelta {
    /// Change in diff percentage, when both runs compared the case
    pub fn diff_delta(&self) -> Option<f64> {
        Some(self.current_diff_percentage? - self.previous_diff_percentage?)
    }
}

/// Case-by-case comparison of two reports
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::PassPolicy;
/// use pixel_parity::report::{ReportComparison, SuiteReport};
///
/// let before = SuiteReport::from_outcomes(Vec::new(), PassPolicy::default(), 0.1);
/// let after = SuiteReport::from_outcomes(Vec::new(), PassPolicy::default(), 0.1);
/// let comparison = ReportComparison::between(&before, &after);
/// assert!(!comparison.has_regressions());
/// assert_eq!(comparison.accuracy_delta(), 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportComparison {
    /// Accuracy of the previous run
    pub previous_accuracy: f64,
    /// Accuracy of the current run
    pub current_accuracy: f64,
    /// Per-case deltas: current order first, then removed cases
    pub cases: Vec<CaseDelta>,
}

fn diff_of(outcome: &CaseOutcome) -> Option<f64> {
    outcome.comparison().map(|c| c.diff_percentage())
}

impl ReportComparison {
    /// Match the cases of two reports by page and viewport
    pub fn between(previous: &SuiteReport, current: &SuiteReport) -> Self {
        let before: HashMap<&TestCase, &CaseOutcome> =
            previous.cases().iter().map(|c| (&c.case, c)).collect();

        let mut cases: Vec<CaseDelta> = current
            .cases()
            .iter()
            .map(|now| {
                let (change, previous_diff) = match before.get(&now.case) {
                    None => (CaseChange::Added, None),
                    Some(then) => {
                        let change = match (then.passed(), now.passed()) {
                            (true, false) => CaseChange::Regressed,
                            (false, true) => CaseChange::Fixed,
                            _ => CaseChange::Unchanged,
                        };
                        (change, diff_of(then))
                    }
                };
                CaseDelta {
                    case: now.case.clone(),
                    change,
                    previous_diff_percentage: previous_diff,
                    current_diff_percentage: diff_of(now),
                }
            })
            .collect();

        let still_present: HashSet<&TestCase> = current.cases().iter().map(|c| &c.case).collect();
        cases.extend(
            previous
                .cases()
                .iter()
                .filter(|then| !still_present.contains(&then.case))
                .map(|then| CaseDelta {
                    case: then.case.clone(),
                    change: CaseChange::Removed,
                    previous_diff_percentage: diff_of(then),
                    current_diff_percentage: None,
                }),
        );

        Self {
            previous_accuracy: previous.accuracy_percentage(),
            current_accuracy: current.accuracy_percentage(),
            cases,
        }
    }

    /// Cases with a given classification
    pub fn with_change(&self, change: CaseChange) -> impl Iterator<Item = &CaseDelta> {
        self.cases.iter().filter(move |c| c.change == change)
    }

    /// Cases that passed before and do not pass now
    pub fn regressions(&self) -> impl Iterator<Item = &CaseDelta> {
        self.with_change(CaseChange::Regressed)
    }

    /// Cases that did not pass before and pass now
    pub fn fixes(&self) -> impl Iterator<Item = &CaseDelta> {
        self.with_change(CaseChange::Fixed)
    }

    /// True if any case regressed
    pub fn has_regressions(&self) -> bool {
        self.regressions().next().is_some()
    }

    /// Change in accuracy, in percentage points
    pub fn accuracy_delta(&self) -> f64 {
        self.current_accuracy - self.previous_accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{evaluate, DiffOptions, PassPolicy};
    use crate::frame::ImageFrame;
    use crate::model::{PageSpec, Viewport};

    fn outcome(page: &str, viewport: &str, differing_rows: u32) -> CaseOutcome {
        let reference = ImageFrame::filled(10, 10, [255, 255, 255, 255]);
        let mut bytes = reference.pixels().to_vec();
        for px in bytes.chunks_exact_mut(4).take((differing_rows * 10) as usize) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
        let candidate = ImageFrame::new(10, 10, bytes).unwrap();
        evaluate(
            &PageSpec::new(page, "r", "c"),
            &Viewport::new(viewport, 10, 10),
            &reference,
            &candidate,
            &PassPolicy::default(),
            &DiffOptions::default(),
        )
    }

    fn report(outcomes: Vec<CaseOutcome>) -> SuiteReport {
        SuiteReport::from_outcomes(outcomes, PassPolicy::default(), 0.1)
    }

    #[test]
    fn test_classifies_regressions_and_fixes() {
        let previous = report(vec![
            outcome("home", "desktop", 0),
            outcome("home", "mobile", 3),
            outcome("links", "desktop", 0),
        ]);
        let current = report(vec![
            outcome("home", "desktop", 2),
            outcome("home", "mobile", 0),
            outcome("links", "desktop", 0),
        ]);

        let comparison = ReportComparison::between(&previous, &current);
        assert!(comparison.has_regressions());

        let regressions: Vec<_> = comparison.regressions().collect();
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].case.viewport, "desktop");
        assert_eq!(regressions[0].diff_delta(), Some(20.0));

        let fixes: Vec<_> = comparison.fixes().collect();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].case.viewport, "mobile");

        assert_eq!(comparison.with_change(CaseChange::Unchanged).count(), 1);
    }

    #[test]
    fn test_added_and_removed_cases() {
        let previous = report(vec![outcome("home", "desktop", 0), outcome("old", "desktop", 0)]);
        let current = report(vec![outcome("home", "desktop", 0), outcome("new", "desktop", 0)]);

        let comparison = ReportComparison::between(&previous, &current);
        let added: Vec<_> = comparison.with_change(CaseChange::Added).collect();
        let removed: Vec<_> = comparison.with_change(CaseChange::Removed).collect();

        assert_eq!(added[0].case.page, "new");
        assert_eq!(added[0].previous_diff_percentage, None);
        assert_eq!(removed[0].case.page, "old");
        assert_eq!(removed[0].current_diff_percentage, None);
        assert!(!comparison.has_regressions());
        assert_eq!(comparison.cases.len(), 3);
    }

    #[test]
    fn test_accuracy_delta() {
        let previous = report(vec![outcome("a", "d", 0), outcome("b", "d", 5)]);
        let current = report(vec![outcome("a", "d", 0), outcome("b", "d", 0)]);
        let comparison = ReportComparison::between(&previous, &current);
        assert_eq!(comparison.previous_accuracy, 50.0);
        assert_eq!(comparison.accuracy_delta(), 50.0);
    }
}
