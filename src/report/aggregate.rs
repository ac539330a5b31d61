//! Reduction of case outcomes into a suite verdict

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::compare::PassPolicy;
use crate::model::CaseOutcome;

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Every case ran and passed
    Passed,
    /// At least one case failed or errored
    Failed,
    /// The run had no cases
    NoTestsRan,
}

impl Verdict {
    /// Get the verdict as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NoTestsRan => "no-tests-ran",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable summary of one run
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::PassPolicy;
/// use pixel_parity::report::{SuiteReport, Verdict};
///
/// let report = SuiteReport::from_outcomes(Vec::new(), PassPolicy::default(), 0.1);
/// assert!(report.no_tests_ran());
/// assert_eq!(report.accuracy_percentage(), 0.0);
/// assert_eq!(report.verdict(), Verdict::NoTestsRan);
/// assert_ne!(report.exit_code(), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "StoredReport")]
pub struct SuiteReport {
    run_id: Uuid,
    total_tests: usize,
    passed: usize,
    failed: usize,
    errored: usize,
    accuracy_percentage: f64,
    no_tests_ran: bool,
    policy: PassPolicy,
    tolerance: f64,
    cases: Vec<CaseOutcome>,
}

/// The parts of a persisted report that are not derived
///
/// Counts, accuracy and per-case verdicts in `report.json` are ignored on
/// load and recomputed from the measurements and the stored policy.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StoredReport {
    run_id: Uuid,
    policy: PassPolicy,
    tolerance: f64,
    cases: Vec<CaseOutcome>,
}

impl From<StoredReport> for SuiteReport {
    fn from(stored: StoredReport) -> Self {
        let mut cases = stored.cases;
        for case in &mut cases {
            case.judge(&stored.policy);
        }
        Self::reduce(stored.run_id, cases, stored.policy, stored.tolerance)
    }
}

impl SuiteReport {
    /// Reduce ordered outcomes into a report with a fresh run id
    pub fn from_outcomes(cases: Vec<CaseOutcome>, policy: PassPolicy, tolerance: f64) -> Self {
        Self::reduce(Uuid::new_v4(), cases, policy, tolerance)
    }

    fn reduce(run_id: Uuid, cases: Vec<CaseOutcome>, policy: PassPolicy, tolerance: f64) -> Self {
        let total_tests = cases.len();
        let passed = cases.iter().filter(|c| c.passed()).count();
        let errored = cases.iter().filter(|c| c.is_error()).count();
        let failed = total_tests - passed - errored;

        let accuracy_percentage = if total_tests == 0 {
            0.0
        } else {
            100.0 * passed as f64 / total_tests as f64
        };

        Self {
            run_id,
            total_tests,
            passed,
            failed,
            errored,
            accuracy_percentage,
            no_tests_ran: total_tests == 0,
            policy,
            tolerance,
            cases,
        }
    }

    /// Unique id of the run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Number of cases
    pub fn total_tests(&self) -> usize {
        self.total_tests
    }

    /// Cases whose comparison passed
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Cases whose comparison did not pass
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Cases that ended in an error outcome
    pub fn errored(&self) -> usize {
        self.errored
    }

    /// `100 * passed / total`, `0` for an empty run
    pub fn accuracy_percentage(&self) -> f64 {
        self.accuracy_percentage
    }

    /// True when the run had no cases
    pub fn no_tests_ran(&self) -> bool {
        self.no_tests_ran
    }

    /// Policy the cases were judged by
    pub fn policy(&self) -> &PassPolicy {
        &self.policy
    }

    /// Per-pixel tolerance in use
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Outcomes in (page, viewport) configuration order
    pub fn cases(&self) -> &[CaseOutcome] {
        &self.cases
    }

    /// Find the outcome for a page at a viewport
    pub fn case(&self, page: &str, viewport: &str) -> Option<&CaseOutcome> {
        self.cases
            .iter()
            .find(|c| c.case.page == page && c.case.viewport == viewport)
    }

    /// Outcomes that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.cases.iter().filter(|c| !c.passed())
    }

    /// Overall verdict
    pub fn verdict(&self) -> Verdict {
        if self.no_tests_ran {
            Verdict::NoTestsRan
        } else if self.passed == self.total_tests {
            Verdict::Passed
        } else {
            Verdict::Failed
        }
    }

    /// Process exit code for the verdict: `0` only when every case passed
    pub fn exit_code(&self) -> i32 {
        match self.verdict() {
            Verdict::Passed => 0,
            Verdict::Failed | Verdict::NoTestsRan => 1,
        }
    }
}
