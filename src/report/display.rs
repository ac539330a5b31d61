//! Console rendering of finished reports

use console::style;
use std::fmt::Write as _;

use super::history::{CaseChange, ReportComparison};
use super::{SuiteReport, Verdict};
use crate::fmt::{format_delta, format_percent, icon, CHART, CHECKMARK, CROSSMARK, SPARKLES, WARNING};
use crate::model::CaseResult;

/// Render the per-case table and totals
pub fn render_summary(report: &SuiteReport, emoji: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{} Visual parity results", icon(CHART, emoji));

    for outcome in report.cases() {
        let line = match &outcome.result {
            CaseResult::Compared(c) if c.passed() => format!(
                "  {} {:<32} {:>8} different",
                icon(CHECKMARK, emoji),
                outcome.case.to_string(),
                format_percent(c.diff_percentage())
            ),
            CaseResult::Compared(c) => {
                let mut line = format!(
                    "  {} {:<32} {:>8} different",
                    icon(CROSSMARK, emoji),
                    outcome.case.to_string(),
                    style(format_percent(c.diff_percentage())).red()
                );
                if !c.dimensions_match() {
                    let _ = write!(
                        line,
                        " (height {} vs {}, {})",
                        c.reference_dimensions().height,
                        c.candidate_dimensions().height,
                        format_percent(c.height_delta_percentage())
                    );
                }
                line
            }
            CaseResult::Error(e) => format!(
                "  {} {:<32} {}: {}",
                icon(WARNING, emoji),
                outcome.case.to_string(),
                style(e.kind.as_str()).yellow(),
                e.message
            ),
        };
        let _ = writeln!(out, "{line}");
    }

    let _ = writeln!(
        out,
        "\n  Total: {}  Passed: {}  Failed: {}  Errored: {}",
        report.total_tests(),
        style(report.passed()).green(),
        style(report.failed()).red(),
        style(report.errored()).yellow()
    );
    let _ = writeln!(
        out,
        "  Accuracy: {}  (limits: {} pixels, {} height, tolerance {})",
        format_percent(report.accuracy_percentage()),
        format_percent(report.policy().max_diff_percent),
        format_percent(report.policy().max_height_delta_percent),
        report.tolerance()
    );

    let verdict = match report.verdict() {
        Verdict::Passed => format!("{} All cases passed", icon(SPARKLES, emoji)),
        Verdict::Failed => format!(
            "{} {} of {} cases did not pass",
            icon(CROSSMARK, emoji),
            report.failed() + report.errored(),
            report.total_tests()
        ),
        Verdict::NoTestsRan => format!("{} No tests ran", icon(WARNING, emoji)),
    };
    let _ = writeln!(out, "\n{verdict}");
    out
}

/// Print the summary to stdout
pub fn print_summary(report: &SuiteReport, emoji: bool) {
    print!("{}", render_summary(report, emoji));
}

/// Render the differences between two runs
pub fn render_comparison(comparison: &ReportComparison, emoji: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{} Accuracy {} -> {} ({})",
        icon(CHART, emoji),
        format_percent(comparison.previous_accuracy),
        format_percent(comparison.current_accuracy),
        format_delta(comparison.accuracy_delta())
    );

    for delta in &comparison.cases {
        let (marker, label) = match delta.change {
            CaseChange::Regressed => (icon(CROSSMARK, emoji), style("regressed").red()),
            CaseChange::Fixed => (icon(CHECKMARK, emoji), style("fixed").green()),
            CaseChange::Added => (icon(SPARKLES, emoji), style("new").cyan()),
            CaseChange::Removed => (icon(WARNING, emoji), style("removed").yellow()),
            CaseChange::Unchanged => continue,
        };
        let mut line = format!("  {} {:<32} {}", marker, delta.case.to_string(), label);
        if let Some(d) = delta.diff_delta() {
            let _ = write!(line, " ({})", format_delta(d));
        }
        let _ = writeln!(out, "{line}");
    }

    let regressions = comparison.regressions().count();
    if regressions == 0 {
        let _ = writeln!(out, "\n{} No regressions", icon(SPARKLES, emoji));
    } else {
        let _ = writeln!(out, "\n{} {} regression(s)", icon(WARNING, emoji), regressions);
    }
    out
}

/// Print the run comparison to stdout
pub fn print_comparison(comparison: &ReportComparison, emoji: bool) {
    print!("{}", render_comparison(comparison, emoji));
}
