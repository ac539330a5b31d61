//! Regressions command implementation
//!
//! Handles the `pixel-parity regressions` command which compares two
//! persisted `report.json` files and lists cases that stopped passing.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use crate::error::ParityError;
use crate::report::display::print_comparison;
use crate::report::{load_report, ReportComparison, SuiteReport};

/// Compare a previous run with the current one
///
/// Returns 1 when any case regressed, 0 otherwise.
///
/// # Examples
///
/// ```no_run
/// use pixel_parity::cmd::regressions::cmd_regressions;
///
/// let code = cmd_regressions("baseline/report.json", "parity-results/report.json", false, true)?;
/// std::process::exit(code);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_regressions(previous: &str, current: &str, json: bool, emoji: bool) -> Result<i32> {
    let previous = read(Path::new(previous))?;
    let current = read(Path::new(current))?;

    let comparison = ReportComparison::between(&previous, &current);
    log::debug!(
        "compared runs {} and {}: {} regressions",
        previous.run_id(),
        current.run_id(),
        comparison.regressions().count()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison_json(&comparison))?);
    } else {
        print_comparison(&comparison, emoji);
    }

    Ok(if comparison.has_regressions() { 1 } else { 0 })
}

fn read(path: &Path) -> Result<SuiteReport> {
    if !path.exists() {
        return Err(ParityError::FileNotFound {
            path: path.to_path_buf(),
            operation: "regressions".to_string(),
        }
        .into());
    }
    let report = load_report(path).map_err(ParityError::from)?;
    Ok(report)
}

fn comparison_json(comparison: &ReportComparison) -> serde_json::Value {
    json!({
        "previous-accuracy": comparison.previous_accuracy,
        "current-accuracy": comparison.current_accuracy,
        "accuracy-delta": comparison.accuracy_delta(),
        "regressions": comparison.regressions().map(|d| d.case.to_string()).collect::<Vec<_>>(),
        "fixes": comparison.fixes().map(|d| d.case.to_string()).collect::<Vec<_>>(),
        "cases": comparison.cases,
    })
}
