//! Run command implementation
//!
//! Thin presentation layer for the run command.
//! Business logic lives in `workflow::RunWorkflow`.

use anyhow::{Context, Result};
use console::style;
use std::env;
use std::path::PathBuf;

use crate::cmd::workflow::{RunResult, RunWorkflow};
use crate::config::ConfigOverrides;
use crate::fmt::{icon, INFO, ROCKET};
use crate::report::display::print_summary;

/// Options for `pixel-parity run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Values overriding the configuration file
    pub overrides: ConfigOverrides,
    /// Print the report as JSON instead of the summary
    pub json: bool,
    /// Use emoji in console output
    pub emoji: bool,
}

/// Main run command handler (presentation layer)
///
/// Returns the process exit code: 0 when every case passed, 1 otherwise.
///
/// # Examples
///
/// ```no_run
/// use pixel_parity::cmd::run::{cmd_run, RunOptions};
///
/// let code = cmd_run(RunOptions { emoji: true, ..Default::default() })?;
/// std::process::exit(code);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_run(options: RunOptions) -> Result<i32> {
    if !options.json {
        println!(
            "{} {} Visual parity run",
            icon(ROCKET, options.emoji),
            style("pixel-parity").bold()
        );
    }

    let project_root = env::current_dir()?;
    let mut workflow = RunWorkflow::new(&project_root, options.overrides);
    if let Some(path) = options.config {
        workflow = workflow.with_config_path(path);
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(workflow.execute(!options.json))?;

    if options.json {
        present_json_report(&result)?;
    } else {
        present_results(&result, options.emoji);
    }

    Ok(result.report.exit_code())
}

/// Present the summary and artifact locations
fn present_results(result: &RunResult, emoji: bool) {
    print_summary(&result.report, emoji);
    println!(
        "\n{} Report written to {}",
        icon(INFO, emoji),
        style(result.report_path.display()).cyan()
    );
}

/// Present JSON report for CI systems
fn present_json_report(result: &RunResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&result.report)?);
    Ok(())
}
