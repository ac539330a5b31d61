//! Compare command implementation
//!
//! Handles the `pixel-parity compare` command which diffs two screenshots
//! directly, without a configuration file.

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

use crate::compare::{evaluate_files, DiffOptions, DiffStyle, PassPolicy, DEFAULT_TOLERANCE};
use crate::config::{ConfigResolver, ConfigurationError, PolicyPreset, PolicySettings, ValidationIssue};
use crate::error::ParityError;
use crate::fmt::{format_percent, icon, CHART, CHECKMARK, CROSSMARK};
use crate::frame::encode_png;
use crate::model::{CaseOutcome, CaseResult, PageSpec, Viewport};

/// Options for `pixel-parity compare`
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Policy preset name
    pub preset: String,
    /// Per-pixel tolerance
    pub tolerance: f64,
    /// Maximum diff percentage, overriding the preset
    pub max_diff_percent: Option<f64>,
    /// Maximum height delta percentage, overriding the preset
    pub max_height_delta_percent: Option<f64>,
    /// How unchanged pixels are drawn in the diff image
    pub style: DiffStyle,
    /// Where to write the diff image
    pub diff_out: Option<PathBuf>,
    /// Print the outcome as JSON
    pub json: bool,
    /// Use emoji in console output
    pub emoji: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            preset: PolicyPreset::default().name().to_string(),
            tolerance: DEFAULT_TOLERANCE,
            max_diff_percent: None,
            max_height_delta_percent: None,
            style: DiffStyle::default(),
            diff_out: None,
            json: false,
            emoji: true,
        }
    }
}

impl CompareOptions {
    fn policy(&self) -> Result<PassPolicy, ParityError> {
        if self.preset.parse::<PolicyPreset>().is_err() {
            return Err(ParityError::InvalidPreset {
                name: self.preset.clone(),
                available: PolicyPreset::ALL.iter().map(|p| p.name().to_string()).collect(),
            });
        }

        let mut issues = Vec::new();
        if !(0.0..=1.0).contains(&self.tolerance) {
            issues.push(ValidationIssue::error("tolerance", "must be within [0, 1]"));
        }
        for (field, value) in [
            ("max-diff", self.max_diff_percent),
            ("max-height-delta", self.max_height_delta_percent),
        ] {
            if value.is_some_and(|v| !(0.0..=100.0).contains(&v)) {
                issues.push(ValidationIssue::error(field, "must be within [0, 100]"));
            }
        }
        ConfigurationError::check(issues)?;

        let settings = PolicySettings {
            max_diff_percent: self.max_diff_percent,
            max_height_delta_percent: self.max_height_delta_percent,
        };
        Ok(ConfigResolver::policy(&self.preset, Some(&settings)))
    }
}

/// Compare two screenshots and report whether they match
///
/// Returns the process exit code: 0 when the pair passes, 1 otherwise.
///
/// # Examples
///
/// ```no_run
/// use pixel_parity::cmd::compare::{cmd_compare, CompareOptions};
///
/// let code = cmd_compare("live.png", "local.png", &CompareOptions::default())?;
/// assert_eq!(code, 0);
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - Either file doesn't exist
/// - The preset or a threshold is invalid
/// - Either file is not a decodable image, or the frames do not overlap
pub fn cmd_compare(reference: &str, candidate: &str, options: &CompareOptions) -> Result<i32> {
    let reference_path = Path::new(reference);
    let candidate_path = Path::new(candidate);

    for path in [reference_path, candidate_path] {
        if !path.exists() {
            return Err(ParityError::FileNotFound {
                path: path.to_path_buf(),
                operation: "compare".to_string(),
            }
            .into());
        }
    }

    let policy = options.policy()?;
    let diff_options = DiffOptions::default()
        .with_tolerance(options.tolerance)
        .with_style(options.style)
        .with_generate_image(options.diff_out.is_some());

    let name = candidate_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let page = PageSpec::new(name, reference, candidate);
    let viewport = Viewport::new("file", 0, 0);

    let outcome = evaluate_files(
        &page,
        &viewport,
        reference_path,
        candidate_path,
        &policy,
        &diff_options,
    );

    if let CaseResult::Error(ref e) = outcome.result {
        anyhow::bail!("comparison failed ({}): {}", e.kind.as_str(), e.message);
    }

    if let Some(ref out) = options.diff_out {
        write_diff(&outcome, out)?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        present_outcome(&outcome, &policy, options);
    }

    Ok(if outcome.passed() { 0 } else { 1 })
}

fn write_diff(outcome: &CaseOutcome, path: &Path) -> Result<()> {
    let Some(image) = outcome.comparison().and_then(|c| c.diff_image()) else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let png = encode_png(image).context("Failed to encode diff image")?;
    std::fs::write(path, png).map_err(|source| ParityError::Io {
        context: format!("writing {}", path.display()),
        source,
    })?;
    Ok(())
}

fn present_outcome(outcome: &CaseOutcome, policy: &PassPolicy, options: &CompareOptions) {
    let Some(result) = outcome.comparison() else {
        return;
    };
    let emoji = options.emoji;

    println!("{} {} Screenshot comparison", icon(CHART, emoji), style("pixel-parity").bold());
    println!();
    println!(
        "   Sizes:     {} reference, {} candidate",
        result.reference_dimensions(),
        result.candidate_dimensions()
    );
    println!(
        "   Compared:  {} of {} pixels differ ({})",
        result.pixel_difference_count(),
        result.total_compared_pixels(),
        format_percent(result.diff_percentage())
    );
    println!(
        "   Height delta: {} (limit {})",
        format_percent(result.height_delta_percentage()),
        format_percent(policy.max_height_delta_percent)
    );
    if let Some(ref out) = options.diff_out {
        println!("   Diff image: {}", style(out.display()).cyan());
    }
    println!();

    if result.passed() {
        println!("{} Screenshots match", icon(CHECKMARK, emoji));
    } else {
        println!(
            "{} Screenshots differ beyond {} pixels / {} height",
            icon(CROSSMARK, emoji),
            format_percent(policy.max_diff_percent),
            format_percent(policy.max_height_delta_percent)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ImageFrame;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, frame: &ImageFrame) -> String {
        let path = dir.join(name);
        std::fs::write(&path, encode_png(frame).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn quiet() -> CompareOptions {
        CompareOptions {
            json: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_compare_with_missing_reference_file() {
        let temp = TempDir::new().unwrap();
        let candidate = write(temp.path(), "c.png", &ImageFrame::filled(4, 4, [0, 0, 0, 255]));
        let missing = temp.path().join("missing.png");

        let err = cmd_compare(missing.to_str().unwrap(), &candidate, &quiet()).unwrap_err();
        let parity = err.downcast_ref::<ParityError>().unwrap();
        assert!(matches!(parity, ParityError::FileNotFound { .. }));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_compare_identical_images_exit_zero() {
        let temp = TempDir::new().unwrap();
        let frame = ImageFrame::filled(4, 4, [10, 20, 30, 255]);
        let a = write(temp.path(), "a.png", &frame);
        let b = write(temp.path(), "b.png", &frame);

        assert_eq!(cmd_compare(&a, &b, &quiet()).unwrap(), 0);
    }

    #[test]
    fn test_compare_different_images_writes_diff() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.png", &ImageFrame::filled(4, 4, [0, 0, 0, 255]));
        let b = write(temp.path(), "b.png", &ImageFrame::filled(4, 4, [255, 255, 255, 255]));
        let diff = temp.path().join("out/diff.png");

        let options = CompareOptions {
            diff_out: Some(diff.clone()),
            ..quiet()
        };
        assert_eq!(cmd_compare(&a, &b, &options).unwrap(), 1);
        assert!(diff.exists());
    }

    #[test]
    fn test_compare_rejects_unknown_preset() {
        let temp = TempDir::new().unwrap();
        let frame = ImageFrame::filled(2, 2, [0, 0, 0, 255]);
        let a = write(temp.path(), "a.png", &frame);

        let options = CompareOptions {
            preset: "strict".to_string(),
            ..quiet()
        };
        let err = cmd_compare(&a, &a, &options).unwrap_err();
        assert_eq!(err.downcast_ref::<ParityError>().unwrap().exit_code(), 64);
    }

    #[test]
    fn test_compare_rejects_out_of_range_tolerance() {
        let options = CompareOptions {
            tolerance: 1.5,
            ..quiet()
        };
        let err = options.policy().unwrap_err();
        assert!(matches!(err, ParityError::InvalidConfig(_)));
    }

    #[test]
    fn test_compare_undecodable_file_is_error() {
        let temp = TempDir::new().unwrap();
        let bad = temp.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();
        let good = write(temp.path(), "good.png", &ImageFrame::filled(2, 2, [0, 0, 0, 255]));

        let err = cmd_compare(bad.to_str().unwrap(), &good, &quiet()).unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn test_threshold_overrides_apply_to_preset() {
        let options = CompareOptions {
            preset: "lenient".to_string(),
            max_diff_percent: Some(2.0),
            ..quiet()
        };
        assert_eq!(options.policy().unwrap(), PassPolicy::new(2.0, 15.0));
    }
}
