//! Configuration validation
//!
//! Every check runs and every problem is collected, so a user fixing a
//! config file sees all issues at once instead of one per attempt.

use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use super::file::{CaptureMode, ConfigFile};
use super::template::PolicyPreset;
use crate::compare::PassPolicy;
use crate::model::{PageSpec, TestCase, Viewport};
use crate::suite::SuiteConfig;

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    /// Should be addressed but does not block a run
    Warning,
    /// Must be fixed
    Error,
}

impl ValidationSeverity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationSeverity::Warning => "WARNING",
            ValidationSeverity::Error => "ERROR",
        }
    }
}

/// A validation issue found in configuration
///
/// # Examples
///
/// ```
/// use pixel_parity::config::validator::{ValidationIssue, ValidationSeverity};
///
/// let issue = ValidationIssue::error("tolerance", "must be within [0, 1]")
///     .with_suggestion("The default is 0.1");
/// assert_eq!(issue.severity, ValidationSeverity::Error);
/// assert!(issue.suggestion.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Severity level
    pub severity: ValidationSeverity,
    /// Field or section that has the issue
    pub field: String,
    /// Description of the issue
    pub message: String,
    /// Suggested fix (if available)
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(
        severity: ValidationSeverity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create an error issue
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, field, message)
    }

    /// Create a warning issue
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, field, message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Configuration rejected at initialization
///
/// Carries every error-severity issue that was found.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render_issues(.issues))]
pub struct ConfigurationError {
    /// The problems found
    pub issues: Vec<ValidationIssue>,
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    let plural = if issues.len() == 1 { "" } else { "s" };
    let mut out = format!("invalid configuration ({} issue{}):", issues.len(), plural);
    for issue in issues {
        out.push_str(&format!("\n  - {issue}"));
    }
    out
}

impl ConfigurationError {
    /// Log warnings and fail if any issue is an error
    pub fn check(issues: Vec<ValidationIssue>) -> Result<(), Self> {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|i| i.severity == ValidationSeverity::Error);

        for warning in &warnings {
            log::warn!("config: {warning}");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { issues: errors })
        }
    }

    /// Fields that have at least one issue
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }
}

fn check_pages(pages: &[PageSpec], issues: &mut Vec<ValidationIssue>) {
    if pages.is_empty() {
        issues.push(
            ValidationIssue::error("page", "no pages configured")
                .with_suggestion("Add at least one [[page]] table"),
        );
    }
    let mut seen = HashSet::new();
    for (i, page) in pages.iter().enumerate() {
        if page.name.trim().is_empty() {
            issues.push(ValidationIssue::error(format!("page[{i}].name"), "name is empty"));
        } else if !seen.insert(page.name.as_str()) {
            issues.push(ValidationIssue::error(
                format!("page[{i}].name"),
                format!("duplicate page name '{}'", page.name),
            ));
        }
    }
}

fn check_viewports(viewports: &[Viewport], issues: &mut Vec<ValidationIssue>) {
    if viewports.is_empty() {
        issues.push(
            ValidationIssue::error("viewport", "no viewports configured")
                .with_suggestion("Add at least one [[viewport]] table"),
        );
    }
    let mut seen = HashSet::new();
    for (i, viewport) in viewports.iter().enumerate() {
        if viewport.name.trim().is_empty() {
            issues.push(ValidationIssue::error(format!("viewport[{i}].name"), "name is empty"));
        } else if !seen.insert(viewport.name.as_str()) {
            issues.push(ValidationIssue::error(
                format!("viewport[{i}].name"),
                format!("duplicate viewport name '{}'", viewport.name),
            ));
        }
        if viewport.width == 0 || viewport.height == 0 {
            issues.push(ValidationIssue::error(
                format!("viewport[{i}]"),
                format!("'{}' has zero dimensions ({}x{})", viewport.name, viewport.width, viewport.height),
            ));
        }
    }
}

/// Cases whose artifact names collide after sanitizing
///
/// Such cases would share capture files and diff images.
fn check_artifacts(pages: &[PageSpec], viewports: &[Viewport], issues: &mut Vec<ValidationIssue>) {
    let mut owners: HashMap<String, TestCase> = HashMap::new();
    let mut reported = HashSet::new();
    for page in pages {
        for viewport in viewports {
            let case = TestCase::new(page, viewport);
            let name = case.artifact_name();
            match owners.get(&name) {
                // Exact duplicates are reported by the name checks
                Some(owner) if *owner == case => {}
                Some(owner) => {
                    if reported.insert(name.clone()) {
                        issues.push(
                            ValidationIssue::error(
                                "artifact",
                                format!("'{owner}' and '{case}' both produce artifact '{name}'"),
                            )
                            .with_suggestion("Rename pages or viewports so names differ in [A-Za-z0-9_.-]"),
                        );
                    }
                }
                None => {
                    owners.insert(name, case);
                }
            }
        }
    }
}

fn check_tolerance(tolerance: f64, issues: &mut Vec<ValidationIssue>) {
    if !(0.0..=1.0).contains(&tolerance) {
        issues.push(
            ValidationIssue::error("tolerance", format!("{tolerance} is outside [0, 1]"))
                .with_suggestion("The default is 0.1"),
        );
    }
}

fn check_percent(field: &str, value: f64, issues: &mut Vec<ValidationIssue>) {
    // NaN fails the range check too
    if !(0.0..=100.0).contains(&value) {
        issues.push(ValidationIssue::error(
            field,
            format!("{value} is outside [0, 100]"),
        ));
    }
}

fn check_policy(policy: &PassPolicy, issues: &mut Vec<ValidationIssue>) {
    check_percent("policy.max-diff-percent", policy.max_diff_percent, issues);
    check_percent(
        "policy.max-height-delta-percent",
        policy.max_height_delta_percent,
        issues,
    );
}

fn check_concurrency(concurrency: usize, capture_concurrency: usize, issues: &mut Vec<ValidationIssue>) {
    if concurrency == 0 {
        issues.push(ValidationIssue::error("concurrency", "must be at least 1"));
    }
    if capture_concurrency == 0 {
        issues.push(ValidationIssue::error("capture-concurrency", "must be at least 1"));
    }
    // Each case issues at most two captures
    if concurrency > 0 && capture_concurrency > concurrency * 2 {
        issues.push(ValidationIssue::warning(
            "capture-concurrency",
            format!(
                "{capture_concurrency} exceeds twice the case concurrency ({concurrency}) and has no effect"
            ),
        ));
    }
}

/// Validate a resolved suite configuration
///
/// # Examples
///
/// ```
/// use pixel_parity::config::validator::validate_suite;
/// use pixel_parity::model::{PageSpec, Viewport};
/// use pixel_parity::suite::SuiteConfig;
///
/// let ok = SuiteConfig::new(
///     vec![PageSpec::new("home", "a.png", "b.png")],
///     vec![Viewport::new("desktop", 1920, 1080)],
/// );
/// assert!(validate_suite(&ok).is_ok());
///
/// let empty = SuiteConfig::new(Vec::new(), Vec::new());
/// let err = validate_suite(&empty).unwrap_err();
/// assert_eq!(err.issues.len(), 2);
/// ```
pub fn validate_suite(config: &SuiteConfig) -> Result<(), ConfigurationError> {
    let mut issues = Vec::new();
    check_pages(&config.pages, &mut issues);
    check_viewports(&config.viewports, &mut issues);
    check_artifacts(&config.pages, &config.viewports, &mut issues);
    check_tolerance(config.diff.tolerance, &mut issues);
    check_policy(&config.policy, &mut issues);
    check_concurrency(config.concurrency, config.capture_concurrency, &mut issues);
    if config.timeout.is_some_and(|t| t.is_zero()) {
        issues.push(ValidationIssue::error("timeout-secs", "must be at least 1"));
    }
    ConfigurationError::check(issues)
}

/// Validate a configuration file as written
pub fn validate_file(config: &ConfigFile) -> Result<(), ConfigurationError> {
    let mut issues = Vec::new();

    if let Err(e) = config.preset.parse::<PolicyPreset>() {
        let names: Vec<&str> = PolicyPreset::ALL.iter().map(|p| p.name()).collect();
        issues.push(
            ValidationIssue::error("preset", e)
                .with_suggestion(format!("Use one of: {}", names.join(", "))),
        );
    }
    if let Some(ref policy) = config.policy {
        if let Some(v) = policy.max_diff_percent {
            check_percent("policy.max-diff-percent", v, &mut issues);
        }
        if let Some(v) = policy.max_height_delta_percent {
            check_percent("policy.max-height-delta-percent", v, &mut issues);
        }
    }

    check_pages(&config.pages, &mut issues);
    check_viewports(&config.viewports, &mut issues);
    check_artifacts(&config.pages, &config.viewports, &mut issues);
    check_tolerance(config.tolerance, &mut issues);
    check_concurrency(config.concurrency, config.capture_concurrency, &mut issues);
    if config.timeout_secs == Some(0) {
        issues.push(ValidationIssue::error("timeout-secs", "must be at least 1"));
    }

    if config.capture.mode == CaptureMode::Command
        && config
            .capture
            .program
            .as_deref()
            .is_none_or(|p| p.trim().is_empty())
    {
        issues.push(
            ValidationIssue::error("capture.program", "command mode requires a program")
                .with_suggestion("Set capture.program or use mode = \"files\""),
        );
    }

    ConfigurationError::check(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::PolicySettings;

    fn valid_file() -> ConfigFile {
        ConfigFile::starter("standard")
    }

    #[test]
    fn test_starter_config_is_valid() {
        assert!(validate_file(&valid_file()).is_ok());
    }

    #[test]
    fn test_all_issues_are_collected() {
        let mut config = valid_file();
        config.preset = "strictest".to_string();
        config.tolerance = 1.5;
        config.concurrency = 0;
        config.pages.clear();
        config.viewports.push(Viewport::new("desktop", 0, 100));

        let err = validate_file(&config).unwrap_err();
        let fields = err.fields();
        assert!(fields.contains(&"preset"));
        assert!(fields.contains(&"tolerance"));
        assert!(fields.contains(&"concurrency"));
        assert!(fields.contains(&"page"));
        // Duplicate name and zero size on the same entry
        assert!(fields.contains(&"viewport[2].name"));
        assert!(fields.contains(&"viewport[2]"));
        assert_eq!(err.issues.len(), 6);
    }

    #[test]
    fn test_error_message_lists_every_issue() {
        let mut config = valid_file();
        config.pages.clear();
        config.tolerance = -0.1;
        let message = validate_file(&config).unwrap_err().to_string();
        assert!(message.starts_with("invalid configuration (2 issues)"));
        assert!(message.contains("no pages configured"));
        assert!(message.contains("tolerance"));
    }

    #[test]
    fn test_nan_threshold_is_rejected() {
        let mut config = valid_file();
        config.policy = Some(PolicySettings {
            max_diff_percent: Some(f64::NAN),
            max_height_delta_percent: Some(101.0),
        });
        let err = validate_file(&config).unwrap_err();
        assert_eq!(err.issues.len(), 2);
    }

    #[test]
    fn test_duplicate_page_names_are_rejected() {
        let mut config = valid_file();
        config.pages.push(config.pages[0].clone());
        let err = validate_file(&config).unwrap_err();
        assert!(err.issues[0].message.contains("duplicate page name 'home'"));
    }

    #[test]
    fn test_colliding_artifact_names_are_rejected() {
        let suite = SuiteConfig::new(
            vec![
                PageSpec::new("about us", "a", "b"),
                PageSpec::new("about_us", "c", "d"),
            ],
            vec![Viewport::new("desktop", 10, 10), Viewport::new("mobile", 5, 10)],
        );
        let err = validate_suite(&suite).unwrap_err();

        // One issue per colliding artifact
        assert_eq!(err.fields(), vec!["artifact", "artifact"]);
        assert!(err.issues[0].message.contains("about_us-desktop"));
        assert!(err.issues[1].message.contains("about_us-mobile"));
    }

    #[test]
    fn test_artifact_collision_across_page_and_viewport() {
        let mut config = valid_file();
        config.pages = vec![
            PageSpec::new("home-a", "a", "b"),
            PageSpec::new("home", "c", "d"),
        ];
        config.viewports = vec![
            Viewport::new("desktop", 10, 10),
            Viewport::new("a-desktop", 10, 10),
        ];
        let err = validate_file(&config).unwrap_err();
        assert_eq!(err.fields(), vec!["artifact"]);
        assert!(err.issues[0].message.contains("home-a-desktop"));
    }

    #[test]
    fn test_duplicate_names_are_not_reported_as_collisions() {
        let mut config = valid_file();
        config.pages.push(config.pages[0].clone());
        let err = validate_file(&config).unwrap_err();
        assert!(!err.fields().contains(&"artifact"));
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let mut config = valid_file();
        config.pages[0].name = "  ".to_string();
        config.viewports[0].name = String::new();
        let err = validate_file(&config).unwrap_err();
        assert_eq!(err.fields(), vec!["page[0].name", "viewport[0].name"]);
    }

    #[test]
    fn test_command_mode_requires_program() {
        let mut config = valid_file();
        config.capture.mode = CaptureMode::Command;
        let err = validate_file(&config).unwrap_err();
        assert_eq!(err.fields(), vec!["capture.program"]);

        config.capture.program = Some("shot-scraper".to_string());
        assert!(validate_file(&config).is_ok());
    }

    #[test]
    fn test_excess_capture_concurrency_is_only_a_warning() {
        let mut config = valid_file();
        config.concurrency = 1;
        config.capture_concurrency = 10;
        assert!(validate_file(&config).is_ok());
    }

    #[test]
    fn test_suite_validation_checks_policy_and_timeout() {
        let mut suite = SuiteConfig::new(
            vec![PageSpec::new("home", "a", "b")],
            vec![Viewport::new("desktop", 10, 10)],
        )
        .with_policy(PassPolicy::new(150.0, 10.0))
        .with_timeout(std::time::Duration::ZERO);
        suite.capture_concurrency = 0;

        let err = validate_suite(&suite).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["policy.max-diff-percent", "capture-concurrency", "timeout-secs"]
        );
    }
}
