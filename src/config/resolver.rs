//! Resolution of a configuration file plus command-line overrides into
//! the values a run uses

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::file::{CaptureMode, CaptureSettings, ConfigFile, PolicySettings};
use super::template::PolicyPreset;
use super::validator::{validate_file, ConfigurationError};
use crate::compare::{DiffOptions, PassPolicy};
use crate::suite::{Capture, CommandCapture, FileCapture, SuiteConfig};

/// Subdirectory of the output dir that command captures write into
pub const CAPTURE_DIR_NAME: &str = "captures";

/// Values given on the command line, applied on top of the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Policy preset
    pub preset: Option<String>,
    /// Per-pixel tolerance
    pub tolerance: Option<f64>,
    /// Maximum diff percentage
    pub max_diff_percent: Option<f64>,
    /// Maximum height delta percentage
    pub max_height_delta_percent: Option<f64>,
    /// Case concurrency
    pub concurrency: Option<usize>,
    /// Run deadline in seconds
    pub timeout_secs: Option<u64>,
    /// Output directory
    pub output_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Apply every set override to a config file
    pub fn apply(&self, config: &mut ConfigFile) {
        if let Some(ref preset) = self.preset {
            config.preset = preset.clone();
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if self.max_diff_percent.is_some() || self.max_height_delta_percent.is_some() {
            let policy = config.policy.get_or_insert_with(PolicySettings::default);
            if let Some(v) = self.max_diff_percent {
                policy.max_diff_percent = Some(v);
            }
            if let Some(v) = self.max_height_delta_percent {
                policy.max_height_delta_percent = Some(v);
            }
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = Some(timeout);
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

/// A validated configuration ready to run
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Orchestrator settings
    pub suite: SuiteConfig,
    /// Capture adapter settings
    pub capture: CaptureSettings,
    /// Report destination
    pub output_dir: PathBuf,
}

impl ResolvedConfig {
    /// Build the capture adapter named by the settings
    pub fn capture_adapter(&self) -> Arc<dyn Capture> {
        match self.capture.mode {
            CaptureMode::Files => Arc::new(FileCapture::new(self.capture.base_dir.clone())),
            CaptureMode::Command => Arc::new(CommandCapture::new(
                self.capture.program.clone().unwrap_or_default(),
                self.capture.args.clone(),
                self.output_dir.join(CAPTURE_DIR_NAME),
            )),
        }
    }
}

/// Handles merging presets, file values and overrides
///
/// # Examples
///
/// ```
/// use pixel_parity::config::{ConfigFile, ConfigOverrides, ConfigResolver};
///
/// let file = ConfigFile::starter("lenient");
/// let overrides = ConfigOverrides { max_diff_percent: Some(2.0), ..Default::default() };
/// let resolved = ConfigResolver::resolve(&file, &overrides)?;
///
/// assert_eq!(resolved.suite.policy.max_diff_percent, 2.0);
/// assert_eq!(resolved.suite.policy.max_height_delta_percent, 15.0);
/// assert_eq!(resolved.suite.cases().len(), 2);
/// # Ok::<(), pixel_parity::config::ConfigurationError>(())
/// ```
pub struct ConfigResolver;

impl ConfigResolver {
    /// Apply overrides, validate, and build the run settings
    pub fn resolve(
        file: &ConfigFile,
        overrides: &ConfigOverrides,
    ) -> Result<ResolvedConfig, ConfigurationError> {
        let mut config = file.clone();
        overrides.apply(&mut config);
        validate_file(&config)?;

        let suite = SuiteConfig {
            pages: config.pages,
            viewports: config.viewports,
            policy: Self::policy(&config.preset, config.policy.as_ref()),
            diff: DiffOptions {
                tolerance: config.tolerance,
                highlight: config.diff.highlight,
                darker_highlight: config.diff.darker_highlight,
                style: config.diff.style,
                generate_image: config.diff.write_images,
            },
            concurrency: config.concurrency,
            capture_concurrency: config.capture_concurrency,
            timeout: config.timeout_secs.map(Duration::from_secs),
        };

        Ok(ResolvedConfig {
            suite,
            capture: config.capture,
            output_dir: config.output_dir,
        })
    }

    /// Preset thresholds with any explicit overrides
    pub fn policy(preset: &str, settings: Option<&PolicySettings>) -> PassPolicy {
        let mut policy = preset
            .parse::<PolicyPreset>()
            .unwrap_or_default()
            .policy();
        if let Some(settings) = settings {
            if let Some(v) = settings.max_diff_percent {
                policy = policy.with_max_diff_percent(v);
            }
            if let Some(v) = settings.max_height_delta_percent {
                policy = policy.with_max_height_delta_percent(v);
            }
        }
        policy
    }
}
