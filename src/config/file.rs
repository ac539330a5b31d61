//! Configuration file data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::compare::{DiffStyle, DEFAULT_HIGHLIGHT, DEFAULT_TOLERANCE};
use crate::model::{PageSpec, Viewport};
use crate::suite::{DEFAULT_CAPTURE_CONCURRENCY, DEFAULT_CONCURRENCY};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".pixel-parity.toml";

/// Default directory for reports and artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "parity-results";

/// pixel-parity configuration file structure
///
/// The preset is kept as a string so an unknown name is reported by
/// validation together with every other problem, not as a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Policy preset name
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Per-pixel color-distance tolerance, `[0, 1]`
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Maximum cases in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum captures in flight
    #[serde(default = "default_capture_concurrency")]
    pub capture_concurrency: usize,

    /// Run deadline in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Where reports and diff images are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Threshold overrides on top of the preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicySettings>,

    /// Diff image settings
    #[serde(default)]
    pub diff: DiffSettings,

    /// Where frames come from
    #[serde(default)]
    pub capture: CaptureSettings,

    /// Viewports, in report order
    #[serde(rename = "viewport", default)]
    pub viewports: Vec<Viewport>,

    /// Pages, in report order
    #[serde(rename = "page", default)]
    pub pages: Vec<PageSpec>,
}

fn default_preset() -> String {
    "standard".to_string()
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_capture_concurrency() -> usize {
    DEFAULT_CAPTURE_CONCURRENCY
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_true() -> bool {
    true
}

fn default_highlight() -> [u8; 4] {
    DEFAULT_HIGHLIGHT
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Threshold overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicySettings {
    /// Maximum share of differing pixels, percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_diff_percent: Option<f64>,

    /// Maximum height difference, percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height_delta_percent: Option<f64>,
}

/// Diff image settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiffSettings {
    /// How unchanged pixels are drawn
    #[serde(default)]
    pub style: DiffStyle,

    /// RGBA of changed pixels
    #[serde(default = "default_highlight")]
    pub highlight: [u8; 4],

    /// RGBA of pixels that got darker, when they should stand out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub darker_highlight: Option<[u8; 4]>,

    /// Whether diff PNGs are written
    #[serde(default = "default_true")]
    pub write_images: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            style: DiffStyle::default(),
            highlight: DEFAULT_HIGHLIGHT,
            darker_highlight: None,
            write_images: true,
        }
    }
}

/// Capture adapter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    /// Pre-rendered screenshots on disk
    #[default]
    Files,
    /// External screenshot program
    Command,
}

/// Capture adapter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaptureSettings {
    /// Adapter kind
    #[serde(default)]
    pub mode: CaptureMode,

    /// Directory file locators are resolved against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Screenshot program (command mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Program arguments with placeholders (command mode)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Files,
            base_dir: default_base_dir(),
            program: None,
            args: Vec::new(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            tolerance: DEFAULT_TOLERANCE,
            concurrency: DEFAULT_CONCURRENCY,
            capture_concurrency: DEFAULT_CAPTURE_CONCURRENCY,
            timeout_secs: None,
            output_dir: default_output_dir(),
            policy: None,
            diff: DiffSettings::default(),
            capture: CaptureSettings::default(),
            viewports: Vec::new(),
            pages: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Starter configuration written by `init`
    ///
    /// Two viewports and one page reading screenshots from `shots/`.
    pub fn starter(preset: &str) -> Self {
        Self {
            preset: preset.to_string(),
            timeout_secs: Some(600),
            viewports: vec![
                Viewport::new("desktop", 1920, 1080),
                Viewport::new("mobile", 375, 812),
            ],
            pages: vec![PageSpec::new(
                "home",
                "shots/{page}-{viewport}-reference.png",
                "shots/{page}-{viewport}-candidate.png",
            )],
            ..Self::default()
        }
    }
}
