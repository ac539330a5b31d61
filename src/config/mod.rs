//! Configuration for pixel-parity
//!
//! This module provides:
//! - .pixel-parity.toml config file support
//! - Named pass-policy presets
//! - Validation that collects every problem in one pass
//! - Resolution of file values and command-line overrides into run settings

pub mod file;
pub mod loader;
pub mod resolver;
pub mod template;
pub mod validator;

pub use file::{
    CaptureMode, CaptureSettings, ConfigFile, DiffSettings, PolicySettings, CONFIG_FILE_NAME,
    DEFAULT_OUTPUT_DIR,
};
pub use loader::ConfigLoader;
pub use resolver::{ConfigOverrides, ConfigResolver, ResolvedConfig, CAPTURE_DIR_NAME};
pub use template::PolicyPreset;
pub use validator::{
    validate_file, validate_suite, ConfigurationError, ValidationIssue, ValidationSeverity,
};
