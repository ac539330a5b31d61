//! Application errors with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes
//! - Documentation links
//! - Proper exit codes for CI
//!
//! Library modules raise their own error enums; the CLI converts the ones
//! that end a command into [`ParityError`] so [`ErrorFormatter`] can attach
//! a hint and pick the exit code.
//!
//! # Examples
//!
//! ```
//! use pixel_parity::error::ParityError;
//! use std::path::PathBuf;
//!
//! let err = ParityError::FileNotFound {
//!     path: PathBuf::from("baseline.png"),
//!     operation: "compare".to_string(),
//! };
//! assert_eq!(err.exit_code(), 66);
//! assert!(err.suggestion().unwrap().contains("baseline.png"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigurationError;
use crate::report::ReportError;
use crate::suite::{CaptureError, SuiteError};

const DOCS_CONFIGURATION: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "#configuration");
const DOCS_CAPTURE: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "#capture");

/// pixel-parity errors with contextual suggestions
#[derive(Error, Debug)]
pub enum ParityError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound {
        /// Path to config file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// `init` would overwrite an existing configuration
    #[error("Configuration file already exists: {}", path.display())]
    ConfigExists {
        /// Path to config file
        path: PathBuf,
    },

    /// Invalid preset name
    #[error("Invalid preset: '{name}'")]
    InvalidPreset {
        /// Invalid preset name
        name: String,
        /// Valid preset names
        available: Vec<String>,
    },

    /// Configuration failed validation
    #[error(transparent)]
    InvalidConfig(#[from] ConfigurationError),

    /// Capture program is not installed
    #[error("Capture program not installed: {tool}")]
    ToolMissing {
        /// Program name
        tool: String,
    },

    /// Capture collaborator could not be prepared
    #[error("Capture unavailable")]
    CaptureUnavailable(#[source] CaptureError),

    /// File not found during operation
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to missing file
        path: PathBuf,
        /// Operation that required the file
        operation: String,
    },

    /// Report or artifact could not be written or read
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// A run was started while another was in progress
    #[error("{0}")]
    Busy(String),

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl From<SuiteError> for ParityError {
    fn from(err: SuiteError) -> Self {
        match err {
            SuiteError::Configuration(e) => Self::InvalidConfig(e),
            SuiteError::Initialization(CaptureError::ProgramNotFound { program }) => {
                Self::ToolMissing { tool: program }
            }
            SuiteError::Initialization(e) => Self::CaptureUnavailable(e),
            e @ SuiteError::Busy(_) => Self::Busy(e.to_string()),
        }
    }
}

impl ParityError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixel_parity::error::ParityError;
    ///
    /// let error = ParityError::ToolMissing { tool: "shot-scraper".to_string() };
    /// assert!(error.suggestion().unwrap().contains("PATH"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Run 'pixel-parity init' to create a configuration file".to_string())
            }
            Self::ConfigExists { .. } => {
                Some("Delete it first, edit it manually, or pass --force".to_string())
            }
            Self::InvalidPreset { available, .. } => {
                Some(format!("Available presets: {}", available.join(", ")))
            }
            Self::InvalidConfig(e) => {
                let hints: Vec<&str> = e
                    .issues
                    .iter()
                    .filter_map(|i| i.suggestion.as_deref())
                    .collect();
                if hints.is_empty() {
                    Some(format!("Fix the listed fields in {}", crate::config::CONFIG_FILE_NAME))
                } else {
                    Some(hints.join("\n"))
                }
            }
            Self::ToolMissing { tool } => Some(format!(
                "Install '{}' and make sure it is on PATH, or set capture.mode = \"files\"",
                tool
            )),
            Self::CaptureUnavailable(e) => match e {
                CaptureError::NotFound { path } => Some(format!(
                    "Check that capture.base-dir ({}) exists",
                    path.display()
                )),
                _ => Some("Check the [capture] section of the configuration".to_string()),
            },
            Self::FileNotFound { path, operation } => Some(format!(
                "Ensure {} exists before running {}",
                path.display(),
                operation
            )),
            Self::Report(_) => {
                Some("Check that the output directory is writable".to_string())
            }
            Self::Busy(_) => Some("Wait for the current run to finish".to_string()),
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::ConfigNotFound { .. } | Self::InvalidConfig(_) | Self::InvalidPreset { .. } => {
                Some(DOCS_CONFIGURATION)
            }
            Self::ToolMissing { .. } | Self::CaptureUnavailable(_) => Some(DOCS_CAPTURE),
            _ => None,
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Follows sysexits.h conventions. A failing verdict is not an error
    /// and exits 1 through the report instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixel_parity::error::ParityError;
    ///
    /// let error = ParityError::ToolMissing { tool: "chromium".to_string() };
    /// assert_eq!(error.exit_code(), 127);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } => 66,  // EX_NOINPUT
            Self::ConfigExists { .. } => 73,    // EX_CANTCREAT
            Self::InvalidPreset { .. } => 64,   // EX_USAGE
            Self::InvalidConfig(_) => 78,       // EX_CONFIG
            Self::ToolMissing { .. } => 127,    // Command not found
            Self::CaptureUnavailable(_) => 69,  // EX_UNAVAILABLE
            Self::FileNotFound { .. } => 66,    // EX_NOINPUT
            Self::Report(_) => 74,              // EX_IOERR
            Self::Busy(_) => 75,                // EX_TEMPFAIL
            Self::Io { .. } => 74,              // EX_IOERR
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        // Error chain (caused by)
        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(parity_error) = Self::find(error) {
            if let Some(suggestion) = parity_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = parity_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        Self::find(error).map_or(1, ParityError::exit_code)
    }

    fn find(error: &anyhow::Error) -> Option<&ParityError> {
        error.chain().find_map(|e| e.downcast_ref::<ParityError>())
    }
}
