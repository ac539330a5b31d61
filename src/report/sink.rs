//! Report sinks
//!
//! A sink receives the finished, immutable [`SuiteReport`]. Sinks run after
//! the orchestrator is done, so a slow or failing sink never affects case
//! outcomes.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::SuiteReport;
use crate::frame::encode_png;
use crate::infra::{FileSystem, RealFileSystem};

/// Name of the JSON report inside the output directory
pub const REPORT_FILE_NAME: &str = "report.json";

/// Subdirectory for diff images
pub const DIFF_DIR_NAME: &str = "diffs";

/// Errors raised while publishing a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Reading or writing an artifact failed
    #[error("failed to access {}", path.display())]
    Io {
        /// Artifact path
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// The report could not be converted to or from JSON
    #[error("invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A diff image could not be encoded
    #[error("failed to encode diff image for {artifact}")]
    Encode {
        /// Artifact stem
        artifact: String,
        #[source]
        /// Encoder error
        source: image::ImageError,
    },
}

/// Consumer of a finished report
pub trait ReportSink {
    /// Publish the report
    fn publish(&self, report: &SuiteReport) -> Result<(), ReportError>;
}

/// Writes `report.json` plus one `diffs/{page}-{viewport}.png` per compared case
#[derive(Debug, Clone)]
pub struct JsonReportSink<FS: FileSystem = RealFileSystem> {
    output_dir: PathBuf,
    fs: FS,
}

impl JsonReportSink<RealFileSystem> {
    /// Create a sink writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(output_dir, RealFileSystem)
    }
}

impl<FS: FileSystem> JsonReportSink<FS> {
    /// Create a sink with a custom filesystem implementation
    pub fn with_fs(output_dir: impl Into<PathBuf>, fs: FS) -> Self {
        Self {
            output_dir: output_dir.into(),
            fs,
        }
    }

    /// Location of the JSON report
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    /// Location of the diff image for an artifact stem
    pub fn diff_path(&self, artifact: &str) -> PathBuf {
        self.output_dir
            .join(DIFF_DIR_NAME)
            .join(format!("{artifact}.png"))
    }

    fn create_dir(&self, dir: &Path) -> Result<(), ReportError> {
        self.fs.create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Drop diff images left by an earlier run
    fn clear_diffs(&self) -> Result<(), ReportError> {
        let dir = self.output_dir.join(DIFF_DIR_NAME);
        match self.fs.remove_dir_all(&dir) {
            Ok(()) => {
                log::debug!("cleared {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ReportError::Io { path: dir, source }),
        }
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<(), ReportError> {
        self.fs.write(path, contents).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<FS: FileSystem> ReportSink for JsonReportSink<FS> {
    fn publish(&self, report: &SuiteReport) -> Result<(), ReportError> {
        self.create_dir(&self.output_dir)?;
        self.clear_diffs()?;

        let mut wrote_diff_dir = false;
        for outcome in report.cases() {
            let Some(image) = outcome.comparison().and_then(|c| c.diff_image()) else {
                continue;
            };
            if !wrote_diff_dir {
                self.create_dir(&self.output_dir.join(DIFF_DIR_NAME))?;
                wrote_diff_dir = true;
            }
            let artifact = outcome.case.artifact_name();
            let png = encode_png(image).map_err(|source| ReportError::Encode {
                artifact: artifact.clone(),
                source,
            })?;
            self.write(&self.diff_path(&artifact), png)?;
        }

        let json = serde_json::to_string_pretty(report)?;
        self.write(&self.report_path(), json)?;
        log::info!("report written to {}", self.report_path().display());
        Ok(())
    }
}

/// Keeps published reports in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<SuiteReport>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All published reports, oldest first
    pub fn reports(&self) -> Vec<SuiteReport> {
        self.reports.lock().clone()
    }

    /// Most recently published report
    pub fn last(&self) -> Option<SuiteReport> {
        self.reports.lock().last().cloned()
    }
}

impl ReportSink for MemorySink {
    fn publish(&self, report: &SuiteReport) -> Result<(), ReportError> {
        self.reports.lock().push(report.clone());
        Ok(())
    }
}

/// Read a previously written JSON report
pub fn load_report(path: &Path) -> Result<SuiteReport, ReportError> {
    load_report_with_fs(path, &RealFileSystem)
}

/// Read a JSON report with a custom filesystem implementation
pub fn load_report_with_fs<FS: FileSystem>(path: &Path, fs: &FS) -> Result<SuiteReport, ReportError> {
    let contents = fs.read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}
