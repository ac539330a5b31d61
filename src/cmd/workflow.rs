//! Run workflow orchestration
//!
//! Separates the business logic of `pixel-parity run` from its console
//! presentation so a full run can be driven programmatically:
//!
//! 1. **Configuration**: load `.pixel-parity.toml` (or an explicit path),
//!    apply command-line overrides and validate.
//! 2. **Suite**: build the capture adapter and run the orchestrator.
//! 3. **Publishing**: write `report.json` and diff images to the output
//!    directory.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use pixel_parity::cmd::workflow::RunWorkflow;
//! use pixel_parity::config::ConfigOverrides;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let workflow = RunWorkflow::new(Path::new("."), ConfigOverrides::default());
//! let result = workflow.execute(false).await?;
//! println!("{} of {} cases passed", result.report.passed(), result.report.total_tests());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigLoader, ConfigOverrides, ConfigResolver, ResolvedConfig};
use crate::error::ParityError;
use crate::report::{JsonReportSink, ReportSink, SuiteReport};
use crate::suite::{LogCollector, MetricsCollector, Orchestrator, ProgressCollector};

/// Result of a complete run
#[derive(Debug)]
pub struct RunResult {
    /// The aggregated report
    pub report: SuiteReport,
    /// Where `report.json` was written
    pub report_path: PathBuf,
    /// Directory holding all artifacts
    pub output_dir: PathBuf,
}

/// Run workflow orchestrator
pub struct RunWorkflow {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl RunWorkflow {
    /// Create a workflow reading the config from `project_root`
    pub fn new(project_root: &Path, overrides: ConfigOverrides) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: None,
            overrides,
        }
    }

    /// Read the configuration from an explicit file instead
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load and resolve the configuration without running anything
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let file = match self.config_path {
            Some(ref path) => ConfigLoader::load_file(&self.project_root.join(path))?,
            None => ConfigLoader::load(&self.project_root)?,
        };
        let mut resolved =
            ConfigResolver::resolve(&file, &self.overrides).map_err(ParityError::from)?;

        // Relative paths in the config are relative to the project, not the cwd
        resolved.output_dir = self.project_root.join(&resolved.output_dir);
        resolved.capture.base_dir = self.project_root.join(&resolved.capture.base_dir);
        Ok(resolved)
    }

    /// Execute the complete run workflow
    pub async fn execute(&self, show_progress: bool) -> Result<RunResult> {
        let resolved = self.resolve()?;
        let capture = resolved.capture_adapter();
        let total = resolved.suite.cases().len() as u64;

        let metrics: Arc<dyn MetricsCollector> = if show_progress {
            Arc::new(ProgressCollector::new(total))
        } else {
            Arc::new(LogCollector)
        };

        let orchestrator = Orchestrator::new(resolved.suite, capture).with_metrics(metrics);
        let report = orchestrator.run().await.map_err(ParityError::from)?;

        let sink = JsonReportSink::new(&resolved.output_dir);
        sink.publish(&report)
            .map_err(ParityError::from)
            .with_context(|| {
                format!("Failed to publish report to {}", resolved.output_dir.display())
            })?;

        Ok(RunResult {
            report_path: sink.report_path(),
            output_dir: resolved.output_dir,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, CONFIG_FILE_NAME};
    use crate::frame::{encode_png, ImageFrame};
    use crate::model::{PageSpec, Viewport};
    use tempfile::TempDir;

    fn write_png(path: &Path, frame: &ImageFrame) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, encode_png(frame).unwrap()).unwrap();
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile {
            viewports: vec![Viewport::new("desktop", 8, 8)],
            pages: vec![PageSpec::new(
                "home",
                "shots/{page}-ref.png",
                "shots/{page}-cand.png",
            )],
            ..ConfigFile::default()
        };
        ConfigLoader::save(&config, temp.path()).unwrap();

        let white = ImageFrame::filled(8, 8, [255, 255, 255, 255]);
        write_png(&temp.path().join("shots/home-ref.png"), &white);
        write_png(&temp.path().join("shots/home-cand.png"), &white);
        temp
    }

    #[tokio::test]
    async fn test_execute_writes_report() {
        let temp = project();
        let result = RunWorkflow::new(temp.path(), ConfigOverrides::default())
            .execute(false)
            .await
            .unwrap();

        assert_eq!(result.report.total_tests(), 1);
        assert_eq!(result.report.passed(), 1);
        assert!(result.report_path.exists());
        assert!(result.output_dir.starts_with(temp.path()));
    }

    #[tokio::test]
    async fn test_missing_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = RunWorkflow::new(temp.path(), ConfigOverrides::default())
            .execute(false)
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<ParityError>().is_some());
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_resolve_applies_overrides_and_project_root() {
        let temp = project();
        let overrides = ConfigOverrides {
            output_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };
        let resolved = RunWorkflow::new(temp.path(), overrides).resolve().unwrap();

        assert_eq!(resolved.output_dir, temp.path().join("out"));
        assert_eq!(resolved.capture.base_dir, temp.path().join("."));
    }

    #[test]
    fn test_explicit_config_path() {
        let temp = project();
        std::fs::rename(
            temp.path().join(CONFIG_FILE_NAME),
            temp.path().join("parity.toml"),
        )
        .unwrap();

        let workflow = RunWorkflow::new(temp.path(), ConfigOverrides::default())
            .with_config_path("parity.toml");
        assert_eq!(workflow.resolve().unwrap().suite.pages.len(), 1);
    }
}
