//! Capture collaborators
//!
//! The orchestrator never renders anything itself. It asks a [`Capture`]
//! implementation for a frame per (page, viewport, role) and treats any
//! failure as a per-case error. Two adapters ship with the crate:
//!
//! - [`FileCapture`] reads pre-rendered screenshots from disk
//! - [`CommandCapture`] runs an external screenshot program per request

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;

use crate::frame::{decode_frame, DecodeError, ImageFrame};
use crate::model::{TestCase, Viewport};

/// Which side of the comparison a capture is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureRole {
    /// Ground-truth rendering
    Reference,
    /// Rendering under test
    Candidate,
}

impl CaptureRole {
    /// Get the role name as used in artifact names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for CaptureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request for a rendered frame
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Page name
    pub page: String,
    /// Reference or candidate
    pub role: CaptureRole,
    /// URL or path template for this role
    pub locator: String,
    /// Screen size to render at
    pub viewport: Viewport,
}

impl CaptureRequest {
    /// Replace `{page}`, `{viewport}`, `{width}`, `{height}` and `{role}` in a template
    ///
    /// # Examples
    ///
    /// ```
    /// use pixel_parity::model::Viewport;
    /// use pixel_parity::suite::{CaptureRequest, CaptureRole};
    ///
    /// let request = CaptureRequest {
    ///     page: "home".into(),
    ///     role: CaptureRole::Candidate,
    ///     locator: "shots/{page}-{viewport}.png".into(),
    ///     viewport: Viewport::new("mobile", 320, 568),
    /// };
    /// assert_eq!(request.expand(&request.locator), "shots/home-mobile.png");
    /// assert_eq!(request.expand("{width}x{height} {role}"), "320x568 candidate");
    /// ```
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{page}", &self.page)
            .replace("{viewport}", &self.viewport.name)
            .replace("{width}", &self.viewport.width.to_string())
            .replace("{height}", &self.viewport.height.to_string())
            .replace("{role}", self.role.as_str())
    }

    /// Deterministic file stem, `{page}-{viewport}-{role}`
    pub fn artifact_name(&self) -> String {
        let case = TestCase {
            page: self.page.clone(),
            viewport: self.viewport.name.clone(),
        };
        format!("{}-{}", case.artifact_name(), self.role)
    }
}

/// Errors raised by capture collaborators
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot file does not exist
    #[error("capture not found: {}", path.display())]
    NotFound {
        /// Expected location
        path: PathBuf,
    },

    /// Captured bytes are not a usable image
    #[error("captured image could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    /// Screenshot program is not installed
    #[error("capture program '{program}' not found on PATH")]
    ProgramNotFound {
        /// Program name as configured
        program: String,
    },

    /// Screenshot program exited unsuccessfully
    #[error("capture program '{program}' failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// Program name
        program: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// Filesystem or process I/O failed
    #[error("{context}")]
    Io {
        /// What was being attempted
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Any other adapter-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Source of rendered frames
///
/// Implementations must be safe to call concurrently; the orchestrator
/// bounds how many captures run at once.
#[async_trait]
pub trait Capture: Send + Sync {
    /// One-time setup before any capture; failure aborts the run
    async fn prepare(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    /// Produce a frame for one request
    async fn capture(&self, request: &CaptureRequest) -> Result<ImageFrame, CaptureError>;
}

async fn read_frame(path: &Path) -> Result<ImageFrame, CaptureError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CaptureError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(CaptureError::Io {
                context: format!("failed to read {}", path.display()),
                source,
            })
        }
    };
    // Decoding is CPU-bound
    let frame = tokio::task::spawn_blocking(move || decode_frame(&bytes))
        .await
        .map_err(|e| CaptureError::Failed(format!("decode task failed: {e}")))??;
    Ok(frame)
}

/// Reads pre-rendered screenshots from disk
///
/// Locators are path templates resolved against `base_dir`.
#[derive(Debug, Clone)]
pub struct FileCapture {
    base_dir: PathBuf,
}

impl FileCapture {
    /// Create a file capture rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Path a request resolves to
    pub fn resolve(&self, request: &CaptureRequest) -> PathBuf {
        self.base_dir.join(request.expand(&request.locator))
    }
}

#[async_trait]
impl Capture for FileCapture {
    async fn prepare(&self) -> Result<(), CaptureError> {
        if !self.base_dir.is_dir() {
            return Err(CaptureError::NotFound {
                path: self.base_dir.clone(),
            });
        }
        Ok(())
    }

    async fn capture(&self, request: &CaptureRequest) -> Result<ImageFrame, CaptureError> {
        let path = self.resolve(request);
        log::debug!("{} {}: reading {}", request.page, request.role, path.display());
        read_frame(&path).await
    }
}

/// Runs an external screenshot program for every request
///
/// Arguments may contain `{url}`, `{output}`, `{width}`, `{height}`,
/// `{page}`, `{viewport}` and `{role}`. The program is expected to write a
/// PNG to `{output}`. Child processes are killed if the capture is dropped,
/// so a run timeout does not leave orphaned browsers behind.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
    output_dir: PathBuf,
}

impl CommandCapture {
    /// Create a command capture writing screenshots into `output_dir`
    pub fn new(program: impl Into<String>, args: Vec<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            output_dir: output_dir.into(),
        }
    }

    /// Where the screenshot for a request is written
    pub fn output_path(&self, request: &CaptureRequest) -> PathBuf {
        self.output_dir.join(format!("{}.png", request.artifact_name()))
    }

    /// Arguments for a request with every placeholder filled in
    pub fn render_args(&self, request: &CaptureRequest) -> Vec<String> {
        let output = self.output_path(request);
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                request
                    .expand(arg)
                    .replace("{url}", &request.locator)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

#[async_trait]
impl Capture for CommandCapture {
    async fn prepare(&self) -> Result<(), CaptureError> {
        which::which(&self.program).map_err(|_| CaptureError::ProgramNotFound {
            program: self.program.clone(),
        })?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| CaptureError::Io {
                context: format!("failed to create {}", self.output_dir.display()),
                source,
            })
    }

    async fn capture(&self, request: &CaptureRequest) -> Result<ImageFrame, CaptureError> {
        let output_path = self.output_path(request);
        let args = self.render_args(request);
        log::debug!("{} {}: running {} {:?}", request.page, request.role, self.program, args);

        // A screenshot left over from an earlier run must never be read back
        match tokio::fs::remove_file(&output_path).await {
            Ok(()) => log::debug!("removed stale {}", output_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CaptureError::Io {
                    context: format!("failed to remove stale {}", output_path.display()),
                    source,
                })
            }
        }

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CaptureError::Io {
                context: format!("failed to run {}", self.program),
                source,
            })?;

        if !output.status.success() {
            return Err(CaptureError::CommandFailed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        read_frame(&output_path).await
    }
}
