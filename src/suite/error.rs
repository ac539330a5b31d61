//! Error types for suite runs
//!
//! Only run-level failures surface here. Anything that goes wrong inside a
//! single case is recorded as that case's error outcome instead.

use thiserror::Error;

use super::capture::CaptureError;
use super::orchestrator::RunState;
use crate::config::ConfigurationError;

/// Errors that abort a run before any case executes
#[derive(Error, Debug)]
pub enum SuiteError {
    /// The suite configuration is invalid
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The capture collaborator could not be prepared
    #[error("failed to initialize capture: {0}")]
    Initialization(#[source] CaptureError),

    /// `run` was called while another run was in progress
    #[error("orchestrator is busy (state: {0})")]
    Busy(RunState),
}
