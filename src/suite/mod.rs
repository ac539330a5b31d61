//! Suite execution
//!
//! Runs every (page, viewport) case of a configuration:
//! 1. validate the configuration and prepare the capture collaborator
//! 2. capture reference and candidate concurrently per case
//! 3. evaluate on the blocking pool, isolating per-case failures
//! 4. reduce outcomes into a [`SuiteReport`](crate::report::SuiteReport)

pub mod capture;
pub mod error;
pub mod orchestrator;
pub mod telemetry;

pub use capture::{Capture, CaptureError, CaptureRequest, CaptureRole, CommandCapture, FileCapture};
pub use error::SuiteError;
pub use orchestrator::{
    Orchestrator, RunState, SuiteConfig, DEFAULT_CAPTURE_CONCURRENCY, DEFAULT_CONCURRENCY,
};
pub use telemetry::{
    LogCollector, MemoryCollector, MetricData, MetricsCollector, NoOpCollector, ProgressCollector,
    RunEvent,
};
