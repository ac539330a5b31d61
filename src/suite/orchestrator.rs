//! Suite orchestration
//!
//! The orchestrator enumerates pages × viewports, captures both renderings
//! of every case through the injected [`Capture`], evaluates them on the
//! blocking pool, and reduces the outcomes into a [`SuiteReport`].
//!
//! Concurrency is bounded twice: a case semaphore limits how many cases are
//! in flight, and a capture semaphore limits how many captures run at once
//! (captures are usually far heavier than diffs). Outcomes land in an
//! index-addressed slot buffer, so the report order is the configuration
//! order no matter which case finishes first.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::capture::{Capture, CaptureRequest, CaptureRole};
use super::error::SuiteError;
use super::telemetry::{case_metadata, MetricData, MetricsCollector, NoOpCollector, RunEvent};
use crate::compare::{evaluate, DiffOptions, PassPolicy};
use crate::config::validator::validate_suite;
use crate::frame::ImageFrame;
use crate::model::{CaseOutcome, ErrorKind, ErrorOutcome, PageSpec, TestCase, Viewport};
use crate::report::SuiteReport;

/// Default number of cases in flight
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default number of concurrent captures
pub const DEFAULT_CAPTURE_CONCURRENCY: usize = 2;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run started
    Idle,
    /// Validating configuration and preparing capture
    Initializing,
    /// Cases executing
    Running,
    /// Collecting outcomes into a report
    Finalizing,
    /// Report produced
    Done,
}

impl RunState {
    /// Get the state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a run needs besides its collaborators
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Pages to verify, in report order
    pub pages: Vec<PageSpec>,
    /// Viewports per page, in report order
    pub viewports: Vec<Viewport>,
    /// Pass/fail thresholds
    pub policy: PassPolicy,
    /// Differencer options
    pub diff: DiffOptions,
    /// Maximum cases in flight
    pub concurrency: usize,
    /// Maximum captures in flight
    pub capture_concurrency: usize,
    /// Run deadline; unfinished cases become timeout outcomes
    pub timeout: Option<Duration>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            viewports: Vec::new(),
            policy: PassPolicy::default(),
            diff: DiffOptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            capture_concurrency: DEFAULT_CAPTURE_CONCURRENCY,
            timeout: None,
        }
    }
}

impl SuiteConfig {
    /// Create a config for the given pages and viewports with default settings
    pub fn new(pages: Vec<PageSpec>, viewports: Vec<Viewport>) -> Self {
        Self {
            pages,
            viewports,
            ..Self::default()
        }
    }

    /// Sets the pass policy.
    pub fn with_policy(mut self, policy: PassPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the differencer options.
    pub fn with_diff_options(mut self, diff: DiffOptions) -> Self {
        self.diff = diff;
        self
    }

    /// Sets the case concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the capture concurrency.
    pub fn with_capture_concurrency(mut self, capture_concurrency: usize) -> Self {
        self.capture_concurrency = capture_concurrency;
        self
    }

    /// Sets the run deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// All cases, pages outer and viewports inner
    pub fn cases(&self) -> Vec<TestCase> {
        self.pages
            .iter()
            .flat_map(|p| self.viewports.iter().map(move |v| TestCase::new(p, v)))
            .collect()
    }
}

/// Drives a suite run
///
/// # Examples
///
/// ```no_run
/// use pixel_parity::model::{PageSpec, Viewport};
/// use pixel_parity::suite::{FileCapture, Orchestrator, SuiteConfig};
/// use std::sync::Arc;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SuiteConfig::new(
///     vec![PageSpec::new("home", "live/{page}-{viewport}.png", "local/{page}-{viewport}.png")],
///     vec![Viewport::new("desktop", 1920, 1080)],
/// );
/// let orchestrator = Orchestrator::new(config, Arc::new(FileCapture::new("shots")));
/// let report = orchestrator.run().await?;
/// println!("{:.1}% accurate", report.accuracy_percentage());
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    config: Arc<SuiteConfig>,
    capture: Arc<dyn Capture>,
    metrics: Arc<dyn MetricsCollector>,
    state: Mutex<RunState>,
}

impl Orchestrator {
    /// Create an orchestrator with a no-op metrics collector
    pub fn new(config: SuiteConfig, capture: Arc<dyn Capture>) -> Self {
        Self {
            config: Arc::new(config),
            capture,
            metrics: Arc::new(NoOpCollector),
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Use a custom metrics collector
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    /// The configuration this orchestrator runs
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    fn set_state(&self, state: RunState) {
        log::debug!("run state: {} -> {}", self.state(), state);
        *self.state.lock() = state;
    }

    /// Execute every case and produce the report
    ///
    /// Only configuration and capture-preparation failures are errors.
    /// Once cases are running, every failure is recorded in the report.
    pub async fn run(&self) -> Result<SuiteReport, SuiteError> {
        {
            let mut state = self.state.lock();
            match *state {
                RunState::Idle | RunState::Done => *state = RunState::Initializing,
                busy => return Err(SuiteError::Busy(busy)),
            }
        }
        let mut guard = RunGuard {
            state: &self.state,
            finished: false,
        };

        // On failure the guard puts the state back to Idle
        self.initialize().await?;

        let report = self.execute().await;
        guard.finished = true;
        Ok(report)
    }

    async fn initialize(&self) -> Result<(), SuiteError> {
        validate_suite(&self.config)?;
        self.capture
            .prepare()
            .await
            .map_err(SuiteError::Initialization)?;
        Ok(())
    }

    async fn execute(&self) -> SuiteReport {
        let started = Instant::now();
        let config = &self.config;
        let total = config.pages.len() * config.viewports.len();

        self.set_state(RunState::Running);
        log::info!(
            "running {} cases ({} pages x {} viewports), concurrency {}",
            total,
            config.pages.len(),
            config.viewports.len(),
            config.concurrency
        );
        self.metrics.record_event(RunEvent::RunStarted, Default::default());

        let slots: Arc<Mutex<Vec<Option<CaseOutcome>>>> = Arc::new(Mutex::new(vec![None; total]));
        let case_permits = Arc::new(Semaphore::new(config.concurrency));
        let capture_permits = Arc::new(Semaphore::new(config.capture_concurrency));

        let mut tasks = JoinSet::new();
        let pairs = config
            .pages
            .iter()
            .flat_map(|p| config.viewports.iter().map(move |v| (p, v)));
        for (index, (page, viewport)) in pairs.enumerate() {
            let task = CaseTask {
                page: page.clone(),
                viewport: viewport.clone(),
                config: Arc::clone(&self.config),
                capture: Arc::clone(&self.capture),
                capture_permits: Arc::clone(&capture_permits),
                metrics: Arc::clone(&self.metrics),
            };
            let case_permits = Arc::clone(&case_permits);
            let slots = Arc::clone(&slots);
            tasks.spawn(async move {
                let outcome = match case_permits.acquire_owned().await {
                    Ok(_permit) => task.run().await,
                    Err(e) => task.failed(ErrorKind::Internal, e.to_string()),
                };
                slots.lock()[index] = Some(outcome);
            });
        }

        let timed_out = self.join_all(&mut tasks).await;

        self.set_state(RunState::Finalizing);
        let outcomes: Vec<CaseOutcome> = {
            let mut slots = slots.lock();
            config
                .cases()
                .into_iter()
                .zip(slots.iter_mut())
                .map(|(case, slot)| {
                    slot.take().unwrap_or_else(|| {
                        let error = if timed_out {
                            ErrorOutcome::timeout()
                        } else {
                            ErrorOutcome::new(ErrorKind::Internal, "case task did not complete")
                        };
                        CaseOutcome::error(case, error)
                    })
                })
                .collect()
        };

        let report = SuiteReport::from_outcomes(outcomes, config.policy, config.diff.tolerance);
        self.metrics.record_duration("run", started.elapsed());
        self.metrics
            .record_metric(MetricData::new("accuracy_percent", report.accuracy_percentage()));
        self.metrics.record_event(RunEvent::RunCompleted, Default::default());
        self.metrics.flush();

        log::info!(
            "run {} finished in {:.1}s: {}/{} passed, {} failed, {} errored",
            report.run_id(),
            started.elapsed().as_secs_f64(),
            report.passed(),
            report.total_tests(),
            report.failed(),
            report.errored()
        );
        self.set_state(RunState::Done);
        report
    }

    /// Wait for every case task, aborting the rest at the deadline
    ///
    /// Returns true if the deadline was hit.
    async fn join_all(&self, tasks: &mut JoinSet<()>) -> bool {
        let deadline = self
            .config
            .timeout
            .map(|t| tokio::time::Instant::now() + t);

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        log::warn!(
                            "run timed out with {} cases unfinished, aborting",
                            tasks.len()
                        );
                        self.metrics.record_event(RunEvent::RunTimedOut, Default::default());
                        tasks.abort_all();
                        // Drain so aborted captures are dropped before reporting
                        while tasks.join_next().await.is_some() {}
                        return true;
                    }
                },
                None => tasks.join_next().await,
            };

            match next {
                None => return false,
                Some(Ok(())) => {}
                Some(Err(e)) if e.is_panic() => log::warn!("case task panicked: {e}"),
                Some(Err(e)) => log::warn!("case task failed: {e}"),
            }
        }
    }
}

/// One (page, viewport) unit of work, owned by its task
struct CaseTask {
    page: PageSpec,
    viewport: Viewport,
    config: Arc<SuiteConfig>,
    capture: Arc<dyn Capture>,
    capture_permits: Arc<Semaphore>,
    metrics: Arc<dyn MetricsCollector>,
}

impl CaseTask {
    fn case(&self) -> TestCase {
        TestCase::new(&self.page, &self.viewport)
    }

    fn failed(&self, kind: ErrorKind, message: impl Into<String>) -> CaseOutcome {
        self.metrics.record_event(
            RunEvent::CaseErrored,
            case_metadata(&self.page.name, &self.viewport.name),
        );
        CaseOutcome::error(self.case(), ErrorOutcome::new(kind, message))
    }

    fn request(&self, role: CaptureRole) -> CaptureRequest {
        let locator = match role {
            CaptureRole::Reference => &self.page.reference,
            CaptureRole::Candidate => &self.page.candidate,
        };
        CaptureRequest {
            page: self.page.name.clone(),
            role,
            locator: locator.clone(),
            viewport: self.viewport.clone(),
        }
    }

    async fn capture(&self, request: CaptureRequest) -> Result<ImageFrame, String> {
        let _permit = self
            .capture_permits
            .acquire()
            .await
            .map_err(|e| e.to_string())?;
        let started = Instant::now();
        let frame = self
            .capture
            .capture(&request)
            .await
            .map_err(|e| format!("{} capture failed: {}", request.role, e))?;
        self.metrics.record_metric(
            MetricData::new("capture_duration_ms", started.elapsed().as_millis() as f64)
                .with_tag("page", &request.page)
                .with_tag("viewport", &request.viewport.name)
                .with_tag("role", request.role.as_str()),
        );
        Ok(frame)
    }

    async fn run(self) -> CaseOutcome {
        let case = self.case();
        log::debug!("{case}: capturing");
        self.metrics.record_event(
            RunEvent::CaseStarted,
            case_metadata(&self.page.name, &self.viewport.name),
        );

        let (reference, candidate) = tokio::join!(
            self.capture(self.request(CaptureRole::Reference)),
            self.capture(self.request(CaptureRole::Candidate)),
        );
        let (reference, candidate) = match (reference, candidate) {
            (Ok(r), Ok(c)) => (r, c),
            (Err(message), _) | (_, Err(message)) => {
                log::warn!("{case}: {message}");
                return self.failed(ErrorKind::Capture, message);
            }
        };

        let page = self.page.clone();
        let viewport = self.viewport.clone();
        let policy = self.config.policy;
        let options = self.config.diff;
        let started = Instant::now();
        let evaluated = tokio::task::spawn_blocking(move || {
            evaluate(&page, &viewport, &reference, &candidate, &policy, &options)
        })
        .await;
        self.metrics
            .record_duration("evaluate", started.elapsed());

        match evaluated {
            Ok(outcome) => {
                let event = if outcome.is_error() {
                    RunEvent::CaseErrored
                } else {
                    RunEvent::CaseCompared
                };
                self.metrics
                    .record_event(event, case_metadata(&self.page.name, &self.viewport.name));
                outcome
            }
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                log::warn!("{case}: evaluation panicked: {message}");
                self.failed(ErrorKind::Internal, format!("evaluation panicked: {message}"))
            }
            Err(e) => self.failed(ErrorKind::Internal, e.to_string()),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Resets the state to Idle when a run ends without a report
///
/// Covers initialization failures and a dropped `run()` future. Dropping
/// the future also drops the `JoinSet`, which aborts the case tasks.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("run abandoned, state back to idle");
            *self.state.lock() = RunState::Idle;
        }
    }
}
