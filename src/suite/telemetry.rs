//! Run telemetry
//!
//! The orchestrator reports lifecycle events and timings to a pluggable
//! [`MetricsCollector`]. Collectors observe only; they never influence the
//! outcome of a run.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Run event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// Configuration accepted, capture prepared
    RunStarted,
    /// A case began capturing
    CaseStarted,
    /// A case produced a comparison
    CaseCompared,
    /// A case ended in an error outcome
    CaseErrored,
    /// The run deadline passed with cases still in flight
    RunTimedOut,
    /// All outcomes collected
    RunCompleted,
}

/// Metric data point
#[derive(Debug, Clone)]
pub struct MetricData {
    /// Metric name
    pub name: String,
    /// Metric value
    pub value: f64,
    /// Tags for categorization
    pub tags: HashMap<String, String>,
}

impl MetricData {
    /// Create a new metric
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            tags: HashMap::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Trait for pluggable metrics collection
pub trait MetricsCollector: Send + Sync {
    /// Collector name
    fn name(&self) -> &str;

    /// Record a run event
    fn record_event(&self, event: RunEvent, metadata: HashMap<String, String>);

    /// Record a metric value
    fn record_metric(&self, metric: MetricData);

    /// Record how long a stage took
    fn record_duration(&self, stage: &str, duration: Duration) {
        let metric = MetricData::new(format!("{}_duration_ms", stage), duration.as_millis() as f64)
            .with_tag("stage", stage);
        self.record_metric(metric);
    }

    /// Flush any buffered output
    fn flush(&self) {}
}

/// Build the metadata map for a case event
pub(crate) fn case_metadata(page: &str, viewport: &str) -> HashMap<String, String> {
    HashMap::from([
        ("page".to_string(), page.to_string()),
        ("viewport".to_string(), viewport.to_string()),
    ])
}

/// No-op collector (default)
#[derive(Debug, Default)]
pub struct NoOpCollector;

impl MetricsCollector for NoOpCollector {
    fn name(&self) -> &str {
        "noop"
    }

    fn record_event(&self, _event: RunEvent, _metadata: HashMap<String, String>) {}

    fn record_metric(&self, _metric: MetricData) {}
}

/// Forwards everything to the `log` facade at debug level
#[derive(Debug, Default)]
pub struct LogCollector;

impl MetricsCollector for LogCollector {
    fn name(&self) -> &str {
        "log"
    }

    fn record_event(&self, event: RunEvent, metadata: HashMap<String, String>) {
        if metadata.is_empty() {
            log::debug!("[event] {:?}", event);
        } else {
            log::debug!("[event] {:?} {:?}", event, metadata);
        }
    }

    fn record_metric(&self, metric: MetricData) {
        log::debug!("[metric] {}={} {:?}", metric.name, metric.value, metric.tags);
    }
}

/// Event with metadata
pub type EventRecord = (RunEvent, HashMap<String, String>);

/// In-memory collector for testing
#[derive(Debug, Default)]
pub struct MemoryCollector {
    events: Mutex<Vec<EventRecord>>,
    metrics: Mutex<Vec<MetricData>>,
}

impl MemoryCollector {
    /// Create a new memory collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().clone()
    }

    /// Count events of one kind
    pub fn count(&self, event: RunEvent) -> usize {
        self.events.lock().iter().filter(|(e, _)| *e == event).count()
    }

    /// Get all recorded metrics
    pub fn metrics(&self) -> Vec<MetricData> {
        self.metrics.lock().clone()
    }

    /// Clear all recorded data
    pub fn clear(&self) {
        self.events.lock().clear();
        self.metrics.lock().clear();
    }
}

impl MetricsCollector for MemoryCollector {
    fn name(&self) -> &str {
        "memory"
    }

    fn record_event(&self, event: RunEvent, metadata: HashMap<String, String>) {
        self.events.lock().push((event, metadata));
    }

    fn record_metric(&self, metric: MetricData) {
        self.metrics.lock().push(metric);
    }
}

/// Terminal progress bar advanced once per finished case
pub struct ProgressCollector {
    bar: ProgressBar,
}

impl ProgressCollector {
    /// Create a progress bar for `total` cases
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} cases {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    /// A collector that never draws, for non-interactive output
    pub fn hidden(total: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Cases finished so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl MetricsCollector for ProgressCollector {
    fn name(&self) -> &str {
        "progress"
    }

    fn record_event(&self, event: RunEvent, metadata: HashMap<String, String>) {
        match event {
            RunEvent::CaseCompared | RunEvent::CaseErrored => {
                if let (Some(page), Some(viewport)) = (metadata.get("page"), metadata.get("viewport")) {
                    self.bar.set_message(format!("{page}/{viewport}"));
                }
                self.bar.inc(1);
            }
            RunEvent::RunTimedOut => self.bar.abandon_with_message("timed out"),
            RunEvent::RunCompleted => self.bar.finish_and_clear(),
            RunEvent::RunStarted | RunEvent::CaseStarted => {}
        }
    }

    fn record_metric(&self, _metric: MetricData) {}
}
