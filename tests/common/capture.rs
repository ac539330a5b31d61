//! In-memory capture collaborator with scripted frames, delays and failures

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pixel_parity::frame::ImageFrame;
use pixel_parity::suite::{Capture, CaptureError, CaptureRequest, CaptureRole};

type Key = (String, String, CaptureRole);

#[derive(Clone)]
enum Script {
    Frame(Arc<ImageFrame>),
    Fail(String),
}

/// Serves frames keyed by (page, viewport, role)
///
/// Unscripted requests get a frame filled with `default_color` at the
/// viewport's width.
pub struct ScriptedCapture {
    default_color: [u8; 4],
    default_height: u32,
    scripts: HashMap<Key, Script>,
    delays: HashMap<(String, String), Duration>,
    prepare_error: Option<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl ScriptedCapture {
    /// Every capture returns the same solid frame
    pub fn solid(color: [u8; 4], height: u32) -> Self {
        Self {
            default_color: color,
            default_height: height,
            scripts: HashMap::new(),
            delays: HashMap::new(),
            prepare_error: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    fn key(page: &str, viewport: &str, role: CaptureRole) -> Key {
        (page.to_string(), viewport.to_string(), role)
    }

    /// Serve a specific frame
    pub fn with_frame(mut self, page: &str, viewport: &str, role: CaptureRole, frame: ImageFrame) -> Self {
        self.scripts
            .insert(Self::key(page, viewport, role), Script::Frame(Arc::new(frame)));
        self
    }

    /// Fail one capture
    pub fn with_failure(mut self, page: &str, viewport: &str, role: CaptureRole, message: &str) -> Self {
        self.scripts
            .insert(Self::key(page, viewport, role), Script::Fail(message.to_string()));
        self
    }

    /// Delay both captures of a case
    pub fn with_delay(mut self, page: &str, viewport: &str, delay: Duration) -> Self {
        self.delays
            .insert((page.to_string(), viewport.to_string()), delay);
        self
    }

    /// Make `prepare` fail
    pub fn with_prepare_error(mut self, message: &str) -> Self {
        self.prepare_error = Some(message.to_string());
        self
    }

    /// Number of `capture` calls that started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of captures observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Completed captures, as "page/viewport/role", in completion order
    pub fn completed(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl Capture for ScriptedCapture {
    async fn prepare(&self) -> Result<(), CaptureError> {
        match self.prepare_error {
            Some(ref message) => Err(CaptureError::Failed(message.clone())),
            None => Ok(()),
        }
    }

    async fn capture(&self, request: &CaptureRequest) -> Result<ImageFrame, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self
            .delays
            .get(&(request.page.clone(), request.viewport.name.clone()))
        {
            tokio::time::sleep(*delay).await;
        }

        let key = Self::key(&request.page, &request.viewport.name, request.role);
        let result = match self.scripts.get(&key) {
            Some(Script::Frame(frame)) => Ok(ImageFrame::clone(frame)),
            Some(Script::Fail(message)) => Err(CaptureError::Failed(message.clone())),
            None => Ok(ImageFrame::filled(
                request.viewport.width,
                self.default_height,
                self.default_color,
            )),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.log.lock().push(format!(
            "{}/{}/{}",
            request.page, request.viewport.name, request.role
        ));
        result
    }
}
