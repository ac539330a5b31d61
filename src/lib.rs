#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! pixel-parity library
//!
//! A visual-regression verification engine: given a reference and a
//! candidate rendering of the same page at the same viewport, it decides
//! whether they match, measures how much they differ, and aggregates many
//! such decisions into one verdict. It can be used programmatically in
//! addition to the CLI interface.
//!
//! # Basic Example
//!
//! Comparing two frames directly:
//!
//! ```
//! use pixel_parity::compare::{evaluate, DiffOptions, PassPolicy};
//! use pixel_parity::frame::ImageFrame;
//! use pixel_parity::model::{PageSpec, Viewport};
//!
//! let page = PageSpec::new("home", "live.png", "local.png");
//! let viewport = Viewport::new("desktop", 1920, 1080);
//! let black = ImageFrame::filled(10, 10, [0, 0, 0, 255]);
//! let white = ImageFrame::filled(10, 10, [255, 255, 255, 255]);
//!
//! let outcome = evaluate(&page, &viewport, &black, &white, &PassPolicy::standard(), &DiffOptions::default());
//! let result = outcome.comparison().unwrap();
//! assert_eq!(result.diff_percentage(), 100.0);
//! assert!(!outcome.passed());
//! ```
//!
//! # Advanced Example: Running a Suite
//!
//! The orchestrator captures every page at every viewport through an
//! injected [`Capture`](suite::Capture) and reduces the outcomes into a
//! [`SuiteReport`](report::SuiteReport):
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use pixel_parity::frame::ImageFrame;
//! use pixel_parity::model::{PageSpec, Viewport};
//! use pixel_parity::suite::{Capture, CaptureError, CaptureRequest, Orchestrator, SuiteConfig};
//!
//! struct Solid;
//!
//! #[async_trait]
//! impl Capture for Solid {
//!     async fn capture(&self, request: &CaptureRequest) -> Result<ImageFrame, CaptureError> {
//!         Ok(ImageFrame::filled(request.viewport.width, 20, [200, 200, 200, 255]))
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = SuiteConfig::new(
//!     vec![PageSpec::new("home", "https://example.com/", "http://localhost:8000/")],
//!     vec![Viewport::new("desktop", 32, 20), Viewport::new("mobile", 16, 20)],
//! );
//! let report = Orchestrator::new(config, Arc::new(Solid)).run().await.unwrap();
//!
//! assert_eq!(report.total_tests(), 2);
//! assert_eq!(report.accuracy_percentage(), 100.0);
//! # });
//! ```

/// Command handlers for CLI operations
pub mod cmd;
/// Frame reconciliation, pixel differencing and case evaluation
pub mod compare;
/// Configuration file, presets and validation
pub mod config;
/// Application errors with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Decoded RGBA frames and image loading
pub mod frame;
/// Infrastructure traits for filesystem access
pub mod infra;
/// Pages, viewports and per-case outcomes
pub mod model;
/// Aggregation, publishing and run-to-run comparison
pub mod report;
/// Suite orchestration, capture and telemetry
pub mod suite;
