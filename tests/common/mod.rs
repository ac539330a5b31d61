//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - Assertion helpers for percentages and case outcomes
//! - Frame, PNG and project fixtures
//! - A scripted in-memory capture collaborator
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::capture::ScriptedCapture;
//! use common::fixtures::WHITE;
//!
//! let capture = ScriptedCapture::solid(WHITE, 20);
//! ```

pub mod assertions;
pub mod capture;
pub mod fixtures;

