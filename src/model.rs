//! Run configuration values and per-case outcomes
//!
//! These are plain immutable values. A [`CaseOutcome`] is produced exactly
//! once per (page, viewport) pair and then only read.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::compare::{ComparisonResult, PassPolicy};

static ARTIFACT_UNSAFE_RE: OnceLock<Regex> = OnceLock::new();

/// A named screen-size configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport name, e.g. "desktop"
    pub name: String,
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

/// A page to verify and where its two renderings come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Page name, e.g. "home"
    pub name: String,
    /// Locator for the reference rendering (URL or path template)
    pub reference: String,
    /// Locator for the candidate rendering (URL or path template)
    pub candidate: String,
}

impl PageSpec {
    /// Create a new page spec
    pub fn new(
        name: impl Into<String>,
        reference: impl Into<String>,
        candidate: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            candidate: candidate.into(),
        }
    }
}

/// Identity of one comparison unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCase {
    /// Page name
    pub page: String,
    /// Viewport name
    pub viewport: String,
}

impl TestCase {
    /// Create a test case for a page at a viewport
    pub fn new(page: &PageSpec, viewport: &Viewport) -> Self {
        Self {
            page: page.name.clone(),
            viewport: viewport.name.clone(),
        }
    }

    /// Deterministic artifact stem, `{page}-{viewport}`
    ///
    /// Characters outside `[A-Za-z0-9_.-]` are replaced with `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixel_parity::model::TestCase;
    ///
    /// let case = TestCase { page: "about us".into(), viewport: "mobile/small".into() };
    /// assert_eq!(case.artifact_name(), "about_us-mobile_small");
    /// ```
    pub fn artifact_name(&self) -> String {
        let re = ARTIFACT_UNSAFE_RE
            .get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("artifact regex is valid"));
        format!(
            "{}-{}",
            re.replace_all(&self.page, "_"),
            re.replace_all(&self.viewport, "_")
        )
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.page, self.viewport)
    }
}

/// Category of a per-case failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// An image could not be decoded
    Decode,
    /// The two frames share no comparable area
    NoOverlap,
    /// The capture collaborator failed
    Capture,
    /// The run deadline passed before the case finished
    Timeout,
    /// The comparison itself failed unexpectedly
    Internal,
}

impl ErrorKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::NoOverlap => "no-overlap",
            Self::Capture => "capture",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        }
    }
}

/// A case that produced no comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorOutcome {
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl ErrorOutcome {
    /// Create an error outcome
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The outcome recorded for cases cut off by the run deadline
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "timeout")
    }
}

/// Either a finished comparison or the reason there is none
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CaseResult {
    /// Both frames were compared
    Compared(ComparisonResult),
    /// The case failed before a comparison could be made
    Error(ErrorOutcome),
}

/// Final outcome of one test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// Which page and viewport this is
    pub case: TestCase,
    /// Comparison or error
    pub result: CaseResult,
}

impl CaseOutcome {
    /// Wrap a comparison
    pub fn compared(case: TestCase, result: ComparisonResult) -> Self {
        Self {
            case,
            result: CaseResult::Compared(result),
        }
    }

    /// Wrap an error
    pub fn error(case: TestCase, error: ErrorOutcome) -> Self {
        Self {
            case,
            result: CaseResult::Error(error),
        }
    }

    /// The comparison, if one was made
    pub fn comparison(&self) -> Option<&ComparisonResult> {
        match &self.result {
            CaseResult::Compared(c) => Some(c),
            CaseResult::Error(_) => None,
        }
    }

    /// The error, if the case failed
    pub fn error_outcome(&self) -> Option<&ErrorOutcome> {
        match &self.result {
            CaseResult::Compared(_) => None,
            CaseResult::Error(e) => Some(e),
        }
    }

    /// True only for a comparison that passed its policy
    pub fn passed(&self) -> bool {
        self.comparison().is_some_and(ComparisonResult::passed)
    }

    /// True if the case ended in an error
    pub fn is_error(&self) -> bool {
        matches!(self.result, CaseResult::Error(_))
    }

    /// Re-derive the verdict of a comparison under `policy`
    pub(crate) fn judge(&mut self, policy: &PassPolicy) {
        if let CaseResult::Compared(ref mut comparison) = self.result {
            comparison.judge(policy);
        }
    }
}
