//! Result classification for a single test execution.
//!
//! Every test body resolves to exactly one [`Outcome`]. Pending and omitted
//! tests are explicit variants rather than sentinel panics, so the executor
//! never has to catch-and-classify control-flow exceptions: anything that
//! unwinds out of a test body is a genuine failure.

use std::any::Any;
use std::fmt;

use serde::Serialize;

/// Source position captured at registration time, used to point diagnostics
/// (duplicate names, failure reports) back at the registering call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
}

impl Location {
    /// Captures the caller's position. Only meaningful when every frame
    /// between the test author and this call carries `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Details of a failed or canceled test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub message: String,
    pub location: Option<Location>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Converts a caught panic payload into a failure, preserving string
    /// payloads verbatim.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panicked with a non-string payload".to_string()
        };
        Self::new(format!("test panicked: {}", message))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{} ({})", self.message, loc),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The closed set of results one test execution can produce.
///
/// Produced once per execution, immutable, and consumed by the reporter
/// boundary. `Canceled` marks a test that gave up on a precondition rather
/// than asserting falsely; `Omitted` marks a test the harness chose not to
/// evaluate at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed(Failure),
    Canceled(Failure),
    Pending,
    Omitted,
}

impl Outcome {
    /// Shorthand for a failure with no recorded location.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(Failure::new(message))
    }

    /// Shorthand for a cancellation with no recorded location.
    pub fn canceled(message: impl Into<String>) -> Self {
        Self::Canceled(Failure::new(message))
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }

    /// The word used for this outcome in reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
            Self::Canceled(_) => "canceled",
            Self::Pending => "pending",
            Self::Omitted => "omitted",
        }
    }
}
