//! Reporter boundary: the ordered event stream a suite produces and the
//! sinks that consume it.
//!
//! Events for one suite arrive in a fixed shape: `SuiteStarted`, then for
//! each test a `TestStarted` followed by exactly one settled event, then a
//! terminal `SuiteCompleted` or `SuiteAborted`. Reporters are opaque sinks;
//! the harness never inspects what they do with an event.

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;

use crate::outcome::Outcome;

/// Per-suite result counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: usize,
    pub pending: usize,
    pub ignored: usize,
    pub filtered: usize,
}

impl Summary {
    /// Number of tests whose bodies were actually evaluated.
    pub fn total_run(&self) -> usize {
        self.succeeded + self.failed + self.canceled + self.pending
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.canceled == 0
    }

    pub(crate) fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Canceled(_) => self.canceled += 1,
            Outcome::Pending => self.pending += 1,
            Outcome::Omitted => self.filtered += 1,
        }
    }
}

/// One lifecycle event in a suite's report stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SuiteStarted { suite: String },
    TestStarted { test: String },
    TestSucceeded { test: String },
    TestFailed { test: String, message: String },
    TestCanceled { test: String, message: String },
    TestPending { test: String },
    TestIgnored { test: String },
    SuiteAborted { test: String, message: String },
    SuiteCompleted { suite: String, summary: Summary },
}

impl Event {
    /// The test this event concerns, if it is a per-test event.
    pub fn test_name(&self) -> Option<&str> {
        match self {
            Self::TestStarted { test }
            | Self::TestSucceeded { test }
            | Self::TestFailed { test, .. }
            | Self::TestCanceled { test, .. }
            | Self::TestPending { test }
            | Self::TestIgnored { test }
            | Self::SuiteAborted { test, .. } => Some(test),
            Self::SuiteStarted { .. } | Self::SuiteCompleted { .. } => None,
        }
    }

    /// True for the event that settles a test (everything per-test except
    /// `TestStarted`).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::TestSucceeded { .. }
                | Self::TestFailed { .. }
                | Self::TestCanceled { .. }
                | Self::TestPending { .. }
                | Self::TestIgnored { .. }
        )
    }
}

/// Sink for suite lifecycle events. Implementations must tolerate being
/// called from whatever task the suite runs on.
pub trait Reporter: Send + Sync {
    fn apply(&self, event: &Event);
}

// Color constants for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Human-readable console reporter: PASS/FAIL/SKIP lines plus a trailing
/// summary, colorized when stderr is a terminal.
pub struct ConsoleReporter {
    use_colors: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Apply color formatting to text if colors are enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn apply(&self, event: &Event) {
        match event {
            Event::SuiteStarted { suite } => println!("Running suite: {}", suite),
            Event::TestStarted { .. } => {}
            Event::TestSucceeded { test } => {
                println!("{}: {}", self.colorize("PASS", GREEN), test)
            }
            Event::TestFailed { test, message } => {
                eprintln!("{}: {}", self.colorize("FAIL", RED), test);
                eprintln!("  Error: {}", message);
            }
            Event::TestCanceled { test, message } => {
                println!(
                    "{}: {} ({})",
                    self.colorize("CANCEL", YELLOW),
                    test,
                    message
                )
            }
            Event::TestPending { test } => {
                println!("{}: {}", self.colorize("PEND", YELLOW), test)
            }
            Event::TestIgnored { test } => {
                println!("{}: {}", self.colorize("SKIP", YELLOW), test)
            }
            Event::SuiteAborted { test, message } => {
                eprintln!(
                    "{}: suite aborted during '{}': {}",
                    self.colorize("ABORT", RED),
                    test,
                    message
                );
            }
            Event::SuiteCompleted { suite, summary } => {
                println!(
                    "\n{}: total {}, {} {}, {} {}, {} {}",
                    suite,
                    summary.total_run(),
                    self.colorize("passed", GREEN),
                    summary.succeeded,
                    self.colorize("failed", RED),
                    summary.failed,
                    self.colorize("skipped", YELLOW),
                    summary.ignored + summary.filtered,
                );
            }
        }
    }
}

/// Reporter that records every event it sees; used by tests to assert on
/// report ordering.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far, in arrival order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event log poisoned").clone()
    }

    /// Names of tests in the order their settled events arrived.
    pub fn settled_names(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.is_settled())
            .filter_map(|e| e.test_name().map(str::to_string))
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn apply(&self, event: &Event) {
        self.events
            .lock()
            .expect("event log poisoned")
            .push(event.clone());
    }
}

/// Machine-readable reporter: one JSON object per event, newline-delimited.
pub struct JsonLinesReporter<W: Write + Send> {
    sink: Mutex<W>,
}

impl<W: Write + Send> JsonLinesReporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner().expect("sink poisoned")
    }
}

impl<W: Write + Send> Reporter for JsonLinesReporter<W> {
    fn apply(&self, event: &Event) {
        let mut sink = self.sink.lock().expect("sink poisoned");
        if let Ok(line) = serde_json::to_string(event) {
            // A broken sink must not unwind into the suite.
            let _ = writeln!(sink, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Failure;

    #[test]
    fn summary_buckets_every_outcome() {
        let mut summary = Summary::default();
        summary.record(&Outcome::Succeeded);
        summary.record(&Outcome::Failed(Failure::new("x")));
        summary.record(&Outcome::Canceled(Failure::new("y")));
        summary.record(&Outcome::Pending);
        summary.record(&Outcome::Omitted);
        assert_eq!(summary.total_run(), 4);
        assert_eq!(summary.filtered, 1);
        assert!(!summary.is_clean());
    }

    #[test]
    fn json_lines_reporter_emits_one_object_per_event() {
        let reporter = JsonLinesReporter::new(Vec::new());
        reporter.apply(&Event::SuiteStarted {
            suite: "s".to_string(),
        });
        reporter.apply(&Event::TestFailed {
            test: "t".to_string(),
            message: "nope".to_string(),
        });

        let raw = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"suite_started\""));
        assert!(lines[1].contains("\"test_failed\""));
        assert!(lines[1].contains("\"nope\""));
    }

    #[test]
    fn recording_reporter_preserves_arrival_order() {
        let reporter = RecordingReporter::new();
        reporter.apply(&Event::TestStarted {
            test: "a".to_string(),
        });
        reporter.apply(&Event::TestSucceeded {
            test: "a".to_string(),
        });
        assert_eq!(reporter.settled_names(), vec!["a"]);
    }
}
