//! Asynchronous continuation chain.
//!
//! The executor turns an ordered list of test descriptors into a single
//! future. In serial mode (the default) each test's invocation is attached
//! as a continuation on the previous test's completion, so test *N+1* does
//! not begin until test *N*'s outcome has settled — regardless of how long
//! each body suspends. The chain never blocks a worker thread; it only
//! schedules the next invocation as a callback on the injected runtime.
//!
//! Failure semantics: an ordinary failure is recorded into the test's
//! outcome and the chain proceeds to the next test. A failure the injected
//! [`AbortPolicy`] classifies as fatal short-circuits the chain, and the
//! remaining tests never start.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::{FutureExt, TryFutureExt};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::outcome::{Failure, Outcome};
use crate::registry::TestDescriptor;
use crate::report::{Event, Reporter};

/// Caller-supplied classification of which failures are fatal to the whole
/// suite rather than to a single test. Nothing is fatal unless the caller
/// says so.
pub trait AbortPolicy: Send + Sync {
    fn should_abort(&self, failure: &Failure) -> bool;
}

/// The default policy: every failure is recoverable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortPolicy for NeverAbort {
    fn should_abort(&self, _failure: &Failure) -> bool {
        false
    }
}

/// How the executor schedules test bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One test at a time, in registration order.
    #[default]
    Serial,
    /// All bodies spawned up front; settled events still emitted in
    /// registration order.
    Parallel,
}

/// A fatal failure that unwound the chain.
#[derive(Debug)]
pub(crate) struct Abort {
    pub(crate) test: String,
    pub(crate) failure: Failure,
}

/// Runs test bodies on an explicitly injected runtime handle.
pub(crate) struct Executor {
    handle: Handle,
    mode: ExecutionMode,
    policy: Arc<dyn AbortPolicy>,
}

impl Executor {
    pub(crate) fn new(handle: Handle) -> Self {
        Self {
            handle,
            mode: ExecutionMode::default(),
            policy: Arc::new(NeverAbort),
        }
    }

    pub(crate) fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn with_policy(mut self, policy: Arc<dyn AbortPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the given descriptors, firing started/settled events on the
    /// reporter, and returns each test's outcome in registration order.
    pub(crate) async fn execute(
        &self,
        tests: Vec<TestDescriptor>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Vec<(String, Outcome)>, Abort> {
        match self.mode {
            ExecutionMode::Serial => {
                let chain = serial_chain(tests, reporter, Arc::clone(&self.policy));
                match self.handle.spawn(chain).await {
                    Ok(result) => result,
                    // A panic escaping the per-test catch (e.g. inside a
                    // reporter) takes the whole suite down.
                    Err(e) => Err(Abort {
                        test: "(suite)".to_string(),
                        failure: Failure::new(format!("suite task failed: {}", e)),
                    }),
                }
            }
            ExecutionMode::Parallel => self.parallel(tests, reporter).await,
        }
    }

    async fn parallel(
        &self,
        tests: Vec<TestDescriptor>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Vec<(String, Outcome)>, Abort> {
        // Spawn every body immediately; execution order is relaxed but the
        // reporter still sees events in registration order.
        let mut spawned = Vec::with_capacity(tests.len());
        for mut desc in tests {
            let join = desc
                .take_body()
                .map(|body| self.handle.spawn(AssertUnwindSafe(body()).catch_unwind()));
            spawned.push((desc.name, join));
        }
        debug!(tests = spawned.len(), "spawned parallel test bodies");

        let mut results = Vec::with_capacity(spawned.len());
        for (name, join) in spawned {
            // Started events are emitted at reporting time; the body may
            // already be running or even settled.
            reporter.apply(&Event::TestStarted { test: name.clone() });
            let outcome = match join {
                None => Outcome::failed("test body already consumed"),
                Some(join) => match join.await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(payload)) => Outcome::Failed(Failure::from_panic(payload)),
                    Err(e) => Outcome::failed(format!("test task failed: {}", e)),
                },
            };
            if let Some(failure) = fatal_failure(&outcome, self.policy.as_ref()) {
                warn!(test = %name, "fatal failure, aborting suite");
                return Err(Abort { test: name, failure });
            }
            reporter.apply(&outcome_event(&name, &outcome));
            results.push((name, outcome));
        }
        Ok(results)
    }
}

/// Folds the descriptors into one future, seeding with a ready future and
/// attaching each test as a continuation on the previous completion.
fn serial_chain(
    tests: Vec<TestDescriptor>,
    reporter: Arc<dyn Reporter>,
    policy: Arc<dyn AbortPolicy>,
) -> BoxFuture<'static, Result<Vec<(String, Outcome)>, Abort>> {
    let mut chain: BoxFuture<'static, Result<Vec<(String, Outcome)>, Abort>> =
        Box::pin(future::ok(Vec::new()));

    for desc in tests {
        let reporter = Arc::clone(&reporter);
        let policy = Arc::clone(&policy);
        chain = Box::pin(chain.and_then(move |mut acc| async move {
            let mut desc = desc;
            let outcome = run_one(&mut desc, reporter.as_ref()).await;
            if let Some(failure) = fatal_failure(&outcome, policy.as_ref()) {
                warn!(test = %desc.name, "fatal failure, aborting suite");
                return Err(Abort {
                    test: desc.name,
                    failure,
                });
            }
            reporter.apply(&outcome_event(&desc.name, &outcome));
            acc.push((desc.name, outcome));
            Ok(acc)
        }));
    }

    chain
}

/// Fires the started event and runs one body to its settled outcome. A
/// panicking body becomes a `Failed` outcome; it never unwinds into the
/// chain.
async fn run_one(desc: &mut TestDescriptor, reporter: &dyn Reporter) -> Outcome {
    reporter.apply(&Event::TestStarted {
        test: desc.name.clone(),
    });
    let body = match desc.take_body() {
        Some(body) => body,
        None => return Outcome::failed("test body already consumed"),
    };
    debug!(test = %desc.name, "running test body");
    match AssertUnwindSafe(body()).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Outcome::Failed(Failure::from_panic(payload)),
    }
}

fn fatal_failure(outcome: &Outcome, policy: &dyn AbortPolicy) -> Option<Failure> {
    match outcome {
        Outcome::Failed(f) | Outcome::Canceled(f) if policy.should_abort(f) => Some(f.clone()),
        _ => None,
    }
}

fn outcome_event(name: &str, outcome: &Outcome) -> Event {
    let test = name.to_string();
    match outcome {
        Outcome::Succeeded => Event::TestSucceeded { test },
        Outcome::Failed(f) => Event::TestFailed {
            test,
            message: f.message.clone(),
        },
        Outcome::Canceled(f) => Event::TestCanceled {
            test,
            message: f.message.clone(),
        },
        Outcome::Pending => Event::TestPending { test },
        // No dedicated event exists for omission; it reports as ignored.
        Outcome::Omitted => Event::TestIgnored { test },
    }
}
