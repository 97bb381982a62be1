//! Suite: the run entry point tying registry, filter, executor, and
//! reporter together.
//!
//! A suite is built in two phases. During registration, tests are added
//! through [`Suite::register`]/[`Suite::ignore`] (or the fluent styles in
//! [`crate::style`]). The first — and only — invocation of [`Suite::run`]
//! closes the registry, walks the descriptors in registration order, and
//! drives the continuation chain, streaming lifecycle events to the
//! reporter as it goes.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;

use crate::error::HarnessError;
use crate::executor::{AbortPolicy, ExecutionMode, Executor, NeverAbort};
use crate::filter::Filter;
use crate::outcome::Outcome;
use crate::registry::Registry;
use crate::report::{Event, Reporter, Summary};

pub struct Suite {
    name: String,
    registry: Registry,
    filter: Filter,
    mode: ExecutionMode,
    policy: Arc<dyn AbortPolicy>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: Registry::new(),
            filter: Filter::all(),
            mode: ExecutionMode::default(),
            policy: Arc::new(NeverAbort),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_abort_policy(mut self, policy: Arc<dyn AbortPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registers a test. See [`Registry::register`].
    #[track_caller]
    pub fn register<I, S, F, Fut>(
        &mut self,
        name: impl Into<String>,
        tags: I,
        body: F,
    ) -> Result<(), HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        self.registry.register(name, tags, body)
    }

    /// Registers a test that is reported as ignored instead of run.
    #[track_caller]
    pub fn ignore<I, S, F, Fut>(
        &mut self,
        name: impl Into<String>,
        tags: I,
        body: F,
    ) -> Result<(), HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        self.registry.ignore(name, tags, body)
    }

    /// Runs the suite to completion on the given runtime handle.
    ///
    /// Closing the registry is the lifecycle trigger: after this, no
    /// further registration is possible. Ignored tests are reported but not
    /// run; tests excluded by the tag filter are counted silently. Returns
    /// the summary, or [`HarnessError::SuiteAborted`] if the abort policy
    /// classified a failure as fatal.
    pub async fn run(
        mut self,
        handle: Handle,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Summary, HarnessError> {
        self.registry.close();
        debug!(suite = %self.name, tests = self.registry.len(), "starting suite");
        reporter.apply(&Event::SuiteStarted {
            suite: self.name.clone(),
        });

        let mut summary = Summary::default();
        let mut to_run = Vec::new();
        for desc in self.registry.into_entries() {
            if desc.ignored {
                reporter.apply(&Event::TestIgnored {
                    test: desc.name.clone(),
                });
                summary.ignored += 1;
            } else if !self.filter.should_run(&desc.tags) {
                summary.filtered += 1;
            } else {
                to_run.push(desc);
            }
        }

        let executor = Executor::new(handle)
            .with_mode(self.mode)
            .with_policy(Arc::clone(&self.policy));

        match executor.execute(to_run, Arc::clone(&reporter)).await {
            Ok(results) => {
                for (_, outcome) in &results {
                    summary.record(outcome);
                }
                debug!(suite = %self.name, run = summary.total_run(), "suite completed");
                reporter.apply(&Event::SuiteCompleted {
                    suite: self.name.clone(),
                    summary,
                });
                Ok(summary)
            }
            Err(abort) => {
                reporter.apply(&Event::SuiteAborted {
                    test: abort.test.clone(),
                    message: abort.failure.message.clone(),
                });
                Err(HarnessError::SuiteAborted {
                    test: abort.test,
                    message: abort.failure.message,
                })
            }
        }
    }
}
