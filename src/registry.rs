//! Test registry and suite lifecycle.
//!
//! The registry is the single source of truth for what a suite contains. It
//! is built once, during the registration phase, and becomes read-only the
//! moment the suite first runs. That transition is monotonic: `Registering`
//! moves to `Closed` exactly once and never back, so the execution phase can
//! read descriptors without any locking.
//!
//! Registry Invariant: no two descriptors share a name, and
//! `names_in_order` is the authoritative ordering for both execution and
//! reporting.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::error::HarnessError;
use crate::outcome::{Location, Outcome};

/// A registered test body: invoked at most once, yielding the test's
/// asynchronous outcome.
pub type TestBody = Box<dyn FnOnce() -> BoxFuture<'static, Outcome> + Send>;

/// Everything the harness knows about one registered test. Created at
/// registration time and immutable thereafter; owned exclusively by the
/// registry until execution takes the body.
pub struct TestDescriptor {
    pub name: String,
    pub tags: BTreeSet<String>,
    pub location: Location,
    pub ignored: bool,
    body: Option<TestBody>,
}

impl TestDescriptor {
    /// Removes the body for execution. Returns `None` if it was already
    /// taken; descriptors are single-shot.
    pub(crate) fn take_body(&mut self) -> Option<TestBody> {
        self.body.take()
    }
}

impl fmt::Debug for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDescriptor")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("location", &self.location)
            .field("ignored", &self.ignored)
            .field("body", &self.body.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Lifecycle phase of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Registering,
    Closed,
}

/// Insertion-ordered mapping from unique test name to descriptor.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<TestDescriptor>,
    index: HashMap<String, usize>,
    phase: Phase,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            phase: Phase::Registering,
        }
    }

    /// Registers a test, preserving insertion order.
    ///
    /// Fails with [`HarnessError::DuplicateName`] if the name is taken and
    /// with [`HarnessError::RegistrationClosed`] once the suite has run;
    /// either way the registry is left unchanged.
    #[track_caller]
    pub fn register<I, S, F, Fut>(&mut self, name: impl Into<String>, tags: I, body: F) -> Result<(), HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let location = Location::caller();
        self.insert(name.into(), collect_tags(tags), boxed_body(body), location, false)
    }

    /// Registers a test that is reported as ignored instead of run. Ignored
    /// names still occupy the namespace.
    #[track_caller]
    pub fn ignore<I, S, F, Fut>(&mut self, name: impl Into<String>, tags: I, body: F) -> Result<(), HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let location = Location::caller();
        self.insert(name.into(), collect_tags(tags), boxed_body(body), location, true)
    }

    fn insert(
        &mut self,
        name: String,
        tags: BTreeSet<String>,
        body: TestBody,
        location: Location,
        ignored: bool,
    ) -> Result<(), HarnessError> {
        if self.phase == Phase::Closed {
            return Err(HarnessError::RegistrationClosed { name });
        }
        if let Some(&existing) = self.index.get(&name) {
            return Err(HarnessError::DuplicateName {
                name,
                first: self.entries[existing].location,
            });
        }

        debug!(test = %name, ignored, "registered test");
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(TestDescriptor {
            name,
            tags,
            location,
            ignored,
            body: Some(body),
        });
        Ok(())
    }

    /// Transitions to the ready phase. Idempotent; there is no way back.
    pub fn close(&mut self) {
        if self.phase == Phase::Registering {
            debug!(tests = self.entries.len(), "registry closed");
            self.phase = Phase::Closed;
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Registered test names in registration order. This ordering drives
    /// both execution and reporting.
    pub fn names_in_order(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<TestDescriptor> {
        self.entries
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter().map(Into::into).collect()
}

fn boxed_body<F, Fut>(body: F) -> TestBody
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    Box::new(move || body().boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter;

    fn no_tags() -> iter::Empty<String> {
        iter::empty()
    }

    #[test]
    fn names_come_back_in_registration_order() {
        let mut registry = Registry::new();
        for name in ["gamma", "alpha", "beta"] {
            registry
                .register(name, no_tags(), || async { Outcome::Succeeded })
                .unwrap();
        }
        assert_eq!(registry.names_in_order(), vec!["gamma", "alpha", "beta"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_names_are_rejected_and_leave_the_registry_unchanged() {
        let mut registry = Registry::new();
        registry
            .register("same", no_tags(), || async { Outcome::Succeeded })
            .unwrap();
        registry
            .register("other", no_tags(), || async { Outcome::Succeeded })
            .unwrap();

        let err = registry
            .register("same", no_tags(), || async { Outcome::Pending })
            .unwrap_err();
        match err {
            HarnessError::DuplicateName { name, first } => {
                assert_eq!(name, "same");
                assert!(first.file.ends_with("registry.rs"));
            }
            other => panic!("expected DuplicateName, got {other:?}"),
        }
        assert_eq!(registry.names_in_order(), vec!["same", "other"]);
    }

    #[test]
    fn registration_fails_after_close() {
        let mut registry = Registry::new();
        registry
            .register("early", no_tags(), || async { Outcome::Succeeded })
            .unwrap();
        registry.close();
        assert_eq!(registry.phase(), Phase::Closed);

        let err = registry
            .register("late", no_tags(), || async { Outcome::Succeeded })
            .unwrap_err();
        assert_eq!(
            err,
            HarnessError::RegistrationClosed {
                name: "late".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let mut registry = Registry::new();
        registry.close();
        registry.close();
        assert_eq!(registry.phase(), Phase::Closed);
    }

    #[test]
    fn ignored_tests_occupy_the_namespace() {
        let mut registry = Registry::new();
        registry
            .ignore("flaky", no_tags(), || async { Outcome::Succeeded })
            .unwrap();
        let err = registry
            .register("flaky", no_tags(), || async { Outcome::Succeeded })
            .unwrap_err();
        assert!(matches!(err, HarnessError::DuplicateName { .. }));
    }
}
