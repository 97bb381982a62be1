//! Fluent specification styles.
//!
//! These replace implicit DSL verbs with explicit method chains that compose
//! a full test name and register it through the ordinary suite API, so every
//! lifecycle and uniqueness rule applies unchanged.
//!
//! ```no_run
//! # use lockstep::{Outcome, Suite};
//! let mut suite = Suite::new("stack");
//! suite
//!     .describe("A stack")
//!     .it("pops values in LIFO order", || async { Outcome::Succeeded })?
//!     .it("stays empty when nothing is pushed", || async { Outcome::Succeeded })?;
//! # Ok::<(), lockstep::HarnessError>(())
//! ```

use std::future::Future;
use std::iter;

use crate::error::HarnessError;
use crate::outcome::Outcome;
use crate::suite::Suite;

impl Suite {
    /// Flat style: tests named `"<subject> <behavior>"`.
    pub fn describe(&mut self, subject: impl Into<String>) -> Subject<'_> {
        Subject {
            suite: self,
            subject: subject.into(),
        }
    }

    /// Feature style: tests named `"Feature: <f> Scenario: <s>"`.
    pub fn feature(&mut self, feature: impl Into<String>) -> Feature<'_> {
        Feature {
            suite: self,
            feature: feature.into(),
        }
    }
}

/// Registration handle for one subject in the flat style.
pub struct Subject<'a> {
    suite: &'a mut Suite,
    subject: String,
}

impl Subject<'_> {
    fn compose(&self, behavior: &str) -> String {
        format!("{} {}", self.subject, behavior)
    }

    #[track_caller]
    pub fn it<F, Fut>(&mut self, behavior: &str, body: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let name = self.compose(behavior);
        self.suite.register(name, iter::empty::<String>(), body)?;
        Ok(self)
    }

    #[track_caller]
    pub fn it_tagged<I, S, F, Fut>(
        &mut self,
        behavior: &str,
        tags: I,
        body: F,
    ) -> Result<&mut Self, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let name = self.compose(behavior);
        self.suite.register(name, tags, body)?;
        Ok(self)
    }

    #[track_caller]
    pub fn ignore<F, Fut>(&mut self, behavior: &str, body: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let name = self.compose(behavior);
        self.suite.ignore(name, iter::empty::<String>(), body)?;
        Ok(self)
    }
}

/// Registration handle for one feature in the feature style.
pub struct Feature<'a> {
    suite: &'a mut Suite,
    feature: String,
}

impl std::fmt::Debug for Feature<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feature")
            .field("suite", &self.suite.name())
            .field("feature", &self.feature)
            .finish()
    }
}


impl Feature<'_> {
    fn compose(&self, scenario: &str) -> String {
        format!("Feature: {} Scenario: {}", self.feature, scenario)
    }

    #[track_caller]
    pub fn scenario<F, Fut>(&mut self, text: &str, body: F) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let name = self.compose(text);
        self.suite.register(name, iter::empty::<String>(), body)?;
        Ok(self)
    }

    #[track_caller]
    pub fn scenario_tagged<I, S, F, Fut>(
        &mut self,
        text: &str,
        tags: I,
        body: F,
    ) -> Result<&mut Self, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let name = self.compose(text);
        self.suite.register(name, tags, body)?;
        Ok(self)
    }

    #[track_caller]
    pub fn ignore_scenario<F, Fut>(
        &mut self,
        text: &str,
        body: F,
    ) -> Result<&mut Self, HarnessError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let name = self.compose(text);
        self.suite.ignore(name, iter::empty::<String>(), body)?;
        Ok(self)
    }
}
