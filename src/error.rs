//! Harness error taxonomy.
//!
//! Registration errors are raised synchronously to the caller. Per-test
//! failures never appear here: they are captured into an
//! [`Outcome`](crate::outcome::Outcome) and reported, so one test's failure
//! cannot unwind into its siblings. The only execution-time variant is
//! `SuiteAborted`, produced when the injected abort policy classifies a
//! failure as fatal to the whole suite.

use thiserror::Error;

use crate::outcome::Location;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    /// A test with this name already exists in the registry. The registry is
    /// left unchanged by the rejected registration.
    #[error("duplicate test name '{name}' (first registered at {first})")]
    DuplicateName { name: String, first: Location },

    /// Registration was attempted after the suite entered its ready phase.
    #[error("cannot register '{name}': registration is closed")]
    RegistrationClosed { name: String },

    /// A fatal failure unwound the continuation chain; tests registered after
    /// `test` never ran.
    #[error("suite aborted during '{test}': {message}")]
    SuiteAborted { test: String, message: String },
}
