//! Include/exclude tag filtering.
//!
//! A [`Filter`] is a pure predicate over a test's tag set; it holds no state
//! and never observes execution.

use std::collections::BTreeSet;

/// Decides which registered tests actually run.
///
/// With no include set, a test runs unless one of its tags is excluded. With
/// an include set, a test runs only if at least one of its tags is included
/// and none is excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    include: Option<BTreeSet<String>>,
    exclude: BTreeSet<String>,
}

impl Filter {
    /// A filter that runs everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds tags to the include set, creating it if absent.
    pub fn including<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let include = self.include.get_or_insert_with(BTreeSet::new);
        include.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Adds tags to the exclude set.
    pub fn excluding<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn should_run(&self, tags: &BTreeSet<String>) -> bool {
        if tags.iter().any(|t| self.exclude.contains(t)) {
            return false;
        }
        match &self.include {
            None => true,
            Some(include) => tags.iter().any(|t| include.contains(t)),
        }
    }
}
