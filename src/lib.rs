pub use crate::error::HarnessError;
pub use crate::executor::{AbortPolicy, ExecutionMode, NeverAbort};
pub use crate::filter::Filter;
pub use crate::outcome::{Failure, Location, Outcome};
pub use crate::registry::{Phase, Registry, TestBody, TestDescriptor};
pub use crate::report::{
    ConsoleReporter, Event, JsonLinesReporter, RecordingReporter, Reporter, Summary,
};
pub use crate::suite::Suite;
pub use crate::timespan::{time_limited, SpanExt};

pub mod error;
pub mod executor;
pub mod filter;
pub mod outcome;
pub mod registry;
pub mod report;
pub mod style;
pub mod suite;
pub mod timespan;
