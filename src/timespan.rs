//! Time-span sugar and the per-test time-limit wrapper.

use std::future::Future;
use std::time::Duration;

use crate::outcome::Outcome;

/// Readable duration constructors for integer literals: `50.millis()`,
/// `2.seconds()`. Multiplications that would overflow saturate at
/// `Duration::MAX` rather than panicking.
pub trait SpanExt {
    fn nanos(self) -> Duration;
    fn micros(self) -> Duration;
    fn millis(self) -> Duration;
    fn seconds(self) -> Duration;
    fn minutes(self) -> Duration;
}

impl SpanExt for u64 {
    fn nanos(self) -> Duration {
        Duration::from_nanos(self)
    }

    fn micros(self) -> Duration {
        Duration::from_micros(self)
    }

    fn millis(self) -> Duration {
        Duration::from_millis(self)
    }

    fn seconds(self) -> Duration {
        Duration::from_secs(self)
    }

    fn minutes(self) -> Duration {
        self.checked_mul(60)
            .map(Duration::from_secs)
            .unwrap_or(Duration::MAX)
    }
}

/// Wraps a test body with a deadline. An in-budget body's outcome passes
/// through untouched; an over-budget one becomes a `Failed` outcome carrying
/// the limit. Cancellation happens at the body's next suspension point.
pub async fn time_limited<F>(limit: Duration, body: F) -> Outcome
where
    F: Future<Output = Outcome>,
{
    match tokio::time::timeout(limit, body).await {
        Ok(outcome) => outcome,
        Err(_) => Outcome::failed(format!("test exceeded time limit of {:?}", limit)),
    }
}
