//! The emitter seam between the coordinator and a metrics backend.

use crate::metrics::{AmountMetric, CountMetric, IntervalMetric};

/// Handle returned by [`Emitter::begin`], passed back on end or cancel so a
/// backend can pair up events from interleaved operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeginToken(pub u64);

/// Receives metric events from the coordinator.
///
/// A successful operation emits `begin`, `end`, `increment`. A failed one
/// emits `begin`, `cancel`. Implementations must be cheap: they are called
/// on every operation.
pub trait Emitter: Send + Sync {
    fn begin(&self, interval: IntervalMetric) -> BeginToken;

    fn end(&self, token: BeginToken, interval: IntervalMetric);

    /// Discard an interval opened by `begin`: the operation failed and its
    /// elapsed time must not be recorded.
    fn cancel(&self, token: BeginToken, interval: IntervalMetric);

    fn increment(&self, count: CountMetric);

    fn add(&self, amount: AmountMetric, value: u64);
}

/// Emitter that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

impl Emitter for NoopEmitter {
    fn begin(&self, _interval: IntervalMetric) -> BeginToken {
        BeginToken(0)
    }

    fn end(&self, _token: BeginToken, _interval: IntervalMetric) {}

    fn cancel(&self, _token: BeginToken, _interval: IntervalMetric) {}

    fn increment(&self, _count: CountMetric) {}

    fn add(&self, _amount: AmountMetric, _value: u64) {}
}
