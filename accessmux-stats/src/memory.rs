//! Accumulating in-process recorder.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::emitter::{BeginToken, Emitter};
use crate::metrics::{AmountMetric, CountMetric, IntervalMetric};

/// One recorded metric event, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEvent {
    Begin(IntervalMetric),
    End(IntervalMetric),
    Cancel(IntervalMetric),
    Increment(CountMetric),
    Add(AmountMetric, u64),
}

/// Emitter that keeps every event in memory.
///
/// Backs the test suite and `SHOW`-style introspection. The event log grows
/// unbounded, so production deployments should wire a real backend instead.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    next_token: AtomicU64,
    events: Mutex<Vec<MetricEvent>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events emitted so far, in order.
    pub fn events(&self) -> Vec<MetricEvent> {
        self.events.lock().clone()
    }

    pub fn count_of(&self, count: CountMetric) -> u64 {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, MetricEvent::Increment(c) if *c == count))
            .count() as u64
    }

    /// Sum of all `add` events for one amount metric.
    pub fn total_of(&self, amount: AmountMetric) -> u64 {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                MetricEvent::Add(a, value) if *a == amount => Some(*value),
                _ => None,
            })
            .sum()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Emitter for MemoryEmitter {
    fn begin(&self, interval: IntervalMetric) -> BeginToken {
        self.events.lock().push(MetricEvent::Begin(interval));
        BeginToken(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    fn end(&self, _token: BeginToken, interval: IntervalMetric) {
        self.events.lock().push(MetricEvent::End(interval));
    }

    fn cancel(&self, _token: BeginToken, interval: IntervalMetric) {
        self.events.lock().push(MetricEvent::Cancel(interval));
    }

    fn increment(&self, count: CountMetric) {
        self.events.lock().push(MetricEvent::Increment(count));
    }

    fn add(&self, amount: AmountMetric, value: u64) {
        self.events.lock().push(MetricEvent::Add(amount, value));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bracket_recording() {
        let emitter = MemoryEmitter::new();

        let token = emitter.begin(IntervalMetric::UserAddTime);
        emitter.end(token, IntervalMetric::UserAddTime);
        emitter.increment(CountMetric::UserAdded);
        emitter.add(
            AmountMetric::HasAccessToApplicationComponentGroupsMappedToUser,
            6,
        );

        assert_eq!(
            emitter.events(),
            vec![
                MetricEvent::Begin(IntervalMetric::UserAddTime),
                MetricEvent::End(IntervalMetric::UserAddTime),
                MetricEvent::Increment(CountMetric::UserAdded),
                MetricEvent::Add(
                    AmountMetric::HasAccessToApplicationComponentGroupsMappedToUser,
                    6
                ),
            ]
        );
        assert_eq!(emitter.count_of(CountMetric::UserAdded), 1);
        assert_eq!(
            emitter.total_of(AmountMetric::HasAccessToApplicationComponentGroupsMappedToUser),
            6
        );
    }

    #[test]
    fn test_tokens_unique() {
        let emitter = MemoryEmitter::new();
        let a = emitter.begin(IntervalMetric::UserAddTime);
        let b = emitter.begin(IntervalMetric::GroupAddTime);
        assert_ne!(a, b);
    }
}
