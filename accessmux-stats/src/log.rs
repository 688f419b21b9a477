//! Emitter that turns metric events into tracing events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::emitter::{BeginToken, Emitter};
use crate::metrics::{AmountMetric, CountMetric, IntervalMetric};

/// Logs every metric event at debug level, with elapsed milliseconds on
/// interval completion.
#[derive(Debug, Default)]
pub struct LogEmitter {
    next_token: AtomicU64,
    open: Mutex<HashMap<u64, Instant>>,
}

impl LogEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn millis(started: Option<Instant>) -> f64 {
        started
            .map(|start| (start.elapsed().as_secs_f64() * 1_000_000.0).round() / 1000.0)
            .unwrap_or_default()
    }
}

impl Emitter for LogEmitter {
    fn begin(&self, interval: IntervalMetric) -> BeginToken {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.open.lock().insert(token, Instant::now());
        debug!(metric = %interval, "begin");
        BeginToken(token)
    }

    fn end(&self, token: BeginToken, interval: IntervalMetric) {
        let started = self.open.lock().remove(&token.0);
        debug!(metric = %interval, elapsed_ms = Self::millis(started), "end");
    }

    fn cancel(&self, token: BeginToken, interval: IntervalMetric) {
        self.open.lock().remove(&token.0);
        debug!(metric = %interval, "cancel");
    }

    fn increment(&self, count: CountMetric) {
        debug!(metric = %count, "increment");
    }

    fn add(&self, amount: AmountMetric, value: u64) {
        debug!(metric = %amount, value, "add");
    }
}
