//! Metric instrumentation for accessmux.
//!
//! Every public coordinator operation is bracketed with a begin/end pair on
//! success or a begin/cancel pair on failure, plus an occurrence count.
//! Transitive-closure queries also report how many groups they expanded and
//! how many group shards they touched.

pub mod emitter;
pub mod log;
pub mod memory;
pub mod metrics;

pub use emitter::{BeginToken, Emitter, NoopEmitter};
pub use log::LogEmitter;
pub use memory::{MemoryEmitter, MetricEvent};
pub use metrics::{AmountMetric, CountMetric, IntervalMetric};
