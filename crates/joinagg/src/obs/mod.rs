//! Observability: in-process counters and the sink abstraction that feeds them.
//!
//! Resolution and codec paths emit `MetricsEvent`s through `sink::record`;
//! they never touch counter state directly.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, TypeCounters};
pub use sink::{
    MetricsEvent, MetricsSink, ResolveOutcome, metrics_report, metrics_reset_all, with_metrics_sink,
};
