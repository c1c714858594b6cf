//! Module: obs::sink
//! Codec and resolution code report what happened as a `MetricsEvent`.
//! Only this module touches the thread-local counters in `obs::metrics`.
use crate::obs::metrics;
use std::{cell::RefCell, fmt, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ResolveOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveOutcome {
    Resolved,
    UnmappedIndex,
    UnmappedChildType,
}

impl ResolveOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::UnmappedIndex => "unmapped_index",
            Self::UnmappedChildType => "unmapped_child_type",
        }
    }
}

impl fmt::Display for ResolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    TextParsed {
        aggregation_type: &'static str,
    },
    WireDecoded {
        aggregation_type: &'static str,
    },
    Resolved {
        aggregation_type: &'static str,
        outcome: ResolveOutcome,
    },
    FactoryBuilt {
        aggregation_type: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
///
/// Writes into the thread-local counters; used unless a test installs its own sink.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::TextParsed { aggregation_type } => {
                m.ops.text_parsed = m.ops.text_parsed.saturating_add(1);
                let entry = m.types.entry(aggregation_type.to_string()).or_default();
                entry.text_parsed = entry.text_parsed.saturating_add(1);
            }

            MetricsEvent::WireDecoded { aggregation_type } => {
                m.ops.wire_decoded = m.ops.wire_decoded.saturating_add(1);
                let entry = m.types.entry(aggregation_type.to_string()).or_default();
                entry.wire_decoded = entry.wire_decoded.saturating_add(1);
            }

            MetricsEvent::Resolved {
                aggregation_type,
                outcome,
            } => {
                match outcome {
                    ResolveOutcome::Resolved => {
                        m.ops.resolved = m.ops.resolved.saturating_add(1);
                    }
                    ResolveOutcome::UnmappedIndex => {
                        m.ops.unmapped_index = m.ops.unmapped_index.saturating_add(1);
                    }
                    ResolveOutcome::UnmappedChildType => {
                        m.ops.unmapped_child_type = m.ops.unmapped_child_type.saturating_add(1);
                    }
                }
                let entry = m.types.entry(aggregation_type.to_string()).or_default();
                entry.resolutions = entry.resolutions.saturating_add(1);
            }

            MetricsEvent::FactoryBuilt { aggregation_type } => {
                m.ops.factories_built = m.ops.factories_built.saturating_add(1);
                let entry = m.types.entry(aggregation_type.to_string()).or_default();
                entry.factories_built = entry.factories_built.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Route events to `sink` while `f` runs, restoring the previous sink afterwards.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{
        MetricsEvent, MetricsSink, ResolveOutcome, metrics_report, metrics_reset_all, record,
        with_metrics_sink,
    };
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct CaptureSink(RefCell<Vec<MetricsEvent>>);

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn global_sink_counts_per_type_and_outcome() {
        metrics_reset_all();
        record(MetricsEvent::Resolved {
            aggregation_type: "children",
            outcome: ResolveOutcome::UnmappedIndex,
        });
        record(MetricsEvent::Resolved {
            aggregation_type: "children",
            outcome: ResolveOutcome::Resolved,
        });
        record(MetricsEvent::TextParsed {
            aggregation_type: "children",
        });

        let report = metrics_report();
        assert_eq!(report.ops.unmapped_index, 1);
        assert_eq!(report.ops.resolved, 1);
        assert_eq!(report.ops.text_parsed, 1);
        assert_eq!(report.types["children"].resolutions, 2);

        metrics_reset_all();
        assert_eq!(metrics_report(), super::metrics::EventReport::default());
    }

    #[test]
    fn override_sink_captures_and_restores() {
        metrics_reset_all();
        let capture = Rc::new(CaptureSink::default());
        let event = MetricsEvent::FactoryBuilt {
            aggregation_type: "children",
        };

        with_metrics_sink(capture.clone(), || record(event));

        assert_eq!(*capture.0.borrow(), vec![event]);
        assert_eq!(metrics_report().ops.factories_built, 0);

        record(event);
        assert_eq!(metrics_report().ops.factories_built, 1);
        assert_eq!(capture.0.borrow().len(), 1);
    }
}
