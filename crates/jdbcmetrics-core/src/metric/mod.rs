//! Metric identity and the four metric kinds.

pub mod counter;
pub mod histogram;
pub mod meter;
pub mod name;
pub mod sample;
pub mod timer;

use std::sync::Arc;

pub use counter::Counter;
pub use histogram::Histogram;
pub use meter::Meter;
pub use name::MetricName;
pub use sample::{ExpDecaySample, Sample, Snapshot, UniformSample};
pub use timer::{Timer, TimerContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Meter,
    Histogram,
    Timer,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Meter => "meter",
            MetricKind::Histogram => "histogram",
            MetricKind::Timer => "timer",
        }
    }
}

/// A live metric held by the registry.
#[derive(Debug, Clone)]
pub enum Metric {
    Counter(Arc<Counter>),
    Meter(Arc<Meter>),
    Histogram(Arc<Histogram>),
    Timer(Arc<Timer>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Meter(_) => MetricKind::Meter,
            Metric::Histogram(_) => MetricKind::Histogram,
            Metric::Timer(_) => MetricKind::Timer,
        }
    }
}
