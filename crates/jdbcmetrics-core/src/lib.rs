//! jdbcmetrics core: metric identities, metric kinds, and the registry that
//! owns them.
//!
//! This crate holds everything a reporter or an instrumentation call site
//! needs to touch a metric. It carries no configuration or plugin loading;
//! those live in `jdbcmetrics-runtime`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Metric updates
//! happen on hot paths inside database calls and must never bring the
//! process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod metric;
pub mod registry;
pub mod snapshot;

pub use error::{BoxError, MetricsError, Result};
pub use metric::{
    Counter, ExpDecaySample, Histogram, Meter, Metric, MetricKind, MetricName, Sample, Snapshot,
    Timer, TimerContext, UniformSample,
};
pub use registry::{MetricsRegistry, RegistryListener};
