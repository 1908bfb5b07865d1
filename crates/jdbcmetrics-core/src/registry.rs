//! Metric registry: the single owner of named metrics.
//!
//! Metrics are created get-or-add style: asking for an existing name returns
//! the live instance, asking for it as a different kind is an error. There is
//! no removal; a metric lives as long as the registry.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::clock::{default_clock, Clock};
use crate::error::{MetricsError, Result};
use crate::metric::{Counter, Histogram, Meter, Metric, MetricKind, MetricName, Timer};

/// Observer of metrics added to a registry.
///
/// Reporters use this to discover metrics without polling.
pub trait RegistryListener: Send + Sync {
    fn on_metric_added(&self, name: &MetricName, metric: &Metric);
}

pub struct MetricsRegistry {
    metrics: DashMap<MetricName, Metric>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
    clock: Arc<dyn Clock>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::with_clock(default_clock())
    }

    /// Registry whose meters, timers and decaying histograms read `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            metrics: DashMap::new(),
            listeners: RwLock::new(Vec::new()),
            clock,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn new_counter(&self, name: MetricName) -> Result<Arc<Counter>> {
        match self.get_or_add(name.clone(), || Metric::Counter(Arc::new(Counter::new()))) {
            Metric::Counter(c) => Ok(c),
            other => Err(kind_mismatch(&name, &other, MetricKind::Counter)),
        }
    }

    /// `biased` selects an exponentially decaying sample instead of a
    /// uniform one.
    pub fn new_histogram(&self, name: MetricName, biased: bool) -> Result<Arc<Histogram>> {
        let clock = self.clock();
        match self.get_or_add(name.clone(), move || {
            let h = if biased {
                Histogram::biased_with_clock(clock)
            } else {
                Histogram::uniform()
            };
            Metric::Histogram(Arc::new(h))
        }) {
            Metric::Histogram(h) => Ok(h),
            other => Err(kind_mismatch(&name, &other, MetricKind::Histogram)),
        }
    }

    pub fn new_meter(
        &self,
        name: MetricName,
        event_type: &str,
        rate_unit: Duration,
    ) -> Result<Arc<Meter>> {
        let clock = self.clock();
        match self.get_or_add(name.clone(), move || {
            Metric::Meter(Arc::new(Meter::with_clock(event_type, rate_unit, clock)))
        }) {
            Metric::Meter(m) => Ok(m),
            other => Err(kind_mismatch(&name, &other, MetricKind::Meter)),
        }
    }

    pub fn new_timer(
        &self,
        name: MetricName,
        duration_unit: Duration,
        rate_unit: Duration,
    ) -> Result<Arc<Timer>> {
        let clock = self.clock();
        match self.get_or_add(name.clone(), move || {
            Metric::Timer(Arc::new(Timer::with_clock(duration_unit, rate_unit, clock)))
        }) {
            Metric::Timer(t) => Ok(t),
            other => Err(kind_mismatch(&name, &other, MetricKind::Timer)),
        }
    }

    pub fn get(&self, name: &MetricName) -> Option<Metric> {
        self.metrics.get(name).map(|r| r.value().clone())
    }

    /// All metrics, sorted by name.
    pub fn metrics(&self) -> Vec<(MetricName, Metric)> {
        let mut all: Vec<(MetricName, Metric)> = self
            .metrics
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Register a listener. It is immediately told about every metric
    /// already present, then about each metric added later.
    ///
    /// No registry lock is held while listeners run, so a listener may
    /// register metrics of its own.
    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) {
        let existing = {
            let mut listeners = self.listeners.write();
            listeners.push(Arc::clone(&listener));
            self.metrics()
        };
        for (name, metric) in existing {
            listener.on_metric_added(&name, &metric);
        }
    }

    /// Existing metric under `name`, or a new one from `make`. The caller
    /// checks the kind.
    fn get_or_add<F>(&self, name: MetricName, make: F) -> Metric
    where
        F: FnOnce() -> Metric,
    {
        let (metric, created) = match self.metrics.entry(name.clone()) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(v) => {
                let m = make();
                v.insert(m.clone());
                (m, true)
            }
        };

        if created {
            tracing::trace!(metric = %name, kind = metric.kind().as_str(), "metric registered");
            let listeners: Vec<Arc<dyn RegistryListener>> = self.listeners.read().clone();
            for l in listeners {
                l.on_metric_added(&name, &metric);
            }
        }
        metric
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_mismatch(name: &MetricName, found: &Metric, requested: MetricKind) -> MetricsError {
    MetricsError::MetricKindMismatch {
        name: name.to_string(),
        existing: found.kind().as_str(),
        requested: requested.as_str(),
    }
}
